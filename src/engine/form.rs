//! The engine's view of a `<form>` element.
//!
//! The form saver never walks a DOM tree itself. It asks a [`FormDocument`]
//! for a snapshot of the form's controls (in document order) and writes back
//! through two mutators. Event delivery is the host's job: it calls
//! [`FormSaver::dispatch`](crate::saver::FormSaver::dispatch) with a
//! [`FormEvent`] whenever the user types, changes a control, submits or
//! resets the form.

use crate::engine::GROUP_NAME_MARKER;
use url::Url;

pub mod memory;

/// Position-independent handle of a control inside its form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlId(pub usize);

/// The `type` of an input-capable control.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ControlType {
    Text,
    Search,
    Email,
    Tel,
    Url,
    Number,
    TextArea,
    Hidden,
    Checkbox,
    Radio,
    Select,
    SelectMultiple,
    Submit,
    Reset,
    Button,
    Image,
    File,
    Password,
}

impl ControlType {
    /// Maps an HTML `type` attribute (or tag name for `textarea`/`select`).
    /// Unknown input types fall back to text, as browsers do.
    pub fn from_type_attr(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "search" => ControlType::Search,
            "email" => ControlType::Email,
            "tel" => ControlType::Tel,
            "url" => ControlType::Url,
            "number" => ControlType::Number,
            "textarea" => ControlType::TextArea,
            "hidden" => ControlType::Hidden,
            "checkbox" => ControlType::Checkbox,
            "radio" => ControlType::Radio,
            "select" | "select-one" => ControlType::Select,
            "select-multiple" => ControlType::SelectMultiple,
            "submit" => ControlType::Submit,
            "reset" => ControlType::Reset,
            "button" => ControlType::Button,
            "image" => ControlType::Image,
            "file" => ControlType::File,
            "password" => ControlType::Password,
            _ => ControlType::Text,
        }
    }

    /// Buttons, file pickers and password inputs are never persisted.
    pub fn is_protectable(self) -> bool {
        !matches!(
            self,
            ControlType::Submit
                | ControlType::Reset
                | ControlType::Button
                | ControlType::Image
                | ControlType::File
                | ControlType::Password
        )
    }

    /// Free text and multi-line text: the controls saved on every keystroke.
    pub fn is_text_like(self) -> bool {
        matches!(
            self,
            ControlType::Text
                | ControlType::Search
                | ControlType::Email
                | ControlType::Tel
                | ControlType::Url
                | ControlType::Number
                | ControlType::TextArea
        )
    }
}

/// How a field's value is encoded in storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    CheckboxSingle,
    /// A checkbox whose name contains `[`, e.g. `toppings[]`.
    CheckboxGroup,
    Radio,
    MultiSelect,
    Other,
}

/// Snapshot of one control.
///
/// For a `SelectMultiple`, `value` is the comma-joined list of selected option values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub id: ControlId,
    pub control_type: ControlType,
    pub name: Option<String>,
    pub value: String,
    pub checked: bool,
}

impl Control {
    /// Name usable as a key component. Empty names count as missing.
    pub fn identity(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn kind(&self) -> FieldKind {
        match self.control_type {
            ControlType::Checkbox => {
                if self.identity().map_or(false, |n| n.contains(GROUP_NAME_MARKER)) {
                    FieldKind::CheckboxGroup
                } else {
                    FieldKind::CheckboxSingle
                }
            }
            ControlType::Radio => FieldKind::Radio,
            ControlType::SelectMultiple => FieldKind::MultiSelect,
            t if t.is_text_like() => FieldKind::Text,
            _ => FieldKind::Other,
        }
    }
}

/// A control eligible for persistence, as seen during one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedField {
    pub control: Control,
    pub kind: FieldKind,
    pub excluded: bool,
}

impl ProtectedField {
    /// Every protectable control of `controls`, in document order.
    pub fn enumerate(controls: &[Control], is_excluded: impl Fn(&str) -> bool) -> Vec<ProtectedField> {
        controls
            .iter()
            .filter(|c| c.control_type.is_protectable())
            .map(|c| ProtectedField {
                kind: c.kind(),
                excluded: c.identity().map_or(false, &is_excluded),
                control: c.clone(),
            })
            .collect()
    }

    pub fn identity(&self) -> Option<&str> {
        self.control.identity()
    }
}

/// Host side of a `<form>` element.
pub trait FormDocument {
    /// The form's `id` attribute.
    fn form_id(&self) -> Option<String>;

    /// The form's `name` attribute.
    fn form_name(&self) -> Option<String>;

    /// URL of the page showing the form.
    fn location(&self) -> Option<Url>;

    /// Snapshot of all input-capable controls, in document order.
    fn controls(&self) -> Vec<Control>;

    /// Assigns a value. For a `SelectMultiple` the value is a comma-joined list.
    fn set_value(&mut self, id: ControlId, value: &str);

    /// Sets the checked state of a checkbox or radio.
    fn set_checked(&mut self, id: ControlId, checked: bool);
}

/// Notifications the host delivers for a protected form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormEvent {
    /// Character-level edit of a control
    Input(ControlId),
    /// Committed change of a control
    Change(ControlId),
    Submit,
    Reset,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control(t: ControlType, name: Option<&str>) -> Control {
        Control {
            id: ControlId(0),
            control_type: t,
            name: name.map(str::to_string),
            value: String::new(),
            checked: false,
        }
    }

    #[test]
    fn type_attribute_mapping() {
        assert_eq!(ControlType::from_type_attr("TEXTAREA"), ControlType::TextArea);
        assert_eq!(ControlType::from_type_attr("select-multiple"), ControlType::SelectMultiple);
        assert_eq!(ControlType::from_type_attr("datetime-local"), ControlType::Text);
        assert_eq!(ControlType::from_type_attr("password"), ControlType::Password);
    }

    #[test]
    fn buttons_files_and_passwords_are_not_protectable() {
        for t in [
            ControlType::Submit,
            ControlType::Reset,
            ControlType::Button,
            ControlType::Image,
            ControlType::File,
            ControlType::Password,
        ] {
            assert!(!t.is_protectable(), "{t:?}");
        }
        assert!(ControlType::Hidden.is_protectable());
        assert!(ControlType::Select.is_protectable());
    }

    #[test]
    fn checkbox_kind_follows_bracket_convention() {
        assert_eq!(control(ControlType::Checkbox, Some("newsletter")).kind(), FieldKind::CheckboxSingle);
        assert_eq!(control(ControlType::Checkbox, Some("topics[]")).kind(), FieldKind::CheckboxGroup);
        assert_eq!(control(ControlType::Checkbox, Some("topics[news]")).kind(), FieldKind::CheckboxGroup);
        assert_eq!(control(ControlType::Radio, Some("size")).kind(), FieldKind::Radio);
        assert_eq!(control(ControlType::TextArea, Some("bio")).kind(), FieldKind::Text);
        assert_eq!(control(ControlType::Select, Some("country")).kind(), FieldKind::Other);
        assert_eq!(control(ControlType::SelectMultiple, Some("langs")).kind(), FieldKind::MultiSelect);
    }

    #[test]
    fn empty_name_has_no_identity() {
        assert_eq!(control(ControlType::Text, Some("")).identity(), None);
        assert_eq!(control(ControlType::Text, None).identity(), None);
    }

    #[test]
    fn enumerate_skips_unprotectable_and_flags_exclusions() {
        let controls = vec![
            control(ControlType::Text, Some("name")),
            control(ControlType::Password, Some("secret")),
            control(ControlType::Submit, Some("go")),
            control(ControlType::Text, Some("iban")),
            control(ControlType::Text, None),
        ];

        let fields = ProtectedField::enumerate(&controls, |n| n == "iban");
        assert_eq!(fields.len(), 3);
        assert!(!fields[0].excluded);
        assert!(fields[1].excluded);
        assert_eq!(fields[2].identity(), None);
        assert!(!fields[2].excluded);
    }
}
