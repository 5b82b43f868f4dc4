use super::{Control, ControlId, ControlType, FormDocument};
use url::Url;

/// In-process [`FormDocument`].
///
/// Used by headless hosts and tests. It keeps controls in insertion order
/// (document order) and mimics the DOM rule that checking a radio unchecks
/// every other radio with the same name in the form.
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    id: Option<String>,
    name: Option<String>,
    location: Option<Url>,
    controls: Vec<Control>,
    next_id: usize,
}

impl MemoryForm {
    pub fn new(id: Option<&str>, name: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            name: name.map(str::to_string),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, url: Url) -> Self {
        self.location = Some(url);
        self
    }

    /// Changes the form's `id` and `name` attributes, as a script could.
    pub fn set_identity(&mut self, id: Option<&str>, name: Option<&str>) {
        self.id = id.map(str::to_string);
        self.name = name.map(str::to_string);
    }

    /// Appends a control and returns its handle.
    pub fn add(&mut self, control_type: ControlType, name: Option<&str>, value: &str) -> ControlId {
        self.push(control_type, name, value, false)
    }

    pub fn add_checkbox(&mut self, name: &str, value: &str, checked: bool) -> ControlId {
        self.push(ControlType::Checkbox, Some(name), value, checked)
    }

    pub fn add_radio(&mut self, name: &str, value: &str, checked: bool) -> ControlId {
        let id = self.push(ControlType::Radio, Some(name), value, false);
        if checked {
            self.set_checked(id, true);
        }
        id
    }

    pub fn remove(&mut self, id: ControlId) -> Option<Control> {
        let pos = self.controls.iter().position(|c| c.id == id)?;
        Some(self.controls.remove(pos))
    }

    pub fn control(&self, id: ControlId) -> Option<&Control> {
        self.controls.iter().find(|c| c.id == id)
    }

    pub fn value(&self, id: ControlId) -> Option<&str> {
        self.control(id).map(|c| c.value.as_str())
    }

    pub fn is_checked(&self, id: ControlId) -> bool {
        self.control(id).map_or(false, |c| c.checked)
    }

    /// Replaces the text of a control the way a user edit would.
    pub fn type_text(&mut self, id: ControlId, text: &str) {
        self.set_value(id, text);
    }

    /// Values of the checked controls named `name`, in document order.
    pub fn checked_values(&self, name: &str) -> Vec<&str> {
        self.controls
            .iter()
            .filter(|c| c.checked && c.name.as_deref() == Some(name))
            .map(|c| c.value.as_str())
            .collect()
    }

    fn push(&mut self, control_type: ControlType, name: Option<&str>, value: &str, checked: bool) -> ControlId {
        let id = ControlId(self.next_id);
        self.next_id += 1;
        self.controls.push(Control {
            id,
            control_type,
            name: name.map(str::to_string),
            value: value.to_string(),
            checked,
        });
        id
    }
}

impl FormDocument for MemoryForm {
    fn form_id(&self) -> Option<String> {
        self.id.clone()
    }

    fn form_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn location(&self) -> Option<Url> {
        self.location.clone()
    }

    fn controls(&self) -> Vec<Control> {
        self.controls.clone()
    }

    fn set_value(&mut self, id: ControlId, value: &str) {
        if let Some(c) = self.controls.iter_mut().find(|c| c.id == id) {
            c.value = value.to_string();
        }
    }

    fn set_checked(&mut self, id: ControlId, checked: bool) {
        let Some(target) = self.control(id).cloned() else {
            return;
        };

        if checked && target.control_type == ControlType::Radio {
            for c in self.controls.iter_mut() {
                if c.control_type == ControlType::Radio && c.name == target.name {
                    c.checked = false;
                }
            }
        }

        if let Some(c) = self.controls.iter_mut().find(|c| c.id == id) {
            c.checked = checked;
        }
    }
}
