//! Stored value encoding.
//!
//! | Field kind | Stored form |
//! |---|---|
//! | text, select, hidden | the raw value |
//! | single checkbox | `"true"` / `"false"` |
//! | radio | value of the checked control |
//! | checkbox group, multi-select | checked values joined with `,` |
//!
//! Decoding is lenient and assumes the value was written by [`StoredValue`]
//! itself. A single checkbox is only unchecked by the exact string `"false"`.

use crate::engine::MULTI_VALUE_SEPARATOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredValue(String);

impl StoredValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn flag(checked: bool) -> Self {
        Self(if checked { "true" } else { "false" }.to_string())
    }

    pub fn list<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut joined = String::new();
        for (i, v) in values.into_iter().enumerate() {
            if i > 0 {
                joined.push(MULTI_VALUE_SEPARATOR);
            }
            joined.push_str(v);
        }
        Self(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_flag(&self) -> bool {
        self.0 != "false"
    }

    /// Items of a list value. The empty string is the empty list.
    pub fn items(&self) -> Vec<&str> {
        if self.0.is_empty() {
            return Vec::new();
        }
        self.0.split(MULTI_VALUE_SEPARATOR).collect()
    }

    pub fn contains_item(&self, value: &str) -> bool {
        self.items().contains(&value)
    }
}

impl From<String> for StoredValue {
    fn from(s: String) -> Self {
        Self(s)
    }
}
