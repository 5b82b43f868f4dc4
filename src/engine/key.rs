//! Storage key derivation.
//!
//! A key is the plain concatenation of
//!
//! ```text
//! [page location] + form id + form name + field name + custom key prefix
//! ```
//!
//! where the page location (hostname, path, query and fragment) is only
//! present for location-based savers. Within one saver everything but the
//! field name is fixed, so distinct field names always give distinct keys,
//! and two savers protecting the same form on the same page agree on every
//! key (state saved in one tab shows up in another).
//!
//! Keys are rebuilt for every pass: scripts may change a form's `id` or
//! `name` at any time.

use crate::engine::config::ProtectOptions;
use crate::engine::form::FormDocument;
use url::Url;

/// The location component of a key: `hostname + path + ?query + #fragment`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageLocation(String);

impl PageLocation {
    pub fn from_url(url: &Url) -> Self {
        let mut s = String::new();
        s.push_str(url.host_str().unwrap_or(""));
        s.push_str(url.path());
        if let Some(q) = url.query().filter(|q| !q.is_empty()) {
            s.push('?');
            s.push_str(q);
        }
        if let Some(f) = url.fragment().filter(|f| !f.is_empty()) {
            s.push('#');
            s.push_str(f);
        }
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Everything of a key except the field name, resolved for one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyScope {
    prefix: String,
    suffix: String,
}

impl KeyScope {
    pub fn new(location: Option<&PageLocation>, form: &dyn FormDocument, options: &ProtectOptions) -> Self {
        let mut prefix = String::new();
        if options.location_based {
            if let Some(loc) = location {
                prefix.push_str(loc.as_str());
            }
        }
        prefix.push_str(form.form_id().as_deref().unwrap_or(""));
        prefix.push_str(form.form_name().as_deref().unwrap_or(""));

        Self {
            prefix,
            suffix: options.custom_key_prefix.clone(),
        }
    }

    pub fn key_for(&self, field_name: &str) -> String {
        let mut key = String::with_capacity(self.prefix.len() + field_name.len() + self.suffix.len());
        key.push_str(&self.prefix);
        key.push_str(field_name);
        key.push_str(&self.suffix);
        key
    }
}
