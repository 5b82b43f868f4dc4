//! Form protection configuration.
//!
//! `ProtectConfig` controls how a single [`FormSaver`](crate::saver::FormSaver)
//! derives keys, when it captures values and which lifecycle hooks it calls.
//! It is split in two parts:
//!
//! - [`ProtectOptions`]: plain data, deserializable from the JSON object a
//!   host page passes in (`{"excludeFields": [...], "timeout": 10}`).
//! - [`Callbacks`]: the four lifecycle hooks, attached from Rust.
//!
//! # Examples
//!
//! ## Use defaults
//! ```rust
//! use gosub_formstate::ProtectConfig;
//! let cfg = ProtectConfig::default();
//! assert!(cfg.options.auto_release);
//! assert_eq!(cfg.options.timeout, 0);
//! ```
//!
//! ## Customize with the builder
//! ```rust
//! use gosub_formstate::ProtectConfig;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ProtectConfig::builder()
//!     .exclude_field("credit_card")
//!     .custom_key_prefix("checkout")
//!     .location_based(true)
//!     .timeout_secs(10)
//!     .on_save(|| println!("form saved"))
//!     .build()?; // returns Result<ProtectConfig, ConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `exclude_fields`: Field names that are never captured, restored or released.
//! - `custom_key_prefix`: Appended to every derived key, to namespace several savers on one page.
//! - `location_based`: Include the page location in keys so state does not leak across URLs.
//! - `timeout`: Seconds between periodic save passes (0 disables periodic saving, at most [`MAX_TIMEOUT_SECS`]).
//! - `auto_release`: Clear stored state when the form is submitted or reset (default: `true`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

/// Longest accepted periodic save interval: one day.
pub const MAX_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Recognized protection options, as supplied by the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProtectOptions {
    pub exclude_fields: BTreeSet<String>,
    pub custom_key_prefix: String,
    pub location_based: bool,
    /// Periodic save interval in seconds, 0 disables it
    pub timeout: u64,
    pub auto_release: bool,
}

impl Default for ProtectOptions {
    fn default() -> Self {
        Self {
            exclude_fields: BTreeSet::new(),
            custom_key_prefix: String::new(),
            location_based: false,
            timeout: 0,
            auto_release: true,
        }
    }
}

impl ProtectOptions {
    /// Parses the options object a host page passes to `protect()`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Periodic save interval, `None` when periodic saving is disabled.
    pub fn periodic_interval(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_fields.contains(name)
    }
}

pub type Hook = Box<dyn FnMut() + Send>;
pub type BeforeRestoreHook = Box<dyn FnMut() -> bool + Send>;

/// Lifecycle hooks. They report successful transitions only, never failures.
#[derive(Default)]
pub struct Callbacks {
    /// Called once after every save pass, and after an immediate save of a non-empty value.
    pub on_save: Option<Hook>,
    /// Returning `false` skips the restore pass.
    pub on_before_restore: Option<BeforeRestoreHook>,
    /// Called once after a restore pass that found at least one stored value.
    pub on_restore: Option<Hook>,
    /// Called once after a release pass that processed at least one field.
    pub on_release: Option<Hook>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_save", &self.on_save.is_some())
            .field("on_before_restore", &self.on_before_restore.is_some())
            .field("on_restore", &self.on_restore.is_some())
            .field("on_release", &self.on_release.is_some())
            .finish()
    }
}

impl Callbacks {
    pub(crate) fn saved(&mut self) {
        if let Some(cb) = self.on_save.as_mut() {
            cb();
        }
    }

    pub(crate) fn before_restore(&mut self) -> bool {
        self.on_before_restore.as_mut().map_or(true, |cb| cb())
    }

    pub(crate) fn restored(&mut self) {
        if let Some(cb) = self.on_restore.as_mut() {
            cb();
        }
    }

    pub(crate) fn released(&mut self) {
        if let Some(cb) = self.on_release.as_mut() {
            cb();
        }
    }
}

#[derive(Debug, Default)]
pub struct ProtectConfig {
    pub options: ProtectOptions,
    pub callbacks: Callbacks,
}

impl ProtectConfig {
    pub fn builder() -> ProtectConfigBuilder {
        ProtectConfigBuilder::default()
    }

    /// Validates host supplied options and wraps them without callbacks.
    pub fn from_options(options: ProtectOptions) -> Result<Self, ConfigError> {
        Self::builder().options(options).build()
    }
}

/// Builder for [`ProtectConfig`], mirroring `ZoneConfigBuilder`.
#[derive(Debug, Default)]
pub struct ProtectConfigBuilder {
    inner: ProtectConfig,
}

impl ProtectConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut ProtectConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn options(self, options: ProtectOptions) -> Self { self.map(|c| c.options = options) }
    pub fn exclude_field<S: Into<String>>(self, name: S) -> Self { self.map(|c| { c.options.exclude_fields.insert(name.into()); }) }
    pub fn exclude_fields<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.map(|c| c.options.exclude_fields.extend(names.into_iter().map(Into::into)))
    }
    pub fn custom_key_prefix<S: Into<String>>(self, prefix: S) -> Self { self.map(|c| c.options.custom_key_prefix = prefix.into()) }
    pub fn location_based(self, on: bool) -> Self { self.map(|c| c.options.location_based = on) }
    pub fn timeout_secs(self, secs: u64) -> Self { self.map(|c| c.options.timeout = secs) }
    pub fn auto_release(self, on: bool) -> Self { self.map(|c| c.options.auto_release = on) }

    pub fn on_save(self, f: impl FnMut() + Send + 'static) -> Self { self.map(|c| c.callbacks.on_save = Some(Box::new(f))) }
    pub fn on_before_restore(self, f: impl FnMut() -> bool + Send + 'static) -> Self { self.map(|c| c.callbacks.on_before_restore = Some(Box::new(f))) }
    pub fn on_restore(self, f: impl FnMut() + Send + 'static) -> Self { self.map(|c| c.callbacks.on_restore = Some(Box::new(f))) }
    pub fn on_release(self, f: impl FnMut() + Send + 'static) -> Self { self.map(|c| c.callbacks.on_release = Some(Box::new(f))) }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut ProtectConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<ProtectConfig, ConfigError> {
        validate(&self.inner.options)?;
        Ok(self.inner)
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyExcludedField,
    TimeoutTooLarge { secs: u64, max: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyExcludedField =>
                write!(f, "excludeFields contains an empty field name"),
            ConfigError::TimeoutTooLarge { secs, max } =>
                write!(f, "timeout must be at most {max} seconds, got {secs}"),
        }
    }
}
impl std::error::Error for ConfigError {}

fn validate(o: &ProtectOptions) -> Result<(), ConfigError> {
    if o.exclude_fields.iter().any(|name| name.is_empty()) {
        return Err(ConfigError::EmptyExcludedField);
    }
    if o.timeout > MAX_TIMEOUT_SECS {
        return Err(ConfigError::TimeoutTooLarge { secs: o.timeout, max: MAX_TIMEOUT_SECS });
    }
    Ok(())
}
