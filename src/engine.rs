//! Form state persistence for the Gosub engine.
//!
//! This module keeps the in-progress state of a user-editable form in the
//! zone's local storage so it survives reloads, crashes and accidental
//! navigation, and puts it back when the form is shown again.
//!
//! # Concepts
//!
//! - A [`FormDocument`] is the engine's view of one `<form>` element: its
//!   identity, its location and its controls in document order.
//! - A [`FormSaver`] protects one form. It derives a storage key for every
//!   protected field, captures values on input/change/periodic triggers,
//!   restores them on `protect()` and clears them again on submit or reset.
//! - A [`FormRegistry`] maps a [`FormId`] to its saver so a form is never
//!   protected twice.
//! - All reads and writes go through a [`StorageAdapter`], a best-effort
//!   facade over any [`StorageArea`] backend.
//!
//! # Example
//!
//! ```rust
//! use gosub_formstate::{ControlType, FormEvent, FormId, FormRegistry, MemoryForm, ProtectConfig};
//! use gosub_formstate::storage::{InMemoryLocalStore, StorageAdapter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let adapter = StorageAdapter::for_url(&InMemoryLocalStore::new(), "https://example.com/signup")?;
//! let registry = FormRegistry::new(adapter);
//!
//! let mut form = MemoryForm::new(Some("signup"), None);
//! let email = form.add(ControlType::Email, Some("email"), "");
//!
//! let saver = registry.protect(FormId::new(), &mut form, ProtectConfig::default())?;
//!
//! form.type_text(email, "jane@example.com");
//! saver.lock().unwrap().dispatch(&mut form, FormEvent::Input(email));
//! # Ok(()) }
//! ```

pub mod codec;
pub mod config;
pub mod errors;
pub mod form;
pub mod key;
pub mod registry;
pub mod saver;
pub mod storage;
pub mod tick;

/// Marker inside a checkbox name that turns it into a checkbox group (`interests[]`).
pub const GROUP_NAME_MARKER: char = '[';

/// Separator between the values of a multi-valued field in its stored form.
pub const MULTI_VALUE_SEPARATOR: char = ',';

pub use codec::StoredValue;
pub use config::{Callbacks, ConfigError, ProtectConfig, ProtectConfigBuilder, ProtectOptions, MAX_TIMEOUT_SECS};
pub use errors::FormStateError;
pub use form::memory::MemoryForm;
pub use form::{Control, ControlId, ControlType, FieldKind, FormDocument, FormEvent};
pub use key::{KeyScope, PageLocation};
pub use registry::{FormId, FormRegistry, SaverHandle};
pub use saver::{FormSaver, ProtectionState};
pub use storage::{StorageAdapter, StorageArea};
pub use tick::{RepeatingTimer, TickResult};
