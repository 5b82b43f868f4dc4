//! Form registry: [`FormRegistry`] and [`FormId`].
//!
//! The registry guarantees one [`FormSaver`] per form. Protecting a form that
//! is already known hands back the existing saver, so its triggers are never
//! bound twice.
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::engine::config::ProtectConfig;
use crate::engine::errors::FormStateError;
use crate::engine::form::FormDocument;
use crate::engine::saver::FormSaver;
use crate::engine::storage::{InMemoryLocalStore, LocalStore, StorageAdapter};

/// A unique identifier for a protected form, represented as a UUID.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormId(Uuid);

impl FormId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FormId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for FormId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type SaverHandle = Arc<Mutex<FormSaver>>;

pub struct FormRegistry {
    /// Storage shared by every saver of this registry
    storage: StorageAdapter,
    savers: Mutex<HashMap<FormId, SaverHandle>>,
}

impl FormRegistry {
    pub fn new(storage: StorageAdapter) -> Self {
        Self {
            storage,
            savers: Mutex::new(HashMap::new()),
        }
    }

    /// Registry backed by a fresh in-memory store, for hosts without persistent storage.
    pub fn in_memory() -> Result<Self, FormStateError> {
        let origin = url::Origin::new_opaque();
        let area = InMemoryLocalStore::new().area(&origin)?;
        Ok(Self::new(StorageAdapter::new(area)))
    }

    pub fn storage(&self) -> &StorageAdapter {
        &self.storage
    }

    /// Returns the saver of `form_id`, creating it with `config` when there is none.
    /// The config of later calls is ignored.
    pub fn create_or_get(&self, form_id: FormId, config: ProtectConfig) -> Result<SaverHandle, FormStateError> {
        let mut savers = self.lock()?;
        if let Some(existing) = savers.get(&form_id) {
            debug!("form {form_id} already protected, reusing its saver");
            return Ok(existing.clone());
        }

        let saver = Arc::new(Mutex::new(FormSaver::new(self.storage.clone(), config)));
        savers.insert(form_id, saver.clone());
        Ok(saver)
    }

    /// Creates (or reuses) the saver of `form_id` and runs `protect()` on it.
    pub fn protect(
        &self,
        form_id: FormId,
        form: &mut dyn FormDocument,
        config: ProtectConfig,
    ) -> Result<SaverHandle, FormStateError> {
        let handle = self.create_or_get(form_id, config)?;
        {
            let mut saver = handle.lock().map_err(|_| FormStateError::Poisoned)?;
            saver.protect(form)?;
        }
        Ok(handle)
    }

    pub fn get(&self, form_id: FormId) -> Result<Option<SaverHandle>, FormStateError> {
        Ok(self.lock()?.get(&form_id).cloned())
    }

    /// Unprotects and forgets the saver of `form_id`. Returns `false` if there was none.
    pub fn dispose(&self, form_id: FormId) -> Result<bool, FormStateError> {
        let Some(handle) = self.lock()?.remove(&form_id) else {
            return Ok(false);
        };
        handle.lock().map_err(|_| FormStateError::Poisoned)?.unprotect();
        debug!("form {form_id} disposed");
        Ok(true)
    }

    pub fn len(&self) -> Result<usize, FormStateError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, FormStateError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<FormId, SaverHandle>>, FormStateError> {
        self.savers.lock().map_err(|_| FormStateError::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::form::{ControlType, FormEvent};
    use crate::engine::form::memory::MemoryForm;
    use crate::engine::saver::ProtectionState;

    #[test]
    fn second_protect_returns_the_same_saver() {
        let registry = FormRegistry::in_memory().unwrap();
        let id = FormId::new();
        let mut form = MemoryForm::new(Some("f"), None);
        form.add(ControlType::Text, Some("t"), "");

        let first = registry.protect(id, &mut form, ProtectConfig::default()).unwrap();
        let second = registry
            .protect(id, &mut form, ProtectConfig::builder().timeout_secs(3).build().unwrap())
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().unwrap(), 1);
        // the first config stays in effect
        assert_eq!(second.lock().unwrap().options().timeout, 0);
    }

    #[test]
    fn distinct_forms_get_distinct_savers() {
        let registry = FormRegistry::in_memory().unwrap();
        let a = registry.create_or_get(FormId::new(), ProtectConfig::default()).unwrap();
        let b = registry.create_or_get(FormId::new(), ProtectConfig::default()).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().unwrap(), 2);
    }

    #[test]
    fn dispose_unprotects_and_forgets() {
        let registry = FormRegistry::in_memory().unwrap();
        let id = FormId::new();
        let mut form = MemoryForm::new(None, None);
        let t = form.add(ControlType::Text, Some("t"), "");

        let handle = registry.protect(id, &mut form, ProtectConfig::default()).unwrap();
        assert!(registry.dispose(id).unwrap());
        assert!(!registry.dispose(id).unwrap());
        assert!(registry.get(id).unwrap().is_none());
        assert!(registry.is_empty().unwrap());

        let mut saver = handle.lock().unwrap();
        assert_eq!(saver.state(), ProtectionState::Disposed);
        assert!(!saver.dispatch(&mut form, FormEvent::Input(t)));
    }

    #[test]
    fn unavailable_storage_is_reported_but_saver_is_kept() {
        let area = InMemoryLocalStore::with_quota(0).area(&url::Origin::new_opaque()).unwrap();
        let registry = FormRegistry::new(StorageAdapter::new(area));
        let id = FormId::new();
        let mut form = MemoryForm::new(None, None);

        let err = registry.protect(id, &mut form, ProtectConfig::default()).unwrap_err();
        assert!(matches!(err, FormStateError::StorageUnavailable));

        let saver = registry.get(id).unwrap().unwrap();
        assert_eq!(saver.lock().unwrap().state(), ProtectionState::Disabled);
    }

    #[test]
    fn poisoned_registry_reports_an_error() {
        let registry = Arc::new(FormRegistry::in_memory().unwrap());
        let r = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = r.savers.lock().unwrap();
            panic!("poison the registry");
        })
        .join();

        assert!(matches!(registry.len(), Err(FormStateError::Poisoned)));
        assert!(matches!(registry.is_empty(), Err(FormStateError::Poisoned)));
        assert!(matches!(registry.get(FormId::new()), Err(FormStateError::Poisoned)));
    }

    #[test]
    fn form_id_round_trips_through_uuid() {
        let uuid = Uuid::new_v4();
        let id = FormId::from(uuid);
        assert_eq!(id.to_string(), uuid.to_string());
    }
}
