use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use anyhow::{anyhow, Result};
use crate::engine::storage::area::{LocalStore, StorageArea, StorageError};

/// In‑memory local storage (no persistence). Used as a default when no storage is defined by the UA.
///
/// Every area can carry a byte quota, counted as the sum of key and value lengths.
/// A quota of zero models a host that exposes storage but rejects every write.
#[derive(Default)]
pub struct InMemoryLocalStore {
    areas: Mutex<HashMap<url::Origin, Arc<dyn StorageArea>>>,
    quota: Option<usize>,
}

impl InMemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose areas refuse writes beyond `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            areas: Mutex::default(),
            quota: Some(bytes),
        }
    }
}

impl LocalStore for InMemoryLocalStore {
    fn area(&self, origin: &url::Origin) -> Result<Arc<dyn StorageArea>> {
        let mut guard = self
            .areas
            .lock()
            .map_err(|_| anyhow!("in-memory local store lock poisoned"))?;
        let quota = self.quota;
        Ok(guard
            .entry(origin.clone())
            .or_insert_with(|| Arc::new(InMemoryLocalArea::new(quota)) as Arc<dyn StorageArea>)
            .clone())
    }
}

#[derive(Default)]
struct InMemoryLocalArea {
    map: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl InMemoryLocalArea {
    fn new(quota: Option<usize>) -> Self {
        Self {
            map: Mutex::default(),
            quota,
        }
    }

    fn map(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.map
            .lock()
            .map_err(|_| anyhow!("in-memory storage area lock poisoned"))
    }
}

fn usage(map: &HashMap<String, String>) -> usize {
    map.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl StorageArea for InMemoryLocalArea {
    fn get_item(&self, key: &str) -> Option<String> {
        self.map.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.map()?;
        if let Some(quota) = self.quota {
            let replaced = map.get(key).map_or(0, |old| key.len() + old.len());
            let needed = usage(&map) - replaced + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota }.into());
            }
        }
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.map()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.map()?.clear();
        Ok(())
    }

    fn len(&self) -> usize {
        self.map.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn keys(&self) -> Vec<String> {
        let mut v: Vec<String> = self
            .map
            .lock()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        v.sort_unstable(); // deterministic order for callers and tests
        v
    }
}
