use std::fmt::Debug;
use std::sync::Arc;
use anyhow::Result;
use log::{debug, warn};

use super::area::{LocalStore, StorageArea};

const PROBE_KEY: &str = "__gosub_formstate_probe__";

/// Best-effort facade over a [`StorageArea`].
///
/// Writes are fire-and-forget: a rejected write (quota, I/O, closed pool) is
/// logged and dropped. There is no retry and the caller is never told.
#[derive(Clone)]
pub struct StorageAdapter {
    area: Arc<dyn StorageArea>,
}

impl Debug for StorageAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAdapter").finish_non_exhaustive()
    }
}

impl StorageAdapter {
    pub fn new(area: Arc<dyn StorageArea>) -> Self {
        Self { area }
    }

    /// Resolves the local storage area for the origin of `page_url`.
    pub fn for_url(store: &dyn LocalStore, page_url: &str) -> Result<Self> {
        let url = url::Url::parse(page_url)?;
        Ok(Self::new(store.area(&url.origin())?))
    }

    /// Checks that the area actually accepts a write, not just that it exists.
    pub fn is_available(&self) -> bool {
        if let Err(e) = self.area.set_item(PROBE_KEY, PROBE_KEY) {
            debug!("storage probe rejected: {e}");
            return false;
        }
        let readable = self.area.get_item(PROBE_KEY).as_deref() == Some(PROBE_KEY);
        if let Err(e) = self.area.remove_item(PROBE_KEY) {
            debug!("could not remove storage probe: {e}");
        }
        readable
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.area.get_item(key)
    }

    pub fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.area.set_item(key, value) {
            warn!("dropping write for {key:?}: {e}");
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.area.remove_item(key) {
            warn!("could not remove {key:?}: {e}");
        }
    }

    pub fn area(&self) -> &Arc<dyn StorageArea> {
        &self.area
    }
}
