//! Storage layer for form state.
//!
//! This module defines the traits, types, and implementations that hold
//! protected form values. Form state lives in the zone's **LocalStorage**:
//! persistent key/value data per origin, shared by every tab that shows a
//! page of that origin.
//!
//! # Concepts
//!
//! - [`StorageArea`] is the object-safe key/value interface (`get_item`,
//!   `set_item`, `remove_item`, `clear`).
//! - [`LocalStore`] mints the [`StorageArea`] for an origin. Asking twice for
//!   the same origin yields the same logical area.
//! - [`StorageAdapter`] is the facade a [`FormSaver`](crate::saver::FormSaver)
//!   talks to. It probes availability and turns every backend failure into a
//!   logged, swallowed no-op, since form persistence is best-effort.
//!
//! # Available types
//!
//! - [`InMemoryLocalStore`] — in-memory areas with an optional byte quota.
//! - [`SqliteLocalStore`] — SQLite-backed persistent areas (feature `sqlite_store`).
//!
//! # Example
//!
//! ```rust
//! use gosub_formstate::storage::{InMemoryLocalStore, StorageAdapter};
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = InMemoryLocalStore::new();
//! let adapter = StorageAdapter::for_url(&store, "https://example.com/contact")?;
//!
//! assert!(adapter.is_available());
//! adapter.set("greeting", "hello");
//! assert_eq!(adapter.get("greeting").as_deref(), Some("hello"));
//! # Ok(()) }
//! ```

/// Storage area module, defining the key/value storage interface.
pub mod area;
/// Adapter module, the best-effort facade used by form savers.
pub mod adapter;

/// Local storage module, providing storage areas per origin.
pub mod local {
    /// In-memory local storage implementation.
    pub mod in_memory;
    /// SQLite-backed local storage implementation.
    #[cfg(feature = "sqlite_store")]
    pub mod sqlite_store;
}

pub use adapter::StorageAdapter;
pub use area::{LocalStore, StorageArea, StorageError};
pub use local::in_memory::InMemoryLocalStore;
#[cfg(feature = "sqlite_store")]
pub use local::sqlite_store::SqliteLocalStore;
