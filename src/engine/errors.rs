use crate::engine::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum FormStateError {
    #[error("Storage is not available in this environment")]
    StorageUnavailable,

    #[error("Form saver has been disposed")]
    Disposed,

    #[error("Form registry lock is poisoned")]
    Poisoned,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
