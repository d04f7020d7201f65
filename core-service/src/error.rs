use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Photo server error: {0}")]
    Provider(#[from] provider_photo_server::PhotoServerError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),
}

impl CoreError {
    /// Whether the operation was refused because a sync pass holds the catalog
    pub fn is_busy(&self) -> bool {
        matches!(self, CoreError::Sync(core_sync::SyncError::SyncInProgress))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
