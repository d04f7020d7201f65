use bridge_traits::BridgeError;
use core_library::{LibraryError, RecordId, SyncState};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("A sync pass is already in progress")]
    SyncInProgress,

    #[error("Inventory enumeration failed: {0}")]
    Inventory(String),

    #[error("Catalog error: {0}")]
    Library(#[from] LibraryError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Invalid state transition for record {record_id} from {from} to {to}")]
    InvalidStateTransition {
        record_id: RecordId,
        from: SyncState,
        to: SyncState,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;
