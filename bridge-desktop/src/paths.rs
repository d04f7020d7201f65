//! Default on-disk locations for desktop hosts

use bridge_traits::error::{BridgeError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "photostore";

/// Per-user data directory, e.g. `~/.local/share/photostore` on Linux.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .ok_or_else(|| BridgeError::NotAvailable("No data directory".to_string()))?;
    Ok(base.join(APP_DIR))
}

/// Default catalog database location inside [`default_data_dir`].
pub fn default_database_path() -> Result<PathBuf> {
    Ok(default_data_dir()?.join("catalog.db"))
}
