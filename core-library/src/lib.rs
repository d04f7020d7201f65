//! # Media Catalog
//!
//! Owns the persistent catalog of media files and their sync state.
//!
//! ## Overview
//!
//! This crate manages:
//! - SQLite database schema and migrations
//! - The `SyncState` protocol states and their legal transitions
//! - Repository access to catalog records with pagination

pub mod db;
pub mod error;
pub mod models;
pub mod repositories;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{LibraryError, Result};
pub use models::{CatalogRecord, CatalogRecordView, NewCatalogRecord, RecordId, SyncState};
pub use repositories::{CatalogRepository, Page, PageRequest, SqliteCatalogRepository};
