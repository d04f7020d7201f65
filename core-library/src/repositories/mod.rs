//! # Repository Pattern Implementation
//!
//! Repository traits and their SQLite implementations.
//!
//! - Traits define the interface, so the sync engine can run against fakes
//! - SQLite implementations use sqlx against a shared `SqlitePool`
//! - Pagination is supported via the `Page<T>` wrapper
//!
//! ## Available Repositories
//!
//! - `CatalogRepository` - Media file records and their sync state

pub mod catalog;
pub mod pagination;

pub use catalog::{CatalogRepository, SqliteCatalogRepository};
pub use pagination::{Page, PageRequest};
