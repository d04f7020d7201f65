//! # Core Runtime Module
//!
//! Foundational infrastructure shared by the catalog and sync crates:
//! - Logging and tracing setup
//! - Configuration with fail-fast bridge validation
//! - Event bus carrying catalog and sync notifications
//!
//! ## Overview
//!
//! Nothing here knows about catalog records or the remote store. Higher crates
//! publish into the [`EventBus`](events::EventBus) and read their settings
//! from [`CoreConfig`](config::CoreConfig).

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
