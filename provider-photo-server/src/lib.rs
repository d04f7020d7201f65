//! # Photo Server Provider
//!
//! Implements `RemoteSyncEndpoint` for the photo server HTTP API.
//!
//! ## Overview
//!
//! The server exposes two routes:
//! - `GET /check?filename=<name>` answers whether a file of that name is stored
//! - `POST /submit` accepts one `multipart/form-data` part named `photo`
//!
//! Requests go through the host's `HttpClient` and file bytes come from its
//! `ContentSource`, so this crate has no network or filesystem code of its own.

pub mod endpoint;
pub mod error;
pub mod types;

pub use endpoint::{guess_mime_type, PhotoServerEndpoint};
pub use error::{PhotoServerError, Result};
