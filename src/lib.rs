//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (currently `core-service`). Host applications can depend on
//! `photostore-workspace` and enable `desktop-shims` to get the reqwest, tokio
//! filesystem and media-folder adapters wired in without listing each crate.
