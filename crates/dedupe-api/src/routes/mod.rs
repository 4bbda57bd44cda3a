//! # API Route Modules
//!
//! - `serve` — the unique and legacy file namespaces.
//! - `files` — upload and original-name lookup.

pub mod files;
pub mod serve;
