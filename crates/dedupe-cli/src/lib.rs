//! # dedupe-cli — CLI Tool for the Dedupe Stack
//!
//! Provides the `dedupe` command-line interface.
//!
//! ## Subcommands
//!
//! - `dedupe collect` — Save a directory tree into content-addressed storage
//!   and write a manifest.
//! - `dedupe hash` — Print a file's digest and unique name.
//! - `dedupe resolve` — Rewrite references through a manifest.
//!
//! ```bash
//! dedupe collect static/ --manifest build/manifest.json
//! dedupe hash static/img/logo.jpeg --name img/logo.jpeg
//! dedupe resolve build/manifest.json css/site.css img/logo.jpeg
//! ```
//!
//! Configuration is read the same way as the API server: the YAML file given
//! by `--config` or `DEDUPE_CONFIG`, overridden by environment variables.

pub mod collect;
pub mod hash;
pub mod manifest;
pub mod resolve;
