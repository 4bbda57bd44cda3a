//! # dedupe-core — Foundational Types for the Dedupe Stack
//!
//! Leaf crate of the workspace. Defines how content is hashed, how a unique
//! storage name is derived from a digest, and how the serving namespaces
//! are configured. It performs no storage or network I/O.
//!
//! ## Key Design Principles
//!
//! 1. **Names come from content.** A stored file is named
//!    `<dir>/<sha256-hex><ext>`. Two writes producing the same name carry
//!    the same bytes, so an existing name is a deduplication hit and never
//!    a collision.
//!
//! 2. **Extensions are canonical.** Extensions are lower-cased and mapped
//!    through [`ExtensionAliases`] (`.jpeg` → `.jpg`, `.yaml` → `.yml` by
//!    default) before they become part of a name.
//!
//! 3. **Configuration is explicit.** [`DedupeConfig`] is built and validated
//!    once at startup and passed to constructors. A namespace prefix of `/`
//!    fails validation, as do namespaces that overlap.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dedupe-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod digest;
pub mod error;
pub mod naming;

// Re-export primary types for ergonomic imports.
pub use config::{DedupeConfig, DedupeSettings, NamespacePrefix};
pub use digest::{digest_bytes, digest_reader, ContentDigest, ContentHasher, DigestAlgorithm};
pub use error::{ConfigError, HashInputError};
pub use naming::{unique_name, ExtensionAliases};
