//! # Hash Subcommand
//!
//! Prints the content digest of a file and the unique name it would be
//! stored under. Nothing is written. With `--expect`, the digest is compared
//! against a known value and a mismatch exits with status 1.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use dedupe_core::{digest_reader, unique_name, ContentDigest, DedupeConfig};

/// Arguments for the `dedupe hash` subcommand.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to hash.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Logical name to derive the unique name from. Defaults to the path as given.
    #[arg(long)]
    pub name: Option<String>,

    /// Expected hex digest; exit with status 1 if the file does not match.
    #[arg(long, value_name = "DIGEST")]
    pub expect: Option<String>,
}

/// Execute the hash subcommand.
pub fn run_hash(args: &HashArgs, config: &DedupeConfig) -> Result<u8> {
    let expected = args
        .expect
        .as_deref()
        .map(ContentDigest::from_hex)
        .transpose()
        .context("invalid --expect digest")?;
    let (digest, unique) = hash_file(args, config)?;
    println!("{digest}  {unique}");

    match expected {
        Some(expected) if expected != digest => {
            tracing::error!(expected = %expected, actual = %digest, "digest mismatch");
            Ok(1)
        }
        _ => Ok(0),
    }
}

fn hash_file(args: &HashArgs, config: &DedupeConfig) -> Result<(ContentDigest, String)> {
    let mut file = std::fs::File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let digest = digest_reader(&mut file)
        .with_context(|| format!("failed to hash {}", args.file.display()))?;

    let name = match &args.name {
        Some(name) => name.clone(),
        None => args.file.to_string_lossy().replace('\\', "/"),
    };
    let unique = unique_name(&name, &digest, &config.extension_aliases);
    Ok((digest, unique))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedupe_core::digest_bytes;

    #[test]
    fn hash_reports_digest_and_unique_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.JPEG");
        std::fs::write(&path, b"hello").unwrap();

        let args = HashArgs {
            file: path,
            name: Some("photos/photo.JPEG".into()),
            expect: None,
        };
        let (digest, unique) = hash_file(&args, &DedupeConfig::default()).unwrap();
        assert_eq!(digest, digest_bytes(b"hello"));
        assert_eq!(
            unique,
            "photos/2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824.jpg"
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let args = HashArgs {
            file: PathBuf::from("/definitely/not/here.txt"),
            name: None,
            expect: None,
        };
        assert!(run_hash(&args, &DedupeConfig::default()).is_err());
    }

    #[test]
    fn expect_compares_against_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, b"hello").unwrap();
        let config = DedupeConfig::default();

        let matching = HashArgs {
            file: path.clone(),
            name: None,
            expect: Some(digest_bytes(b"hello").to_hex()),
        };
        assert_eq!(run_hash(&matching, &config).unwrap(), 0);

        let mismatched = HashArgs {
            expect: Some(digest_bytes(b"other").to_hex()),
            ..matching
        };
        assert_eq!(run_hash(&mismatched, &config).unwrap(), 1);

        let malformed = HashArgs {
            file: path,
            name: None,
            expect: Some("not-a-digest".into()),
        };
        let err = run_hash(&malformed, &config).unwrap_err();
        assert!(format!("{err:#}").contains("invalid hex digest"));
    }
}
