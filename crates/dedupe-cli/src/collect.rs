//! # Collect Subcommand
//!
//! Walks a source directory and saves every file through deduplicating
//! storage into the unique root, then writes a manifest mapping each
//! original name to its content-hashed name.
//!
//! Files are visited in sorted order so repeated runs over the same tree
//! produce byte-identical manifests. Symbolic links are not followed. Any
//! entry that cannot be read fails the run; a partial manifest is never
//! written.
//!
//! Each new (original name, stored name) pairing is appended to the name
//! ledger: PostgreSQL when `DATABASE_URL` is set, otherwise in-memory for
//! the duration of the run.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use dedupe_core::DedupeConfig;
use dedupe_store::{DedupStorage, FileSystemStorage, Ledger, LedgerBackend};
use walkdir::WalkDir;

use crate::manifest::Manifest;

/// Arguments for the `dedupe collect` subcommand.
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Directory to collect.
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Destination directory. Defaults to the configured unique root.
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Where to write the manifest.
    #[arg(long, default_value = "dedupe-manifest.json")]
    pub manifest: PathBuf,
}

/// Totals reported after a collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectSummary {
    pub files: usize,
    pub stored: usize,
    pub deduplicated: usize,
}

/// Execute the collect subcommand.
pub fn run_collect(args: &CollectArgs, config: &DedupeConfig) -> Result<u8> {
    if !args.source.is_dir() {
        bail!("source is not a directory: {}", args.source.display());
    }
    let dest = args
        .dest
        .clone()
        .unwrap_or_else(|| config.unique_root_dir.clone());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let ledger = runtime.block_on(open_ledger())?;
    let (manifest, summary) = runtime.block_on(collect(&args.source, &dest, config, ledger))?;

    manifest.save(&args.manifest)?;
    println!(
        "OK: collected {} files into {} ({} stored, {} deduplicated), manifest {}",
        summary.files,
        dest.display(),
        summary.stored,
        summary.deduplicated,
        args.manifest.display()
    );
    Ok(0)
}

/// The ledger the API server would use: PostgreSQL when `DATABASE_URL` is
/// set, otherwise in-memory.
async fn open_ledger() -> Result<LedgerBackend> {
    let pool = dedupe_store::db::init_pool()
        .await
        .context("initializing database")?;
    let ledger = LedgerBackend::from_pool(pool);
    tracing::info!(ledger = ledger.kind(), "name ledger ready");
    Ok(ledger)
}

/// Save every file under `source` into `dest`, recording new pairings in
/// `ledger`, and build the manifest.
pub async fn collect<L: Ledger>(
    source: &Path,
    dest: &Path,
    config: &DedupeConfig,
    ledger: L,
) -> Result<(Manifest, CollectSummary)> {
    let storage = DedupStorage::new(
        FileSystemStorage::new(dest, config.unique_namespace_prefix.as_str()),
        ledger,
        config.extension_aliases.clone(),
    );

    let mut manifest = Manifest::default();
    let mut summary = CollectSummary::default();

    for path in walk_sorted(source)? {
        let name = logical_name(source, &path)?;
        let mut file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        let outcome = storage
            .store(&name, &mut file)
            .await
            .with_context(|| format!("failed to store {name}"))?;

        tracing::debug!(original = %name, stored = %outcome.name, "collected");
        summary.files += 1;
        if outcome.deduplicated {
            summary.deduplicated += 1;
        } else {
            summary.stored += 1;
        }
        manifest.insert(name, outcome.name);
    }

    Ok((manifest, summary))
}

/// `/`-separated name of `path` relative to `root`.
fn logical_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component.as_os_str().to_str() {
            Some(part) => parts.push(part),
            None => bail!("file name is not valid UTF-8: {}", path.display()),
        }
    }
    Ok(parts.join("/"))
}

/// Recursively walk a directory, returning all regular file paths sorted.
fn walk_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        let file_type = entry.file_type();
        if file_type.is_symlink() {
            tracing::warn!(path = %entry.path().display(), "skipping symbolic link");
        } else if file_type.is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
