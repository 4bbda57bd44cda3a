//! # Resolve Subcommand
//!
//! Rewrites references through a collection manifest and prints one line per
//! reference: `<reference>\t<url>`. References that cannot be rewritten are
//! printed unchanged. A reference to a file missing from the manifest is
//! logged as a warning and processing continues; `--strict` turns any such
//! miss into a non-zero exit.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use dedupe_core::DedupeConfig;

use crate::manifest::Manifest;

/// Arguments for the `dedupe resolve` subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Manifest written by `dedupe collect`.
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// References to resolve.
    #[arg(value_name = "REFERENCE", required = true)]
    pub references: Vec<String>,

    /// Exit with status 1 if any reference is missing from the manifest.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the resolve subcommand.
pub fn run_resolve(args: &ResolveArgs, config: &DedupeConfig) -> Result<u8> {
    let manifest = Manifest::load(&args.manifest)?;
    let (lines, missing) = resolve_all(&manifest, &args.references, config);
    for line in lines {
        println!("{line}");
    }
    Ok(if args.strict && missing > 0 { 1 } else { 0 })
}

/// Resolve every reference, returning output lines and the number of misses.
fn resolve_all(
    manifest: &Manifest,
    references: &[String],
    config: &DedupeConfig,
) -> (Vec<String>, usize) {
    let mut missing = 0;
    let lines = references
        .iter()
        .map(|reference| {
            match manifest.substitute(reference, &config.unique_namespace_prefix) {
                Ok(Some(url)) => format!("{reference}\t{url}"),
                Ok(None) => format!("{reference}\t{reference}"),
                Err(e) => {
                    tracing::warn!(error = %e, "leaving reference unchanged");
                    missing += 1;
                    format!("{reference}\t{reference}")
                }
            }
        })
        .collect();
    (lines, missing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        let mut m = Manifest::default();
        m.insert("css/site.css", "css/abc.css");
        m
    }

    #[test]
    fn resolves_known_and_keeps_others() {
        let refs = vec![
            "css/site.css".to_string(),
            "https://example.com/x.css".to_string(),
            "img/gone.png".to_string(),
        ];
        let (lines, missing) = resolve_all(&manifest(), &refs, &DedupeConfig::default());
        assert_eq!(
            lines,
            vec![
                "css/site.css\t/dd/css/abc.css",
                "https://example.com/x.css\thttps://example.com/x.css",
                "img/gone.png\timg/gone.png",
            ]
        );
        assert_eq!(missing, 1);
    }

    #[test]
    fn strict_mode_fails_on_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        manifest().save(&path).unwrap();

        let lenient = ResolveArgs {
            manifest: path.clone(),
            references: vec!["img/gone.png".into()],
            strict: false,
        };
        assert_eq!(run_resolve(&lenient, &DedupeConfig::default()).unwrap(), 0);

        let strict = ResolveArgs {
            strict: true,
            ..lenient
        };
        assert_eq!(run_resolve(&strict, &DedupeConfig::default()).unwrap(), 1);
    }
}
