//! # Unique File Naming
//!
//! Derives the storage name of a file from its requested name and content
//! digest: `<dir>/<digest-hex><ext>`, where `<ext>` is the lower-cased
//! original extension mapped through an [`ExtensionAliases`] table.
//!
//! Names are `/`-separated logical paths regardless of host platform.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::ConfigError;

/// Mapping of lower-case extensions to their canonical spelling.
///
/// Consulted after lower-casing so that `photo.JPEG` and `photo.jpg` with
/// the same bytes resolve to one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ExtensionAliases(BTreeMap<String, String>);

impl ExtensionAliases {
    /// An empty table. Every extension maps to itself.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Add or replace an alias. Both sides are normalized to a lower-case
    /// extension with a leading dot.
    pub fn insert(&mut self, from: &str, to: &str) -> Result<(), ConfigError> {
        let from = normalize_alias_ext(from)?;
        let to = normalize_alias_ext(to)?;
        self.0.insert(from, to);
        Ok(())
    }

    /// Merge `overrides` over this table, overrides winning.
    pub fn merged(mut self, overrides: &ExtensionAliases) -> Self {
        for (from, to) in &overrides.0 {
            self.0.insert(from.clone(), to.clone());
        }
        self
    }

    /// Parse `from=to` pairs separated by commas, e.g. `.tif=.tiff,.htm=.html`.
    pub fn parse_pairs(input: &str) -> Result<Self, ConfigError> {
        let mut aliases = Self::empty();
        for pair in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (from, to) = pair.split_once('=').ok_or_else(|| {
                ConfigError::InvalidAlias(format!("expected from=to, got {pair:?}"))
            })?;
            aliases.insert(from.trim(), to.trim())?;
        }
        Ok(aliases)
    }

    /// Canonical extension for `ext` (which must include its leading dot).
    ///
    /// The input is lower-cased before lookup. Empty input stays empty.
    pub fn canonical(&self, ext: &str) -> String {
        let lower = ext.to_lowercase();
        match self.0.get(&lower) {
            Some(alias) => alias.clone(),
            None => lower,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for ExtensionAliases {
    /// `.jpeg` → `.jpg` and `.yaml` → `.yml`.
    fn default() -> Self {
        let mut map = BTreeMap::new();
        map.insert(".jpeg".to_string(), ".jpg".to_string());
        map.insert(".yaml".to_string(), ".yml".to_string());
        Self(map)
    }
}

impl TryFrom<BTreeMap<String, String>> for ExtensionAliases {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut aliases = Self::empty();
        for (from, to) in raw {
            aliases.insert(&from, &to)?;
        }
        Ok(aliases)
    }
}

impl From<ExtensionAliases> for BTreeMap<String, String> {
    fn from(aliases: ExtensionAliases) -> Self {
        aliases.0
    }
}

fn normalize_alias_ext(ext: &str) -> Result<String, ConfigError> {
    let ext = ext.trim().to_lowercase();
    let ext = if ext.starts_with('.') { ext } else { format!(".{ext}") };
    if ext.len() < 2 || ext[1..].contains(|c: char| c == '.' || c == '/') {
        return Err(ConfigError::InvalidAlias(format!(
            "extension must be a single suffix like \".jpg\", got {ext:?}"
        )));
    }
    Ok(ext)
}

/// Split a logical name into its directory and final component.
///
/// `"a/b/c.txt"` → `("a/b", "c.txt")`; `"c.txt"` → `("", "c.txt")`.
pub fn split_dir(name: &str) -> (&str, &str) {
    match name.rfind('/') {
        Some(idx) => {
            let dir = name[..idx].trim_end_matches('/');
            // Keep a lone root slash so "/x.png" stays rooted.
            let dir = if dir.is_empty() && name.starts_with('/') { "/" } else { dir };
            (dir, &name[idx + 1..])
        }
        None => ("", name),
    }
}

/// Extension of a file name including its dot, or `""`.
///
/// Leading dots do not start an extension: `.bashrc` has none, and
/// `..config.yaml` has `.yaml`.
pub fn extension(file_name: &str) -> &str {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[stem_start..].rfind('.') {
        Some(idx) => &file_name[stem_start + idx..],
        None => "",
    }
}

/// Compute the unique storage name for `requested` content with `digest`.
pub fn unique_name(requested: &str, digest: &ContentDigest, aliases: &ExtensionAliases) -> String {
    let (dir, file_name) = split_dir(requested);
    let ext = aliases.canonical(extension(file_name));
    let file = format!("{}{}", digest.to_hex(), ext);
    match dir {
        "" => file,
        "/" => format!("/{file}"),
        dir => format!("{dir}/{file}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::digest_bytes;

    fn hex_of(data: &[u8]) -> String {
        digest_bytes(data).to_hex()
    }

    #[test]
    fn jpeg_resolves_to_jpg() {
        let digest = digest_bytes(b"img");
        let name = unique_name("foo.jpeg", &digest, &ExtensionAliases::default());
        assert_eq!(name, format!("{}.jpg", hex_of(b"img")));
    }

    #[test]
    fn extension_is_lowercased_before_alias_lookup() {
        let digest = digest_bytes(b"img");
        let aliases = ExtensionAliases::default();
        assert_eq!(
            unique_name("photos/Holiday.JPEG", &digest, &aliases),
            format!("photos/{}.jpg", hex_of(b"img"))
        );
        assert_eq!(
            unique_name("conf/App.YAML", &digest, &aliases),
            format!("conf/{}.yml", hex_of(b"img"))
        );
        assert_eq!(
            unique_name("doc.PDF", &digest, &aliases),
            format!("{}.pdf", hex_of(b"img"))
        );
    }

    #[test]
    fn no_extension_yields_no_extension() {
        let digest = digest_bytes(b"raw");
        let aliases = ExtensionAliases::default();
        assert_eq!(
            unique_name("bin/LICENSE", &digest, &aliases),
            format!("bin/{}", hex_of(b"raw"))
        );
        assert_eq!(unique_name(".bashrc", &digest, &aliases), hex_of(b"raw"));
    }

    #[test]
    fn directory_is_preserved() {
        let digest = digest_bytes(b"css");
        let name = unique_name("a/b/site.css", &digest, &ExtensionAliases::default());
        assert_eq!(name, format!("a/b/{}.css", hex_of(b"css")));
    }

    #[test]
    fn only_last_extension_counts() {
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(extension("..config.yaml"), ".yaml");
        assert_eq!(extension("noext"), "");
        assert_eq!(extension(".hidden"), "");
    }

    #[test]
    fn split_dir_handles_roots() {
        assert_eq!(split_dir("x.png"), ("", "x.png"));
        assert_eq!(split_dir("/x.png"), ("/", "x.png"));
        assert_eq!(split_dir("a/x.png"), ("a", "x.png"));
    }

    #[test]
    fn custom_aliases_merge_over_defaults() {
        let overrides = ExtensionAliases::parse_pairs("TIF=.tiff, .jpeg=.jpe").unwrap();
        let aliases = ExtensionAliases::default().merged(&overrides);
        assert_eq!(aliases.canonical(".tif"), ".tiff");
        assert_eq!(aliases.canonical(".JPEG"), ".jpe");
        assert_eq!(aliases.canonical(".yaml"), ".yml");
        assert_eq!(aliases.len(), 3);
    }

    #[test]
    fn malformed_alias_pairs_are_rejected() {
        assert!(ExtensionAliases::parse_pairs(".jpeg").is_err());
        assert!(ExtensionAliases::parse_pairs(".a.b=.c").is_err());
        assert!(ExtensionAliases::parse_pairs("=.c").is_err());
    }

    #[test]
    fn aliases_deserialize_from_yaml_map() {
        let aliases: ExtensionAliases = serde_yaml::from_str("JPEG: jpg\n.htm: .html\n").unwrap();
        assert_eq!(aliases.canonical(".jpeg"), ".jpg");
        assert_eq!(aliases.canonical(".htm"), ".html");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::digest::digest_bytes;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn unique_name_depends_only_on_dir_ext_and_content(
            dir in "[a-z]{1,8}",
            stem_a in "[a-zA-Z0-9_-]{1,12}",
            stem_b in "[a-zA-Z0-9_-]{1,12}",
            ext in "(png|css|js|txt)",
            content in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let digest = digest_bytes(&content);
            let aliases = ExtensionAliases::default();
            let a = unique_name(&format!("{dir}/{stem_a}.{ext}"), &digest, &aliases);
            let b = unique_name(&format!("{dir}/{stem_b}.{ext}"), &digest, &aliases);
            prop_assert_eq!(a, b);
        }
    }
}
