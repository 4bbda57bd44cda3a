//! # Namespace Configuration
//!
//! Explicit configuration handed to the store and the serving middleware at
//! construction time.
//!
//! Two URL namespaces are configured:
//!
//! - the **unique namespace** (default `/dd/`), holding content-hash named
//!   files that are cacheable forever, and
//! - the **legacy namespace** (default `/media/`), addressed by original
//!   logical names and redirected to their current unique names.
//!
//! Neither may be the site root, and the two may not be equal or nested in
//! one another. Both are rejected when the config is built, never at request
//! time.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::naming::ExtensionAliases;

pub const DEFAULT_UNIQUE_PREFIX: &str = "/dd/";
pub const DEFAULT_LEGACY_PREFIX: &str = "/media/";

/// A validated URL path prefix with a leading and trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespacePrefix(String);

impl NamespacePrefix {
    /// Build a prefix from a URL or a bare path.
    ///
    /// Absolute URLs are reduced to their path (`https://cdn.example/dd` →
    /// `/dd/`). A prefix that normalizes to `/` is rejected with a
    /// [`ConfigError::RootPrefix`] naming `setting`; `example_segment` is
    /// used to build the suggested value.
    pub fn parse(
        raw: &str,
        setting: &'static str,
        example_segment: &str,
    ) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        let path = match url::Url::parse(raw) {
            Ok(url) if url.has_host() => url.path().to_string(),
            _ => raw.to_string(),
        };
        let normalized = ensure_leading_trailing_slash(&path);
        if normalized == "/" {
            let base = raw.trim_end_matches('/');
            return Err(ConfigError::RootPrefix {
                setting,
                suggestion: format!("{base}/{example_segment}/"),
            });
        }
        Ok(Self(normalized))
    }

    /// The prefix including both slashes, e.g. `/media/`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix without its trailing slash, e.g. `/media`, as used for
    /// mounting nested routers.
    pub fn mount_path(&self) -> &str {
        self.0.trim_end_matches('/')
    }

    /// Whether a request path falls inside this namespace.
    pub fn contains(&self, path: &str) -> bool {
        path.starts_with(&self.0)
    }

    /// Strip the prefix, returning the logical name inside the namespace.
    pub fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.0.as_str())
    }

    /// Whether either prefix is equal to or nested inside the other.
    pub fn overlaps(&self, other: &NamespacePrefix) -> bool {
        self.contains(&other.0) || other.contains(&self.0)
    }

    /// Build the request path for a logical name inside this namespace.
    pub fn join(&self, name: &str) -> String {
        format!("{}{}", self.0, name.trim_start_matches('/'))
    }
}

impl std::fmt::Display for NamespacePrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn ensure_leading_trailing_slash(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

/// Complete deduplication configuration.
#[derive(Debug, Clone)]
pub struct DedupeConfig {
    /// URL prefix of the content-hash namespace.
    pub unique_namespace_prefix: NamespacePrefix,
    /// URL prefix of the original-name namespace.
    pub legacy_namespace_prefix: NamespacePrefix,
    /// Directory served under the legacy namespace.
    pub legacy_root_dir: PathBuf,
    /// Directory served under the unique namespace.
    pub unique_root_dir: PathBuf,
    /// Extension aliases, defaults merged with configured overrides.
    pub extension_aliases: ExtensionAliases,
}

impl DedupeConfig {
    /// Validate raw settings into a config.
    pub fn from_settings(settings: &DedupeSettings) -> Result<Self, ConfigError> {
        let unique_namespace_prefix = NamespacePrefix::parse(
            settings.dedupe_url.as_deref().unwrap_or(DEFAULT_UNIQUE_PREFIX),
            "DEDUPE_URL",
            "dd",
        )?;
        let legacy_namespace_prefix = NamespacePrefix::parse(
            settings.media_url.as_deref().unwrap_or(DEFAULT_LEGACY_PREFIX),
            "MEDIA_URL",
            "media",
        )?;
        if unique_namespace_prefix.overlaps(&legacy_namespace_prefix) {
            return Err(ConfigError::OverlappingPrefixes {
                unique: unique_namespace_prefix.to_string(),
                legacy: legacy_namespace_prefix.to_string(),
            });
        }
        let extension_aliases = match &settings.extensions {
            Some(overrides) => ExtensionAliases::default().merged(overrides),
            None => ExtensionAliases::default(),
        };
        Ok(Self {
            unique_namespace_prefix,
            legacy_namespace_prefix,
            legacy_root_dir: settings
                .media_root
                .clone()
                .unwrap_or_else(|| PathBuf::from("media")),
            unique_root_dir: settings
                .dedupe_root
                .clone()
                .unwrap_or_else(|| PathBuf::from("dd")),
            extension_aliases,
        })
    }

    /// Load settings from an optional YAML file, apply environment
    /// overrides from `lookup`, and validate.
    ///
    /// `lookup` is `std::env::var(..).ok()` in production; tests pass a map.
    pub fn load(
        file: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = match file {
            Some(path) => DedupeSettings::from_yaml_str(&std::fs::read_to_string(path)?)?,
            None => DedupeSettings::default(),
        };
        settings.apply_overrides(lookup)?;
        Self::from_settings(&settings)
    }
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            unique_namespace_prefix: NamespacePrefix(DEFAULT_UNIQUE_PREFIX.to_string()),
            legacy_namespace_prefix: NamespacePrefix(DEFAULT_LEGACY_PREFIX.to_string()),
            legacy_root_dir: PathBuf::from("media"),
            unique_root_dir: PathBuf::from("dd"),
            extension_aliases: ExtensionAliases::default(),
        }
    }
}

/// Raw, unvalidated settings as read from a file or the environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DedupeSettings {
    /// Unique namespace URL or path.
    pub dedupe_url: Option<String>,
    /// Directory for unique-namespace files.
    pub dedupe_root: Option<PathBuf>,
    /// Legacy namespace URL or path.
    pub media_url: Option<String>,
    /// Directory for legacy-namespace files.
    pub media_root: Option<PathBuf>,
    /// Extension alias overrides.
    pub extensions: Option<ExtensionAliases>,
}

impl DedupeSettings {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Overlay `DEDUPE_URL`, `DEDUPE_ROOT`, `MEDIA_URL`, `MEDIA_ROOT` and
    /// `DEDUPE_EXTENSIONS` when present.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("DEDUPE_URL") {
            self.dedupe_url = Some(v);
        }
        if let Some(v) = lookup("DEDUPE_ROOT") {
            self.dedupe_root = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("MEDIA_URL") {
            self.media_url = Some(v);
        }
        if let Some(v) = lookup("MEDIA_ROOT") {
            self.media_root = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("DEDUPE_EXTENSIONS") {
            let parsed = ExtensionAliases::parse_pairs(&v)?;
            self.extensions = Some(match self.extensions.take() {
                Some(existing) => existing.merged(&parsed),
                None => parsed,
            });
        }
        Ok(())
    }
}
