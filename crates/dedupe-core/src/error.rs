//! # Error Types — Structured Error Hierarchy
//!
//! Errors raised by the foundational layer. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Hashing errors abort a write before anything is persisted.
//! - Configuration errors are fatal at startup and name the offending
//!   setting together with a corrected example.

use thiserror::Error;

/// The content stream could not be fully or rewindably read.
#[derive(Error, Debug)]
pub enum HashInputError {
    /// Seeking back to the start of the stream failed.
    #[error("content stream could not be rewound: {0}")]
    Rewind(#[source] std::io::Error),

    /// Reading the stream failed part way through.
    #[error("content stream could not be read: {0}")]
    Read(#[source] std::io::Error),

    /// A textual digest was malformed.
    #[error("invalid hex digest: {0}")]
    InvalidHex(String),
}

/// Invalid configuration, detected before any request is served.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A namespace prefix resolves to the site root.
    #[error("{setting} setting must include a path component, for example: {setting} = {suggestion:?}")]
    RootPrefix {
        /// Name of the setting that carried the prefix.
        setting: &'static str,
        /// A corrected value for the setting.
        suggestion: String,
    },

    /// The two namespaces are equal or one is nested inside the other.
    #[error("DEDUPE_URL ({unique}) and MEDIA_URL ({legacy}) must be disjoint; neither may contain the other")]
    OverlappingPrefixes {
        /// Normalized unique namespace prefix.
        unique: String,
        /// Normalized legacy namespace prefix.
        legacy: String,
    },

    /// An extension alias entry could not be parsed.
    #[error("invalid extension alias: {0}")]
    InvalidAlias(String),

    /// The configuration file is not valid YAML for this schema.
    #[error("invalid configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration file could not be read.
    #[error("configuration file could not be read: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_prefix_message_names_setting_and_suggestion() {
        let err = ConfigError::RootPrefix {
            setting: "MEDIA_URL",
            suggestion: "/media/".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("MEDIA_URL"));
        assert!(msg.contains("\"/media/\""));
    }

    #[test]
    fn overlapping_prefix_message_names_both_settings() {
        let err = ConfigError::OverlappingPrefixes {
            unique: "/files/".into(),
            legacy: "/files/media/".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DEDUPE_URL (/files/)"));
        assert!(msg.contains("MEDIA_URL (/files/media/)"));
    }
}
