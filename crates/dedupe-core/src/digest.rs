//! # Content Digest — Content-Addressed File Names
//!
//! Defines `ContentDigest` and `DigestAlgorithm`, plus the blocking hashing
//! entry points used to name files by their content.
//!
//! ## Invariant
//!
//! A digest depends on the content bytes only. File names, timestamps and
//! read position never leak into it: [`digest_reader()`] rewinds the stream
//! to its start before consuming it.
//!
//! The algorithm is fixed for the lifetime of a deployment. Changing it
//! would give previously stored content new names and break deduplication
//! against everything written before the switch.

use std::io::{Read, Seek, SeekFrom};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::HashInputError;

/// Read buffer size used when hashing streams.
pub const HASH_CHUNK_SIZE: usize = 64 * 1024;

/// The hash algorithm used to produce a content digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256. The only algorithm in use.
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A content digest with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new content digest from raw bytes and algorithm.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string.
    ///
    /// This is the form embedded in unique file names.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 64-character hex string into a SHA-256 digest. The
    /// `sha256:` prefix written by `Display` is accepted.
    pub fn from_hex(hex: &str) -> Result<Self, HashInputError> {
        let hex = hex.trim();
        let hex = hex.strip_prefix("sha256:").unwrap_or(hex);
        if hex.len() != 64 {
            return Err(HashInputError::InvalidHex(format!(
                "expected 64 hex chars, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 32];
        for (i, pair) in hex.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(pair)
                .map_err(|_| HashInputError::InvalidHex("non-ASCII input".into()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| HashInputError::InvalidHex(format!("invalid hex pair {pair:?}")))?;
        }
        Ok(Self::new(DigestAlgorithm::Sha256, bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Incremental hasher for content streamed in chunks.
#[derive(Clone, Default)]
pub struct ContentHasher {
    inner: Sha256,
    consumed: u64,
}

impl std::fmt::Debug for ContentHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentHasher")
            .field("algorithm", &DigestAlgorithm::Sha256)
            .field("consumed", &self.consumed)
            .finish()
    }
}

impl ContentHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk of content.
    pub fn update(&mut self, chunk: &[u8]) {
        self.inner.update(chunk);
        self.consumed += chunk.len() as u64;
    }

    /// Number of bytes hashed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Finish hashing and produce the digest.
    pub fn finalize(self) -> ContentDigest {
        let hash = self.inner.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        ContentDigest::new(DigestAlgorithm::Sha256, bytes)
    }
}

/// Compute the digest of an in-memory byte slice.
pub fn digest_bytes(data: &[u8]) -> ContentDigest {
    let mut hasher = ContentHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Compute the digest of a seekable stream.
///
/// The stream is rewound to its start first, then read to the end. It is
/// left positioned at the end; callers that persist the same stream must
/// rewind it again.
pub fn digest_reader<R: Read + Seek + ?Sized>(
    reader: &mut R,
) -> Result<ContentDigest, HashInputError> {
    reader.seek(SeekFrom::Start(0)).map_err(HashInputError::Rewind)?;

    let mut hasher = ContentHasher::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashInputError::Read(e)),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}
