//! Async content hashing for streams handed to the store.

use std::io::SeekFrom;

use dedupe_core::digest::HASH_CHUNK_SIZE;
use dedupe_core::{ContentDigest, ContentHasher, HashInputError};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::backend::Content;

/// Rewind `content` and hash it to the end.
///
/// The stream is left at its end position.
pub async fn digest_stream<C: Content + ?Sized>(
    content: &mut C,
) -> Result<ContentDigest, HashInputError> {
    rewind(content).await?;

    let mut hasher = ContentHasher::new();
    let mut buf = vec![0u8; HASH_CHUNK_SIZE];
    loop {
        let n = content.read(&mut buf).await.map_err(HashInputError::Read)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize())
}

/// Seek `content` back to its first byte.
pub async fn rewind<C: Content + ?Sized>(content: &mut C) -> Result<(), HashInputError> {
    content
        .seek(SeekFrom::Start(0))
        .await
        .map_err(HashInputError::Rewind)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dedupe_core::digest_bytes;
    use std::io::Cursor;

    #[tokio::test]
    async fn stream_digest_matches_bytes_digest() {
        let data = vec![3u8; HASH_CHUNK_SIZE + 5];
        let mut cursor = Cursor::new(data.clone());
        assert_eq!(digest_stream(&mut cursor).await.unwrap(), digest_bytes(&data));
    }

    #[tokio::test]
    async fn consumed_stream_is_rewound_before_hashing() {
        let mut cursor = Cursor::new(b"already read".to_vec());
        let mut sink = Vec::new();
        cursor.read_to_end(&mut sink).await.unwrap();
        assert_eq!(
            digest_stream(&mut cursor).await.unwrap(),
            digest_bytes(b"already read")
        );
        // A second pass over the same stream yields the same digest.
        assert_eq!(
            digest_stream(&mut cursor).await.unwrap(),
            digest_bytes(b"already read")
        );
    }
}
