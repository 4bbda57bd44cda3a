//! # Storage Backends
//!
//! [`StorageBackend`] is the narrow storage interface consumed by the
//! deduplicating store and the collection pipeline:
//! `exists`, `open`, `save` (which may rename) and `url`.
//!
//! [`FileSystemStorage`] stores files under a root directory and serves them
//! under a base URL.
//!
//! ## Atomic Writes
//!
//! A save writes to a uniquely named temporary file beside the target and
//! renames it into place. Readers never observe a partial file, and two
//! racing saves of the same content-addressed name simply replace one
//! complete copy with another identical one.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncRead, AsyncSeek, AsyncWriteExt};
use tracing::debug;

use crate::error::StorageError;
use crate::hasher::rewind;

/// Content handed to [`StorageBackend::save`].
///
/// Content must be seekable: it is read once to hash it and again to
/// persist it.
pub trait Content: AsyncRead + AsyncSeek + Unpin + Send {}

impl<T: AsyncRead + AsyncSeek + Unpin + Send + ?Sized> Content for T {}

/// Readable stream returned by [`StorageBackend::open`].
pub type ContentStream = Box<dyn AsyncRead + Unpin + Send>;

/// File storage operations.
///
/// All operations perform I/O and are awaited by callers.
pub trait StorageBackend: Send + Sync {
    /// Whether a file with this name is stored.
    fn exists(&self, name: &str) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Open a stored file for reading.
    fn open(&self, name: &str) -> impl Future<Output = Result<ContentStream, StorageError>> + Send;

    /// Persist `content` under `name`, returning the name actually used.
    fn save<C: Content + ?Sized>(
        &self,
        name: &str,
        content: &mut C,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;

    /// Public URL of a stored file.
    fn url(&self, name: &str) -> String;
}

/// Filesystem-backed storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
    base_url: String,
}

impl FileSystemStorage {
    /// Create storage rooted at `root`, serving files under `base_url`.
    ///
    /// The root does not need to exist yet; directories are created on the
    /// first save.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self {
            root: root.into(),
            base_url,
        }
    }

    /// Resolve a logical name to a path inside the root.
    ///
    /// Rejects empty names, absolute names, and any `.`/`..` component.
    pub fn path(&self, name: &str) -> Result<PathBuf, StorageError> {
        if name.is_empty() || name.starts_with('/') || name.contains('\\') {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        let relative = Path::new(name);
        for component in relative.components() {
            if !matches!(component, Component::Normal(_)) {
                return Err(StorageError::InvalidName(name.to_string()));
            }
        }
        if name.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl StorageBackend for FileSystemStorage {
    async fn exists(&self, name: &str) -> Result<bool, StorageError> {
        let path = self.path(name)?;
        Ok(fs::try_exists(&path).await?)
    }

    async fn open(&self, name: &str) -> Result<ContentStream, StorageError> {
        let path = self.path(name)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save<C: Content + ?Sized>(
        &self,
        name: &str,
        content: &mut C,
    ) -> Result<String, StorageError> {
        let path = self.path(name)?;
        let parent = path
            .parent()
            .ok_or_else(|| StorageError::InvalidName(name.to_string()))?
            .to_path_buf();
        fs::create_dir_all(&parent).await?;

        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = parent.join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4().simple()));

        rewind(content).await?;
        let written = async {
            let mut file = fs::File::create(&tmp).await?;
            let bytes = tokio::io::copy(content, &mut file).await?;
            file.flush().await?;
            file.sync_all().await?;
            fs::rename(&tmp, &path).await?;
            Ok::<u64, std::io::Error>(bytes)
        }
        .await;

        match written {
            Ok(bytes) => {
                debug!(name = %name, bytes, "wrote file");
                Ok(name.to_string())
            }
            Err(e) => {
                // Best-effort cleanup; the original error is what matters.
                let _ = fs::remove_file(&tmp).await;
                Err(e.into())
            }
        }
    }

    fn url(&self, name: &str) -> String {
        format!("{}{}", self.base_url, name.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::io::AsyncReadExt;

    fn storage() -> (tempfile::TempDir, FileSystemStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path(), "/media");
        (dir, storage)
    }

    #[tokio::test]
    async fn save_open_roundtrip_creates_directories() {
        let (_dir, storage) = storage();
        let mut content = Cursor::new(b"nested".to_vec());
        let stored = storage.save("a/b/c.txt", &mut content).await.unwrap();
        assert_eq!(stored, "a/b/c.txt");
        assert!(storage.exists("a/b/c.txt").await.unwrap());

        let mut stream = storage.open("a/b/c.txt").await.unwrap();
        let mut read = Vec::new();
        stream.read_to_end(&mut read).await.unwrap();
        assert_eq!(read, b"nested");
    }

    #[tokio::test]
    async fn save_writes_whole_stream_even_if_partially_read() {
        let (_dir, storage) = storage();
        let mut content = Cursor::new(b"0123456789".to_vec());
        let mut head = [0u8; 4];
        content.read_exact(&mut head).await.unwrap();
        storage.save("digits.txt", &mut content).await.unwrap();
        let on_disk = std::fs::read(storage.path("digits.txt").unwrap()).unwrap();
        assert_eq!(on_disk, b"0123456789");
    }

    #[tokio::test]
    async fn no_temporary_files_left_behind() {
        let (dir, storage) = storage();
        storage
            .save("x.bin", &mut Cursor::new(vec![1u8, 2, 3]))
            .await
            .unwrap();
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["x.bin".to_string()]);
    }

    #[tokio::test]
    async fn open_missing_is_not_found() {
        let (_dir, storage) = storage();
        let err = storage.open("missing.txt").await.err().unwrap();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert!(!storage.exists("missing.txt").await.unwrap());
    }

    #[test]
    fn traversal_and_absolute_names_are_rejected() {
        let (_dir, storage) = storage();
        for name in ["", "/etc/passwd", "../x", "a/../../x", "a//b", "./a", "a\\b"] {
            assert!(
                matches!(storage.path(name), Err(StorageError::InvalidName(_))),
                "{name:?} should be rejected"
            );
        }
        assert!(storage.path("a/b.png").is_ok());
    }

    #[test]
    fn url_joins_base() {
        let (_dir, storage) = storage();
        assert_eq!(storage.url("a/b.png"), "/media/a/b.png");
        let cdn = FileSystemStorage::new("/srv", "https://cdn.example.com/media/");
        assert_eq!(cdn.url("b.png"), "https://cdn.example.com/media/b.png");
    }
}
