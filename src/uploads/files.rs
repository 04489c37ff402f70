//! Flat directory of uploaded and converted files

use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime};

/// A file written to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub path: PathBuf,
}

impl StoredFile {
    /// Name of a sibling file with the same stem and a different extension
    pub fn sibling_name(&self, extension: &str) -> String {
        let stem = Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name);
        format!("{stem}{extension}")
    }
}

/// Files live directly under one directory, named `<uuid><ext>`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Persist bytes under a freshly generated name with `extension`
    pub async fn save(&self, extension: &str, bytes: &[u8]) -> io::Result<StoredFile> {
        let name = format!("{}{extension}", uuid::Uuid::new_v4());
        self.save_as(&name, bytes).await
    }

    /// Persist bytes under an exact name
    pub async fn save_as(&self, name: &str, bytes: &[u8]) -> io::Result<StoredFile> {
        if !is_plain_file_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a plain file name: {name}"),
            ));
        }
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        Ok(StoredFile {
            name: name.to_string(),
            path,
        })
    }

    /// Read a stored file. Names that are not plain file names, or that do
    /// not exist, yield `None`.
    pub async fn read(&self, name: &str) -> io::Result<Option<Vec<u8>>> {
        if !is_plain_file_name(name) {
            return Ok(None);
        }
        match tokio::fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete regular files last modified more than `max_age` ago
    pub async fn remove_older_than(&self, max_age: Duration) -> io::Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let now = SystemTime::now();
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok());
            if age.is_some_and(|age| age > max_age) {
                match tokio::fs::remove_file(entry.path()).await {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "Failed to remove expired file"
                    ),
                }
            }
        }
        Ok(removed)
    }
}

/// True for a single normal path component, i.e. no separators, `.` or `..`
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("abc.pdf"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("../etc/passwd"));
        assert!(!is_plain_file_name("a/b.txt"));
        assert!(!is_plain_file_name("/abs.txt"));
    }

    #[test]
    fn test_sibling_name() {
        let stored = StoredFile {
            name: "1234.txt".to_string(),
            path: PathBuf::from("/tmp/1234.txt"),
        };
        assert_eq!(stored.sibling_name(".pdf"), "1234.pdf");
    }

    #[tokio::test]
    async fn test_save_and_read() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        let stored = store.save(".txt", b"hello").await.unwrap();
        assert!(stored.name.ends_with(".txt"));
        assert_eq!(store.read(&stored.name).await.unwrap(), Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_read_missing_or_traversal() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("uploads"));
        store.ensure_dir().await.unwrap();
        std::fs::write(tmp.path().join("secret.txt"), b"s").unwrap();

        assert_eq!(store.read("never-made.pdf").await.unwrap(), None);
        assert_eq!(store.read("../secret.txt").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remove_older_than() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());
        store.save(".txt", b"x").await.unwrap();

        assert_eq!(
            store.remove_older_than(Duration::from_secs(3600)).await.unwrap(),
            0
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(
            store.remove_older_than(Duration::from_millis(1)).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_remove_from_missing_dir_is_noop() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("absent"));
        assert_eq!(store.remove_older_than(Duration::ZERO).await.unwrap(), 0);
    }
}
