use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Flat on-disk store of fetched license texts, one file per key.
///
/// Entries never expire. Clearing the directory is the only way to force a refetch.
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    /// Open the store at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex SHA-256 of the dependency key followed by its license URL.
    pub fn key(dependency: &str, license_url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(dependency.as_bytes());
        hasher.update(license_url.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Missing and unreadable entries both count as a miss.
    pub async fn get(&self, key: &str) -> Option<String> {
        tokio::fs::read_to_string(self.dir.join(key)).await.ok()
    }

    pub async fn put(&self, key: &str, text: &str) -> Result<()> {
        let path = self.dir.join(key);
        tokio::fs::write(&path, text)
            .await
            .with_context(|| format!("Failed to write cache entry {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_key_is_stable_hex() {
        let a = CacheStore::key("foo@1.0.0", "https://github.com/x/foo");
        let b = CacheStore::key("foo@1.0.0", "https://github.com/x/foo");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_differs_per_dependency_and_url() {
        let base = CacheStore::key("foo@1.0.0", "https://github.com/x/foo");
        assert_ne!(base, CacheStore::key("foo@2.0.0", "https://github.com/x/foo"));
        assert_ne!(base, CacheStore::key("foo@1.0.0", "https://github.com/y/foo"));
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join("nested").join("cache");
        let store = CacheStore::open(&dir).unwrap();
        assert!(store.dir().is_dir());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let root = TempDir::new().unwrap();
        let store = CacheStore::open(root.path()).unwrap();
        let key = CacheStore::key("foo@1.0.0", "https://example.com/LICENSE");

        assert_eq!(store.get(&key).await, None);
        store.put(&key, "MIT License text").await.unwrap();
        assert_eq!(store.get(&key).await.as_deref(), Some("MIT License text"));

        // rewriting identical content is harmless
        store.put(&key, "MIT License text").await.unwrap();
        assert_eq!(store.get(&key).await.as_deref(), Some("MIT License text"));
        assert!(root.path().join(&key).is_file());
    }
}
