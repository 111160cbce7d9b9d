//! On-disk content cache keyed by (repository, revision, filename).
//!
//! Layout: `{root}/{owner}/{repo}/{revision}_{filename}`, one plain-text file
//! per entry holding the decoded content. An entry that exists is
//! authoritative; nothing here validates its content.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::RepositoryRef;

/// Default cache root, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = "cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read cache entry {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write cache entry {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to scan cache directory {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// A cached file found by [`ContentCache::entries_for_revision`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    /// Filename without the revision prefix.
    pub file_name: String,
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ContentCache {
    root: PathBuf,
}

impl ContentCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory owned by one repository.
    pub fn repository_dir(&self, repo: &RepositoryRef) -> PathBuf {
        self.root.join(&repo.owner).join(&repo.name)
    }

    pub fn entry_path(&self, repo: &RepositoryRef, sha: &str, file_name: &str) -> PathBuf {
        self.repository_dir(repo).join(format!("{sha}_{file_name}"))
    }

    pub async fn ensure_repository_dir(&self, repo: &RepositoryRef) -> Result<PathBuf> {
        let dir = self.repository_dir(repo);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| CacheError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        Ok(dir)
    }

    /// Presence check only.
    pub async fn exists(&self, repo: &RepositoryRef, sha: &str, file_name: &str) -> bool {
        tokio::fs::try_exists(self.entry_path(repo, sha, file_name))
            .await
            .unwrap_or(false)
    }

    pub async fn read(
        &self,
        repo: &RepositoryRef,
        sha: &str,
        file_name: &str,
    ) -> Result<Option<String>> {
        read_entry(&self.entry_path(repo, sha, file_name)).await
    }

    /// Write an entry, creating the repository directory if needed.
    ///
    /// Returns the entry's path.
    pub async fn write(
        &self,
        repo: &RepositoryRef,
        sha: &str,
        file_name: &str,
        content: &str,
    ) -> Result<PathBuf> {
        self.ensure_repository_dir(repo).await?;
        let path = self.entry_path(repo, sha, file_name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| CacheError::Write {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// All entries cached for `sha`, sorted by filename.
    ///
    /// Presence is what counts: a zero-byte entry is returned like any other,
    /// so an empty cached file still marks its revision as cached. A
    /// repository without a cache directory has no entries.
    pub async fn entries_for_revision(
        &self,
        repo: &RepositoryRef,
        sha: &str,
    ) -> Result<Vec<CachedFile>> {
        let dir = self.repository_dir(repo);
        let prefix = format!("{sha}_");

        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(CacheError::Scan { path: dir, source }),
        };

        let mut entries = Vec::new();
        loop {
            let entry = match read_dir.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => return Err(CacheError::Scan { path: dir, source }),
            };

            let name = entry.file_name();
            let Some(file_name) = name.to_str().and_then(|n| n.strip_prefix(&prefix)) else {
                continue;
            };

            let path = entry.path();
            if let Some(content) = read_entry(&path).await? {
                entries.push(CachedFile {
                    file_name: file_name.to_string(),
                    path,
                    content,
                });
            }
        }

        entries.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(entries)
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}

async fn read_entry(path: &Path) -> Result<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(CacheError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acme() -> RepositoryRef {
        RepositoryRef::new("acme", "widgets")
    }

    #[tokio::test]
    async fn write_then_read_round_trips_under_repository_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(tmp.path());

        assert!(!cache.exists(&acme(), "abc123", "ci.yml").await);

        let path = cache
            .write(&acme(), "abc123", "ci.yml", "name: CI")
            .await
            .unwrap();

        assert_eq!(path, tmp.path().join("acme/widgets/abc123_ci.yml"));
        assert!(cache.exists(&acme(), "abc123", "ci.yml").await);
        assert_eq!(
            cache.read(&acme(), "abc123", "ci.yml").await.unwrap(),
            Some("name: CI".to_string())
        );
    }

    #[tokio::test]
    async fn read_missing_entry_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(tmp.path());
        assert_eq!(cache.read(&acme(), "abc", "ci.yml").await.unwrap(), None);
    }

    #[tokio::test]
    async fn write_overwrites_existing_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(tmp.path());
        cache.write(&acme(), "abc", "ci.yml", "old").await.unwrap();
        cache.write(&acme(), "abc", "ci.yml", "new").await.unwrap();
        assert_eq!(
            cache.read(&acme(), "abc", "ci.yml").await.unwrap().as_deref(),
            Some("new")
        );
    }

    #[tokio::test]
    async fn entries_for_revision_matches_exact_prefix_only() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(tmp.path());
        cache.write(&acme(), "abc", "release.yml", "r").await.unwrap();
        cache.write(&acme(), "abc", "ci.yml", "c").await.unwrap();
        cache.write(&acme(), "abcd", "ci.yml", "other").await.unwrap();

        let entries = cache.entries_for_revision(&acme(), "abc").await.unwrap();

        let names: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, ["ci.yml", "release.yml"]);
        assert_eq!(entries[0].content, "c");
        assert_eq!(entries[0].path, tmp.path().join("acme/widgets/abc_ci.yml"));
    }

    #[tokio::test]
    async fn empty_entry_still_counts() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(tmp.path());
        cache.write(&acme(), "abc", "ci.yml", "").await.unwrap();

        let entries = cache.entries_for_revision(&acme(), "abc").await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "");
    }

    #[tokio::test]
    async fn entries_for_revision_without_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(tmp.path());
        assert!(
            cache
                .entries_for_revision(&acme(), "abc")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn repositories_write_to_disjoint_subtrees() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ContentCache::new(tmp.path());
        let other = RepositoryRef::new("acme", "gadgets");

        let a = cache.write(&acme(), "abc", "ci.yml", "a").await.unwrap();
        let b = cache.write(&other, "abc", "ci.yml", "b").await.unwrap();

        assert!(a.starts_with(cache.repository_dir(&acme())));
        assert!(b.starts_with(cache.repository_dir(&other)));
        assert!(!a.starts_with(cache.repository_dir(&other)));
        assert_eq!(
            cache.read(&acme(), "abc", "ci.yml").await.unwrap().as_deref(),
            Some("a")
        );
    }

    #[tokio::test]
    async fn ensure_repository_dir_reports_blocked_path() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("acme"), "not a directory").unwrap();
        let cache = ContentCache::new(tmp.path());

        let err = cache.ensure_repository_dir(&acme()).await.unwrap_err();
        assert!(matches!(err, CacheError::CreateDir { .. }));
    }
}
