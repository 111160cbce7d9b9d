//! Append-only provenance log shared by every repository task.
//!
//! Each record is one JSON line. Appends from concurrent tasks are serialized
//! by an async mutex held across the whole open, write, close sequence, so
//! lines never interleave regardless of the platform's append semantics.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::model::TrackerRecord;

/// Default tracker file, relative to the working directory.
pub const DEFAULT_TRACKER_FILE: &str = "cachetracker.json";

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to open tracker file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to append to tracker file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize tracker record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("malformed tracker record at {}:{line}: {source}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(Debug)]
pub struct ProvenanceTracker {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ProvenanceTracker {
    /// Open the tracker, creating the file and its parent directory if they
    /// are missing. Existing content is kept.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let open_err = |source: io::Error| TrackerError::Open {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(open_err)?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(open_err)?;

        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line.
    pub async fn append(&self, record: &TrackerRecord) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.lock.lock().await;

        let write_err = |source: io::Error| TrackerError::Write {
            path: self.path.clone(),
            source,
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(write_err)?;
        file.write_all(line.as_bytes()).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;

        tracing::trace!(repo = %record.repo, commit = %record.commit, file = %record.file_name, "Appended tracker record");
        Ok(())
    }

    /// Read every record back, skipping blank lines.
    pub async fn read_records(&self) -> Result<Vec<TrackerRecord>> {
        let text = {
            let _guard = self.lock.lock().await;
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| TrackerError::Open {
                    path: self.path.clone(),
                    source,
                })?
        };

        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|source| TrackerError::Parse {
                    path: self.path.clone(),
                    line: idx + 1,
                    source,
                })
            })
            .collect()
    }
}
