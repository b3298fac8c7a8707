//! Staged temp files for in-flight uploads.
//!
//! A [`StagingArea`] is shared by the whole process. Each request opens its
//! own [`StagingScope`], which records every path it creates on a stack of
//! pending releases. Paths leave the stack only once they are gone from disk.
//! Whatever is still pending when the scope is dropped (early return, panic,
//! or a cancelled request future) is removed in `Drop`.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt, BufWriter};
use tubely_core::constants::STAGING_FILE_PREFIX;

use crate::error::StagingError;

const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Error yielded by an inbound body stream.
#[derive(Debug, Error)]
pub enum BodyError {
    /// The transport rejected the body for exceeding its limit.
    #[error("request body too large")]
    TooLarge,

    #[error("{0}")]
    Aborted(String),
}

#[derive(Debug, Default)]
struct StagingCounters {
    created: AtomicU64,
    released: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
    max_bytes: u64,
    counters: Arc<StagingCounters>,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
            counters: Arc::new(StagingCounters::default()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Open a scope owning the staged files of one request.
    pub fn scope(&self) -> StagingScope {
        StagingScope {
            area: self.clone(),
            pending: Vec::new(),
        }
    }

    /// Staged paths ever registered.
    pub fn created_count(&self) -> u64 {
        self.counters.created.load(Ordering::SeqCst)
    }

    /// Staged paths confirmed gone from disk.
    pub fn released_count(&self) -> u64 {
        self.counters.released.load(Ordering::SeqCst)
    }

    pub fn live_count(&self) -> u64 {
        self.created_count().saturating_sub(self.released_count())
    }
}

/// An open staged file. Its path stays stable across [`StagingScope::replace`].
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    file: File,
    len: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Handle sharing this file's cursor, for sequential reads.
    pub async fn reader(&self) -> io::Result<File> {
        self.file.try_clone().await
    }
}

/// Per-request owner of staged files.
#[derive(Debug)]
pub struct StagingScope {
    area: StagingArea,
    pending: Vec<PathBuf>,
}

impl StagingScope {
    /// Spill `body` to a fresh, uniquely named file and rewind it.
    ///
    /// The copy aborts with `PayloadTooLarge` as soon as the byte count passes
    /// the area's ceiling.
    pub async fn stage<S>(&mut self, body: S) -> Result<StagedFile, StagingError>
    where
        S: Stream<Item = Result<Bytes, BodyError>>,
    {
        let limit = self.area.max_bytes;
        let named = tempfile::Builder::new()
            .prefix(STAGING_FILE_PREFIX)
            .suffix(".mp4")
            .tempfile_in(&self.area.dir)
            .map_err(StagingError::Create)?;
        let (std_file, path) = named.keep().map_err(|e| StagingError::Create(e.error))?;
        self.adopt(path.clone());

        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, File::from_std(std_file));
        let mut body = std::pin::pin!(body);
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| match e {
                BodyError::TooLarge => StagingError::PayloadTooLarge { limit },
                BodyError::Aborted(message) => StagingError::BodyAborted(message),
            })?;

            written += chunk.len() as u64;
            if written > limit {
                tracing::debug!(limit, path = %path.display(), "Upload exceeded limit while staging");
                return Err(StagingError::PayloadTooLarge { limit });
            }

            writer.write_all(&chunk).await.map_err(StagingError::Write)?;
        }

        writer.flush().await.map_err(StagingError::Write)?;
        let mut file = writer.into_inner();
        file.seek(SeekFrom::Start(0))
            .await
            .map_err(StagingError::Write)?;

        tracing::debug!(path = %path.display(), size_bytes = written, "Upload staged");

        Ok(StagedFile {
            path,
            file,
            len: written,
        })
    }

    /// Take ownership of a path another step is about to create.
    ///
    /// Registering before the file exists guarantees cleanup even if the
    /// producing step is cancelled halfway.
    pub fn adopt(&mut self, path: PathBuf) {
        self.area.counters.created.fetch_add(1, Ordering::SeqCst);
        self.pending.push(path);
    }

    /// Supersede `staged` with the file at `new_path`.
    ///
    /// The current file is closed and `new_path` is renamed over it, so the
    /// returned handle keeps the original path. The handle is freshly opened
    /// and positioned at the start.
    pub async fn replace(
        &mut self,
        staged: StagedFile,
        new_path: PathBuf,
    ) -> Result<StagedFile, StagingError> {
        if !self.pending.contains(&new_path) {
            self.adopt(new_path.clone());
        }

        let StagedFile { path, file, .. } = staged;
        drop(file);

        tokio::fs::rename(&new_path, &path)
            .await
            .map_err(StagingError::SwapFailure)?;

        // The predecessor was overwritten and `new_path` no longer exists.
        self.pending.retain(|p| p != &new_path);
        self.area.counters.released.fetch_add(1, Ordering::SeqCst);

        let mut file = File::open(&path).await.map_err(StagingError::Reopen)?;
        file.seek(SeekFrom::Start(0))
            .await
            .map_err(StagingError::Reopen)?;
        let len = file.metadata().await.map_err(StagingError::Reopen)?.len();

        Ok(StagedFile { path, file, len })
    }

    /// Close and delete `staged`.
    pub async fn release(&mut self, staged: StagedFile) {
        let StagedFile { path, file, .. } = staged;
        drop(file);
        self.remove_pending(&path).await;
    }

    /// Delete everything this scope still owns.
    pub async fn release_all(&mut self) {
        while let Some(path) = self.pending.last().cloned() {
            if !self.remove_pending(&path).await {
                // Left for Drop to retry.
                break;
            }
        }
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    async fn remove_pending(&mut self, path: &Path) -> bool {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to remove staged file");
                return false;
            }
        }
        self.pending.retain(|p| p != path);
        self.area.counters.released.fetch_add(1, Ordering::SeqCst);
        true
    }
}

impl Drop for StagingScope {
    // Only reached with pending files when the request future is dropped
    // before `release_all`. Removal is synchronous so nothing outlives the
    // scope; these are a handful of unlink calls on local disk.
    fn drop(&mut self) {
        while let Some(path) = self.pending.pop() {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Leaked staged file");
                    continue;
                }
            }
            self.area.counters.released.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(path = %path.display(), "Staged file removed on scope exit");
        }
    }
}
