use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tubely_core::{AppError, Video};
use tubely_db::VideoRepository;
use tokio::io::{AsyncRead, AsyncReadExt};
use tubely_processing::{MediaTool, ProbeOutput, StreamInfo, ToolError};
use tubely_storage::{Storage, StorageBackend, StorageError, StorageResult};
use uuid::Uuid;

/// Prefix the fake remux writes in front of the input, so tests can tell the
/// remuxed file was the one uploaded.
pub const REMUX_MARKER: &[u8] = b"faststart:";

/// Video repository backed by a map.
#[derive(Clone, Default)]
pub struct InMemoryVideos {
    videos: Arc<Mutex<HashMap<Uuid, Video>>>,
    fail_updates: Arc<AtomicBool>,
    updates: Arc<AtomicUsize>,
    retitle_after_read: Arc<Mutex<Option<String>>>,
}

impl InMemoryVideos {
    /// Insert a fresh record owned by `user_id` and return it.
    pub fn insert_for(&self, user_id: Uuid) -> Video {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id,
            title: "Boots on the ground".to_string(),
            description: "A test clip".to_string(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        self.videos
            .lock()
            .unwrap()
            .insert(video.id, video.clone());
        video
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    /// Change the stored title right after the next read, as another writer
    /// editing the record mid-upload would.
    pub fn retitle_after_read(&self, title: &str) {
        *self.retitle_after_read.lock().unwrap() = Some(title.to_string());
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideos {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let snapshot = self.get(id);
        if let Some(title) = self.retitle_after_read.lock().unwrap().take() {
            if let Some(existing) = self.videos.lock().unwrap().get_mut(&id) {
                existing.title = title;
            }
        }
        Ok(snapshot)
    }

    async fn update_video_url(
        &self,
        id: Uuid,
        video_url: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Internal("connection reset by peer".to_string()));
        }
        let mut videos = self.videos.lock().unwrap();
        match videos.get_mut(&id) {
            Some(existing) => {
                existing.video_url = Some(video_url.to_string());
                existing.updated_at = updated_at;
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Video {} not found", id))),
        }
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

enum ProbeBehavior {
    Video { width: i64, height: i64 },
    AudioOnly,
    Fails,
}

/// Media tool double: probes report fixed geometry, remux copies the input
/// behind [`REMUX_MARKER`].
pub struct FakeMediaTool {
    probe: ProbeBehavior,
    remux_fails: bool,
    remux_skips_output: bool,
    probes: AtomicUsize,
    remuxes: AtomicUsize,
}

impl FakeMediaTool {
    fn with(probe: ProbeBehavior) -> Self {
        Self {
            probe,
            remux_fails: false,
            remux_skips_output: false,
            probes: AtomicUsize::new(0),
            remuxes: AtomicUsize::new(0),
        }
    }

    pub fn video(width: i64, height: i64) -> Self {
        Self::with(ProbeBehavior::Video { width, height })
    }

    pub fn audio_only() -> Self {
        Self::with(ProbeBehavior::AudioOnly)
    }

    pub fn failing_probe() -> Self {
        Self::with(ProbeBehavior::Fails)
    }

    pub fn failing_remux(mut self) -> Self {
        self.remux_fails = true;
        self
    }

    /// Report a successful remux without writing the output file.
    pub fn remux_without_output(mut self) -> Self {
        self.remux_skips_output = true;
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn remux_count(&self) -> usize {
        self.remuxes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaTool for FakeMediaTool {
    async fn probe(&self, path: &Path) -> Result<ProbeOutput, ToolError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        assert!(path.exists(), "probe called on a missing file");

        let streams = match self.probe {
            ProbeBehavior::Video { width, height } => vec![
                StreamInfo {
                    codec_type: Some("audio".to_string()),
                    width: None,
                    height: None,
                },
                StreamInfo {
                    codec_type: Some("video".to_string()),
                    width: Some(width),
                    height: Some(height),
                },
            ],
            ProbeBehavior::AudioOnly => vec![StreamInfo {
                codec_type: Some("audio".to_string()),
                width: None,
                height: None,
            }],
            ProbeBehavior::Fails => {
                return Err(ToolError::Exit {
                    tool: "ffprobe",
                    status: "exit status: 1".to_string(),
                    stderr: "Invalid data found when processing input".to_string(),
                })
            }
        };

        Ok(ProbeOutput { streams })
    }

    async fn remux_faststart(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.remuxes.fetch_add(1, Ordering::SeqCst);
        if self.remux_fails {
            // Leave a partial file behind like a crashed ffmpeg would.
            tokio::fs::write(output, b"partial").await.ok();
            return Err(ToolError::Exit {
                tool: "ffmpeg",
                status: "exit status: 1".to_string(),
                stderr: "moov atom not found".to_string(),
            });
        }

        if self.remux_skips_output {
            return Ok(());
        }

        let original = tokio::fs::read(input)
            .await
            .map_err(|source| ToolError::Spawn {
                tool: "ffmpeg",
                source,
            })?;
        let mut remuxed = REMUX_MARKER.to_vec();
        remuxed.extend_from_slice(&original);
        tokio::fs::write(output, remuxed)
            .await
            .map_err(|source| ToolError::Spawn {
                tool: "ffmpeg",
                source,
            })
    }
}

/// Object store double whose uploads fail after the first read.
#[derive(Default)]
pub struct FailingStorage {
    attempts: AtomicUsize,
}

impl FailingStorage {
    pub fn attempt_count(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for FailingStorage {
    async fn upload_stream(
        &self,
        _storage_key: &str,
        _content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<u64> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let mut first_part = [0u8; 1024];
        reader.read(&mut first_part).await?;
        Err(StorageError::UploadFailed("bucket gone".to_string()))
    }

    async fn exists(&self, _storage_key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
