//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in-process: local storage and the staging area live in
//! temp dirs, the video repository and media tool are in-memory fakes.

#![allow(dead_code)]

pub mod auth;
pub mod fakes;
pub mod fixtures;

use axum_test::TestServer;
use fakes::{FakeMediaTool, InMemoryVideos};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tubely_api::constants::API_BASE;
use tubely_api::setup::routes;
use tubely_api::state::AppState;
use tubely_core::{BaseConfig, Config, MediaToolConfig, StorageBackend, TubelyConfig};
use tubely_storage::{LocalStorage, Storage};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_DISTRIBUTION: &str = "d111111abcdef8.cloudfront.net";

/// Upload path for a video ID.
pub fn upload_path(video_id: impl std::fmt::Display) -> String {
    format!("{}/video_upload/{}", API_BASE, video_id)
}

/// Test application: server plus the fakes and directories behind it.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    pub videos: InMemoryVideos,
    pub media_tool: Arc<FakeMediaTool>,
    pub storage_dir: TempDir,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Staged files created but not yet removed.
    pub fn live_staged_files(&self) -> u64 {
        self.state.uploads.staging().live_count()
    }

    pub fn staged_files_created(&self) -> u64 {
        self.state.uploads.staging().created_count()
    }

    /// Files left in the staging directory.
    pub fn staging_dir_entries(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .expect("read staging dir")
            .count()
    }

    /// Keys of all stored objects, e.g. `landscape/<hex>.mp4`.
    pub fn stored_keys(&self) -> Vec<String> {
        stored_keys(self.storage_dir.path())
    }

    pub fn stored_object(&self, key: &str) -> Vec<u8> {
        std::fs::read(self.storage_dir.path().join(key)).expect("read stored object")
    }
}

fn stored_keys(root: &Path) -> Vec<String> {
    let mut keys = Vec::new();
    for prefix in std::fs::read_dir(root).expect("read storage dir") {
        let prefix = prefix.expect("dir entry");
        if !prefix.path().is_dir() {
            continue;
        }
        let prefix_name = prefix.file_name().to_string_lossy().into_owned();
        for object in std::fs::read_dir(prefix.path()).expect("read prefix dir") {
            let object = object.expect("dir entry");
            keys.push(format!(
                "{}/{}",
                prefix_name,
                object.file_name().to_string_lossy()
            ));
        }
    }
    keys.sort();
    keys
}

fn test_config(storage_dir: &Path, staging_dir: &Path, max_video_size_bytes: u64) -> Config {
    Config(Box::new(TubelyConfig {
        base: BaseConfig {
            server_port: 0,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 1,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            environment: "test".to_string(),
        },
        database_url: "postgresql://unused".to_string(),
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        local_storage_path: Some(storage_dir.to_string_lossy().into_owned()),
        distribution_domain: TEST_DISTRIBUTION.to_string(),
        max_video_size_bytes,
        upload_temp_dir: staging_dir.to_path_buf(),
        media_tools: MediaToolConfig {
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            timeout: Some(Duration::from_secs(5)),
        },
    }))
}

/// Build the full router around `media_tool` with a 1 MiB video ceiling.
pub async fn setup_test_app(media_tool: FakeMediaTool) -> TestApp {
    setup_test_app_with_limit(media_tool, 1024 * 1024).await
}

pub async fn setup_test_app_with_limit(
    media_tool: FakeMediaTool,
    max_video_size_bytes: u64,
) -> TestApp {
    build_test_app(media_tool, max_video_size_bytes, None).await
}

/// Build the router with `storage` in place of the local backend.
///
/// `storage_dir` stays empty in that case.
pub async fn setup_test_app_with_storage(
    media_tool: FakeMediaTool,
    storage: Arc<dyn Storage>,
) -> TestApp {
    build_test_app(media_tool, 1024 * 1024, Some(storage)).await
}

async fn build_test_app(
    media_tool: FakeMediaTool,
    max_video_size_bytes: u64,
    storage: Option<Arc<dyn Storage>>,
) -> TestApp {
    let storage_dir = TempDir::new().expect("storage temp dir");
    let staging_dir = TempDir::new().expect("staging temp dir");
    let config = test_config(storage_dir.path(), staging_dir.path(), max_video_size_bytes);

    let storage = match storage {
        Some(storage) => storage,
        None => Arc::new(
            LocalStorage::new(storage_dir.path())
                .await
                .expect("local storage"),
        ),
    };
    let videos = InMemoryVideos::default();
    let media_tool = Arc::new(media_tool);

    let state = Arc::new(AppState::new(
        &config,
        Arc::new(videos.clone()),
        storage,
        media_tool.clone(),
    ));
    let router = routes::setup_routes(&config, state.clone()).expect("router");
    let server = TestServer::new(router).expect("test server");

    TestApp {
        server,
        state,
        videos,
        media_tool,
        storage_dir,
        staging_dir,
    }
}
