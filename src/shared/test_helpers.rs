use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::rate_limits::RateLimiter;
use crate::features::uploads::clients::CaptchaVerifier;
use crate::features::uploads::services::UploadService;
use crate::features::uploads::{self, UploadState};
use crate::modules::storage::ObjectStore;

/// One recorded `put_object` call
#[derive(Debug, Clone)]
pub struct PutRecord {
    pub bucket: String,
    pub key: String,
    pub data: Vec<u8>,
    pub content_type: String,
}

/// In-memory object store that records every put
pub struct MemoryObjectStore {
    bucket: String,
    fail: bool,
    puts: Mutex<Vec<PutRecord>>,
}

impl MemoryObjectStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            fail: false,
            puts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(bucket: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(bucket)
        }
    }

    pub fn puts(&self) -> Vec<PutRecord> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        if self.fail {
            return Err(AppError::ExternalServiceError(
                "storage unavailable".to_string(),
            ));
        }
        self.puts.lock().unwrap().push(PutRecord {
            bucket: self.bucket.clone(),
            key: key.to_string(),
            data,
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    fn bucket_name(&self) -> String {
        self.bucket.clone()
    }
}

/// Verifier with a fixed answer that counts its calls
pub struct StaticCaptchaVerifier {
    accept: bool,
    calls: AtomicUsize,
    last_remote_ip: Mutex<Option<String>>,
}

impl StaticCaptchaVerifier {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            calls: AtomicUsize::new(0),
            last_remote_ip: Mutex::new(None),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            ..Self::accepting()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_remote_ip(&self) -> Option<String> {
        self.last_remote_ip.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaptchaVerifier for StaticCaptchaVerifier {
    async fn verify(&self, _token: &str, remote_ip: Option<&str>) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_remote_ip.lock().unwrap() = remote_ip.map(String::from);
        Ok(self.accept)
    }
}

pub const TEST_PUBLIC_URL: &str = "https://files.example.com";

/// Fully configured upload state backed by in-memory fakes.
///
/// Each app stages uploads in its own temp directory, removed on drop.
pub struct TestApp {
    pub state: UploadState,
    pub store: Arc<MemoryObjectStore>,
    pub verifier: Arc<StaticCaptchaVerifier>,
}

impl TestApp {
    pub fn new(limit: u32, max_file_size: u64) -> Self {
        Self::with_verifier(limit, max_file_size, StaticCaptchaVerifier::accepting())
    }

    pub fn with_verifier(limit: u32, max_file_size: u64, verifier: StaticCaptchaVerifier) -> Self {
        let store = Arc::new(MemoryObjectStore::new("drops"));
        let verifier = Arc::new(verifier);
        let temp_dir = std::env::temp_dir().join(format!("rockdrop-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_dir).unwrap();
        let state = UploadState {
            upload_service: Some(Arc::new(UploadService::new(
                store.clone(),
                TEST_PUBLIC_URL,
                false,
            ))),
            verifier: Some(verifier.clone() as Arc<dyn CaptchaVerifier>),
            rate_limiter: Arc::new(RateLimiter::new(limit, Duration::from_secs(3600))),
            missing_settings: Vec::new(),
            max_file_size,
            temp_dir,
            turnstile_site_key: Some("site-key".to_string()),
        };

        Self {
            state,
            store,
            verifier,
        }
    }

    pub fn router(&self) -> Router {
        uploads::routes(self.state.clone())
    }

    pub fn temp_dir(&self) -> &Path {
        &self.state.temp_dir
    }

    /// Files still present in the staging directory
    pub fn leftover_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.temp_dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.state.temp_dir);
    }
}
