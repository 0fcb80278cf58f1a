use std::path::PathBuf;

/// Lifecycle of one file in the upload flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading,
    Success,
    Error,
}

/// View model for one selected file; lives only for the session
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub content_type: Option<String>,
    /// Public URL once stored
    pub url: Option<String>,
    /// 0..=100
    pub progress: u8,
    pub status: UploadStatus,
    pub error: Option<String>,
}

impl UploadedFile {
    /// Simulated progress never passes this until the server confirms
    pub const PROGRESS_CEILING: u8 = 90;
    pub const PROGRESS_STEP: u8 = 10;

    pub fn new(path: PathBuf, size: u64) -> Self {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());

        Self {
            path,
            file_name,
            size,
            content_type: None,
            url: None,
            progress: 0,
            status: UploadStatus::Uploading,
            error: None,
        }
    }

    /// Reads the size from the file's metadata
    pub async fn from_path(path: PathBuf) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(&path).await?;
        Ok(Self::new(path, metadata.len()))
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Advances simulated progress; no-op once the upload has finished
    pub fn tick(&mut self) {
        if self.status == UploadStatus::Uploading {
            self.progress = self
                .progress
                .saturating_add(Self::PROGRESS_STEP)
                .min(Self::PROGRESS_CEILING);
        }
    }

    pub fn succeed(&mut self, url: String) {
        self.status = UploadStatus::Success;
        self.progress = 100;
        self.url = Some(url);
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = UploadStatus::Error;
        self.error = Some(message.into());
    }
}
