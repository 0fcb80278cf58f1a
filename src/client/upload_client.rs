use std::time::Duration;

use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::client::uploaded_file::UploadedFile;
use crate::features::uploads::dtos::{PublicConfigDto, UploadResponseDto};
use crate::features::uploads::services::size_exceeded_message;
use crate::shared::constants::{
    CAPTCHA_TOKEN_FIELD, DEFAULT_CONTENT_TYPE, FILE_FIELD, GENERIC_UPLOAD_ERROR,
};
use crate::shared::types::ErrorResponse;

/// Interval between simulated progress ticks
pub const PROGRESS_TICK: Duration = Duration::from_millis(200);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    FileTooLarge(String),

    #[error("Please complete the verification first")]
    MissingToken,

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success response; `message` is the server's text
    #[error("{message}")]
    Server {
        status: reqwest::StatusCode,
        message: String,
        retry_after: Option<i64>,
    },
}

/// HTTP client for a rockdrop server
pub struct UploadClient {
    http_client: reqwest::Client,
    base_url: String,
    max_file_size: u64,
}

impl UploadClient {
    pub fn new(base_url: &str, max_file_size: u64) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_file_size,
        })
    }

    /// Adopts the server's advertised size limit
    pub fn set_max_file_size(&mut self, max_file_size: u64) {
        self.max_file_size = max_file_size;
    }

    pub async fn fetch_config(&self) -> Result<PublicConfigDto, ClientError> {
        let response = self
            .http_client
            .get(format!("{}/api/config", self.base_url))
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json::<PublicConfigDto>().await?)
    }

    /// Checks that can fail before anything is sent
    pub fn precheck(&self, file: &mut UploadedFile, token: &str) -> Result<(), ClientError> {
        if file.size > self.max_file_size {
            let message = size_exceeded_message(self.max_file_size);
            file.fail(message.clone());
            return Err(ClientError::FileTooLarge(message));
        }

        if token.trim().is_empty() {
            let error = ClientError::MissingToken;
            file.fail(error.to_string());
            return Err(error);
        }

        Ok(())
    }

    /// Uploads one file, calling `on_progress` after every simulated tick.
    ///
    /// # Returns
    /// The public URL of the stored file
    pub async fn upload<F>(
        &self,
        file: &mut UploadedFile,
        token: &str,
        mut on_progress: F,
    ) -> Result<String, ClientError>
    where
        F: FnMut(&UploadedFile),
    {
        self.precheck(file, token)?;

        let form = match self.build_form(file, token).await {
            Ok(form) => form,
            Err(e) => {
                file.fail(e.to_string());
                return Err(e);
            }
        };

        let request = self
            .http_client
            .post(format!("{}/api/upload", self.base_url))
            .multipart(form)
            .send();
        tokio::pin!(request);

        // There are no transfer progress events, so progress is simulated
        let mut ticker = interval_at(Instant::now() + PROGRESS_TICK, PROGRESS_TICK);
        let sent = loop {
            tokio::select! {
                result = &mut request => break result,
                _ = ticker.tick() => {
                    file.tick();
                    on_progress(&*file);
                }
            }
        };

        let outcome = match sent {
            Ok(response) => Self::read_response(response).await,
            Err(e) => Err(ClientError::Request(e)),
        };

        match outcome {
            Ok(url) => {
                file.succeed(url.clone());
                on_progress(&*file);
                Ok(url)
            }
            Err(e) => {
                file.fail(e.to_string());
                on_progress(&*file);
                Err(e)
            }
        }
    }

    async fn build_form(&self, file: &UploadedFile, token: &str) -> Result<Form, ClientError> {
        let data = tokio::fs::read(&file.path).await?;
        let content_type = file.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);

        let part = Part::bytes(data)
            .file_name(file.file_name.clone())
            .mime_str(content_type)?;

        Ok(Form::new()
            .text(CAPTCHA_TOKEN_FIELD, token.to_string())
            .part(FILE_FIELD, part))
    }

    async fn read_response(response: reqwest::Response) -> Result<String, ClientError> {
        let status = response.status();
        if status.is_success() {
            let body = response.json::<UploadResponseDto>().await?;
            return Ok(body.url);
        }

        let error = match response.json::<ErrorResponse>().await {
            Ok(body) => ClientError::Server {
                status,
                message: body.message,
                retry_after: body.retry_after,
            },
            Err(e) => {
                debug!("Unreadable error body for status {}: {}", status, e);
                ClientError::Server {
                    status,
                    message: GENERIC_UPLOAD_ERROR.to_string(),
                    retry_after: None,
                }
            }
        };

        Err(error)
    }
}
