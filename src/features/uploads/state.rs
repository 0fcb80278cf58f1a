use std::path::PathBuf;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::{AppError, Result};
use crate::features::rate_limits::RateLimiter;
use crate::features::uploads::clients::CaptchaVerifier;
use crate::features::uploads::services::UploadService;
use crate::modules::storage::ObjectStore;

/// Shared state for the upload routes.
///
/// The storage and CAPTCHA collaborators are optional so the server can start
/// with incomplete settings and report the problem per request instead.
#[derive(Clone)]
pub struct UploadState {
    pub upload_service: Option<Arc<UploadService>>,
    pub verifier: Option<Arc<dyn CaptchaVerifier>>,
    pub rate_limiter: Arc<RateLimiter>,
    pub missing_settings: Vec<&'static str>,
    pub max_file_size: u64,
    pub temp_dir: PathBuf,
    pub turnstile_site_key: Option<String>,
}

impl UploadState {
    pub fn new(
        config: &Config,
        store: Option<Arc<dyn ObjectStore>>,
        verifier: Option<Arc<dyn CaptchaVerifier>>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        let upload_service = store.zip(config.storage.public_url.as_deref()).map(
            |(store, public_url)| {
                Arc::new(UploadService::new(
                    store,
                    public_url,
                    config.upload.unique_keys,
                ))
            },
        );

        Self {
            upload_service,
            verifier,
            rate_limiter,
            missing_settings: config.missing_settings(),
            max_file_size: config.upload.max_file_size,
            temp_dir: config.upload.temp_dir.clone(),
            turnstile_site_key: config.turnstile.site_key.clone(),
        }
    }

    /// Collaborators needed to serve an upload, or a misconfiguration error
    pub fn ready(&self) -> Result<(Arc<UploadService>, Arc<dyn CaptchaVerifier>)> {
        if !self.missing_settings.is_empty() {
            return Err(AppError::ServerMisconfigured(format!(
                "missing settings: {}",
                self.missing_settings.join(", ")
            )));
        }

        match (&self.upload_service, &self.verifier) {
            (Some(service), Some(verifier)) => Ok((service.clone(), verifier.clone())),
            (None, _) => Err(AppError::ServerMisconfigured(
                "storage client unavailable".to_string(),
            )),
            (_, None) => Err(AppError::ServerMisconfigured(
                "CAPTCHA verifier unavailable".to_string(),
            )),
        }
    }
}
