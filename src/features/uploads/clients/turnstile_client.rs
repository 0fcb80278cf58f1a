use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::error::{AppError, Result};

/// Server-side check of a bot-check token
#[async_trait]
pub trait CaptchaVerifier: Send + Sync {
    /// Returns `Ok(true)` only when the provider confirms the token
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool>;
}

/// Form body for Turnstile siteverify
#[derive(Debug, Serialize)]
struct SiteVerifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    remoteip: Option<&'a str>,
}

/// Turnstile siteverify response
#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    #[serde(default)]
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Client for Cloudflare Turnstile token verification
pub struct TurnstileClient {
    http_client: reqwest::Client,
    secret_key: String,
    verify_url: String,
}

impl TurnstileClient {
    pub fn new(secret_key: String, verify_url: String, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            secret_key,
            verify_url,
        })
    }
}

#[async_trait]
impl CaptchaVerifier for TurnstileClient {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool> {
        let request_body = SiteVerifyRequest {
            secret: &self.secret_key,
            response: token,
            remoteip: remote_ip,
        };

        let response = self
            .http_client
            .post(&self.verify_url)
            .form(&request_body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Turnstile verification request failed: {}", e);
                AppError::ExternalServiceError(format!("Turnstile request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalServiceError(format!(
                "Turnstile returned status: {}",
                status
            )));
        }

        let body = response.json::<SiteVerifyResponse>().await.map_err(|e| {
            AppError::ExternalServiceError(format!("Failed to parse Turnstile response: {}", e))
        })?;

        if !body.success {
            tracing::debug!("Turnstile rejected token: {:?}", body.error_codes);
        }

        Ok(body.success)
    }
}
