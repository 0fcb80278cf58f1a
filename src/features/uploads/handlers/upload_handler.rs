use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{debug, warn};

use crate::core::error::{AppError, Result};
use crate::core::extractor::ClientAddress;
use crate::features::rate_limits::services::random_rate_limit_message;
use crate::features::uploads::dtos::{UploadFileDto, UploadResponseDto};
use crate::features::uploads::services::{
    parse_form, size_exceeded_message, ParsedForm, StagedFile,
};
use crate::features::uploads::state::UploadState;
use crate::shared::constants::CAPTCHA_TOKEN_FIELD;
use crate::shared::types::ErrorResponse;

/// Upload a file
///
/// Accepts multipart/form-data with:
/// - `file`: The file to upload (required, exactly one)
/// - `cf-turnstile-response`: Turnstile token from the widget (required)
///
/// Every response carries `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
/// `X-RateLimit-Reset` headers.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "uploads",
    request_body(
        content = UploadFileDto,
        content_type = "multipart/form-data",
        description = "The file and the Turnstile token",
    ),
    responses(
        (status = 200, description = "File stored", body = UploadResponseDto),
        (status = 400, description = "Missing token, missing file or malformed form", body = ErrorResponse),
        (status = 403, description = "Verification failed", body = ErrorResponse),
        (status = 405, description = "Method not allowed", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Server misconfigured or upload failed", body = ErrorResponse)
    )
)]
pub async fn upload_file(
    State(state): State<UploadState>,
    client: ClientAddress,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Response {
    let now = Utc::now();
    let decision = state.rate_limiter.check_at(client.as_str(), now);

    let mut response = if decision.allowed {
        match handle_upload(&state, &client, multipart).await {
            Ok(uploaded) => Json(uploaded).into_response(),
            Err(e) => {
                debug!("Upload from {} failed: {}", client.as_str(), e);
                e.into_response()
            }
        }
    } else {
        AppError::RateLimitExceeded {
            message: random_rate_limit_message().to_string(),
            retry_after: decision.retry_after_secs(now),
        }
        .into_response()
    };

    decision.apply_headers(response.headers_mut());
    response
}

/// Rejects every method other than POST on the upload route
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

async fn handle_upload(
    state: &UploadState,
    client: &ClientAddress,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<UploadResponseDto> {
    let (service, verifier) = state.ready()?;

    let multipart = multipart.map_err(|e| {
        AppError::BadRequest(format!("Invalid multipart request: {}", e.body_text()))
    })?;

    let form = parse_form(multipart, &state.temp_dir, state.max_file_size).await?;

    let outcome = async {
        let token = form
            .field(CAPTCHA_TOKEN_FIELD)
            .ok_or_else(|| AppError::BadRequest("Missing verification token".to_string()))?;

        if !verifier.verify(token, client.remote_ip()).await? {
            warn!("CAPTCHA verification failed for {}", client.as_str());
            return Err(AppError::Forbidden("Verification failed".to_string()));
        }

        let staged = single_file(&form)?;
        if staged.size > state.max_file_size {
            return Err(AppError::PayloadTooLarge(size_exceeded_message(
                state.max_file_size,
            )));
        }

        service.store(staged).await
    }
    .await;

    form.cleanup().await;
    outcome
}

fn single_file(form: &ParsedForm) -> Result<&StagedFile> {
    match form.files.as_slice() {
        [file] => Ok(file),
        [] => Err(AppError::BadRequest("No file uploaded".to_string())),
        _ => Err(AppError::BadRequest(
            "Only one file can be uploaded at a time".to_string(),
        )),
    }
}
