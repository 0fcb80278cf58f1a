use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upload form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler streams axum's Multipart extractor directly.
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// Token produced by the Turnstile widget
    #[serde(rename = "cf-turnstile-response")]
    pub cf_turnstile_response: String,
}

/// Response DTO for a stored upload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadResponseDto {
    /// Public URL of the stored file
    #[schema(example = "https://files.example.com/1700000000000-photo.png")]
    pub url: String,
}

/// Settings a client needs before uploading
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfigDto {
    /// Turnstile site key for rendering the widget, `null` when not configured
    pub turnstile_site_key: Option<String>,
    /// Largest accepted file in bytes
    pub max_file_size: u64,
}
