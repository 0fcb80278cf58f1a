use utoipa::{Modify, OpenApi};

use crate::features::rate_limits::{dtos as rate_limits_dtos, handlers as rate_limits_handlers};
use crate::features::uploads::{dtos as uploads_dtos, handlers as uploads_handlers};
use crate::shared::types::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Uploads
        uploads_handlers::upload_file,
        uploads_handlers::get_public_config,
        // Rate Limits
        rate_limits_handlers::get_rate_limit_status,
    ),
    components(
        schemas(
            ErrorResponse,
            uploads_dtos::UploadFileDto,
            uploads_dtos::UploadResponseDto,
            uploads_dtos::PublicConfigDto,
            rate_limits_dtos::RateLimitStatusDto,
        )
    ),
    tags(
        (name = "uploads", description = "File upload to object storage"),
        (name = "rate-limits", description = "Per-client upload allowance"),
    ),
    info(
        title = "Rockdrop API",
        version = "0.1.0",
        description = "API documentation for Rockdrop",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_upload_paths() {
        let doc = ApiDoc::openapi();

        assert!(doc.paths.paths.contains_key("/api/upload"));
        assert!(doc.paths.paths.contains_key("/api/config"));
        assert!(doc.paths.paths.contains_key("/api/rate-limit"));
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Drops".to_string(),
            version: "9.9.9".to_string(),
            description: "Staging".to_string(),
        }
        .modify(&mut doc);

        assert_eq!(doc.info.title, "Drops");
        assert_eq!(doc.info.version, "9.9.9");
        assert_eq!(doc.info.description.as_deref(), Some("Staging"));
    }
}
