use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::uploads::dtos::MULTIPART_OVERHEAD;
use crate::features::uploads::handlers::{get_public_config, method_not_allowed, upload_file};
use crate::features::uploads::state::UploadState;

/// Create routes for the uploads feature
pub fn routes(state: UploadState) -> Router {
    // Allow body size up to the file limit + buffer for multipart overhead
    let body_limit = usize::try_from(state.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route(
            "/api/upload",
            post(upload_file)
                .fallback(method_not_allowed)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/config", get(get_public_config))
        .with_state(state)
}
