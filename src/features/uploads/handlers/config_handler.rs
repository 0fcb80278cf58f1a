use axum::{extract::State, Json};

use crate::features::uploads::dtos::PublicConfigDto;
use crate::features::uploads::state::UploadState;

/// Get the public upload settings
#[utoipa::path(
    get,
    path = "/api/config",
    tag = "uploads",
    responses(
        (status = 200, description = "Turnstile site key and maximum file size", body = PublicConfigDto)
    )
)]
pub async fn get_public_config(State(state): State<UploadState>) -> Json<PublicConfigDto> {
    Json(PublicConfigDto {
        turnstile_site_key: state.turnstile_site_key.clone(),
        max_file_size: state.max_file_size,
    })
}
