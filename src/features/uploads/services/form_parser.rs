use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::constants::{DEFAULT_CONTENT_TYPE, FILE_FIELD};

/// A file part written to a temporary file while parsing
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub original_filename: String,
    pub content_type: String,
    pub size: u64,
    pub path: PathBuf,
}

/// Decoded multipart form: text fields plus staged file parts
#[derive(Debug, Default)]
pub struct ParsedForm {
    pub fields: HashMap<String, String>,
    pub files: Vec<StagedFile>,
}

impl ParsedForm {
    /// First non-empty value of a text field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Best-effort removal of every staged temp file
    pub async fn cleanup(&self) {
        for file in &self.files {
            remove_temp_file(&file.path).await;
        }
    }
}

/// Removes a temp file, swallowing any failure
async fn remove_temp_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!("Could not remove temp file {}: {}", path.display(), e);
    }
}

pub fn size_exceeded_message(max_file_size: u64) -> String {
    format!(
        "File size exceeds {}MB limit",
        max_file_size / 1024 / 1024
    )
}

fn map_multipart_error(e: MultipartError, max_file_size: u64) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(size_exceeded_message(max_file_size))
    } else {
        debug!("Failed to read multipart data: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
    }
}

/// Streams a multipart body, staging `file` parts under `temp_dir`.
///
/// A file part larger than `max_file_size` aborts parsing with
/// [`AppError::PayloadTooLarge`]; anything already staged is removed first.
pub async fn parse_form(
    mut multipart: Multipart,
    temp_dir: &Path,
    max_file_size: u64,
) -> Result<ParsedForm> {
    let mut form = ParsedForm::default();

    let outcome = read_parts(&mut multipart, &mut form, temp_dir, max_file_size).await;
    if let Err(e) = outcome {
        form.cleanup().await;
        return Err(e);
    }

    Ok(form)
}

async fn read_parts(
    multipart: &mut Multipart,
    form: &mut ParsedForm,
    temp_dir: &Path,
    max_file_size: u64,
) -> Result<()> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(e, max_file_size))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == FILE_FIELD && field.file_name().is_some() {
            let staged = stage_file(field, temp_dir, max_file_size).await?;
            debug!(
                "Staged '{}' ({} bytes) at {}",
                staged.original_filename,
                staged.size,
                staged.path.display()
            );
            form.files.push(staged);
        } else if field.file_name().is_some() {
            debug!("Ignoring file part in field: {}", field_name);
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| map_multipart_error(e, max_file_size))?;
            form.fields.entry(field_name).or_insert(text);
        }
    }

    Ok(())
}

async fn stage_file(mut field: Field<'_>, temp_dir: &Path, max_file_size: u64) -> Result<StagedFile> {
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let original_filename = field
        .file_name()
        .map(base_name)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unnamed".to_string());

    let path = temp_dir.join(format!("rockdrop-{}.part", Uuid::new_v4()));
    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;

    let mut size: u64 = 0;
    let written: Result<()> = async {
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| map_multipart_error(e, max_file_size))?
        {
            size += chunk.len() as u64;
            if size > max_file_size {
                return Err(AppError::PayloadTooLarge(size_exceeded_message(
                    max_file_size,
                )));
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to write temp file: {}", e)))?;
        }
        file.flush()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to flush temp file: {}", e)))
    }
    .await;

    drop(file);
    if let Err(e) = written {
        remove_temp_file(&path).await;
        return Err(e);
    }

    Ok(StagedFile {
        original_filename,
        content_type,
        size,
        path,
    })
}

/// Strips any directory components a client may send in a filename
fn base_name(raw: &str) -> String {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim().to_string()
}
