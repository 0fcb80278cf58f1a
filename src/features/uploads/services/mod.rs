mod form_parser;
mod upload_service;

pub use form_parser::{parse_form, size_exceeded_message, ParsedForm, StagedFile};
pub use upload_service::UploadService;
