mod upload_dto;

pub use upload_dto::{PublicConfigDto, UploadFileDto, UploadResponseDto};

/// Extra request body allowance on top of the file size for multipart framing and fields
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;
