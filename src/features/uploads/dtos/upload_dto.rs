use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upload form DTO for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handler uses axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFormDto {
    /// The image file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Response DTO for a stored photo upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StoredFileDto {
    /// Server-generated file name
    pub filename: String,
    /// Public URL where the file can be fetched
    pub url: String,
    /// File size in bytes
    pub size: usize,
}
