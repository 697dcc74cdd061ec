use std::path::PathBuf;

use axum::body::Bytes;
use uuid::Uuid;

use crate::core::config::UploadConfig;
use crate::core::error::{AppError, Result};
use crate::features::uploads::dtos::StoredFileDto;

/// Stores report photos on local disk under a server-generated name.
pub struct UploadService {
    dir: PathBuf,
    max_file_size: usize,
    public_base_url: String,
}

impl UploadService {
    pub fn new(config: &UploadConfig, public_base_url: String) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            max_file_size: config.max_file_size,
            public_base_url,
        }
    }

    /// Create the upload directory if it does not exist.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to create upload directory '{}': {}",
                self.dir.display(),
                e
            ))
        })
    }

    /// Store an uploaded image and return its public URL.
    ///
    /// The stored name is a fresh UUID plus a sanitized extension taken from
    /// the client file name, so client names never reach the filesystem.
    pub async fn store_image(
        &self,
        filename: Option<&str>,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<StoredFileDto> {
        let content_type = content_type
            .ok_or_else(|| AppError::Validation("Missing content type".to_string()))?;
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Only image uploads are allowed, got '{}'",
                content_type
            )));
        }

        if data.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }
        if data.len() > self.max_file_size {
            return Err(AppError::Validation(format!(
                "File too large: {} bytes (limit {})",
                data.len(),
                self.max_file_size
            )));
        }

        let extension = filename
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "jpg".to_string());

        let stored_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = self.dir.join(&stored_name);
        let size = data.len();

        tokio::fs::write(&path, &data).await.map_err(|e| {
            tracing::error!("Failed to write upload to '{}': {:?}", path.display(), e);
            AppError::Internal("Failed to store uploaded file".to_string())
        })?;

        tracing::info!("Stored upload '{}' ({} bytes)", stored_name, size);

        Ok(StoredFileDto {
            url: format!("{}/uploads/{}", self.public_base_url, stored_name),
            filename: stored_name,
            size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &std::path::Path) -> UploadService {
        UploadService {
            dir: dir.to_path_buf(),
            max_file_size: 1024,
            public_base_url: "http://localhost:8000".to_string(),
        }
    }

    #[tokio::test]
    async fn stores_image_under_generated_name() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let stored = service
            .store_image(
                Some("lampu rusak.PNG"),
                Some("image/png"),
                Bytes::from_static(b"fakepng"),
            )
            .await
            .unwrap();

        assert!(stored.filename.ends_with(".png"));
        assert!(!stored.filename.contains(' '));
        assert_eq!(stored.size, 7);
        assert_eq!(
            stored.url,
            format!("http://localhost:8000/uploads/{}", stored.filename)
        );
        assert!(tmp.path().join(&stored.filename).exists());
    }

    #[tokio::test]
    async fn defaults_extension_when_name_is_unusable() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let stored = service
            .store_image(
                Some("../../etc/passwd"),
                Some("image/jpeg"),
                Bytes::from_static(b"x"),
            )
            .await
            .unwrap();

        assert!(stored.filename.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn rejects_non_image_content_type() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let err = service
            .store_image(
                Some("report.pdf"),
                Some("application/pdf"),
                Bytes::from_static(b"x"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_oversized_and_empty_files() {
        let tmp = tempfile::tempdir().unwrap();
        let service = service(tmp.path());

        let big = Bytes::from(vec![0u8; 2048]);
        let err = service
            .store_image(Some("a.png"), Some("image/png"), big)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .store_image(Some("a.png"), Some("image/png"), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
