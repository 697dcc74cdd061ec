mod upload_dto;

pub use upload_dto::{StoredFileDto, UploadFormDto};
