pub mod upload_handler;
