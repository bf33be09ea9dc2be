use std::sync::Arc;

use crate::storage::FileStore;
use crate::{payloads, Result, LOG};

/// Route uploaded files are served back under
pub const IMAGES_PATH: &str = "/upload/images";

#[derive(Clone)]
pub struct UploadsService {
    files: Arc<dyn FileStore>,
    public_url: String,
}

impl UploadsService {
    pub fn new(files: Arc<dyn FileStore>, public_url: impl Into<String>) -> Self {
        Self {
            files,
            public_url: public_url.into(),
        }
    }

    /// Validate and store an uploaded cover image, returning the url
    /// it's served at.
    pub async fn write_cover(&self, content_type: Option<&str>, bytes: &[u8]) -> Result<String> {
        let ext = payloads::validate_image_headers(content_type, bytes.len())?;
        let name = self.files.write(bytes, ext).await?;
        slog::info!(LOG, "stored cover image"; "file" => &name, "bytes" => bytes.len());
        Ok(format!("{}{}/{}", self.public_url, IMAGES_PATH, name))
    }
}
