use async_trait::async_trait;

use crate::claim::ImageFormat;
use crate::error::Result;

/// Raw bytes of one image plus its encoding.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, format: ImageFormat) -> Self {
        Self { bytes, format }
    }

    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }
}

/// Turns claim images into the model's raw output text.
///
/// Implementations return the text verbatim and never retry; every provider
/// failure surfaces as `ClaimsError::Extraction`.
#[async_trait]
pub trait ClaimExtractor: Send + Sync {
    /// Extract one claim from the front and back of its statement.
    async fn extract_pair(&self, front: &ImagePayload, back: &ImagePayload) -> Result<String>;

    /// Extract from a single uploaded image.
    async fn extract_single(&self, image: &ImagePayload) -> Result<String>;
}
