use super::{ExtractRequest, FrameExtractor, ThumbnailError};
use async_trait::async_trait;

/// Used when no video-capable backend exists. Every request fails softly.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledExtractor;

#[async_trait]
impl FrameExtractor for DisabledExtractor {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn extract(&self, _request: &ExtractRequest) -> Result<(), ThumbnailError> {
        Err(ThumbnailError::Unavailable)
    }
}
