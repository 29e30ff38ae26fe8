//! Client trait and the dispatch step.

use crate::error::Result;
use crate::types::{GeneratedImage, GenerationRequest};
use async_trait::async_trait;
use std::path::Path;

/// Trait for the remote image generation client.
///
/// The single production implementation is [`crate::GeminiClient`]; the trait
/// is the seam tests use to substitute canned responses.
#[async_trait]
pub trait ImageClient: Send + Sync {
    /// Generates an image from the given request. One network round trip.
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage>;

    /// Model identifier used for display.
    fn model(&self) -> &str;
}

/// Performs exactly one generate call and writes the returned image bytes
/// verbatim to `output`.
///
/// The output path is not touched unless the call yields an image, so a
/// failed invocation leaves any existing file as it was.
pub async fn dispatch(
    client: &dyn ImageClient,
    request: &GenerationRequest,
    output: &Path,
) -> Result<GeneratedImage> {
    tracing::debug!(
        model = client.model(),
        slots = request.image_slot_count(),
        "dispatching generation request"
    );

    let image = client.generate(request).await?;
    image.save(output)?;

    tracing::info!(
        path = %output.display(),
        bytes = image.size(),
        "saved generated image"
    );
    Ok(image)
}
