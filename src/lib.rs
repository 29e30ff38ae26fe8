#![warn(missing_docs)]
//! aiphoto - Gemini image operations from the command line.
//!
//! This crate wraps the Gemini 2.5 Flash Image API (via Vertex AI or the
//! Developer API) behind a small set of photo operations: generate, edit,
//! restore, style transfer, compose, add text, and sketch-to-image. Each
//! operation is a fixed arrangement of prompt text and image slots sent in
//! one request; the first returned image is written to disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use aiphoto::{dispatch, GeminiClient, Operation};
//!
//! #[tokio::main]
//! async fn main() -> aiphoto::Result<()> {
//!     let client = GeminiClient::builder().build()?;
//!     let request = Operation::Generate.assemble(
//!         Some("A sunset over the marina"),
//!         vec![],
//!         None,
//!         None,
//!     )?;
//!     dispatch(&client, &request, "sunset.png".as_ref()).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod gemini;
mod operation;
mod provider;
mod types;

pub use error::{AiPhotoError, Result};
pub use gemini::{GeminiBackend, GeminiClient, GeminiClientBuilder, GeminiModel};
pub use operation::{Operation, OperationSpec};
pub use provider::{dispatch, ImageClient};
pub use types::{
    AspectRatio, GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat, SourceImage,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{AiPhotoError, Result};
    pub use crate::gemini::GeminiClient;
    pub use crate::operation::Operation;
    pub use crate::provider::{dispatch, ImageClient};
    pub use crate::types::{GeneratedImage, GenerationRequest, SourceImage};
}
