//! The command-to-request mapping layer.
//!
//! Every subcommand maps to a fixed [`OperationSpec`]: which instruction text
//! (if any) is prepended to the user prompt, how many input image slots the
//! operation takes, and whether a style reference or aspect ratio applies.
//! Adding an operation is a table edit in [`Operation::spec`], not new
//! branching.

use crate::error::{AiPhotoError, Result};
use crate::types::{AspectRatio, GenerationRequest, SourceImage};

/// One named image-transformation mode exposed as a subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Text-to-image generation.
    Generate,
    /// Mask-free editing of an existing image.
    Edit,
    /// Restoration of old or damaged photos.
    Restore,
    /// Restyle an image, optionally guided by a reference image.
    StyleTransfer,
    /// Combine elements from up to three input images.
    Compose,
    /// Render text onto an image.
    AddText,
    /// Turn a sketch into a finished image.
    SketchToImage,
}

/// Fixed per-operation request shape.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    /// Subcommand name.
    pub name: &'static str,
    /// Instruction text prepended to the user prompt. Operations with an
    /// instruction also work without a prompt; the instruction stands alone.
    pub instruction: Option<&'static str>,
    /// Minimum number of input image slots.
    pub min_inputs: usize,
    /// Maximum number of input image slots.
    pub max_inputs: usize,
    /// Whether a style-reference slot is accepted.
    pub accepts_style_ref: bool,
    /// Whether an output aspect ratio may be requested.
    pub accepts_aspect_ratio: bool,
}

impl Operation {
    /// All image operations, in CLI order.
    pub const ALL: [Operation; 7] = [
        Self::Generate,
        Self::Edit,
        Self::Restore,
        Self::StyleTransfer,
        Self::Compose,
        Self::AddText,
        Self::SketchToImage,
    ];

    /// The lookup table: operation name, instruction template, slot arity.
    pub fn spec(&self) -> OperationSpec {
        match self {
            Self::Generate => OperationSpec {
                name: "generate",
                instruction: None,
                min_inputs: 0,
                max_inputs: 0,
                accepts_style_ref: false,
                accepts_aspect_ratio: true,
            },
            Self::Edit => OperationSpec {
                name: "edit",
                instruction: None,
                min_inputs: 1,
                max_inputs: 1,
                accepts_style_ref: false,
                accepts_aspect_ratio: true,
            },
            Self::Restore => OperationSpec {
                name: "restore",
                instruction: Some(
                    "Repair this photograph without altering its content: remove \
                     scratches, tears, and fading, and recover natural color, \
                     detail, and sharpness.",
                ),
                min_inputs: 1,
                max_inputs: 1,
                accepts_style_ref: false,
                accepts_aspect_ratio: false,
            },
            Self::StyleTransfer => OperationSpec {
                name: "style_transfer",
                instruction: None,
                min_inputs: 1,
                max_inputs: 1,
                accepts_style_ref: true,
                accepts_aspect_ratio: false,
            },
            Self::Compose => OperationSpec {
                name: "compose",
                instruction: None,
                min_inputs: 1,
                max_inputs: 3,
                accepts_style_ref: false,
                accepts_aspect_ratio: false,
            },
            Self::AddText => OperationSpec {
                name: "add_text",
                instruction: None,
                min_inputs: 1,
                max_inputs: 1,
                accepts_style_ref: false,
                accepts_aspect_ratio: false,
            },
            Self::SketchToImage => OperationSpec {
                name: "sketch_to_image",
                instruction: Some("Render this sketch as a finished, detailed color image."),
                min_inputs: 1,
                max_inputs: 1,
                accepts_style_ref: false,
                accepts_aspect_ratio: false,
            },
        }
    }

    /// Subcommand name for display.
    pub fn name(&self) -> &'static str {
        self.spec().name
    }

    /// Assembles the request for this operation.
    ///
    /// Pure data-shaping: validates slot arity against the table, composes
    /// instruction and prompt, and places images in request order (inputs,
    /// then style reference). No network activity.
    pub fn assemble(
        &self,
        prompt: Option<&str>,
        images: Vec<SourceImage>,
        style_ref: Option<SourceImage>,
        aspect_ratio: Option<AspectRatio>,
    ) -> Result<GenerationRequest> {
        let spec = self.spec();

        if images.len() < spec.min_inputs || images.len() > spec.max_inputs {
            let expected = if spec.min_inputs == spec.max_inputs {
                format!("exactly {}", spec.min_inputs)
            } else {
                format!("between {} and {}", spec.min_inputs, spec.max_inputs)
            };
            return Err(AiPhotoError::InvalidRequest(format!(
                "{} takes {} input image(s), got {}",
                spec.name,
                expected,
                images.len()
            )));
        }

        if style_ref.is_some() && !spec.accepts_style_ref {
            return Err(AiPhotoError::InvalidRequest(format!(
                "{} does not accept a style reference image",
                spec.name
            )));
        }

        if aspect_ratio.is_some() && !spec.accepts_aspect_ratio {
            return Err(AiPhotoError::InvalidRequest(format!(
                "{} does not accept an aspect ratio",
                spec.name
            )));
        }

        let prompt = prompt.map(str::trim).filter(|p| !p.is_empty());
        let text = match (spec.instruction, prompt) {
            (Some(instruction), Some(prompt)) => format!("{instruction} {prompt}"),
            (Some(instruction), None) => instruction.to_string(),
            (None, Some(prompt)) => prompt.to_string(),
            (None, None) => {
                return Err(AiPhotoError::InvalidRequest(format!(
                    "{} requires a prompt",
                    spec.name
                )));
            }
        };

        Ok(GenerationRequest {
            prompt: text,
            images,
            style_ref,
            aspect_ratio,
        })
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
