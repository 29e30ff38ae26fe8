//! Gemini image generation client (Vertex AI or Developer API).

use crate::error::{parse_retry_after, sanitize_error_message, AiPhotoError, Result};
use crate::provider::ImageClient;
use crate::types::{GeneratedImage, GenerationMetadata, GenerationRequest, ImageFormat};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Gemini 2.5 Flash Image (preview).
    #[default]
    Flash25Preview,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash25Preview => "gemini-2.5-flash-image-preview",
        }
    }
}

/// Which Google API backend to call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeminiBackend {
    /// Gemini Developer API (generativelanguage.googleapis.com).
    /// Uses `GOOGLE_API_KEY` auth.
    ApiKey,
    /// Vertex AI (aiplatform.googleapis.com).
    /// Uses ambient gcloud CLI credentials.
    Vertex {
        /// GCP project ID.
        project: String,
        /// GCP location ("global" uses the location-less endpoint).
        location: String,
    },
}

impl std::fmt::Display for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey => write!(f, "Gemini Developer API (API key)"),
            Self::Vertex { project, location } => {
                write!(f, "Vertex AI (project {project}, location {location})")
            }
        }
    }
}

/// Builder for [`GeminiClient`].
#[derive(Debug, Clone, Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    backend: Option<GeminiBackend>,
    project: Option<String>,
    location: Option<String>,
}

impl GeminiClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Explicitly sets the backend.
    pub fn backend(mut self, backend: GeminiBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the GCP project ID (implies the Vertex AI backend).
    pub fn project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Sets the GCP location (implies Vertex AI, defaults to "global").
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builds the client, resolving backend and credentials.
    ///
    /// Resolution order: explicit backend, explicit project,
    /// `GOOGLE_CLOUD_PROJECT`, `GOOGLE_API_KEY`, then the ambient gcloud
    /// project. Anything else is a configuration error.
    pub fn build(self) -> Result<GeminiClient> {
        let location = |loc: Option<String>| {
            loc.or_else(|| std::env::var("GOOGLE_CLOUD_LOCATION").ok())
                .unwrap_or_else(|| "global".to_string())
        };

        let backend = if let Some(b) = self.backend {
            b
        } else if let Some(project) = self.project.clone() {
            GeminiBackend::Vertex {
                project,
                location: location(self.location.clone()),
            }
        } else if let Ok(project) = std::env::var("GOOGLE_CLOUD_PROJECT") {
            GeminiBackend::Vertex {
                project,
                location: location(self.location.clone()),
            }
        } else if self.api_key.is_some() || std::env::var("GOOGLE_API_KEY").is_ok() {
            GeminiBackend::ApiKey
        } else if let Some(project) = gcloud_default_project() {
            GeminiBackend::Vertex {
                project,
                location: location(self.location.clone()),
            }
        } else {
            return Err(AiPhotoError::Auth(
                "no credentials configured. Set GOOGLE_CLOUD_PROJECT and run \
                 `gcloud auth application-default login` for Vertex AI, or set \
                 GOOGLE_API_KEY for the Gemini Developer API."
                    .into(),
            ));
        };

        let api_key = match &backend {
            GeminiBackend::ApiKey => {
                let key = self
                    .api_key
                    .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
                    .ok_or_else(|| {
                        AiPhotoError::Auth("GOOGLE_API_KEY not set and no API key provided".into())
                    })?;
                Some(key)
            }
            // Vertex auth goes through gcloud at call time.
            GeminiBackend::Vertex { .. } => self.api_key,
        };

        Ok(GeminiClient {
            client: reqwest::Client::new(),
            api_key,
            model: self.model,
            backend,
        })
    }
}

/// Gemini image generation client.
pub struct GeminiClient {
    client: reqwest::Client,
    /// Some for the Developer API backend; unused for Vertex.
    api_key: Option<String>,
    model: GeminiModel,
    backend: GeminiBackend,
}

/// Get a bearer token by running `gcloud auth print-access-token`.
fn gcloud_access_token() -> Result<String> {
    let output = std::process::Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .map_err(|e| {
            AiPhotoError::Auth(format!(
                "Failed to run gcloud CLI: {}. Install it from https://cloud.google.com/sdk/docs/install",
                e
            ))
        })?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AiPhotoError::Auth(format!(
            "gcloud auth failed: {}. Run `gcloud auth login` or `gcloud auth application-default login`.",
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// The project configured in the ambient gcloud CLI, if any.
fn gcloud_default_project() -> Option<String> {
    let output = std::process::Command::new("gcloud")
        .args(["config", "get-value", "project"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let project = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if project.is_empty() || project == "(unset)" {
        None
    } else {
        Some(project)
    }
}

impl GeminiClient {
    /// Creates a new [`GeminiClientBuilder`].
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::new()
    }

    /// Returns the resolved backend.
    pub fn backend(&self) -> &GeminiBackend {
        &self.backend
    }

    /// Checks that credentials resolve, without calling the generation
    /// endpoint.
    ///
    /// For Vertex AI this obtains a token from the gcloud CLI; for the
    /// Developer API the key was already resolved at build time.
    pub fn verify(&self) -> Result<()> {
        match &self.backend {
            GeminiBackend::ApiKey => Ok(()),
            GeminiBackend::Vertex { .. } => {
                gcloud_access_token()?;
                Ok(())
            }
        }
    }

    fn endpoint_url(&self) -> String {
        match &self.backend {
            GeminiBackend::ApiKey => format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                self.model.as_str(),
            ),
            GeminiBackend::Vertex { project, location } => {
                let host = if location == "global" {
                    "aiplatform.googleapis.com".to_string()
                } else {
                    format!("{location}-aiplatform.googleapis.com")
                };
                format!(
                    "https://{host}/v1/projects/{project}/locations/{location}/publishers/google/models/{}:generateContent",
                    self.model.as_str(),
                )
            }
        }
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let start = Instant::now();

        let url = self.endpoint_url();
        let body = GeminiGenerateRequest::from_generation_request(request);

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);

        builder = match &self.backend {
            GeminiBackend::ApiKey => {
                let api_key = self.api_key.as_ref().ok_or_else(|| {
                    AiPhotoError::Auth("GOOGLE_API_KEY required for the Developer API".into())
                })?;
                builder.header("x-goog-api-key", api_key)
            }
            GeminiBackend::Vertex { .. } => {
                let token = gcloud_access_token()?;
                builder.header("Authorization", format!("Bearer {}", token))
            }
        };

        tracing::debug!(model = self.model.as_str(), backend = %self.backend, "sending generation request");
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let (data, mime_format) = extract_image(gemini_response)?;

        let duration_ms = start.elapsed().as_millis() as u64;

        let format = ImageFormat::from_magic_bytes(&data)
            .or(mime_format)
            .unwrap_or(ImageFormat::Png);

        Ok(GeneratedImage::new(
            data,
            format,
            GenerationMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
            },
        ))
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> AiPhotoError {
        let text = sanitize_error_message(text);
        if status == 402 {
            return AiPhotoError::Billing(
                "billing not enabled for this project or API key. Enable it in the \
                 Google Cloud console."
                    .into(),
            );
        }
        if status == 404 {
            return AiPhotoError::InvalidRequest(
                "model not found. Verify the model is available to your project and \
                 the Vertex AI API is enabled."
                    .into(),
            );
        }
        if status == 429 {
            let retry_after = parse_retry_after(headers).map(std::time::Duration::from_secs);
            return AiPhotoError::RateLimited { retry_after };
        }
        if status == 401 || status == 403 {
            return AiPhotoError::Auth(text);
        }
        let lower = text.to_lowercase();
        if lower.contains("safety")
            || lower.contains("blocked")
            || lower.contains("content_policy")
            || lower.contains("prohibited")
        {
            return AiPhotoError::ContentBlocked(text);
        }
        AiPhotoError::Api {
            status,
            message: text,
        }
    }
}

#[async_trait]
impl ImageClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        self.generate_impl(request).await
    }

    fn model(&self) -> &str {
        self.model.as_str()
    }
}

/// Pulls the first image payload out of a decoded response.
///
/// Returns the raw bytes and the format claimed by the response MIME type.
/// Zero candidates or zero image parts is the "no image generated" case.
fn extract_image(response: GeminiResponse) -> Result<(Vec<u8>, Option<ImageFormat>)> {
    if let Some(ref feedback) = response.prompt_feedback {
        if let Some(ref reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| format!("prompt blocked: {}", reason));
            return Err(AiPhotoError::ContentBlocked(msg));
        }
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AiPhotoError::NoImage("no candidates returned".into()))?;

    if let Some(ref finish_reason) = candidate.finish_reason {
        match finish_reason.as_str() {
            "SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "IMAGE_RECITATION"
            | "RECITATION"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST" => {
                return Err(AiPhotoError::ContentBlocked(format!(
                    "blocked by safety filter: {}",
                    finish_reason
                )));
            }
            "IMAGE_OTHER" | "NO_IMAGE" => {
                return Err(AiPhotoError::NoImage(format!(
                    "generation failed: {}. Try a different prompt.",
                    finish_reason
                )));
            }
            _ => {} // STOP, MAX_TOKENS, etc. are normal
        }
    }

    let content = candidate
        .content
        .ok_or_else(|| AiPhotoError::NoImage("candidate carried no content".into()))?;

    let mut inline = None;
    for part in content.parts {
        if let Some(text) = part.text {
            tracing::debug!(text = %text, "model text response");
        }
        if inline.is_none() {
            inline = part.inline_data;
        }
    }

    let inline =
        inline.ok_or_else(|| AiPhotoError::NoImage("response contained no image parts".into()))?;

    let data = base64::engine::general_purpose::STANDARD
        .decode(&inline.data)
        .map_err(|e| AiPhotoError::Decode(e.to_string()))?;

    Ok((data, ImageFormat::from_mime_type(&inline.mime_type)))
}

// Request wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerateRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a request - inline image data or text.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData { inline_data: GeminiInlineData },
    Text { text: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_modalities: Vec<String>,
    candidate_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_config: Option<GeminiImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiImageConfig {
    aspect_ratio: String,
}

impl GeminiGenerateRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        let mut parts = Vec::with_capacity(req.image_slot_count() + 1);

        // Image slots first (inputs, then style reference), text last.
        for image in req.images.iter().chain(req.style_ref.iter()) {
            parts.push(GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.format.mime_type().to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            });
        }

        parts.push(GeminiRequestPart::Text {
            text: req.prompt.clone(),
        });

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiGenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
                candidate_count: 1,
                image_config: req.aspect_ratio.map(|ar| GeminiImageConfig {
                    aspect_ratio: ar.as_str().to_string(),
                }),
            },
        }
    }
}

// Response wire types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineDataResponse>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataResponse {
    mime_type: String,
    data: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AspectRatio, SourceImage};

    fn png() -> SourceImage {
        SourceImage::from_bytes(vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0,
        ])
    }

    #[test]
    fn test_model_as_str() {
        assert_eq!(
            GeminiModel::Flash25Preview.as_str(),
            "gemini-2.5-flash-image-preview"
        );
    }

    #[test]
    fn test_builder_with_explicit_key() {
        let client = GeminiClientBuilder::new().api_key("test-key").build();
        let client = client.unwrap();
        // Explicit key without a project resolves to the Developer API,
        // unless the environment forces Vertex.
        if std::env::var("GOOGLE_CLOUD_PROJECT").is_err() {
            assert_eq!(client.backend(), &GeminiBackend::ApiKey);
        }
    }

    #[test]
    fn test_builder_project_implies_vertex() {
        let client = GeminiClientBuilder::new()
            .project("my-project")
            .location("us-central1")
            .build()
            .unwrap();
        match client.backend() {
            GeminiBackend::Vertex { project, location } => {
                assert_eq!(project, "my-project");
                assert_eq!(location, "us-central1");
            }
            other => panic!("expected Vertex backend, got: {:?}", other),
        }
    }

    #[test]
    fn test_builder_vertex_default_location_is_global() {
        if std::env::var("GOOGLE_CLOUD_LOCATION").is_ok() {
            return;
        }
        let client = GeminiClientBuilder::new()
            .project("my-project")
            .build()
            .unwrap();
        match client.backend() {
            GeminiBackend::Vertex { location, .. } => assert_eq!(location, "global"),
            other => panic!("expected Vertex backend, got: {:?}", other),
        }
    }

    #[test]
    fn test_builder_explicit_backend() {
        let client = GeminiClientBuilder::new()
            .backend(GeminiBackend::Vertex {
                project: "explicit-project".to_string(),
                location: "europe-west4".to_string(),
            })
            .build()
            .unwrap();
        match client.backend() {
            GeminiBackend::Vertex { project, .. } => assert_eq!(project, "explicit-project"),
            other => panic!("expected Vertex backend, got: {:?}", other),
        }
    }

    #[test]
    fn test_verify_api_key_backend_is_offline() {
        let client = GeminiClientBuilder::new()
            .backend(GeminiBackend::ApiKey)
            .api_key("test-key")
            .build()
            .unwrap();
        // Key already resolved at build time; no subprocess, no network.
        assert!(client.verify().is_ok());
    }

    #[test]
    fn test_endpoint_url_global_vertex() {
        let client = GeminiClientBuilder::new()
            .project("my-project")
            .location("global")
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint_url(),
            "https://aiplatform.googleapis.com/v1/projects/my-project/locations/global\
             /publishers/google/models/gemini-2.5-flash-image-preview:generateContent"
        );
    }

    #[test]
    fn test_endpoint_url_regional_vertex() {
        let client = GeminiClientBuilder::new()
            .project("my-project")
            .location("us-central1")
            .build()
            .unwrap();
        assert!(client
            .endpoint_url()
            .starts_with("https://us-central1-aiplatform.googleapis.com/"));
    }

    #[test]
    fn test_endpoint_url_developer_api() {
        let client = GeminiClientBuilder::new()
            .backend(GeminiBackend::ApiKey)
            .api_key("test-key")
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint_url(),
            "https://generativelanguage.googleapis.com/v1beta/models\
             /gemini-2.5-flash-image-preview:generateContent"
        );
    }

    #[test]
    fn test_request_construction_text_only() {
        let req = GenerationRequest::new("A sunset");
        let wire = GeminiGenerateRequest::from_generation_request(&req);

        assert_eq!(wire.contents.len(), 1);
        assert_eq!(wire.contents[0].parts.len(), 1);
        assert_eq!(
            wire.generation_config.response_modalities,
            vec!["TEXT", "IMAGE"]
        );
        assert_eq!(wire.generation_config.candidate_count, 1);
        assert!(wire.generation_config.image_config.is_none());
    }

    #[test]
    fn test_request_construction_image_before_text() {
        let req = GenerationRequest::new("Edit this").with_image(png());
        let wire = GeminiGenerateRequest::from_generation_request(&req);

        let parts = &wire.contents[0].parts;
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], GeminiRequestPart::InlineData { .. }));
        assert!(matches!(parts[1], GeminiRequestPart::Text { .. }));
    }

    #[test]
    fn test_request_construction_style_ref_after_inputs() {
        let req = GenerationRequest::new("Match the style")
            .with_image(png())
            .with_style_ref(png());
        let wire = GeminiGenerateRequest::from_generation_request(&req);

        let parts = &wire.contents[0].parts;
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[0], GeminiRequestPart::InlineData { .. }));
        assert!(matches!(parts[1], GeminiRequestPart::InlineData { .. }));
        assert!(matches!(parts[2], GeminiRequestPart::Text { .. }));
    }

    #[test]
    fn test_request_serialization_uses_camel_case() {
        let req = GenerationRequest::new("A sunset").with_aspect_ratio(AspectRatio::Landscape);
        let wire = GeminiGenerateRequest::from_generation_request(&req);
        let json = serde_json::to_value(&wire).unwrap();

        let config = json.get("generationConfig").unwrap();
        assert!(json.get("generation_config").is_none());
        assert_eq!(config["candidateCount"], 1);
        assert_eq!(config["imageConfig"]["aspectRatio"], "16:9");
    }

    #[test]
    fn test_request_serialization_inline_data_shape() {
        let req = GenerationRequest::new("Edit this").with_image(png());
        let wire = GeminiGenerateRequest::from_generation_request(&req);
        let json = serde_json::to_value(&wire).unwrap();

        let part = &json["contents"][0]["parts"][0];
        assert_eq!(part["inline_data"]["mimeType"], "image/png");
        assert!(part["inline_data"]["data"].is_string());
    }

    #[test]
    fn test_request_omits_image_config_without_ratio() {
        let req = GenerationRequest::new("A sunset");
        let wire = GeminiGenerateRequest::from_generation_request(&req);
        let json = serde_json::to_value(&wire).unwrap();

        assert!(json["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": {
                            "mimeType": "image/png",
                            "data": "iVBORw0KGgo="
                        }
                    }]
                },
                "finishReason": "STOP"
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.candidates.len(), 1);
        assert_eq!(resp.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_extract_image_decodes_payload() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "Here is your image"},
                        {"inlineData": {"mimeType": "image/jpeg", "data": "AQID"}}
                    ]
                }
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let (data, format) = extract_image(resp).unwrap();
        assert_eq!(data, vec![1, 2, 3]);
        assert_eq!(format, Some(ImageFormat::Jpeg));
    }

    #[test]
    fn test_extract_image_no_candidates() {
        let resp: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(
            extract_image(resp),
            Err(AiPhotoError::NoImage(_))
        ));
    }

    #[test]
    fn test_extract_image_text_only_response() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "I cannot draw that"}]}
            }]
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let err = extract_image(resp).unwrap_err();
        assert!(matches!(err, AiPhotoError::NoImage(_)));
        assert!(err.to_string().contains("no image parts"));
    }

    #[test]
    fn test_extract_image_prompt_feedback_block() {
        let json = r#"{
            "candidates": [],
            "promptFeedback": {
                "blockReason": "SAFETY",
                "blockReasonMessage": "Prompt was blocked due to safety"
            }
        }"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        match extract_image(resp) {
            Err(AiPhotoError::ContentBlocked(msg)) => {
                assert_eq!(msg, "Prompt was blocked due to safety");
            }
            other => panic!("expected ContentBlocked, got: {:?}", other),
        }
    }

    #[test]
    fn test_extract_image_safety_finish_reason() {
        let json = r#"{"candidates": [{"finishReason": "IMAGE_SAFETY"}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            extract_image(resp),
            Err(AiPhotoError::ContentBlocked(_))
        ));
    }

    #[test]
    fn test_parse_error_classification() {
        let client = GeminiClientBuilder::new()
            .backend(GeminiBackend::ApiKey)
            .api_key("test-key")
            .build()
            .unwrap();
        let headers = reqwest::header::HeaderMap::new();

        assert!(matches!(
            client.parse_error(402, "payment required", &headers),
            AiPhotoError::Billing(_)
        ));
        assert!(matches!(
            client.parse_error(404, "not found", &headers),
            AiPhotoError::InvalidRequest(_)
        ));
        assert!(matches!(
            client.parse_error(403, "permission denied", &headers),
            AiPhotoError::Auth(_)
        ));
        assert!(matches!(
            client.parse_error(400, "request blocked by safety system", &headers),
            AiPhotoError::ContentBlocked(_)
        ));
        assert!(matches!(
            client.parse_error(500, "internal", &headers),
            AiPhotoError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_parse_error_rate_limit_reads_retry_after() {
        let client = GeminiClientBuilder::new()
            .backend(GeminiBackend::ApiKey)
            .api_key("test-key")
            .build()
            .unwrap();

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "12".parse().unwrap());

        match client.parse_error(429, "slow down", &headers) {
            AiPhotoError::RateLimited { retry_after } => {
                assert_eq!(retry_after, Some(std::time::Duration::from_secs(12)));
            }
            other => panic!("expected RateLimited, got: {:?}", other),
        }
    }
}
