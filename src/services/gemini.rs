//! Gemini REST backend.
//!
//! - planning and placement analysis: `models/{text_model}:generateContent`
//!   with a JSON `responseSchema`, so the reply text is itself JSON
//! - background synthesis: `models/{image_model}:predict` (Imagen), one
//!   sample, returned as `bytesBase64Encoded`

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::CreativeBackend;
use crate::config::BackendConfig;
use crate::error::{AdhyatmikError, Result};
use crate::model::{AspectRatio, GenerationPlan, PlacementDirective};

/// HTTP client for the Gemini / Imagen APIs.
pub struct GeminiBackend {
    client: reqwest::Client,
    config: BackendConfig,
    api_key: String,
}

impl GeminiBackend {
    /// Build a backend; fails if no API key is configured.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = reqwest::Client::builder()
            .user_agent(concat!("adhyatmik/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdhyatmikError::Config(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.config.api_base, model, method)
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AdhyatmikError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AdhyatmikError::Upstream(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AdhyatmikError::Upstream(format!(
                "API error {}: {}",
                status,
                api_error_message(&bytes)
            )));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| AdhyatmikError::Upstream(format!("invalid JSON response: {}", e)))
    }

    /// Call `generateContent` and parse the reply text as `T`.
    async fn generate_json<T: DeserializeOwned>(&self, parts: Value, schema: Value) -> Result<T> {
        let body = json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });
        let url = self.endpoint(&self.config.text_model, "generateContent");
        let reply = self.post(&url, &body).await?;
        let text = candidate_text(&reply)?;
        serde_json::from_str(text.trim())
            .map_err(|e| AdhyatmikError::Upstream(format!("malformed model output: {}", e)))
    }
}

#[async_trait]
impl CreativeBackend for GeminiBackend {
    #[tracing::instrument(skip_all, fields(model = %self.config.text_model))]
    async fn plan_generation(&self, caption: &str) -> Result<GenerationPlan> {
        let parts = json!([{ "text": planning_prompt(caption) }]);
        let plan: GenerationPlan = self.generate_json(parts, plan_schema()).await?;
        if plan.image_prompt.trim().is_empty() || plan.hindi_text.trim().is_empty() {
            return Err(AdhyatmikError::Upstream(
                "planner returned an empty image prompt or text".to_string(),
            ));
        }
        tracing::info!(theme = %plan.theme, "generation planned");
        Ok(plan)
    }

    #[tracing::instrument(skip_all, fields(model = %self.config.image_model, aspect = %aspect_ratio))]
    async fn synthesize_background(
        &self,
        image_prompt: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<String> {
        let body = json!({
            "instances": [{ "prompt": image_prompt }],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": aspect_ratio.as_str(),
                "outputMimeType": "image/jpeg"
            }
        });
        let url = self.endpoint(&self.config.image_model, "predict");
        let reply: PredictResponse = serde_json::from_value(self.post(&url, &body).await?)
            .map_err(|e| AdhyatmikError::Upstream(format!("malformed predict response: {}", e)))?;

        reply
            .predictions
            .into_iter()
            .find_map(|p| p.bytes_base64_encoded)
            .filter(|b64| !b64.is_empty())
            .ok_or_else(|| AdhyatmikError::Upstream("no image was generated".to_string()))
    }

    #[tracing::instrument(skip_all, fields(model = %self.config.text_model, bytes = background.len()))]
    async fn analyze_placement(
        &self,
        background: &[u8],
        hindi_text: &str,
        theme: &str,
    ) -> Result<PlacementDirective> {
        let mime = image::guess_format(background)
            .map(|f| f.to_mime_type())
            .unwrap_or("image/jpeg");
        let parts = json!([
            {
                "inlineData": {
                    "mimeType": mime,
                    "data": base64::engine::general_purpose::STANDARD.encode(background)
                }
            },
            { "text": analysis_prompt(hindi_text, theme) }
        ]);
        let directive: PlacementDirective = self.generate_json(parts, directive_schema()).await?;
        Ok(directive.normalized())
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
}

/// Concatenated text of the first candidate.
fn candidate_text(reply: &Value) -> Result<String> {
    let parts = reply
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            let reason = reply
                .pointer("/promptFeedback/blockReason")
                .and_then(Value::as_str)
                .unwrap_or("no candidates returned");
            AdhyatmikError::Upstream(format!("model returned no content ({})", reason))
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        return Err(AdhyatmikError::Upstream("model returned empty text".to_string()));
    }
    Ok(text)
}

/// Best-effort extraction of `error.message` from an API error body.
fn api_error_message(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| String::from_utf8_lossy(body).chars().take(300).collect())
}

fn planning_prompt(caption: &str) -> String {
    format!(
        "You are the art director for devotional and inspirational Hindi quote images.\n\
         The user wrote:\n\"\"\"\n{caption}\n\"\"\"\n\n\
         1. hindiText: the exact quote to print on the image, in Devanagari. Keep the \
         user's wording, punctuation and emojis; drop instructions such as \"और लिखा हो\". \
         Use \\n only where a deliberate line break belongs.\n\
         2. imagePrompt: a detailed English prompt for a photorealistic or painterly \
         background that matches the mood. The image must contain no text, letters or \
         watermarks and should leave calm space for a caption.\n\
         3. theme: two to five English words describing the mood."
    )
}

fn analysis_prompt(hindi_text: &str, theme: &str) -> String {
    format!(
        "This background will carry the Hindi text:\n\"\"\"\n{hindi_text}\n\"\"\"\n\
         Theme: {theme}.\n\
         Choose where the text block should be centered so it does not cover faces or \
         the main subject. x and y are percentages (0-100) of the image width and height \
         for the center of the text block. fontSize is a percentage of the image width \
         (typically 5-12). fontStyle is one of bold-sans-serif, elegant-serif, calligraphic. \
         Pick a textColor with strong contrast against that area, plus a shadowColor and \
         shadowBlur (pixels) that keep it legible. Return hindiText unchanged."
    )
}

fn plan_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "imagePrompt": { "type": "STRING" },
            "hindiText": { "type": "STRING" },
            "theme": { "type": "STRING" }
        },
        "required": ["imagePrompt", "hindiText", "theme"]
    })
}

fn directive_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "hindiText": { "type": "STRING" },
            "x": { "type": "NUMBER" },
            "y": { "type": "NUMBER" },
            "fontSize": { "type": "NUMBER" },
            "fontStyle": {
                "type": "STRING",
                "enum": ["bold-sans-serif", "elegant-serif", "calligraphic"]
            },
            "textColor": { "type": "STRING" },
            "shadowColor": { "type": "STRING" },
            "shadowBlur": { "type": "NUMBER" }
        },
        "required": ["hindiText", "x", "y", "fontSize", "fontStyle", "shadowColor", "shadowBlur"]
    })
}
