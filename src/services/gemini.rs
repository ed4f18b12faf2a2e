use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::inference::{InferenceProvider, ProviderError};
use crate::models::PromptBundle;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topK")]
    top_k: u32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Google Generative Language API client with structured output.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Overrides the API endpoint. Tests point this at a local stub.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn request_url(&self, model_id: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model_id, self.api_key
        )
    }
}

#[async_trait::async_trait]
impl InferenceProvider for GeminiClient {
    async fn generate(
        &self,
        model_id: &str,
        bundle: &PromptBundle,
    ) -> Result<String, ProviderError> {
        let mut parts = Vec::new();
        if let Some(image) = &bundle.image {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                }),
            });
        }
        parts.push(Part {
            text: Some(&bundle.instruction),
            inline_data: None,
        });

        let request = GenerateRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                top_k: 32,
                top_p: 0.95,
                max_output_tokens: 1024,
                response_mime_type: "application/json",
                response_schema: analysis_response_schema(),
            },
        };

        log::debug!("📤 Calling Gemini model {}", model_id);

        let response = self
            .client
            .post(self.request_url(model_id))
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Api(format!("request to {} failed: {}", model_id, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("⚠️ Gemini model {} returned {}: {}", model_id, status, body);
            return Err(classify_failure(status.as_u16(), &body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("unreadable response body: {}", e)))?;

        payload_text(body)
            .ok_or_else(|| ProviderError::Api("response carried no candidate text".to_string()))
    }
}

/// Splits a non-success response into retryable overload vs. fatal error.
/// 503 and 429 are the provider's capacity signals; the body markers catch
/// overload reported under other status codes.
fn classify_failure(status: u16, body: &str) -> ProviderError {
    let overloaded = status == 503
        || status == 429
        || body.contains("overloaded")
        || body.contains("RESOURCE_EXHAUSTED")
        || body.contains("UNAVAILABLE");

    let detail = format!("HTTP {}: {}", status, body);
    if overloaded {
        ProviderError::Overloaded(detail)
    } else {
        ProviderError::Api(detail)
    }
}

/// candidates[0].content.parts[0].text
fn payload_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|part| part.text)
}

/// Response schema sent with every call so the model emits the analysis
/// shape directly instead of free text.
fn analysis_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "foodName": { "type": "STRING", "description": "Short name of the food", "nullable": false },
            "calories": { "type": "NUMBER", "description": "Calories (kcal)", "nullable": false },
            "carbs": { "type": "NUMBER", "description": "Carbohydrates (g)", "nullable": false },
            "protein": { "type": "NUMBER", "description": "Protein (g)", "nullable": false },
            "fat": { "type": "NUMBER", "description": "Fat (g)", "nullable": false },
            "sugar": {
                "type": "NUMBER",
                "description": "Added/free sugars only (g). Natural sugar in pure fruit counts as 0; count only sugar added to drinks, snacks, seasonings and sauces.",
                "nullable": true
            },
            "sodium": { "type": "NUMBER", "description": "Sodium (mg)", "nullable": true },
            "fiber": { "type": "NUMBER", "description": "Dietary fiber (g)", "nullable": true },
            "servingSize": { "type": "NUMBER", "description": "Number of servings shown (1 serving = 1.0)", "nullable": false },
            "description": {
                "type": "STRING",
                "description": "One short sentence describing the food. No compound sentences, no serving counts.",
                "nullable": false
            },
            "ingredients": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Main ingredients",
                "nullable": true
            },
            "nutritions": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "Main nutrient names (e.g. Vitamin A, Calcium, Iron, Dietary Fiber, Omega-3), including the nutrients this food is especially rich in.",
                "nullable": true
            },
            "analysis": {
                "type": "OBJECT",
                "description": "Health assessment of the food",
                "properties": {
                    "healthScore": { "type": "NUMBER", "description": "Health score 0-100", "nullable": false },
                    "analysis": { "type": "STRING", "description": "Brief overall assessment, under 50 words", "nullable": false }
                },
                "nullable": true
            },
            "recommendations": {
                "type": "OBJECT",
                "description": "Suggestions for the user",
                "properties": {
                    "healthImprovements": { "type": "STRING", "description": "Concrete improvements based on the analysis", "nullable": true },
                    "alternativeOptions": { "type": "STRING", "description": "Healthier alternative foods", "nullable": true }
                },
                "nullable": true
            }
        },
        "required": ["foodName", "calories", "carbs", "protein", "fat", "description"]
    })
}
