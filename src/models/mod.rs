use base64::{engine::general_purpose, Engine};
use serde::{Deserialize, Serialize};

/// Response language. The wire format is `"ko"` for Korean; any other
/// value selects English, and a missing field defaults to Korean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    Korean,
    English,
}

impl Language {
    pub fn from_code(code: &str) -> Self {
        if code == "ko" {
            Language::Korean
        } else {
            Language::English
        }
    }

    pub fn is_korean(self) -> bool {
        matches!(self, Language::Korean)
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Ok(Language::from_code(&code))
    }
}

/// Incoming analysis request. At least one of `image_base64` and
/// `description` must carry content; the handler rejects the request
/// before any model call otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzeRequest {
    pub image_base64: Option<String>,
    pub description: Option<String>,
    pub language: Language,
    pub user_profile: Option<UserProfile>,
}

/// Nutrition profile supplied by the caller. Read-only to the analysis
/// core; every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub daily_calorie_goal: Option<f64>,
    pub daily_carb_goal: Option<f64>,
    pub daily_protein_goal: Option<f64>,
    pub daily_fat_goal: Option<f64>,
    pub health_interests: Vec<String>,
    pub dietary_restrictions: Vec<String>,
    pub custom_health_interest: Option<String>,
}

/// Base64 image payload plus its MIME type, ready for the provider.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub data: String,
    pub mime_type: String,
}

impl ImagePart {
    /// Builds an image part from raw request data. Accepts both a plain
    /// base64 string and a `data:<mime>;base64,<payload>` URL; for plain
    /// strings the MIME type is sniffed from the decoded magic bytes.
    pub fn from_base64(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix("data:") {
            if let Some((mime, payload)) = rest.split_once(";base64,") {
                let mime_type = if mime.is_empty() {
                    "image/jpeg".to_string()
                } else {
                    mime.to_string()
                };
                return Self {
                    data: payload.to_string(),
                    mime_type,
                };
            }
        }

        Self {
            data: raw.to_string(),
            mime_type: detect_mime(raw).to_string(),
        }
    }
}

/// Sniffs the image type from the first decoded bytes. Unknown or
/// undecodable data falls back to JPEG.
fn detect_mime(base64_data: &str) -> &'static str {
    // 24 base64 chars decode to 18 bytes, enough for every magic number
    let head = &base64_data.as_bytes()[..base64_data.len().min(24)];
    match general_purpose::STANDARD.decode(head) {
        Ok(bytes) => {
            if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
                "image/png"
            } else if bytes.starts_with(&[0xFF, 0xD8]) {
                "image/jpeg"
            } else if bytes.starts_with(b"GIF8") {
                "image/gif"
            } else if bytes.starts_with(b"RIFF") {
                "image/webp"
            } else {
                "image/jpeg"
            }
        }
        Err(_) => "image/jpeg",
    }
}

/// Final instruction text plus the optional image, consumed once by the
/// model runner.
#[derive(Debug, Clone)]
pub struct PromptBundle {
    pub instruction: String,
    pub image: Option<ImagePart>,
}

/// Canonical analysis result. Always fully populated: the validator and
/// the fallback builder both guarantee every field holds a usable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodAnalysis {
    pub food_name: String,
    pub calories: u32,
    pub carbs: f64,
    pub protein: f64,
    pub fat: f64,
    pub sugar: f64,
    pub sodium: f64,
    pub fiber: f64,
    pub description: String,
    pub serving_size: f64,
    pub ingredients: Vec<String>,
    pub nutritions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<HealthAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Recommendations>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthAnalysis {
    /// 0-100, scored on the food itself
    pub health_score: u8,
    pub analysis: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub health_improvements: String,
    pub alternative_options: String,
}
