use crate::models::{FoodAnalysis, HealthAnalysis, Language, Recommendations};

pub fn unknown_food_label(language: Language) -> &'static str {
    if language.is_korean() {
        "알 수 없는 음식"
    } else {
        "Unknown Food"
    }
}

/// Builds the schema-conformant placeholder returned when every model
/// attempt has failed. All nutrition numbers are zero, the health score
/// is the neutral 50 and the text fields explain that analysis was
/// unavailable. Callers return it with a success status; exhaustion is
/// never surfaced as an error response.
pub fn unavailable_analysis(description: Option<&str>, language: Language) -> FoodAnalysis {
    let korean = language.is_korean();
    let food_name = description
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| unknown_food_label(language))
        .to_string();

    let description = if korean {
        format!("{} (분석 실패)", food_name)
    } else {
        format!("{} (Analysis Failed)", food_name)
    };

    FoodAnalysis {
        food_name,
        calories: 0,
        carbs: 0.0,
        protein: 0.0,
        fat: 0.0,
        sugar: 0.0,
        sodium: 0.0,
        fiber: 0.0,
        description,
        serving_size: 1.0,
        ingredients: Vec::new(),
        nutritions: Vec::new(),
        analysis: Some(HealthAnalysis {
            health_score: 50,
            analysis: if korean {
                "서버 과부하로 인해 정확한 분석을 제공할 수 없습니다. 나중에 다시 시도해주세요."
                    .to_string()
            } else {
                "Unable to provide accurate analysis due to server overload. Please try again later."
                    .to_string()
            },
        }),
        recommendations: Some(Recommendations {
            health_improvements: if korean {
                "현재 서비스 과부하로 인해 추천을 제공할 수 없습니다.".to_string()
            } else {
                "Unable to provide recommendations due to current service overload.".to_string()
            },
            alternative_options: if korean {
                "잠시 후 다시 시도해주세요.".to_string()
            } else {
                "Please try again in a moment.".to_string()
            },
        }),
    }
}
