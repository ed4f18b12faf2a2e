use serde_json::Value;

use crate::models::{FoodAnalysis, HealthAnalysis, Language, Recommendations};

pub fn unidentified_food_label(language: Language) -> &'static str {
    if language.is_korean() {
        "미확인 음식"
    } else {
        "Unidentified Food"
    }
}

/// Normalizes a raw model payload into the canonical result. Never
/// fails: every field has a documented default, so the output is always
/// fully populated. Applying it to an already-normalized result is a
/// fixed point.
pub fn normalize(raw: &Value, language: Language) -> FoodAnalysis {
    let field = |key: &str| raw.get(key);

    FoodAnalysis {
        food_name: string_or(field("foodName"), unidentified_food_label(language)),
        calories: count(field("calories")),
        carbs: number(field("carbs")),
        protein: number(field("protein")),
        fat: number(field("fat")),
        sugar: number(field("sugar")),
        sodium: number(field("sodium")),
        fiber: number(field("fiber")),
        description: string_or(field("description"), ""),
        serving_size: serving_size(field("servingSize")),
        ingredients: string_list(field("ingredients")),
        nutritions: string_list(field("nutritions")),
        analysis: field("analysis").and_then(Value::as_object).map(|section| {
            HealthAnalysis {
                health_score: health_score(section.get("healthScore")),
                analysis: string_or(section.get("analysis"), ""),
            }
        }),
        recommendations: field("recommendations")
            .and_then(Value::as_object)
            .map(|section| Recommendations {
                health_improvements: string_or(section.get("healthImprovements"), ""),
                alternative_options: string_or(section.get("alternativeOptions"), ""),
            }),
    }
}

/// Non-negative finite number. Accepts JSON numbers and numeric strings;
/// everything else (missing, wrong type, NaN, infinity, negative) is 0.
fn number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Calories are reported as a whole number.
fn count(value: Option<&Value>) -> u32 {
    number(value).min(u32::MAX as f64) as u32
}

/// Positive serving count, 1.0 when missing or out of range.
fn serving_size(value: Option<&Value>) -> f64 {
    let v = number(value);
    if v > 0.0 {
        v
    } else {
        1.0
    }
}

/// 0-100 score; out-of-range values clamp, anything unusable becomes the
/// neutral 50.
fn health_score(value: Option<&Value>) -> u8 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v.clamp(0.0, 100.0) as u8,
        _ => 50,
    }
}

/// String field with a fallback for missing, non-string or empty values.
fn string_or(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => fallback.to_string(),
    }
}

/// Keeps string elements of an array; any other shape is an empty list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_micronutrients_default_to_zero() {
        let raw = json!({
            "foodName": "불고기",
            "calories": 420,
            "carbs": 12.5,
            "protein": 35.0,
            "fat": 22.0,
            "description": "양념에 재운 소고기 구이"
        });

        let result = normalize(&raw, Language::Korean);
        assert_eq!(result.sugar, 0.0);
        assert_eq!(result.sodium, 0.0);
        assert_eq!(result.fiber, 0.0);
        assert_eq!(result.serving_size, 1.0);
        assert_eq!(result.calories, 420);
        assert_eq!(result.food_name, "불고기");
    }

    #[test]
    fn test_missing_health_score_defaults_to_fifty() {
        let raw = json!({
            "foodName": "샐러드",
            "analysis": { "analysis": "신선한 채소 위주" }
        });

        let analysis = normalize(&raw, Language::Korean).analysis.unwrap();
        assert_eq!(analysis.health_score, 50);
        assert_eq!(analysis.analysis, "신선한 채소 위주");
    }

    #[test]
    fn test_absent_sections_stay_absent() {
        let raw = json!({ "foodName": "물" });
        let result = normalize(&raw, Language::Korean);
        assert!(result.analysis.is_none());
        assert!(result.recommendations.is_none());
    }

    #[test]
    fn test_non_array_ingredients_become_empty() {
        let raw = json!({
            "foodName": "김밥",
            "ingredients": "밥, 김, 단무지",
            "nutritions": 42
        });

        let result = normalize(&raw, Language::Korean);
        assert!(result.ingredients.is_empty());
        assert!(result.nutritions.is_empty());
    }

    #[test]
    fn test_numeric_strings_are_coerced() {
        let raw = json!({
            "calories": "350",
            "carbs": " 41.5 ",
            "servingSize": "2"
        });

        let result = normalize(&raw, Language::English);
        assert_eq!(result.calories, 350);
        assert_eq!(result.carbs, 41.5);
        assert_eq!(result.serving_size, 2.0);
    }

    #[test]
    fn test_invalid_values_get_defaults() {
        let raw = json!({
            "foodName": "",
            "calories": -120,
            "carbs": "a lot",
            "servingSize": -1,
            "analysis": { "healthScore": 250, "analysis": 7 }
        });

        let result = normalize(&raw, Language::English);
        assert_eq!(result.food_name, "Unidentified Food");
        assert_eq!(result.calories, 0);
        assert_eq!(result.carbs, 0.0);
        assert_eq!(result.serving_size, 1.0);

        let analysis = result.analysis.unwrap();
        assert_eq!(analysis.health_score, 100);
        assert_eq!(analysis.analysis, "");
    }

    #[test]
    fn test_zero_health_score_is_preserved() {
        let raw = json!({ "analysis": { "healthScore": 0, "analysis": "매우 가공된 음식" } });
        let analysis = normalize(&raw, Language::Korean).analysis.unwrap();
        assert_eq!(analysis.health_score, 0);
    }

    #[test]
    fn test_non_object_payload_still_yields_full_result() {
        let result = normalize(&json!(null), Language::Korean);
        assert_eq!(result.food_name, "미확인 음식");
        assert_eq!(result.calories, 0);
        assert!(result.ingredients.is_empty());
        assert!(result.analysis.is_none());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = json!({
            "foodName": "잡채",
            "calories": 290,
            "carbs": "44",
            "protein": 8.2,
            "fat": 9.1,
            "sugar": 6.0,
            "servingSize": 1.5,
            "ingredients": ["당면", "시금치", 3],
            "nutritions": ["철분"],
            "analysis": { "healthScore": 68, "analysis": "균형 잡힌 반찬" },
            "recommendations": {
                "healthImprovements": "기름을 줄여보세요",
                "alternativeOptions": "곤약면 잡채"
            }
        });

        let once = normalize(&raw, Language::Korean);
        let round_tripped = serde_json::to_value(&once).unwrap();
        let twice = normalize(&round_tripped, Language::Korean);

        assert_eq!(once, twice);
    }
}
