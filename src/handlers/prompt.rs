use crate::models::{ImagePart, Language, PromptBundle};

const LANGUAGE_DIRECTIVE_KO: &str = "중요: 모든 텍스트 응답(음식 이름, 설명, 분석, 추천, 개선사항, 대체옵션)은 반드시 한국어로만 작성해주세요. 절대 영어를 사용하지 마세요.";
const LANGUAGE_DIRECTIVE_EN: &str = "IMPORTANT: Please write ALL text responses (food name, description, analysis, recommendations, improvements, alternatives) in English ONLY. Do not use Korean.";

const FOOD_DETAIL_KO: &str = "'한국 음식'이라면 구체적인 한국 음식 이름으로 응답해주세요. 예를 들어 '김치찌개', '불고기', '비빔밥' 등으로 응답해 주세요.";
const FOOD_DETAIL_EN: &str = "Please provide specific and accurate food names. For example, 'Grilled Chicken Salad', 'Beef Stir-fry', 'Vegetable Soup', etc.";

const NUTRITION_GUIDE_KO: &str = "영양소 분석 기준:
- 주요 영양소를 분석하여 포함된 영양소를 나열해주세요.
- 예시: 비타민A, 비타민C, 칼슘, 철분, 식이섬유, 오메가3 등
- 해당 음식에서 특별히 풍부한 영양소를 반드시 포함해주세요.
- 음식에 포함된 당류 계산 시 중요한 점:
  * 사과, 바나나, 포도 등 과일에 있는 자연당은 제외하고 오직 가공식품에 추가된 첨가당/자유당만 계산해야 합니다.
  * 사과, 바나나 등 순수한 과일은 첨가당이 0g입니다.
  * 음료, 과자, 양념, 소스 등에 포함된 첨가당만 계산해주세요.
  * 나트륨(소금, mg)과 식이섬유(g) 함량도 추정해 알려주세요.
  * 만약 추정이 어렵다면 0으로 표시하세요.";

const NUTRITION_GUIDE_EN: &str = "Nutrition analysis criteria:
- Analyze and list the main nutrients included.
- Examples: Vitamin A, Vitamin C, Calcium, Iron, Dietary Fiber, Omega-3, etc.
- Please include nutrients that are particularly abundant in the food.
- Important note on calculating sugar content in food:
  * Exclude natural sugars in fruits like apples, bananas, grapes, and only calculate added/free sugars in processed foods.
  * Pure fruits like apples and bananas have 0g added sugar.
  * Only calculate added sugars in beverages, snacks, seasonings, sauces, etc.
  * Please also estimate and provide sodium (salt, mg) and dietary fiber (g) content.
  * If estimation is difficult, mark as 0.";

/// Restates the output shape in the prompt itself so a model that drifts
/// from the declared response schema still tends to produce it.
const SCHEMA_RESTATEMENT: &str = r#"Respond with a single JSON object in exactly this shape:
{
  "foodName": "name of the food" (string),
  "calories": number (kcal),
  "carbs": number (grams),
  "protein": number (grams),
  "fat": number (grams),
  "sugar": number (grams, added/free sugars only, may be null),
  "sodium": number (mg, may be null),
  "fiber": number (grams, may be null),
  "description": "one short sentence describing the food" (string),
  "servingSize": number (1 serving = 1.0),
  "ingredients": ["ingredient1", "ingredient2"] (may be null),
  "nutritions": ["Vitamin C", "Calcium"] (nutrient names, may be null),
  "analysis": { "healthScore": number (0-100), "analysis": "brief health analysis" } (may be null),
  "recommendations": { "healthImprovements": "...", "alternativeOptions": "..." } (may be null)
}"#;

const OUTPUT_RULES: &str = r#"IMPORTANT:
- For "nutritions", provide ONLY specific nutrient names (like vitamins and minerals) as an array of strings. Do NOT include sentences or descriptions. Examples: ["비타민C", "칼슘", "철분", "식이섬유"] or ["Vitamin C", "Calcium", "Iron", "Fiber"].
- For "analysis", analyze ONLY the food characteristics itself. Do NOT compare with daily nutritional goals or mention daily targets. Focus on the food's nutritional quality, ingredients, and health benefits or concerns.
- Provide realistic estimates based on typical portions and recipes."#;

/// Assembles the full instruction text and pairs it with the image.
/// Deterministic: identical inputs always produce identical output.
pub fn compose_prompt(
    description: Option<&str>,
    image: Option<ImagePart>,
    language: Language,
    profile_guide: &str,
) -> PromptBundle {
    let korean = language.is_korean();

    let preamble = match (description, image.is_some()) {
        (Some(description), true) => {
            if korean {
                format!(
                    "이 음식 이미지와 사용자 설명을 함께 분석하여 가장 정확한 영양 정보를 제공해주세요. \
                     음식 이미지가 아닌 경우 \"음식아님\"으로 표시하고 모든 영양 정보는 0으로 표시하세요. \
                     이미지와 설명이 일치하지 않는 경우, 사용자 설명을 우선시하세요.\n\
                     사용자 설명: \"{}\"\n\
                     반드시 주요 영양소 목록(nutritions)을 분석해주세요.",
                    description
                )
            } else {
                format!(
                    "Please analyze this food image and user description together to provide the most \
                     accurate nutritional information. If the image is not food, mark it as \"not food\" \
                     and set all nutritional information to 0. If the image and description don't match, \
                     prioritize the user description.\n\
                     User description: \"{}\"\n\
                     Please analyze the main nutrients list (nutritions).",
                    description
                )
            }
        }
        (None, true) => {
            if korean {
                "이 음식 이미지를 분석하여 영양 정보를 제공해주세요. \
                 반드시 주요 영양소 목록(nutritions)을 분석해주세요."
                    .to_string()
            } else {
                "Please analyze this food image to provide nutritional information. \
                 Please analyze the main nutrients list (nutritions)."
                    .to_string()
            }
        }
        (Some(description), false) => {
            if korean {
                format!(
                    "다음 음식 설명을 분석하여 영양 정보를 제공해주세요: \"{}\". \
                     반드시 주요 영양소 목록(nutritions)을 분석해주세요.",
                    description
                )
            } else {
                format!(
                    "Please analyze the following food description to provide nutritional \
                     information: \"{}\". Please analyze the main nutrients list (nutritions).",
                    description
                )
            }
        }
        // Callers reject empty requests before composing
        (None, false) => String::new(),
    };

    let language_directive = if korean { LANGUAGE_DIRECTIVE_KO } else { LANGUAGE_DIRECTIVE_EN };
    let food_detail = if korean { FOOD_DETAIL_KO } else { FOOD_DETAIL_EN };
    let nutrition_guide = if korean { NUTRITION_GUIDE_KO } else { NUTRITION_GUIDE_EN };

    let mut instruction = format!(
        "{}\n\n{}\n\n{}\n\n{} {}\n\n{}",
        preamble, SCHEMA_RESTATEMENT, OUTPUT_RULES, language_directive, food_detail, nutrition_guide
    );

    if !profile_guide.is_empty() {
        instruction.push_str("\n\n");
        instruction.push_str(profile_guide);
    }

    PromptBundle { instruction, image }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> ImagePart {
        ImagePart {
            data: "aGVsbG8=".to_string(),
            mime_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn test_compose_is_deterministic() {
        let first = compose_prompt(Some("된장찌개"), None, Language::Korean, "가이드");
        let second = compose_prompt(Some("된장찌개"), None, Language::Korean, "가이드");
        assert_eq!(first.instruction, second.instruction);
    }

    #[test]
    fn test_korean_prompt_carries_language_directive_and_description() {
        let bundle = compose_prompt(Some("비빔밥"), None, Language::Korean, "");
        assert!(bundle.instruction.contains(LANGUAGE_DIRECTIVE_KO));
        assert!(bundle.instruction.contains("\"비빔밥\""));
        assert!(bundle.image.is_none());
    }

    #[test]
    fn test_english_prompt_uses_english_blocks() {
        let bundle = compose_prompt(Some("chicken salad"), None, Language::English, "");
        assert!(bundle.instruction.contains(LANGUAGE_DIRECTIVE_EN));
        assert!(bundle.instruction.contains(NUTRITION_GUIDE_EN));
        assert!(!bundle.instruction.contains(LANGUAGE_DIRECTIVE_KO));
    }

    #[test]
    fn test_schema_restatement_and_nutrient_rule_always_present() {
        let bundle = compose_prompt(None, Some(sample_image()), Language::Korean, "");
        assert!(bundle.instruction.contains("\"servingSize\": number"));
        assert!(bundle.instruction.contains("ONLY specific nutrient names"));
        assert!(bundle.instruction.contains("Do NOT compare with daily nutritional goals"));
    }

    #[test]
    fn test_image_and_description_preamble_prioritizes_description() {
        let bundle = compose_prompt(
            Some("돈까스"),
            Some(sample_image()),
            Language::Korean,
            "",
        );
        assert!(bundle.instruction.contains("사용자 설명을 우선시하세요"));
        assert!(bundle.image.is_some());
    }

    #[test]
    fn test_profile_guide_is_appended_at_the_end() {
        let bundle = compose_prompt(Some("kimbap"), None, Language::English, "User guide block");
        assert!(bundle.instruction.ends_with("User guide block"));

        let without = compose_prompt(Some("kimbap"), None, Language::English, "");
        assert!(!without.instruction.ends_with('\n'));
    }
}
