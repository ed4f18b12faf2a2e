use crate::models::{Language, UserProfile};

/// Fixed tag → label mapping for the health-interest tags the clients
/// send. Unknown tags pass through untranslated.
const HEALTH_INTEREST_LABELS: &[(&str, &str, &str)] = &[
    ("weightLoss", "체중 감량", "Weight Loss"),
    ("muscleGain", "근육 증가", "Muscle Gain"),
    ("sugarControl", "혈당 관리", "Blood Sugar Control"),
    ("slowAging", "저속노화", "Anti-Aging"),
    ("heartHealth", "심장 건강", "Heart Health"),
    ("immunity", "면역력 강화", "Immunity Boost"),
    ("sleep", "수면 개선", "Sleep Improvement"),
    ("stress", "스트레스 관리", "Stress Management"),
    ("eyeHealth", "눈 건강", "Eye Health"),
    ("other", "기타", "Other"),
];

/// Reference reading per interest, appended to the guide so the model can
/// cite them in its recommendations.
const HEALTH_INTEREST_LINKS: &[(&str, &str)] = &[
    (
        "eyeHealth",
        "https://www.nei.nih.gov/learn-about-eye-health/healthy-vision/keep-your-eyes-healthy",
    ),
    (
        "heartHealth",
        "https://www.heart.org/en/healthy-living/healthy-eating/heart-check-foods",
    ),
    (
        "muscleGain",
        "https://www.nsca.com/education/articles/kinetic-select/high-protein-diets/",
    ),
    (
        "immunity",
        "https://www.healthline.com/health/food-nutrition/foods-that-boost-the-immune-system",
    ),
    (
        "weightLoss",
        "https://www.cdc.gov/healthy-weight-growth/healthy-eating/index.html",
    ),
    (
        "sugarControl",
        "https://www.healthline.com/nutrition/foods-to-lower-blood-sugar",
    ),
    ("slowAging", "https://kormedi.com/1707012/"),
    (
        "sleep",
        "https://www.hopkinsmedicine.org/health/wellness-and-prevention/better-sleep-3-simple-diet-tweaks",
    ),
    ("stress", "https://www.nimh.nih.gov/health/publications/stress"),
];

const CUSTOM_INTEREST_LINK: &str = "https://www.nutrition.gov/topics/basic-nutrition";

pub fn interest_label<'a>(tag: &'a str, language: Language) -> &'a str {
    HEALTH_INTEREST_LABELS
        .iter()
        .find(|(known, _, _)| *known == tag)
        .map(|(_, korean, english)| if language.is_korean() { *korean } else { *english })
        .unwrap_or(tag)
}

fn interest_link(tag: &str) -> Option<&'static str> {
    HEALTH_INTEREST_LINKS
        .iter()
        .find(|(known, _)| *known == tag)
        .map(|(_, url)| *url)
}

/// Turns the optional user profile into the guidance block appended to
/// the prompt. Deterministic; returns an empty string when there is no
/// profile or the profile carries no populated fields.
pub fn build_profile_guide(profile: Option<&UserProfile>, language: Language) -> String {
    let Some(profile) = profile else {
        return String::new();
    };

    let korean = language.is_korean();
    let mut guides: Vec<String> = Vec::new();

    if let Some(goal) = profile.daily_calorie_goal {
        guides.push(if korean {
            format!("사용자의 일일 목표 칼로리는 {}kcal입니다.", goal)
        } else {
            format!("User's daily calorie goal is {}kcal.", goal)
        });
    }

    let mut macro_goals: Vec<String> = Vec::new();
    if let Some(carbs) = profile.daily_carb_goal {
        macro_goals.push(if korean {
            format!("탄수화물 {}g", carbs)
        } else {
            format!("Carbs {}g", carbs)
        });
    }
    if let Some(protein) = profile.daily_protein_goal {
        macro_goals.push(if korean {
            format!("단백질 {}g", protein)
        } else {
            format!("Protein {}g", protein)
        });
    }
    if let Some(fat) = profile.daily_fat_goal {
        macro_goals.push(if korean {
            format!("지방 {}g", fat)
        } else {
            format!("Fat {}g", fat)
        });
    }
    if !macro_goals.is_empty() {
        guides.push(if korean {
            format!("사용자의 일일 영양소 목표: {}", macro_goals.join(", "))
        } else {
            format!("User's daily nutrition goals: {}", macro_goals.join(", "))
        });
    }

    if !profile.health_interests.is_empty() {
        let translated: Vec<&str> = profile
            .health_interests
            .iter()
            .map(|tag| interest_label(tag, language))
            .collect();
        guides.push(if korean {
            format!("사용자의 건강 관심사: {}", translated.join(", "))
        } else {
            format!("User's health interests: {}", translated.join(", "))
        });
    }

    if !profile.dietary_restrictions.is_empty() {
        guides.push(if korean {
            format!("사용자의 식이 제한: {}", profile.dietary_restrictions.join(", "))
        } else {
            format!(
                "User's dietary restrictions: {}",
                profile.dietary_restrictions.join(", ")
            )
        });
    }

    if guides.is_empty() {
        return String::new();
    }

    let title = if korean {
        "사용자 맞춤 분석 가이드"
    } else {
        "User-specific Analysis Guide"
    };
    let note = if korean {
        "위 정보를 고려하여 분석 및 추천을 진행해주세요."
    } else {
        "Please proceed with analysis and recommendations considering the above information."
    };

    let mut guide = format!("{}:\n{}\n{}", title, guides.join("\n"), note);

    let references = build_reference_links(profile, language);
    if !references.is_empty() {
        guide.push_str("\n\n");
        guide.push_str(&references);
    }

    guide
}

/// Reference section: one link per known interest, plus a generic link
/// for a free-form custom interest.
fn build_reference_links(profile: &UserProfile, language: Language) -> String {
    let korean = language.is_korean();
    let link_text = if korean { "관련 참고자료" } else { "Related Reference" };

    let mut links: Vec<String> = profile
        .health_interests
        .iter()
        .filter_map(|tag| {
            interest_link(tag)
                .map(|url| format!("{} {}: {}", interest_label(tag, language), link_text, url))
        })
        .collect();

    if let Some(custom) = profile.custom_health_interest.as_deref() {
        let custom = custom.trim();
        if !custom.is_empty() {
            links.push(format!("{} {}: {}", custom, link_text, CUSTOM_INTEREST_LINK));
        }
    }

    if links.is_empty() {
        return String::new();
    }

    let title = if korean { "참고자료" } else { "References" };
    format!("{}:\n{}", title, links.join("\n"))
}
