//! Canned questions offered to farmers before they type or speak.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuggestedQuestion {
    pub category: &'static str,
    pub ur: &'static str,
    pub en: &'static str,
}

const fn q(category: &'static str, ur: &'static str, en: &'static str) -> SuggestedQuestion {
    SuggestedQuestion { category, ur, en }
}

static QUESTIONS: &[SuggestedQuestion] = &[
    q("irrigation", "میری فصل کو کتنا پانی چاہیے؟", "How much water does my crop need?"),
    q("irrigation", "آبپاشی کا بہترین وقت کیا ہے؟", "What is the best time for irrigation?"),
    q("irrigation", "ٹیوب ویل کتنی دیر چلائیں؟", "How long should I run the tubewell?"),
    q("fertilizer", "گندم میں کون سی کھاد لگائیں؟", "Which fertilizer for wheat?"),
    q("fertilizer", "یوریا کب اور کتنی لگائیں؟", "When and how much urea?"),
    q("fertilizer", "DAP کی مقدار کیا ہونی چاہیے؟", "What should be the DAP quantity?"),
    q("pest", "کیڑوں سے بچاؤ کیسے کریں؟", "How to prevent pests?"),
    q("pest", "کون سی دوا چھڑکاؤ کریں؟", "Which pesticide to spray?"),
    q("pest", "جڑی بوٹیوں کا تدارک کیسے کریں؟", "How to control weeds?"),
    q("disease", "پیلے پتوں کا علاج کیا ہے؟", "Treatment for yellow leaves?"),
    q("disease", "گندم میں سرخی کا علاج؟", "Treatment for wheat rust?"),
    q("disease", "فصل کی بیماری کیسے پہچانیں؟", "How to identify crop disease?"),
];

/// Whether any question belongs to `category`
pub fn is_category(category: &str) -> bool {
    QUESTIONS.iter().any(|q| q.category == category)
}

/// Questions in `category`, or all of them when the category is unknown or absent
pub fn suggested_questions(category: Option<&str>) -> Vec<SuggestedQuestion> {
    let filtered: Vec<SuggestedQuestion> = match category {
        Some(category) => QUESTIONS
            .iter()
            .filter(|q| q.category == category)
            .copied()
            .collect(),
        None => Vec::new(),
    };

    if filtered.is_empty() {
        QUESTIONS.to_vec()
    } else {
        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_by_category() {
        let pest = suggested_questions(Some("pest"));
        assert_eq!(pest.len(), 3);
        assert!(pest.iter().all(|q| q.category == "pest"));
    }

    #[test]
    fn test_unknown_category_returns_all() {
        assert_eq!(suggested_questions(Some("weather")).len(), 12);
        assert_eq!(suggested_questions(None).len(), 12);
    }

    #[test]
    fn test_known_categories() {
        for category in ["irrigation", "fertilizer", "pest", "disease"] {
            assert!(is_category(category));
        }
        assert!(!is_category("weather"));
        assert!(!is_category("Pest"));
    }
}
