//! Local keyword extraction and categorization. No network, no NLP model:
//! tokens are matched against the archetype keyword vocabulary.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::assessment::catalog::Catalog;

/// Upper bound on keywords shown in a report.
pub const MAX_REPORT_KEYWORDS: usize = 15;

const SKILL_STEMS: &[&str] = &[
    "design", "coding", "analysis", "management", "communication", "software", "project",
    "planning", "research",
];
const INTEREST_STEMS: &[&str] = &[
    "art", "science", "music", "sport", "travel", "book", "technology", "nature", "photo", "food",
];
const PERSONALITY_STEMS: &[&str] = &[
    "leader", "creativ", "analytic", "detail", "social", "team", "success", "motivat",
    "disciplin", "patien",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordKind {
    Skill,
    Interest,
    Personality,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizedKeyword {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: KeywordKind,
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Returns archetype keywords that occur as whole words in `text`, in order of
/// first appearance.
pub fn extract_keywords(text: &str, catalog: &Catalog) -> Vec<String> {
    let vocabulary: HashSet<String> = catalog
        .archetypes
        .iter()
        .flat_map(|a| a.keywords.iter())
        .map(|k| k.to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    tokens(text)
        .filter(|t| vocabulary.contains(t))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

pub fn classify(keyword: &str) -> KeywordKind {
    let lower = keyword.to_lowercase();
    if SKILL_STEMS.iter().any(|s| lower.contains(s)) {
        KeywordKind::Skill
    } else if INTEREST_STEMS.iter().any(|s| lower.contains(s)) {
        KeywordKind::Interest
    } else if PERSONALITY_STEMS.iter().any(|s| lower.contains(s)) {
        KeywordKind::Personality
    } else {
        KeywordKind::Other
    }
}

pub fn categorize(keywords: &[String]) -> Vec<CategorizedKeyword> {
    keywords
        .iter()
        .take(MAX_REPORT_KEYWORDS)
        .map(|k| CategorizedKeyword {
            text: k.clone(),
            kind: classify(k),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_catalog_keywords_in_order() {
        let catalog = Catalog::builtin();
        let text = "I love Travel, photography and design. Travel is my passion; adventure too!";
        assert_eq!(
            extract_keywords(text, &catalog),
            vec!["travel", "design", "adventure"]
        );
    }

    #[test]
    fn test_no_partial_word_matches() {
        let catalog = Catalog::builtin();
        assert!(extract_keywords("redesigned artistic", &catalog).is_empty());
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify("design"), KeywordKind::Skill);
        assert_eq!(classify("music"), KeywordKind::Interest);
        assert_eq!(classify("leadership"), KeywordKind::Personality);
        assert_eq!(classify("courage"), KeywordKind::Other);
    }

    #[test]
    fn test_categorize_caps_length() {
        let many: Vec<String> = (0..20).map(|i| format!("kw{i}")).collect();
        assert_eq!(categorize(&many).len(), MAX_REPORT_KEYWORDS);
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let json = serde_json::to_value(CategorizedKeyword {
            text: "art".to_string(),
            kind: KeywordKind::Interest,
        })
        .unwrap();
        assert_eq!(json["type"], "interest");
    }
}
