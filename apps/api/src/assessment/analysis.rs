//! Text analysis: the optional external collaborator that reads free-text
//! answers and suggests score adjustments, archetypes and recommendations.
//!
//! Everything the collaborator returns is untrusted. `validate_analysis`
//! checks each field independently and keeps the local value whenever a field
//! is missing, mistyped or out of range.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::assessment::catalog::{Catalog, Trait};
use crate::assessment::matcher::MATCH_SIZE;
use crate::assessment::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::assessment::scorer::{round2, TraitScoreSet, MAX_ANSWER, MIN_ANSWER};
use crate::llm_client::{LlmClient, LlmError};

/// Comments shorter than this are treated as missing.
pub const MIN_COMMENT_CHARS: usize = 20;
/// Analysis career lists shorter than this are ignored.
pub const MIN_ANALYSIS_CAREERS: usize = 3;
/// Analysis course lists shorter than this are ignored.
pub const MIN_ANALYSIS_COURSES: usize = 5;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("text analysis is not configured")]
    Unavailable,

    #[error("text analysis timed out after {0}s")]
    Timeout(u64),

    #[error("text analysis call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("text analysis returned malformed data: {0}")]
    Malformed(String),
}

/// Raw collaborator response. Every field is optional and loosely typed so a
/// single bad field never discards the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAnalysis {
    #[serde(default, alias = "nlp_keywords")]
    pub keywords: Option<Value>,
    #[serde(default)]
    pub updated_scores: Option<Value>,
    #[serde(default, alias = "top_coalitions")]
    pub matched_archetypes: Option<Value>,
    #[serde(default, alias = "personality_comment")]
    pub narrative_comment: Option<Value>,
    #[serde(default)]
    pub career_recommendations: Option<Value>,
    #[serde(default)]
    pub course_recommendations: Option<Value>,
}

/// The injected text-analysis capability.
#[async_trait]
pub trait TextAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        text: &str,
        scores: &TraitScoreSet,
    ) -> Result<RawAnalysis, AnalysisError>;
}

/// Used when no LLM credentials are configured. Always unavailable.
pub struct DisabledAnalyzer;

#[async_trait]
impl TextAnalyzer for DisabledAnalyzer {
    async fn analyze(
        &self,
        _text: &str,
        _scores: &TraitScoreSet,
    ) -> Result<RawAnalysis, AnalysisError> {
        Err(AnalysisError::Unavailable)
    }
}

/// Text analysis backed by the shared LLM client.
pub struct LlmTextAnalyzer {
    llm: LlmClient,
    archetype_names: Vec<String>,
}

impl LlmTextAnalyzer {
    pub fn new(llm: LlmClient, catalog: &Catalog) -> Self {
        Self {
            llm,
            archetype_names: catalog.archetypes.iter().map(|a| a.name.clone()).collect(),
        }
    }

    fn build_prompt(&self, text: &str, scores: &TraitScoreSet) -> String {
        let scores_block = scores
            .iter()
            .map(|(t, s)| format!("- {}: {s}", t.as_str()))
            .collect::<Vec<_>>()
            .join("\n");
        let archetypes_block = self
            .archetype_names
            .iter()
            .map(|n| format!("- {n}"))
            .collect::<Vec<_>>()
            .join("\n");

        ANALYSIS_PROMPT_TEMPLATE
            .replace("{archetypes}", &archetypes_block)
            .replace("{scores}", &scores_block)
            .replace("{free_text}", text)
    }
}

#[async_trait]
impl TextAnalyzer for LlmTextAnalyzer {
    async fn analyze(
        &self,
        text: &str,
        scores: &TraitScoreSet,
    ) -> Result<RawAnalysis, AnalysisError> {
        let prompt = self.build_prompt(text, scores);
        match self.llm.call_json::<RawAnalysis>(&prompt, ANALYSIS_SYSTEM).await {
            Ok(raw) => Ok(raw),
            Err(LlmError::Parse(e)) => Err(AnalysisError::Malformed(e.to_string())),
            Err(e) => Err(AnalysisError::Llm(e)),
        }
    }
}

/// Collaborator output after validation against the local results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedAnalysis {
    /// Local scores with every valid suggested value applied.
    pub scores: TraitScoreSet,
    /// At least `MATCH_SIZE` catalog archetypes, or `None`.
    pub archetypes: Option<Vec<String>>,
    /// Reasons for catalog archetypes, keyed by name.
    pub reasons: BTreeMap<String, String>,
    pub comment: Option<String>,
    pub careers: Option<Vec<String>>,
    pub courses: Option<Vec<String>>,
    pub keywords: Vec<String>,
}

impl ValidatedAnalysis {
    /// True when validation kept nothing that would change the local report.
    pub fn is_empty(&self, local: &TraitScoreSet) -> bool {
        self.scores == *local
            && self.archetypes.is_none()
            && self.comment.is_none()
            && self.careers.is_none()
            && self.courses.is_none()
            && self.keywords.is_empty()
    }
}

pub fn validate_analysis(
    raw: &RawAnalysis,
    local: &TraitScoreSet,
    catalog: &Catalog,
) -> ValidatedAnalysis {
    let (archetypes, reasons) = validate_archetypes(raw.matched_archetypes.as_ref(), catalog);

    let comment = raw
        .narrative_comment
        .as_ref()
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|c| c.chars().count() >= MIN_COMMENT_CHARS)
        .map(str::to_string);

    let careers = string_list(raw.career_recommendations.as_ref())
        .filter(|c| c.len() >= MIN_ANALYSIS_CAREERS);
    let courses = string_list(raw.course_recommendations.as_ref())
        .filter(|c| c.len() >= MIN_ANALYSIS_COURSES);

    let keywords = string_list(raw.keywords.as_ref())
        .unwrap_or_default()
        .into_iter()
        .map(|k| k.to_lowercase())
        .collect();

    ValidatedAnalysis {
        scores: validate_scores(raw.updated_scores.as_ref(), local),
        archetypes,
        reasons,
        comment,
        careers,
        courses,
        keywords,
    }
}

/// Applies suggested scores that are numeric and inside [1, 5]. Anything else
/// leaves the local value in place.
fn validate_scores(suggested: Option<&Value>, local: &TraitScoreSet) -> TraitScoreSet {
    let mut scores = local.clone();
    let Some(Value::Object(map)) = suggested else {
        return scores;
    };

    for (name, value) in map {
        let Some(t) = Trait::from_name(name) else {
            warn!("Ignoring suggested score for unknown trait '{name}'");
            continue;
        };
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(v) if (f64::from(MIN_ANSWER)..=f64::from(MAX_ANSWER)).contains(&v) => {
                scores.set(t, round2(v));
            }
            _ => warn!(
                "Rejected suggested score {value} for {} (kept {})",
                t.as_str(),
                local.get(t)
            ),
        }
    }
    scores
}

/// Accepts either `[{"name", "reason"}]` or `["name"]`. Names outside the
/// catalog are dropped; the list is used only if enough valid names remain.
fn validate_archetypes(
    suggested: Option<&Value>,
    catalog: &Catalog,
) -> (Option<Vec<String>>, BTreeMap<String, String>) {
    let mut names: Vec<String> = Vec::new();
    let mut reasons = BTreeMap::new();

    let Some(Value::Array(items)) = suggested else {
        return (None, reasons);
    };

    for item in items {
        let (name, reason) = match item {
            Value::String(name) => (name.as_str(), None),
            Value::Object(obj) => match obj.get("name").and_then(Value::as_str) {
                Some(name) => (name, obj.get("reason").and_then(Value::as_str)),
                None => continue,
            },
            _ => continue,
        };
        if catalog.archetype(name).is_none() {
            warn!("Ignoring unknown archetype '{name}' from text analysis");
            continue;
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        if let Some(reason) = reason.map(str::trim).filter(|r| !r.is_empty()) {
            reasons.insert(name.to_string(), reason.to_string());
        }
    }

    if names.len() >= MATCH_SIZE {
        names.truncate(MATCH_SIZE);
        (Some(names), reasons)
    } else {
        (None, reasons)
    }
}

fn string_list(value: Option<&Value>) -> Option<Vec<String>> {
    let Value::Array(items) = value? else {
        return None;
    };
    let list: Vec<String> = items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(obj) => obj
                .get("title")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect();
    Some(list)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn local() -> TraitScoreSet {
        [
            (Trait::Openness, 3.5),
            (Trait::Conscientiousness, 4.0),
            (Trait::Extraversion, 2.5),
            (Trait::Agreeableness, 3.0),
            (Trait::Neuroticism, 2.0),
        ]
        .into_iter()
        .collect()
    }

    fn raw(value: Value) -> RawAnalysis {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_out_of_range_score_keeps_local_value() {
        let catalog = Catalog::builtin();
        let analysis = raw(json!({"updated_scores": {"Openness": 9, "Extraversion": 4.25}}));
        let validated = validate_analysis(&analysis, &local(), &catalog);
        assert_eq!(validated.scores.get(Trait::Openness), 3.5);
        assert_eq!(validated.scores.get(Trait::Extraversion), 4.25);
        assert_eq!(validated.scores.get(Trait::Conscientiousness), 4.0);
    }

    #[test]
    fn test_mistyped_and_unknown_scores_are_ignored() {
        let catalog = Catalog::builtin();
        let analysis = raw(json!({
            "updated_scores": {"Openness": "high", "Grit": 4, "neuroticism": "1.5", "Agreeableness": null}
        }));
        let validated = validate_analysis(&analysis, &local(), &catalog);
        assert_eq!(validated.scores.get(Trait::Openness), 3.5);
        assert_eq!(validated.scores.get(Trait::Neuroticism), 1.5);
        assert_eq!(validated.scores.get(Trait::Agreeableness), 3.0);
    }

    #[test]
    fn test_non_object_scores_keep_everything_local() {
        let catalog = Catalog::builtin();
        let analysis = raw(json!({"updated_scores": [1, 2, 3]}));
        assert_eq!(validate_analysis(&analysis, &local(), &catalog).scores, local());
    }

    #[test]
    fn test_archetypes_require_two_catalog_names() {
        let catalog = Catalog::builtin();
        let analysis = raw(json!({
            "top_coalitions": [
                {"name": "Social Leader", "reason": "Loves people."},
                {"name": "Imaginary Type", "reason": "n/a"}
            ]
        }));
        let validated = validate_analysis(&analysis, &local(), &catalog);
        assert_eq!(validated.archetypes, None);
        assert_eq!(
            validated.reasons.get("Social Leader").map(String::as_str),
            Some("Loves people.")
        );
        assert!(!validated.reasons.contains_key("Imaginary Type"));

        let analysis = raw(json!({
            "matched_archetypes": ["Team Player", {"name": "Dreamy Artist"}, "Adventure Seeker"]
        }));
        let validated = validate_analysis(&analysis, &local(), &catalog);
        assert_eq!(
            validated.archetypes,
            Some(vec!["Team Player".to_string(), "Dreamy Artist".to_string()])
        );
    }

    #[test]
    fn test_comment_and_list_thresholds() {
        let catalog = Catalog::builtin();
        let analysis = raw(json!({
            "personality_comment": "Too short",
            "career_recommendations": ["Pilot", "Chef"],
            "course_recommendations": ["A", "B", "C", "D", {"title": "E"}],
            "nlp_keywords": ["Travel", 3, "Music"]
        }));
        let validated = validate_analysis(&analysis, &local(), &catalog);
        assert_eq!(validated.comment, None);
        assert_eq!(validated.careers, None);
        assert_eq!(validated.courses.map(|c| c.len()), Some(5));
        assert_eq!(validated.keywords, vec!["travel", "music"]);
    }

    #[test]
    fn test_empty_response_changes_nothing() {
        let catalog = Catalog::builtin();
        let validated = validate_analysis(&RawAnalysis::default(), &local(), &catalog);
        assert_eq!(validated.scores, local());
        assert!(validated.archetypes.is_none());
        assert!(validated.comment.is_none());
        assert!(validated.keywords.is_empty());
        assert!(validated.is_empty(&local()));
    }

    #[test]
    fn test_all_invalid_fields_leave_analysis_empty() {
        let catalog = Catalog::builtin();
        let invalid = raw(json!({
            "updated_scores": {"Openness": 9},
            "narrative_comment": "short",
            "career_recommendations": ["one"],
            "matched_archetypes": ["Nobody"]
        }));
        assert!(validate_analysis(&invalid, &local(), &catalog).is_empty(&local()));

        let comment_only = raw(json!({"narrative_comment": "A steady and curious planner."}));
        assert!(!validate_analysis(&comment_only, &local(), &catalog).is_empty(&local()));
    }

    #[tokio::test]
    async fn test_disabled_analyzer_is_unavailable() {
        let result = DisabledAnalyzer.analyze("some text", &local()).await;
        assert!(matches!(result, Err(AnalysisError::Unavailable)));
    }

    #[test]
    fn test_prompt_lists_archetypes_and_scores() {
        let catalog = Catalog::builtin();
        let analyzer = LlmTextAnalyzer::new(LlmClient::new("test-key".to_string(), None), &catalog);
        let prompt = analyzer.build_prompt("I like painting", &local());
        assert!(prompt.contains("- Dreamy Artist"));
        assert!(prompt.contains("- Openness: 3.5"));
        assert!(prompt.contains("I like painting"));
        assert!(!prompt.contains("{free_text}"));
    }

    async fn mock_llm_reply(text: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": text}],
                "usage": {"input_tokens": 10, "output_tokens": 20}
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_llm_analyzer_returns_raw_fields() {
        let catalog = Catalog::builtin();
        let body = json!({
            "keywords": ["art"],
            "updated_scores": {"Openness": 4.5},
            "matched_archetypes": [{"name": "Dreamy Artist", "reason": "Paints."}]
        });
        let server = mock_llm_reply(&body.to_string()).await;
        let analyzer = LlmTextAnalyzer::new(
            LlmClient::new("test-key".to_string(), Some(server.uri())),
            &catalog,
        );
        let raw = analyzer.analyze("I paint every weekend", &local()).await.unwrap();
        assert_eq!(raw.keywords, Some(json!(["art"])));
        assert!(raw.narrative_comment.is_none());
    }

    #[tokio::test]
    async fn test_llm_analyzer_flags_non_json_as_malformed() {
        let catalog = Catalog::builtin();
        let server = mock_llm_reply("I'm not able to do that.").await;
        let analyzer = LlmTextAnalyzer::new(
            LlmClient::new("test-key".to_string(), Some(server.uri())),
            &catalog,
        );
        let result = analyzer.analyze("I paint every weekend", &local()).await;
        assert!(matches!(result, Err(AnalysisError::Malformed(_))));
    }
}
