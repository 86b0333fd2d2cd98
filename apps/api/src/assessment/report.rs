//! Report Assembler — composes scoring, matching and recommendations into the
//! caller-facing report.
//!
//! Flow: score_traits → (optional) text analysis → validate →
//!       match_archetypes → select_recommendations → insights.
//!
//! Text analysis is best-effort. Unavailable, failed, timed-out or malformed
//! analysis is logged and the report is built from local computation alone.

use std::collections::BTreeMap;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assessment::analysis::{
    validate_analysis, AnalysisError, RawAnalysis, TextAnalyzer, ValidatedAnalysis,
};
use crate::assessment::catalog::{Catalog, Course};
use crate::assessment::insights::{
    competency_insights, fallback_comment, greeting, improvement_areas, strengths,
    tactical_suggestions, SuggestionContext,
};
use crate::assessment::keywords::{categorize, extract_keywords, CategorizedKeyword};
use crate::assessment::matcher::match_archetypes;
use crate::assessment::recommendations::select_recommendations;
use crate::assessment::scorer::{score_traits, Answer, TraitScoreSet};
use crate::models::session::{CompetencyAnswer, Demographics};

/// Free text shorter than this is not worth sending for analysis.
pub const MIN_ANALYSIS_TEXT_CHARS: usize = 10;
/// Careers and courses shown in a report.
pub const MAX_REPORT_ITEMS: usize = 5;

/// The final composed result returned to callers and cached per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub greeting: String,
    pub personality_type: String,
    pub trait_scores: TraitScoreSet,
    pub matched_archetypes: Vec<String>,
    pub narrative_comment: String,
    pub careers: Vec<String>,
    pub courses: Vec<Course>,
    pub improvement_areas: Vec<String>,
    pub strengths: Vec<String>,
    pub tactical_suggestions: Vec<String>,
    pub keywords: Vec<CategorizedKeyword>,
    pub competency_insights: Vec<String>,
    pub used_text_analysis: bool,
}

/// Everything the assembler reads from a session.
pub struct ReportInput<'a> {
    pub answers: &'a [Answer],
    pub demographics: &'a Demographics,
    pub competency_answers: &'a [CompetencyAnswer],
    pub top_archetype: Option<&'a str>,
}

impl ReportInput<'_> {
    pub fn participant_text(&self) -> String {
        participant_text(Some(self.demographics), self.competency_answers)
    }

    /// Text sent for analysis: demographics free text plus competency Q&A.
    pub fn analysis_text(&self, catalog: &Catalog) -> String {
        let mut text = self.demographics.free_text();
        if self.competency_answers.is_empty() {
            return text;
        }
        text.push_str("Competency questions and answers:\n");
        for answer in self.competency_answers {
            let question = catalog
                .competency_question(&answer.question_id)
                .map(|q| q.text.as_str())
                .unwrap_or(answer.question_id.as_str());
            let reply = match (&answer.answer_text, answer.value) {
                (Some(t), _) if !t.trim().is_empty() => t.trim().to_string(),
                (_, Some(v)) => format!("{v}/5"),
                _ => continue,
            };
            text.push_str(&format!("Q: {question}\nA: {reply}\n"));
        }
        text
    }
}

/// Text written by the participant: interests, open-ended answers and
/// free-text competency answers, one per line.
pub fn participant_text(
    demographics: Option<&Demographics>,
    competency_answers: &[CompetencyAnswer],
) -> String {
    let demographic_fields = demographics.into_iter().flat_map(|d| {
        [
            d.interests.as_str(),
            d.open_ended_1.as_str(),
            d.open_ended_2.as_str(),
        ]
    });
    demographic_fields
        .chain(competency_answers.iter().filter_map(|a| a.answer_text.as_deref()))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct ReportAssembler<'a> {
    catalog: &'a Catalog,
    analyzer: &'a dyn TextAnalyzer,
    timeout: Duration,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(catalog: &'a Catalog, analyzer: &'a dyn TextAnalyzer, timeout: Duration) -> Self {
        Self {
            catalog,
            analyzer,
            timeout,
        }
    }

    pub async fn assemble<R: Rng + Send>(&self, input: &ReportInput<'_>, rng: &mut R) -> Report {
        let catalog = self.catalog;
        let local_scores = score_traits(input.answers, catalog);
        info!("Local trait scores: {:?}", local_scores);

        let participant_text = input.participant_text();
        let analysis = if participant_text.chars().count() < MIN_ANALYSIS_TEXT_CHARS {
            info!("Free text too short, skipping text analysis");
            None
        } else {
            self.run_analysis(&input.analysis_text(catalog), &local_scores)
                .await
        };
        let analysis = analysis
            .map(|raw| validate_analysis(&raw, &local_scores, catalog));
        let used_text_analysis = match &analysis {
            Some(validated) if validated.is_empty(&local_scores) => {
                info!("Text analysis kept no valid fields, using local results");
                false
            }
            Some(_) => true,
            None => false,
        };
        let analysis = analysis.unwrap_or_else(|| ValidatedAnalysis {
            scores: local_scores.clone(),
            ..ValidatedAnalysis::default()
        });

        let scores = analysis.scores.clone();
        let keywords = if analysis.keywords.is_empty() {
            extract_keywords(&participant_text, catalog)
        } else {
            analysis.keywords.clone()
        };

        let matched = match &analysis.archetypes {
            Some(names) => {
                info!("Using archetypes suggested by text analysis: {:?}", names);
                names.clone()
            }
            None => {
                let result = match_archetypes(&scores, catalog, &keywords, rng);
                info!("Matched archetypes locally: {:?}", result.matched);
                result.matched
            }
        };
        let reasons: BTreeMap<String, String> = if analysis.archetypes.is_some() {
            analysis.reasons.clone()
        } else {
            BTreeMap::new()
        };

        let demographics = input.demographics;
        let first_name = demographics.first_name();
        let local_recs =
            select_recommendations(&matched, catalog, &demographics.interests, rng);

        let mut careers = match analysis.careers.clone() {
            Some(careers) => {
                debug!("Using careers suggested by text analysis");
                careers
            }
            None => local_recs.careers,
        };
        careers.truncate(MAX_REPORT_ITEMS);

        let mut courses = match analysis.courses.clone() {
            Some(titles) => {
                debug!("Using courses suggested by text analysis");
                titles.into_iter().map(Course::from_title).collect()
            }
            None => local_recs.courses,
        };
        courses.truncate(MAX_REPORT_ITEMS);

        let narrative_comment = analysis
            .comment
            .clone()
            .unwrap_or_else(|| fallback_comment(first_name, &scores));

        let tactical = tactical_suggestions(&SuggestionContext {
            first_name,
            scores: &scores,
            matched: &matched,
            keywords: &keywords,
            courses: &courses,
            demographics,
        });

        let insight_archetype = input
            .top_archetype
            .or_else(|| matched.first().map(String::as_str));

        Report {
            greeting: greeting(first_name),
            personality_type: matched.join(" & "),
            improvement_areas: improvement_areas(&scores),
            strengths: strengths(&matched, &reasons, catalog),
            tactical_suggestions: tactical,
            keywords: categorize(&keywords),
            competency_insights: competency_insights(input.competency_answers, insight_archetype),
            trait_scores: scores,
            matched_archetypes: matched,
            narrative_comment,
            careers,
            courses,
            used_text_analysis,
        }
    }

    /// Calls the analyzer under the configured timeout. Every failure mode
    /// resolves to `None`.
    async fn run_analysis(&self, text: &str, scores: &TraitScoreSet) -> Option<RawAnalysis> {
        let outcome = match tokio::time::timeout(self.timeout, self.analyzer.analyze(text, scores))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(AnalysisError::Timeout(self.timeout.as_secs())),
        };

        match outcome {
            Ok(raw) => {
                info!("Text analysis succeeded");
                Some(raw)
            }
            Err(AnalysisError::Unavailable) => {
                debug!("Text analysis not configured, using local computation");
                None
            }
            Err(e) => {
                warn!("Text analysis failed, falling back to local computation: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    use super::*;
    use crate::assessment::analysis::DisabledAnalyzer;
    use crate::assessment::catalog::Trait;
    use crate::test_support::{sample_demographics, ScriptedAnalyzer};

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn social_answers() -> Vec<Answer> {
        // High extraversion, agreeableness and conscientiousness.
        ["P3", "P4", "P13", "P9", "P10", "P15", "P20", "P1", "P11", "P17", "P19"]
            .iter()
            .map(|id| Answer::new(*id, 5))
            .chain([Answer::new("P16", 1), Answer::new("P2", 2)])
            .collect()
    }

    async fn assemble_with(analyzer: &dyn TextAnalyzer, answers: &[Answer]) -> Report {
        let catalog = Catalog::builtin();
        let demographics = sample_demographics();
        let input = ReportInput {
            answers,
            demographics: &demographics,
            competency_answers: &[],
            top_archetype: None,
        };
        let mut rng = StdRng::seed_from_u64(17);
        ReportAssembler::new(&catalog, analyzer, TIMEOUT)
            .assemble(&input, &mut rng)
            .await
    }

    #[tokio::test]
    async fn test_local_report_without_analysis() {
        let report = assemble_with(&DisabledAnalyzer, &social_answers()).await;

        assert!(!report.used_text_analysis);
        assert_eq!(report.matched_archetypes.len(), 2);
        assert_eq!(report.matched_archetypes[0], "Social Leader");
        assert_eq!(
            report.personality_type,
            report.matched_archetypes.join(" & ")
        );
        assert!(report.narrative_comment.contains("Extraversion"));
        assert_eq!(report.courses.len(), MAX_REPORT_ITEMS);
        assert!(report.careers.len() <= MAX_REPORT_ITEMS);
        assert_eq!(report.improvement_areas.len(), 1);
        assert!(report.greeting.starts_with("Hi Ada"));
    }

    #[tokio::test]
    async fn test_valid_analysis_overrides_local_values() {
        let analyzer = ScriptedAnalyzer::replying(json!({
            "keywords": ["art", "music"],
            "updated_scores": {"Openness": 4.8, "Neuroticism": 9},
            "matched_archetypes": [
                {"name": "Dreamy Artist", "reason": "Paints every weekend."},
                {"name": "Innovative Explorer", "reason": "Always tinkering with ideas."}
            ],
            "narrative_comment": "You are a thoughtful, creative person who loves the arts.",
            "career_recommendations": ["Illustrator", "Composer", "Set Designer"],
            "course_recommendations": ["Drawing", "Harmony", "Color Theory", "Sculpture", "Film"]
        }));
        let report = assemble_with(&analyzer, &social_answers()).await;

        assert!(report.used_text_analysis);
        assert_eq!(report.trait_scores.get(Trait::Openness), 4.8);
        // Out-of-range suggestion rejected; local value kept.
        let local = score_traits(&social_answers(), &Catalog::builtin());
        assert_eq!(
            report.trait_scores.get(Trait::Neuroticism),
            local.get(Trait::Neuroticism)
        );
        assert_eq!(
            report.matched_archetypes,
            vec!["Dreamy Artist", "Innovative Explorer"]
        );
        assert_eq!(report.strengths[0], "Paints every weekend.");
        assert_eq!(report.careers, vec!["Illustrator", "Composer", "Set Designer"]);
        assert_eq!(report.courses[0].title, "Drawing");
        assert!(report.narrative_comment.starts_with("You are a thoughtful"));
        assert_eq!(analyzer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_analysis_falls_back_to_local_report() {
        let local = assemble_with(&DisabledAnalyzer, &social_answers()).await;
        let failing = ScriptedAnalyzer::failing();
        let report = assemble_with(&failing, &social_answers()).await;

        assert_eq!(failing.call_count(), 1);
        assert!(!report.used_text_analysis);
        assert_eq!(report, local);
    }

    #[tokio::test]
    async fn test_analysis_without_valid_fields_is_not_reported_as_used() {
        let local = assemble_with(&DisabledAnalyzer, &social_answers()).await;
        for response in [
            json!({}),
            json!({"updated_scores": {"Openness": 9}, "narrative_comment": "short"}),
        ] {
            let analyzer = ScriptedAnalyzer::replying(response);
            let report = assemble_with(&analyzer, &social_answers()).await;
            assert_eq!(analyzer.call_count(), 1);
            assert!(!report.used_text_analysis);
            assert_eq!(report, local);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_analysis_times_out() {
        let slow = ScriptedAnalyzer::replying(json!({"narrative_comment": "never delivered in time at all"}))
            .with_delay(Duration::from_secs(60));
        let report = assemble_with(&slow, &social_answers()).await;
        assert!(!report.used_text_analysis);
        assert!(report.narrative_comment.starts_with("Hi Ada"));
    }

    #[tokio::test]
    async fn test_short_text_skips_analysis() {
        let catalog = Catalog::builtin();
        let mut demographics = sample_demographics();
        demographics.interests = "art".to_string();
        demographics.open_ended_1.clear();
        demographics.open_ended_2.clear();
        let analyzer = ScriptedAnalyzer::replying(json!({}));
        let input = ReportInput {
            answers: &[],
            demographics: &demographics,
            competency_answers: &[],
            top_archetype: None,
        };
        let mut rng = StdRng::seed_from_u64(1);
        let report = ReportAssembler::new(&catalog, &analyzer, TIMEOUT)
            .assemble(&input, &mut rng)
            .await;
        assert_eq!(analyzer.call_count(), 0);
        assert!(!report.used_text_analysis);
    }

    #[test]
    fn test_analysis_text_includes_competency_answers() {
        let catalog = Catalog::builtin();
        let demographics = sample_demographics();
        let competency = vec![
            CompetencyAnswer {
                question_id: "SL1".to_string(),
                value: Some(4),
                answer_text: None,
            },
            CompetencyAnswer {
                question_id: "SL3".to_string(),
                value: None,
                answer_text: Some("I negotiate club budgets".to_string()),
            },
        ];
        let input = ReportInput {
            answers: &[],
            demographics: &demographics,
            competency_answers: &competency,
            top_archetype: Some("Social Leader"),
        };
        let text = input.analysis_text(&catalog);
        assert!(text.contains("Q: At what level are your leadership skills"));
        assert!(text.contains("A: 4/5"));
        assert!(text.contains("A: I negotiate club budgets"));
        assert!(input.participant_text().contains("I negotiate club budgets"));
        assert!(!input.participant_text().contains("leadership skills"));
    }
}
