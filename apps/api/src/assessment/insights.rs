//! Rule-based narrative pieces of the report: improvement areas, strengths,
//! tactical suggestions, competency insights and the fallback comment.

use std::collections::BTreeMap;

use crate::assessment::catalog::{Catalog, Course, Trait};
use crate::assessment::scorer::TraitScoreSet;
use crate::models::session::{CompetencyAnswer, Demographics};

pub const MAX_TACTICAL_SUGGESTIONS: usize = 5;
pub const MAX_COMPETENCY_INSIGHTS: usize = 2;

const LEADERSHIP_KEYWORDS: &[&str] = &["leadership", "management", "entrepreneurship", "persuasion"];
const DEGREE_MARKERS: &[&str] = &["bachelor", "master", "university", "degree", "phd"];
const CODING_MARKERS: &[&str] = &["software", "coding", "programming"];

/// Generic comment used when no text analysis is available.
pub fn fallback_comment(first_name: &str, scores: &TraitScoreSet) -> String {
    format!(
        "Hi {first_name}, we analyzed your answers and identified your personality traits. \
         According to your test, your most prominent traits are: {}.",
        scores.top_names(2).join(", ")
    )
}

pub fn greeting(first_name: &str) -> String {
    format!("Hi {first_name}, your personality report is ready!")
}

/// Advice targeting the lowest-scoring trait.
pub fn improvement_areas(scores: &TraitScoreSet) -> Vec<String> {
    let advice = match scores.lowest() {
        Trait::Openness => {
            "Try activities outside your comfort zone to become more open to new experiences and ideas."
        }
        Trait::Conscientiousness => {
            "Make daily planning a habit and set small goals to build a more disciplined approach."
        }
        Trait::Extraversion => {
            "Join group activities around topics you care about to be more active in social settings."
        }
        Trait::Agreeableness => {
            "Practise active listening techniques to better understand other people's perspectives."
        }
        Trait::Neuroticism => {
            "Stress management techniques and regular meditation can help balance emotional swings."
        }
    };
    vec![advice.to_string()]
}

/// One entry per matched archetype: the analysis reason when one was given,
/// otherwise the archetype description. Duplicates are dropped.
pub fn strengths(
    matched: &[String],
    reasons: &BTreeMap<String, String>,
    catalog: &Catalog,
) -> Vec<String> {
    let mut strengths: Vec<String> = Vec::new();
    for name in matched {
        let text = reasons
            .get(name)
            .cloned()
            .or_else(|| catalog.archetype(name).map(|a| a.description.clone()));
        if let Some(text) = text {
            if !strengths.contains(&text) {
                strengths.push(text);
            }
        }
    }
    strengths
}

pub struct SuggestionContext<'a> {
    pub first_name: &'a str,
    pub scores: &'a TraitScoreSet,
    pub matched: &'a [String],
    pub keywords: &'a [String],
    pub courses: &'a [Course],
    pub demographics: &'a Demographics,
}

pub fn tactical_suggestions(ctx: &SuggestionContext<'_>) -> Vec<String> {
    let interests = ctx.demographics.interests.to_lowercase();
    let education = ctx.demographics.education.to_lowercase();
    let scores = ctx.scores;

    let mut suggestions = vec![
        format!(
            "{}, joining communities and events in your field can support your career goals.",
            ctx.first_name
        ),
        "Draw inspiration from different fields to boost your creativity.".to_string(),
    ];
    if let Some(course) = ctx.courses.first() {
        suggestions.push(format!(
            "For your personal growth, consider the recommended {} course.",
            course.title
        ));
    }

    if scores.get(Trait::Extraversion) < 3.0
        && ctx
            .keywords
            .iter()
            .any(|k| LEADERSHIP_KEYWORDS.contains(&k.as_str()))
    {
        suggestions.push(
            "To balance leadership goals with an introverted nature, start by taking on responsibility in small groups."
                .to_string(),
        );
    }
    if scores.get(Trait::Openness) > 4.0 && interests.contains("creativ") {
        suggestions.push(
            "With your high openness, creative projects that combine different disciplines can be very rewarding."
                .to_string(),
        );
    }
    if scores.get(Trait::Neuroticism) > 3.5 {
        suggestions.push(
            "Daily meditation and mindfulness exercises can strengthen your stress management."
                .to_string(),
        );
    }
    if ctx.matched.iter().any(|m| m == "Methodical Expert")
        || scores.get(Trait::Conscientiousness) > 4.0
    {
        suggestions.push(
            "Your planning and organization skills are strong; apply them systematically to your projects and career goals."
                .to_string(),
        );
    }
    if DEGREE_MARKERS.iter().any(|m| education.contains(m)) {
        suggestions.push(
            "Internships or volunteer work in sectors related to your studies can ease your career transition."
                .to_string(),
        );
    }
    if CODING_MARKERS.iter().any(|m| interests.contains(m)) {
        suggestions.push(
            "A portfolio or public code profile that shows your technical skills gives you an edge in job hunting."
                .to_string(),
        );
    }

    suggestions.truncate(MAX_TACTICAL_SUGGESTIONS);
    suggestions
}

/// Short observations derived from the competency answers of `archetype`.
pub fn competency_insights(answers: &[CompetencyAnswer], archetype: Option<&str>) -> Vec<String> {
    let Some(archetype) = archetype else {
        return Vec::new();
    };
    if answers.is_empty() {
        return Vec::new();
    }

    let mut insights: Vec<String> = answers
        .iter()
        .filter(|a| a.answer_text.as_deref().map(str::trim).unwrap_or("").len() > 10)
        .map(|_| {
            format!("Based on your competency answer, you show an approach that suits the {archetype} type.")
        })
        .collect();

    let strong = answers
        .iter()
        .filter(|a| a.value.is_some_and(|v| v >= 4))
        .count();
    if strong > 0 {
        insights.push(format!(
            "You rated yourself highly on {strong} competency area(s) associated with the {archetype} type."
        ));
    }

    if insights.is_empty() {
        insights.push(format!(
            "Your answers to the {archetype} competency questions strengthen your profile."
        ));
    }
    insights.truncate(MAX_COMPETENCY_INSIGHTS);
    insights
}
