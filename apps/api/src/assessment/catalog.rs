//! Question and archetype catalog, loaded once at startup and never mutated.
//!
//! The catalog is plain owned data so alternative catalogs (tests, localized
//! variants) can be constructed without touching the scoring code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assessment::catalog_data;

/// Questions shown per questionnaire page.
pub const QUESTIONS_PER_PAGE: usize = 5;

/// Neutral midpoint used for missing answers and missing profile entries.
pub const NEUTRAL_SCORE: f64 = 3.0;

/// One of the five personality dimensions, each scored on a 1–5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Trait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl Trait {
    /// All traits in canonical order. Ties between traits resolve in this order.
    pub const ALL: [Trait; 5] = [
        Trait::Openness,
        Trait::Conscientiousness,
        Trait::Extraversion,
        Trait::Agreeableness,
        Trait::Neuroticism,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Trait::Openness => "Openness",
            Trait::Conscientiousness => "Conscientiousness",
            Trait::Extraversion => "Extraversion",
            Trait::Agreeableness => "Agreeableness",
            Trait::Neuroticism => "Neuroticism",
        }
    }

    /// Case-insensitive lookup by trait name.
    pub fn from_name(name: &str) -> Option<Trait> {
        Trait::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

/// A questionnaire item. Personality items carry a trait tag; interest items
/// carry a category and never contribute to trait scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    #[serde(rename = "trait", skip_serializing_if = "Option::is_none")]
    pub trait_tag: Option<Trait>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub reverse: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    pub description: String,
}

impl Course {
    /// Builds a course entry with the generic description used for every
    /// recommendation that has no curated text.
    pub fn from_title(title: impl Into<String>) -> Self {
        let title = title.into();
        let description = format!(
            "This course builds your skills in '{title}' and helps you move toward your goals."
        );
        Self { title, description }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyQuestion {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A predefined personality profile ("coalition").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Archetype {
    pub name: String,
    pub description: String,
    /// Ideal trait values. Traits absent here are treated as `NEUTRAL_SCORE`.
    pub profile: BTreeMap<Trait, f64>,
    pub careers: Vec<String>,
    pub courses: Vec<Course>,
    pub keywords: Vec<String>,
    pub competency_questions: Vec<CompetencyQuestion>,
}

impl Archetype {
    pub fn ideal(&self, t: Trait) -> f64 {
        self.profile.get(&t).copied().unwrap_or(NEUTRAL_SCORE)
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    pub questions: Vec<Question>,
    /// Insertion order is significant: it breaks ranking ties.
    pub archetypes: Vec<Archetype>,
    /// Archetype to fall back on when matching cannot produce two results.
    pub trait_fallbacks: BTreeMap<Trait, String>,
}

impl Catalog {
    pub fn new(
        questions: Vec<Question>,
        archetypes: Vec<Archetype>,
        trait_fallbacks: BTreeMap<Trait, String>,
    ) -> Self {
        Self {
            questions,
            archetypes,
            trait_fallbacks,
        }
    }

    /// The built-in catalog: 20 personality and 15 interest questions,
    /// 10 archetypes with 5 competency questions each.
    pub fn builtin() -> Self {
        catalog_data::build()
    }

    pub fn page_count(&self) -> usize {
        self.questions.len().div_ceil(QUESTIONS_PER_PAGE)
    }

    /// Returns the questions of a 1-based page, or `None` when out of range.
    pub fn page(&self, page: usize) -> Option<&[Question]> {
        if page == 0 || page > self.page_count() {
            return None;
        }
        let start = (page - 1) * QUESTIONS_PER_PAGE;
        let end = (start + QUESTIONS_PER_PAGE).min(self.questions.len());
        Some(&self.questions[start..end])
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn archetype(&self, name: &str) -> Option<&Archetype> {
        self.archetypes.iter().find(|a| a.name == name)
    }

    pub fn fallback_for(&self, t: Trait) -> Option<&Archetype> {
        self.trait_fallbacks
            .get(&t)
            .and_then(|name| self.archetype(name))
    }

    /// Looks up a competency question across every archetype.
    pub fn competency_question(&self, id: &str) -> Option<&CompetencyQuestion> {
        self.archetypes
            .iter()
            .flat_map(|a| a.competency_questions.iter())
            .find(|q| q.id == id)
    }
}
