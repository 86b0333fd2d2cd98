use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::assessment::report::Report;
use crate::assessment::scorer::Answer;
use crate::errors::AppError;

/// Youngest accepted participant, in years.
const MIN_AGE_YEARS: i32 = 15;
/// Oldest accepted birth year offset, in years.
const MAX_AGE_YEARS: i32 = 100;

/// Demographic and free-text data submitted after the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub full_name: String,
    pub birth_year: i32,
    pub email: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub university_major: String,
    #[serde(default)]
    pub interests: String,
    /// Goals, in the participant's own words.
    #[serde(default)]
    pub open_ended_1: String,
    #[serde(default)]
    pub open_ended_2: String,
}

impl Demographics {
    pub fn validate(&self, current_year: i32) -> Result<(), AppError> {
        if self.birth_year < current_year - MAX_AGE_YEARS
            || self.birth_year > current_year - MIN_AGE_YEARS
        {
            return Err(AppError::Validation(format!(
                "birth_year must be within the last {MAX_AGE_YEARS} years and at least {MIN_AGE_YEARS} years ago"
            )));
        }
        if !is_valid_email(&self.email) {
            return Err(AppError::Validation(format!(
                "'{}' is not a valid email address",
                self.email
            )));
        }
        Ok(())
    }

    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("there")
    }

    /// Free text that feeds keyword extraction and text analysis.
    pub fn free_text(&self) -> String {
        let mut text = String::new();
        for (label, value) in [
            ("Interests", &self.interests),
            ("Goals", &self.open_ended_1),
            ("Open answer", &self.open_ended_2),
        ] {
            if !value.trim().is_empty() {
                text.push_str(&format!("{label}: {}\n\n", value.trim()));
            }
        }
        text
    }
}

fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && tld.len() >= 2 && !host.starts_with('.') && !host.ends_with('.')
        }
        None => false,
    }
}

/// Answer to an archetype competency question: a 1–5 rating, free text, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetencyAnswer {
    pub question_id: String,
    #[serde(default, alias = "answer_value")]
    pub value: Option<u8>,
    #[serde(default)]
    pub answer_text: Option<String>,
}

/// One participant's run through the test, keyed by session id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSession {
    pub id: Uuid,
    /// Append-only answer log; the latest answer per question is effective.
    pub answers: Vec<Answer>,
    pub demographics: Option<Demographics>,
    pub competency_answers: Vec<CompetencyAnswer>,
    /// Preliminary best archetype; drives competency questions and cache invalidation.
    pub top_archetype: Option<String>,
    pub report: Option<Report>,
    /// Bumped by the store on every successful write; stale writes are rejected.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TestSession {
    pub fn new(answers: Vec<Answer>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            answers,
            demographics: None,
            competency_answers: Vec::new(),
            top_archetype: None,
            report: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Latest answer per question, in order of each question's first appearance.
    pub fn effective_answers(&self) -> Vec<Answer> {
        let mut effective: Vec<Answer> = Vec::new();
        for answer in &self.answers {
            match effective
                .iter_mut()
                .find(|a| a.question_id == answer.question_id)
            {
                Some(existing) => existing.value = answer.value,
                None => effective.push(answer.clone()),
            }
        }
        effective
    }

    /// Completion is derived from the presence of a computed report.
    pub fn is_complete(&self) -> bool {
        self.report.is_some()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

pub fn current_year() -> i32 {
    Utc::now().year()
}

#[derive(Debug, FromRow)]
pub struct TestSessionRow {
    pub id: Uuid,
    pub answers: Json<Vec<Answer>>,
    pub demographics: Option<Json<Demographics>>,
    pub competency_answers: Json<Vec<CompetencyAnswer>>,
    pub top_archetype: Option<String>,
    pub report: Option<Json<Report>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TestSessionRow> for TestSession {
    fn from(row: TestSessionRow) -> Self {
        Self {
            id: row.id,
            answers: row.answers.0,
            demographics: row.demographics.map(|d| d.0),
            competency_answers: row.competency_answers.0,
            top_archetype: row.top_archetype,
            report: row.report.map(|r| r.0),
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
