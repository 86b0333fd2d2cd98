//! Trait Scorer — reduces raw questionnaire answers to five trait averages.
//!
//! Pure and deterministic: no I/O, no randomness.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::assessment::catalog::{Catalog, Trait, NEUTRAL_SCORE};

pub const MIN_ANSWER: u8 = 1;
pub const MAX_ANSWER: u8 = 5;

/// A single questionnaire response on the 1–5 scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    #[serde(alias = "answer_value", alias = "answer")]
    pub value: u8,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, value: u8) -> Self {
        Self {
            question_id: question_id.into(),
            value,
        }
    }
}

/// Trait → average score in [1, 5]. Always covers all five traits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitScoreSet(BTreeMap<Trait, f64>);

impl Default for TraitScoreSet {
    fn default() -> Self {
        Self(Trait::ALL.iter().map(|t| (*t, NEUTRAL_SCORE)).collect())
    }
}

impl FromIterator<(Trait, f64)> for TraitScoreSet {
    /// Traits missing from the iterator stay at the neutral midpoint.
    fn from_iter<I: IntoIterator<Item = (Trait, f64)>>(iter: I) -> Self {
        let mut set = TraitScoreSet::default();
        for (t, score) in iter {
            set.set(t, score);
        }
        set
    }
}

impl TraitScoreSet {
    pub fn get(&self, t: Trait) -> f64 {
        self.0.get(&t).copied().unwrap_or(NEUTRAL_SCORE)
    }

    pub fn set(&mut self, t: Trait, score: f64) {
        self.0.insert(t, score);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Trait, f64)> + '_ {
        self.0.iter().map(|(t, s)| (*t, *s))
    }

    /// Traits ordered by descending score; equal scores keep canonical order.
    pub fn ranked(&self) -> Vec<(Trait, f64)> {
        let mut ranked: Vec<(Trait, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn highest(&self) -> Trait {
        self.ranked()
            .first()
            .map(|(t, _)| *t)
            .unwrap_or(Trait::Openness)
    }

    /// Lowest-scoring trait; the first in canonical order wins ties.
    pub fn lowest(&self) -> Trait {
        let mut lowest = (Trait::Openness, f64::INFINITY);
        for (t, score) in self.iter() {
            if score < lowest.1 {
                lowest = (t, score);
            }
        }
        lowest.0
    }

    /// Names of the `n` highest-scoring traits.
    pub fn top_names(&self, n: usize) -> Vec<&'static str> {
        self.ranked()
            .into_iter()
            .take(n)
            .map(|(t, _)| t.as_str())
            .collect()
    }
}

/// Score contributed by one answer. Reverse-scored items are inverted (6 − v).
pub fn contributing_score(value: u8, reverse: bool) -> f64 {
    let value = value.clamp(MIN_ANSWER, MAX_ANSWER);
    if reverse {
        f64::from(MIN_ANSWER + MAX_ANSWER - value)
    } else {
        f64::from(value)
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Averages every answer per trait, inverting reverse-scored items first.
/// Answers to unknown or interest-only questions are ignored; a trait with no
/// contributing answers scores exactly `NEUTRAL_SCORE`.
pub fn score_traits(answers: &[Answer], catalog: &Catalog) -> TraitScoreSet {
    let mut buckets: BTreeMap<Trait, Vec<f64>> = BTreeMap::new();

    for answer in answers {
        let Some(question) = catalog.question(&answer.question_id) else {
            continue;
        };
        let Some(t) = question.trait_tag else {
            continue;
        };
        buckets
            .entry(t)
            .or_default()
            .push(contributing_score(answer.value, question.reverse));
    }

    Trait::ALL
        .iter()
        .map(|t| {
            let score = match buckets.get(t) {
                Some(values) if !values.is_empty() => {
                    round2(values.iter().sum::<f64>() / values.len() as f64)
                }
                _ => NEUTRAL_SCORE,
            };
            (*t, score)
        })
        .collect()
}
