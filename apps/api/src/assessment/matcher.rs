//! Coalition Matcher — ranks archetypes by closeness to a user's trait scores.
//!
//! similarity = (5 − √d) × 2, floored at 0, where d is the Euclidean distance
//! between the user's scores and the archetype's ideal profile. Each matching
//! keyword adds `KEYWORD_BONUS` before flooring.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::assessment::catalog::{Catalog, Trait};
use crate::assessment::scorer::{round2, TraitScoreSet};

/// Number of archetypes in a full match.
pub const MATCH_SIZE: usize = 2;

pub const KEYWORD_BONUS: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeScore {
    pub name: String,
    pub distance: f64,
    pub keyword_matches: usize,
    pub score: f64,
}

impl ArchetypeScore {
    fn is_viable(&self) -> bool {
        self.score.is_finite() && self.score > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Every archetype, best first.
    pub ranked: Vec<ArchetypeScore>,
    /// Selected archetype names (1–2, fewer only when the catalog is smaller).
    pub matched: Vec<String>,
    pub used_fallback: bool,
}

/// Euclidean distance between the user's scores and an ideal profile.
pub fn profile_distance(scores: &TraitScoreSet, ideal: impl Fn(Trait) -> f64) -> f64 {
    Trait::ALL
        .iter()
        .map(|t| (scores.get(*t) - ideal(*t)).powi(2))
        .sum::<f64>()
        .sqrt()
}

pub fn similarity(distance: f64) -> f64 {
    (5.0 - distance.sqrt()) * 2.0
}

/// Scores every archetype and sorts best first. The sort is stable, so equal
/// scores keep catalog insertion order.
pub fn rank_archetypes(
    scores: &TraitScoreSet,
    catalog: &Catalog,
    keywords: &[String],
) -> Vec<ArchetypeScore> {
    let keywords: HashSet<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

    let mut ranked: Vec<ArchetypeScore> = catalog
        .archetypes
        .iter()
        .map(|archetype| {
            let distance = profile_distance(scores, |t| archetype.ideal(t));
            let keyword_matches = archetype
                .keywords
                .iter()
                .filter(|k| keywords.contains(&k.to_lowercase()))
                .count();
            let raw = similarity(distance) + KEYWORD_BONUS * keyword_matches as f64;
            let score = if raw.is_finite() {
                round2(raw.max(0.0))
            } else {
                raw
            };
            debug!(
                "Archetype '{}' distance={:.3} keyword_matches={} score={}",
                archetype.name, distance, keyword_matches, score
            );
            ArchetypeScore {
                name: archetype.name.clone(),
                distance,
                keyword_matches,
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Selects the best archetypes for the given scores.
///
/// Fallback when fewer than two viable archetypes exist: the archetype tied to
/// the user's highest trait, then random remaining archetypes.
pub fn match_archetypes<R: Rng + ?Sized>(
    scores: &TraitScoreSet,
    catalog: &Catalog,
    keywords: &[String],
    rng: &mut R,
) -> MatchResult {
    let ranked = rank_archetypes(scores, catalog, keywords);

    let mut matched: Vec<String> = ranked
        .iter()
        .filter(|s| s.is_viable())
        .take(MATCH_SIZE)
        .map(|s| s.name.clone())
        .collect();

    let used_fallback = matched.len() < MATCH_SIZE;
    if used_fallback {
        warn!(
            "Only {} viable archetype(s) found, applying fallback selection",
            matched.len()
        );
        fill_with_fallback(&mut matched, scores, catalog, rng);
    }

    MatchResult {
        ranked,
        matched,
        used_fallback,
    }
}

fn fill_with_fallback<R: Rng + ?Sized>(
    matched: &mut Vec<String>,
    scores: &TraitScoreSet,
    catalog: &Catalog,
    rng: &mut R,
) {
    if let Some(archetype) = catalog.fallback_for(scores.highest()) {
        if !matched.contains(&archetype.name) {
            matched.push(archetype.name.clone());
        }
    }

    let mut remaining: Vec<&str> = catalog
        .archetypes
        .iter()
        .map(|a| a.name.as_str())
        .filter(|name| !matched.iter().any(|m| m == name))
        .collect();
    remaining.shuffle(rng);

    for name in remaining {
        if matched.len() >= MATCH_SIZE {
            break;
        }
        matched.push(name.to_string());
    }
}

/// Deterministic single best archetype, used to pick competency questions and
/// to detect when cached reports go stale.
pub fn top_archetype(scores: &TraitScoreSet, catalog: &Catalog, keywords: &[String]) -> Option<String> {
    rank_archetypes(scores, catalog, keywords)
        .into_iter()
        .find(|s| s.is_viable())
        .map(|s| s.name)
        .or_else(|| catalog.fallback_for(scores.highest()).map(|a| a.name.clone()))
        .or_else(|| catalog.archetypes.first().map(|a| a.name.clone()))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::assessment::catalog::Archetype;

    fn archetype(name: &str, profile: &[(Trait, f64)]) -> Archetype {
        Archetype {
            name: name.to_string(),
            description: format!("{name} description"),
            profile: profile.iter().copied().collect(),
            careers: vec![],
            courses: vec![],
            keywords: vec![],
            competency_questions: vec![],
        }
    }

    fn catalog_of(archetypes: Vec<Archetype>, fallbacks: &[(Trait, &str)]) -> Catalog {
        Catalog::new(
            vec![],
            archetypes,
            fallbacks
                .iter()
                .map(|(t, n)| (*t, n.to_string()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_similarity_example() {
        let scores = TraitScoreSet::default();
        let planner = archetype("Planner", &[(Trait::Conscientiousness, 5.0)]);
        let distance = profile_distance(&scores, |t| planner.ideal(t));
        assert!((distance - 2.0).abs() < 1e-9);
        let ranked = rank_archetypes(&scores, &catalog_of(vec![planner], &[]), &[]);
        assert_eq!(ranked[0].score, 7.17);
    }

    #[test]
    fn test_perfect_profile_scores_ten() {
        let scores: TraitScoreSet = [(Trait::Openness, 5.0)].into_iter().collect();
        let catalog = catalog_of(vec![archetype("Explorer", &[(Trait::Openness, 5.0)])], &[]);
        assert_eq!(rank_archetypes(&scores, &catalog, &[])[0].score, 10.0);
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let catalog = Catalog::builtin();
        let scores: TraitScoreSet = [
            (Trait::Openness, 4.2),
            (Trait::Conscientiousness, 2.5),
            (Trait::Extraversion, 4.67),
            (Trait::Agreeableness, 3.1),
            (Trait::Neuroticism, 2.0),
        ]
        .into_iter()
        .collect();

        let first = rank_archetypes(&scores, &catalog, &[]);
        for _ in 0..10 {
            assert_eq!(rank_archetypes(&scores, &catalog, &[]), first);
        }
        let mut rng = StdRng::seed_from_u64(1);
        let a = match_archetypes(&scores, &catalog, &[], &mut rng);
        let b = match_archetypes(&scores, &catalog, &[], &mut rng);
        assert_eq!(a.matched, b.matched);
        assert!(!a.used_fallback);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = catalog_of(
            vec![
                archetype("First", &[(Trait::Openness, 4.0)]),
                archetype("Second", &[(Trait::Openness, 2.0)]),
                archetype("Third", &[(Trait::Openness, 4.0)]),
            ],
            &[],
        );
        let mut rng = StdRng::seed_from_u64(7);
        let result = match_archetypes(&TraitScoreSet::default(), &catalog, &[], &mut rng);
        assert_eq!(result.matched, vec!["First", "Second"]);
    }

    #[test]
    fn test_keyword_bonus_changes_ranking() {
        let mut explorer = archetype("Explorer", &[(Trait::Openness, 5.0)]);
        explorer.keywords = vec!["travel".to_string()];
        let planner = archetype("Planner", &[(Trait::Conscientiousness, 4.0)]);
        let catalog = catalog_of(vec![planner, explorer], &[]);

        let scores = TraitScoreSet::default();
        assert_eq!(rank_archetypes(&scores, &catalog, &[])[0].name, "Planner");

        let ranked = rank_archetypes(&scores, &catalog, &["Travel".to_string()]);
        assert_eq!(ranked[0].name, "Explorer");
        assert_eq!(ranked[0].keyword_matches, 1);
    }

    #[test]
    fn test_single_archetype_catalog_matches_one() {
        let catalog = catalog_of(
            vec![archetype("Only", &[])],
            &[(Trait::Openness, "Only")],
        );
        let mut rng = StdRng::seed_from_u64(3);
        let result = match_archetypes(&TraitScoreSet::default(), &catalog, &[], &mut rng);
        assert_eq!(result.matched, vec!["Only"]);
        assert!(result.used_fallback);
    }

    #[test]
    fn test_degenerate_scores_use_trait_fallback_then_random() {
        // Ideal profiles far outside the scale floor every similarity to zero.
        let catalog = catalog_of(
            vec![
                archetype("A", &[(Trait::Openness, 100.0)]),
                archetype("B", &[(Trait::Openness, 100.0)]),
                archetype("C", &[(Trait::Openness, 100.0)]),
            ],
            &[(Trait::Conscientiousness, "B")],
        );
        let scores: TraitScoreSet = [(Trait::Conscientiousness, 4.5)].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(42);
        let result = match_archetypes(&scores, &catalog, &[], &mut rng);

        assert!(result.ranked.iter().all(|s| s.score == 0.0));
        assert!(result.used_fallback);
        assert_eq!(result.matched.len(), 2);
        assert_eq!(result.matched[0], "B");
        assert_ne!(result.matched[1], "B");
    }

    #[test]
    fn test_empty_catalog_matches_nothing() {
        let catalog = catalog_of(vec![], &[]);
        let mut rng = StdRng::seed_from_u64(0);
        let result = match_archetypes(&TraitScoreSet::default(), &catalog, &[], &mut rng);
        assert!(result.matched.is_empty());
        assert_eq!(top_archetype(&TraitScoreSet::default(), &catalog, &[]), None);
    }

    #[test]
    fn test_top_archetype_prefers_best_viable() {
        let catalog = Catalog::builtin();
        let scores: TraitScoreSet = [
            (Trait::Openness, 5.0),
            (Trait::Conscientiousness, 3.0),
            (Trait::Extraversion, 4.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            top_archetype(&scores, &catalog, &[]).as_deref(),
            Some("Innovative Explorer")
        );
    }
}
