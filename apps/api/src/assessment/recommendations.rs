//! Recommendation Selector — careers and courses from the matched archetypes.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assessment::catalog::{Catalog, Course};

/// Course lists shorter than this are topped up from other archetypes.
pub const MIN_COURSES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub careers: Vec<String>,
    pub courses: Vec<Course>,
}

/// Unions careers and courses of `matched` in order, keeping the first
/// occurrence of each title. Courses are topped up to `MIN_COURSES` from the
/// remaining archetypes in random order. Careers mentioned in `interests` move
/// to the front.
pub fn select_recommendations<R: Rng + ?Sized>(
    matched: &[String],
    catalog: &Catalog,
    interests: &str,
    rng: &mut R,
) -> Recommendations {
    let matched_archetypes: Vec<_> = matched
        .iter()
        .filter_map(|name| catalog.archetype(name))
        .collect();

    let mut careers = Vec::new();
    let mut seen_careers = HashSet::new();
    for career in matched_archetypes.iter().flat_map(|a| a.careers.iter()) {
        if seen_careers.insert(career.as_str()) {
            careers.push(career.clone());
        }
    }

    let mut courses = Vec::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    for course in matched_archetypes.iter().flat_map(|a| a.courses.iter()) {
        if seen_titles.insert(course.title.clone()) {
            courses.push(course.clone());
        }
    }

    if courses.len() < MIN_COURSES {
        info!(
            "Only {} courses from matched archetypes, topping up from the catalog",
            courses.len()
        );
        let mut remaining: Vec<_> = catalog
            .archetypes
            .iter()
            .filter(|a| !matched.contains(&a.name))
            .collect();
        remaining.shuffle(rng);

        'outer: for archetype in remaining {
            for course in &archetype.courses {
                if courses.len() >= MIN_COURSES {
                    break 'outer;
                }
                if seen_titles.insert(course.title.clone()) {
                    courses.push(course.clone());
                }
            }
        }
    }

    Recommendations {
        careers: promote_mentioned(careers, interests),
        courses,
    }
}

/// Moves careers whose title appears in the free-text interests to the front,
/// preserving relative order within both groups.
fn promote_mentioned(careers: Vec<String>, interests: &str) -> Vec<String> {
    let interests = interests.to_lowercase();
    if interests.trim().is_empty() {
        return careers;
    }
    let (mut mentioned, rest): (Vec<String>, Vec<String>) = careers
        .into_iter()
        .partition(|c| interests.contains(&c.to_lowercase()));
    mentioned.extend(rest);
    mentioned
}
