//! Personality assessment: scoring, archetype matching, recommendations and
//! report assembly. Everything here is free of HTTP and storage concerns.

pub mod analysis;
pub mod catalog;
mod catalog_data;
pub mod insights;
pub mod keywords;
pub mod matcher;
pub mod prompts;
pub mod recommendations;
pub mod report;
pub mod scorer;
