//! Shared fixtures for in-crate tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::assessment::analysis::{AnalysisError, RawAnalysis, TextAnalyzer};
use crate::assessment::scorer::TraitScoreSet;
use crate::models::session::Demographics;

pub fn sample_demographics() -> Demographics {
    Demographics {
        full_name: "Ada Lovelace".to_string(),
        birth_year: 1995,
        email: "ada@example.com".to_string(),
        country: "UK".to_string(),
        education: "Bachelor of Mathematics".to_string(),
        university_major: "Mathematics".to_string(),
        interests: "reading, leadership workshops".to_string(),
        open_ended_1: "I want to run a community project one day.".to_string(),
        open_ended_2: String::new(),
    }
}

/// Analyzer that returns a canned response (or failure) and counts calls.
pub struct ScriptedAnalyzer {
    response: Option<Value>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    pub fn replying(response: Value) -> Self {
        Self {
            response: Some(response),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextAnalyzer for ScriptedAnalyzer {
    async fn analyze(
        &self,
        _text: &str,
        _scores: &TraitScoreSet,
    ) -> Result<RawAnalysis, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.response {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AnalysisError::Malformed(e.to_string())),
            None => Err(AnalysisError::Malformed("scripted failure".to_string())),
        }
    }
}
