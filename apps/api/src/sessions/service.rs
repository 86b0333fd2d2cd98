//! Session lifecycle: validated writes, preliminary matching, and the cached
//! report.
//!
//! Every write recomputes the session's preliminary top archetype. When it
//! moves, the cached report no longer describes the participant and is
//! dropped; the next results request assembles a fresh one.

use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assessment::catalog::{Catalog, CompetencyQuestion};
use crate::assessment::keywords::extract_keywords;
use crate::assessment::matcher::top_archetype;
use crate::assessment::report::{participant_text, Report, ReportAssembler, ReportInput};
use crate::assessment::scorer::{score_traits, Answer, MAX_ANSWER, MIN_ANSWER};
use crate::errors::AppError;
use crate::models::session::{CompetencyAnswer, Demographics, TestSession};
use crate::sessions::SessionStore;

/// Compare-and-set attempts before a write gives up with `Conflict`.
const MAX_WRITE_ATTEMPTS: usize = 5;

pub fn validate_answers(answers: &[Answer], catalog: &Catalog) -> Result<(), AppError> {
    if answers.is_empty() {
        return Err(AppError::Validation(
            "At least one answer is required".to_string(),
        ));
    }
    for answer in answers {
        if catalog.question(&answer.question_id).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown question id '{}'",
                answer.question_id
            )));
        }
        check_value(answer.value, &answer.question_id)?;
    }
    Ok(())
}

/// Competency answers must target questions of `archetype`, the session's
/// current top archetype.
pub fn validate_competency_answers(
    answers: &[CompetencyAnswer],
    catalog: &Catalog,
    archetype: &str,
) -> Result<(), AppError> {
    if answers.is_empty() {
        return Err(AppError::Validation(
            "At least one competency answer is required".to_string(),
        ));
    }
    let owned = catalog
        .archetype(archetype)
        .map(|a| a.competency_questions.as_slice())
        .unwrap_or_default();
    for answer in answers {
        if !owned.iter().any(|q| q.id == answer.question_id) {
            let reason = if catalog.competency_question(&answer.question_id).is_some() {
                format!("does not belong to the {archetype} type")
            } else {
                "is unknown".to_string()
            };
            return Err(AppError::Validation(format!(
                "Competency question id '{}' {reason}",
                answer.question_id
            )));
        }
        let has_text = answer
            .answer_text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        match answer.value {
            Some(value) => check_value(value, &answer.question_id)?,
            None if has_text => {}
            None => {
                return Err(AppError::Validation(format!(
                    "Competency answer '{}' needs a value or answer_text",
                    answer.question_id
                )))
            }
        }
    }
    Ok(())
}

fn check_value(value: u8, question_id: &str) -> Result<(), AppError> {
    if (MIN_ANSWER..=MAX_ANSWER).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Answer to '{question_id}' must be between {MIN_ANSWER} and {MAX_ANSWER}, got {value}"
        )))
    }
}

/// Recomputes the preliminary top archetype from the effective answers and
/// the participant's own text. Clears the cached report when it changes.
pub fn refresh_top_archetype(session: &mut TestSession, catalog: &Catalog) {
    let scores = score_traits(&session.effective_answers(), catalog);
    let keywords = extract_keywords(
        &participant_text(session.demographics.as_ref(), &session.competency_answers),
        catalog,
    );
    let top = top_archetype(&scores, catalog, &keywords);
    if top == session.top_archetype {
        return;
    }
    info!(
        session_id = %session.id,
        "Top archetype changed from {:?} to {:?}",
        session.top_archetype,
        top
    );
    if session.report.take().is_some() {
        info!(session_id = %session.id, "Cached report invalidated");
    }
    session.top_archetype = top;
}

pub async fn load(store: &dyn SessionStore, id: Uuid) -> Result<TestSession, AppError> {
    store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// Load → apply → refresh → compare-and-set save, reloading when another
/// write got there first.
async fn modify<F>(
    store: &dyn SessionStore,
    catalog: &Catalog,
    id: Uuid,
    mut apply: F,
) -> Result<TestSession, AppError>
where
    F: FnMut(&mut TestSession) -> Result<(), AppError> + Send,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let mut session = load(store, id).await?;
        apply(&mut session)?;
        refresh_top_archetype(&mut session, catalog);
        session.touch();
        if store.save(&session).await? {
            session.version += 1;
            return Ok(session);
        }
        warn!(session_id = %id, attempt, "Session changed during write, retrying");
    }
    Err(AppError::Conflict(format!(
        "Session {id} is being modified concurrently, try again"
    )))
}

pub async fn start_session(
    store: &dyn SessionStore,
    catalog: &Catalog,
    answers: Vec<Answer>,
) -> Result<TestSession, AppError> {
    validate_answers(&answers, catalog)?;
    let mut session = TestSession::new(answers);
    refresh_top_archetype(&mut session, catalog);
    store.create(&session).await?;
    info!(session_id = %session.id, "Started test session");
    Ok(session)
}

pub async fn record_answers(
    store: &dyn SessionStore,
    catalog: &Catalog,
    id: Uuid,
    answers: Vec<Answer>,
) -> Result<TestSession, AppError> {
    validate_answers(&answers, catalog)?;
    modify(store, catalog, id, |session| {
        session.answers.extend(answers.iter().cloned());
        Ok(())
    })
    .await
}

pub async fn record_demographics(
    store: &dyn SessionStore,
    catalog: &Catalog,
    id: Uuid,
    demographics: Demographics,
    current_year: i32,
) -> Result<TestSession, AppError> {
    demographics.validate(current_year)?;
    modify(store, catalog, id, |session| {
        session.demographics = Some(demographics.clone());
        Ok(())
    })
    .await
}

/// Competency questions of the session's top archetype. Available once
/// demographics are in.
pub async fn competency_questions(
    store: &dyn SessionStore,
    catalog: &Catalog,
    id: Uuid,
) -> Result<(String, Vec<CompetencyQuestion>), AppError> {
    let session = load(store, id).await?;
    let name = competency_archetype(&session)?.to_string();
    let questions = catalog
        .archetype(&name)
        .map(|a| a.competency_questions.clone())
        .unwrap_or_default();
    Ok((name, questions))
}

fn competency_archetype(session: &TestSession) -> Result<&str, AppError> {
    if session.demographics.is_none() {
        return Err(AppError::Conflict(
            "Submit demographics before requesting competency questions".to_string(),
        ));
    }
    session.top_archetype.as_deref().ok_or_else(|| {
        AppError::Conflict("No archetype has been matched for this session yet".to_string())
    })
}

pub async fn record_competency_answers(
    store: &dyn SessionStore,
    catalog: &Catalog,
    id: Uuid,
    answers: Vec<CompetencyAnswer>,
) -> Result<TestSession, AppError> {
    modify(store, catalog, id, |session| {
        validate_competency_answers(&answers, catalog, competency_archetype(session)?)?;
        session.competency_answers.extend(answers.iter().cloned());
        Ok(())
    })
    .await
}

/// Returns the cached report, or assembles and returns a new one.
///
/// The new report is cached only if no other report was cached meanwhile and
/// the top archetype it was built for is still current.
pub async fn resolve_report<R: Rng + Send>(
    store: &dyn SessionStore,
    assembler: &ReportAssembler<'_>,
    id: Uuid,
    rng: &mut R,
) -> Result<Report, AppError> {
    let session = load(store, id).await?;
    if let Some(report) = session.report {
        info!(session_id = %id, "Returning cached report");
        return Ok(report);
    }

    let demographics = session.demographics.as_ref().ok_or_else(|| {
        AppError::Validation("Demographics have not been submitted for this session".to_string())
    })?;
    let answers = session.effective_answers();
    if answers.is_empty() {
        return Err(AppError::Validation(
            "No answers have been submitted for this session".to_string(),
        ));
    }

    let top = session.top_archetype.as_deref();
    let input = ReportInput {
        answers: &answers,
        demographics,
        competency_answers: &session.competency_answers,
        top_archetype: top,
    };
    let report = assembler.assemble(&input, rng).await;
    info!(session_id = %id, "Assembled report: {}", report.personality_type);

    if store.cache_report(id, top, &report).await? {
        return Ok(report);
    }

    // Lost a race: prefer a report another request cached for the same match.
    let current = load(store, id).await?;
    match current.report {
        Some(cached) if current.top_archetype.as_deref() == top => {
            info!(session_id = %id, "Returning report cached by a concurrent request");
            Ok(cached)
        }
        _ => {
            info!(session_id = %id, "Session changed during assembly, report not cached");
            Ok(report)
        }
    }
}
