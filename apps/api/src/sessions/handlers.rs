use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assessment::catalog::{CompetencyQuestion, Question, QUESTIONS_PER_PAGE};
use crate::assessment::report::{Report, ReportAssembler};
use crate::assessment::scorer::Answer;
use crate::errors::AppError;
use crate::models::session::{current_year, CompetencyAnswer, Demographics};
use crate::sessions::service;
use crate::state::AppState;

#[derive(Serialize)]
pub struct StartResponse {
    pub title: &'static str,
    pub instructions: &'static str,
    pub page_count: usize,
    pub questions_per_page: usize,
    pub stages: Vec<&'static str>,
}

#[derive(Serialize)]
pub struct QuestionPageResponse {
    pub page: usize,
    pub page_count: usize,
    pub questions: Vec<Question>,
}

#[derive(Deserialize)]
pub struct AnswersRequest {
    pub answers: Vec<Answer>,
}

#[derive(Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
}

#[derive(Serialize)]
pub struct AnswersRecordedResponse {
    pub session_id: Uuid,
    pub answered_questions: usize,
}

#[derive(Serialize)]
pub struct DemographicsResponse {
    pub session_id: Uuid,
    pub top_archetype: Option<String>,
}

#[derive(Serialize)]
pub struct CompetencyQuestionsResponse {
    pub archetype: String,
    pub questions: Vec<CompetencyQuestion>,
}

#[derive(Deserialize)]
pub struct CompetencyAnswersRequest {
    pub answers: Vec<CompetencyAnswer>,
}

#[derive(Serialize)]
pub struct SessionStatusResponse {
    pub session_id: Uuid,
    pub complete: bool,
    pub answered_questions: usize,
    pub has_demographics: bool,
    pub competency_answers: usize,
    pub top_archetype: Option<String>,
}

/// GET /api/v1/test/start
pub async fn handle_start(State(state): State<AppState>) -> Json<StartResponse> {
    Json(StartResponse {
        title: "Personality & Career Test",
        instructions: "Rate each statement from 1 (strongly disagree) to 5 (strongly agree). \
                       Answer honestly; there are no right or wrong answers.",
        page_count: state.catalog.page_count(),
        questions_per_page: QUESTIONS_PER_PAGE,
        stages: vec!["questions", "demographics", "competency", "results"],
    })
}

/// GET /api/v1/test/questions/:page
pub async fn handle_question_page(
    State(state): State<AppState>,
    Path(page): Path<usize>,
) -> Result<Json<QuestionPageResponse>, AppError> {
    let questions = state
        .catalog
        .page(page)
        .ok_or_else(|| AppError::NotFound(format!("Question page {page} does not exist")))?;
    Ok(Json(QuestionPageResponse {
        page,
        page_count: state.catalog.page_count(),
        questions: questions.to_vec(),
    }))
}

/// POST /api/v1/test/answers
pub async fn handle_create_session(
    State(state): State<AppState>,
    Json(req): Json<AnswersRequest>,
) -> Result<(StatusCode, Json<SessionCreatedResponse>), AppError> {
    let session = service::start_session(state.store.as_ref(), &state.catalog, req.answers).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            session_id: session.id,
        }),
    ))
}

/// POST /api/v1/test/:session_id/answers
pub async fn handle_append_answers(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<AnswersRequest>,
) -> Result<Json<AnswersRecordedResponse>, AppError> {
    let session =
        service::record_answers(state.store.as_ref(), &state.catalog, session_id, req.answers)
            .await?;
    Ok(Json(AnswersRecordedResponse {
        session_id,
        answered_questions: session.effective_answers().len(),
    }))
}

/// POST /api/v1/test/:session_id/demographics
pub async fn handle_demographics(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(demographics): Json<Demographics>,
) -> Result<Json<DemographicsResponse>, AppError> {
    let session = service::record_demographics(
        state.store.as_ref(),
        &state.catalog,
        session_id,
        demographics,
        current_year(),
    )
    .await?;
    Ok(Json(DemographicsResponse {
        session_id,
        top_archetype: session.top_archetype,
    }))
}

/// GET /api/v1/test/:session_id/competency-questions
pub async fn handle_competency_questions(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<CompetencyQuestionsResponse>, AppError> {
    let (archetype, questions) =
        service::competency_questions(state.store.as_ref(), &state.catalog, session_id).await?;
    Ok(Json(CompetencyQuestionsResponse {
        archetype,
        questions,
    }))
}

/// POST /api/v1/test/:session_id/competency-answers
pub async fn handle_competency_answers(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<CompetencyAnswersRequest>,
) -> Result<StatusCode, AppError> {
    service::record_competency_answers(
        state.store.as_ref(),
        &state.catalog,
        session_id,
        req.answers,
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/test/:session_id/results
pub async fn handle_results(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Report>, AppError> {
    let assembler = ReportAssembler::new(
        &state.catalog,
        state.analyzer.as_ref(),
        state.config.analysis_timeout(),
    );
    let mut rng = StdRng::from_entropy();
    let report =
        service::resolve_report(state.store.as_ref(), &assembler, session_id, &mut rng).await?;
    Ok(Json(report))
}

/// GET /api/v1/test/:session_id/status
pub async fn handle_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let session = service::load(state.store.as_ref(), session_id).await?;
    Ok(Json(SessionStatusResponse {
        session_id,
        complete: session.is_complete(),
        answered_questions: session.effective_answers().len(),
        has_demographics: session.demographics.is_some(),
        competency_answers: session.competency_answers.len(),
        top_archetype: session.top_archetype,
    }))
}
