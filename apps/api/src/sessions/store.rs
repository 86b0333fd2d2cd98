use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::assessment::report::Report;
use crate::errors::AppError;
use crate::models::session::{TestSession, TestSessionRow};
use crate::sessions::SessionStore;

/// Sessions stored one row each, with the variable-shape parts in JSONB.
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: &TestSession) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO test_sessions
                (id, answers, demographics, competency_answers, top_archetype,
                 report, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.id)
        .bind(Json(&session.answers))
        .bind(session.demographics.as_ref().map(Json))
        .bind(Json(&session.competency_answers))
        .bind(session.top_archetype.as_deref())
        .bind(session.report.as_ref().map(Json))
        .bind(session.version)
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TestSession>, AppError> {
        let row: Option<TestSessionRow> = sqlx::query_as(
            r#"
            SELECT id, answers, demographics, competency_answers, top_archetype,
                   report, version, created_at, updated_at
            FROM test_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(TestSession::from))
    }

    async fn save(&self, session: &TestSession) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE test_sessions
            SET answers = $3, demographics = $4, competency_answers = $5,
                top_archetype = $6, report = $7, updated_at = $8,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(session.id)
        .bind(session.version)
        .bind(Json(&session.answers))
        .bind(session.demographics.as_ref().map(Json))
        .bind(Json(&session.competency_answers))
        .bind(session.top_archetype.as_deref())
        .bind(session.report.as_ref().map(Json))
        .bind(session.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn cache_report(
        &self,
        id: Uuid,
        expected_top: Option<&str>,
        report: &Report,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE test_sessions
            SET report = $2, updated_at = $3, version = version + 1
            WHERE id = $1
              AND report IS NULL
              AND top_archetype IS NOT DISTINCT FROM $4
            "#,
        )
        .bind(id)
        .bind(Json(report))
        .bind(Utc::now())
        .bind(expected_top)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
