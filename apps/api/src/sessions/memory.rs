use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::assessment::report::Report;
use crate::errors::AppError;
use crate::models::session::TestSession;
use crate::sessions::SessionStore;

/// In-process store for router and service tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, TestSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &TestSession) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<TestSession>, AppError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn save(&self, session: &TestSession) -> Result<bool, AppError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(existing) if existing.version == session.version => {
                *existing = session.clone();
                existing.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn cache_report(
        &self,
        id: Uuid,
        expected_top: Option<&str>,
        report: &Report,
    ) -> Result<bool, AppError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(existing)
                if existing.report.is_none()
                    && existing.top_archetype.as_deref() == expected_top =>
            {
                existing.report = Some(report.clone());
                existing.updated_at = Utc::now();
                existing.version += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
