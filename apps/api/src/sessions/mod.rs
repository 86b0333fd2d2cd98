pub mod handlers;
#[cfg(test)]
pub mod memory;
pub mod service;
pub mod store;

use async_trait::async_trait;
use uuid::Uuid;

use crate::assessment::report::Report;
use crate::errors::AppError;
use crate::models::session::TestSession;

/// Persistence seam for test sessions. Production: `PgSessionStore`.
///
/// Writes are compare-and-set. A write that lost a race returns `Ok(false)`
/// and leaves the stored record untouched.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, session: &TestSession) -> Result<(), AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<TestSession>, AppError>;

    /// Overwrites the stored session only if its version still equals
    /// `session.version`, bumping the version on success.
    async fn save(&self, session: &TestSession) -> Result<bool, AppError>;

    /// Caches `report` only if the session has no report yet and its top
    /// archetype still equals `expected_top`.
    async fn cache_report(
        &self,
        id: Uuid,
        expected_top: Option<&str>,
        report: &Report,
    ) -> Result<bool, AppError>;
}
