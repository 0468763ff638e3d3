//! Engine error types.
//!
//! The taxonomy separates user-visible rejections (validation, duplicate
//! attempts) from infrastructure failures (persistence). An empty catalog
//! result and a degraded AI ranking are deliberately not errors: the
//! curator returns an empty base set, and the ranker absorbs provider
//! failures at its own boundary.

use thiserror::Error;

use crate::model::LearnerType;

/// Errors surfaced by the curation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A malformed or incomplete answer submission. Rejected before
    /// scoring; no result is produced.
    #[error("invalid submission: {0}")]
    Validation(String),

    /// A second quiz attempt for a student who already has a result.
    #[error("diagnostic already completed for student {0}; the quiz allows a single attempt")]
    AlreadyCompleted(String),

    /// No published curriculum path exists for a learner type. Unlike a
    /// missing diagnostic this indicates broken catalog data.
    #[error("no curriculum path published for learner type {0}")]
    MissingCurriculum(LearnerType),

    /// A store read or write failed. In batch context this is isolated
    /// per student and recorded, not propagated.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl EngineError {
    /// Returns `true` if this error should be shown to the submitting
    /// student rather than treated as an operational failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_) | EngineError::AlreadyCompleted(_)
        )
    }
}
