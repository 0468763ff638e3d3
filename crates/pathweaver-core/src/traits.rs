//! Core trait definitions for stores, the content catalog, and text
//! generation.
//!
//! These async traits are implemented by the `pathweaver-store` and
//! `pathweaver-providers` crates respectively. The engine only ever
//! talks to these seams, so every store and provider is swappable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{
    AnswerSet, ContentItem, ContentStatus, CurriculumPath, DifficultyBand, LearnerType,
    StudentPath, StudentRecord, TestResult,
};

// ---------------------------------------------------------------------------
// Content catalog
// ---------------------------------------------------------------------------

/// Queryable view over the externally-authored content catalog.
///
/// Read-only to the engine; the authoring subsystem owns the data.
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    /// Items in one learner-type partition, filtered by difficulty and
    /// publication status. Catalog order is preserved.
    async fn find_items(
        &self,
        path_type: LearnerType,
        bands: &[DifficultyBand],
        status: ContentStatus,
    ) -> Result<Vec<ContentItem>, EngineError>;

    /// A broader candidate pool across learner types, for AI ranking.
    async fn find_pool(
        &self,
        status: ContentStatus,
        bands: &[DifficultyBand],
        limit: usize,
    ) -> Result<Vec<ContentItem>, EngineError>;

    /// The curriculum path for a learner type, if one is published.
    async fn find_curriculum(
        &self,
        path_type: LearnerType,
    ) -> Result<Option<CurriculumPath>, EngineError>;
}

// ---------------------------------------------------------------------------
// Diagnostic store
// ---------------------------------------------------------------------------

/// Persistence for quiz submissions and scored results.
#[async_trait]
pub trait DiagnosticStore: Send + Sync {
    /// Insert a result, atomically enforcing one-result-per-student.
    ///
    /// Implementations must perform the existence check and the insert
    /// under a single lock (or equivalent uniqueness constraint) and
    /// return [`EngineError::AlreadyCompleted`] for a duplicate. A
    /// read-then-write race is not acceptable here.
    async fn insert_result(&self, result: TestResult) -> Result<(), EngineError>;

    async fn get_result(&self, student_id: &str) -> Result<Option<TestResult>, EngineError>;

    async fn list_results(&self) -> Result<Vec<TestResult>, EngineError>;

    /// Persist the raw answers alongside the result. Preference signals
    /// are re-derived from these during regeneration.
    async fn insert_answers(&self, answers: AnswerSet) -> Result<(), EngineError>;

    async fn get_answers(&self, student_id: &str) -> Result<Option<AnswerSet>, EngineError>;
}

// ---------------------------------------------------------------------------
// Path store
// ---------------------------------------------------------------------------

/// Persistence for per-student learning paths.
#[async_trait]
pub trait PathStore: Send + Sync {
    async fn get_path(&self, student_id: &str) -> Result<Option<StudentPath>, EngineError>;

    /// Create or fully replace a student's path record.
    async fn upsert_path(&self, path: StudentPath) -> Result<(), EngineError>;
}

// ---------------------------------------------------------------------------
// Student directory
// ---------------------------------------------------------------------------

/// The roster of students known to the platform.
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    async fn list_students(&self) -> Result<Vec<StudentRecord>, EngineError>;

    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>, EngineError>;

    async fn upsert_student(&self, student: StudentRecord) -> Result<(), EngineError>;

    /// Record a student's current difficulty band.
    async fn set_difficulty(
        &self,
        student_id: &str,
        band: DifficultyBand,
    ) -> Result<(), EngineError>;
}

// ---------------------------------------------------------------------------
// Text generation
// ---------------------------------------------------------------------------

/// Trait for text-generation backends used by the AI ranker.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider name (e.g. "anthropic").
    fn name(&self) -> &str;

    /// Generate free text from a prompt.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GeneratedText>;
}

/// Request to generate text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "claude-sonnet-4-20250514").
    pub model: String,
    /// The main prompt.
    pub prompt: String,
    /// Optional system prompt.
    #[serde(default)]
    pub system_prompt: Option<String>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Response from a text-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedText {
    /// The raw response text.
    pub text: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token accounting for a generation request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ---------------------------------------------------------------------------
// Ranker
// ---------------------------------------------------------------------------

/// Best-effort content re-ranking capability.
///
/// The signature is infallible on purpose: implementations absorb
/// provider errors and timeouts, log them, and return an empty list.
/// Degraded AI ranking must never fail an otherwise-successful curation.
#[async_trait]
pub trait Ranker: Send + Sync {
    /// Recommend supplementary content ids for a student. Returns ids
    /// drawn from `request.pool`, already de-duplicated against the base
    /// set; empty on any failure.
    async fn recommend(&self, request: &RankRequest) -> Vec<String>;
}

/// Input to a ranking request.
#[derive(Debug, Clone)]
pub struct RankRequest {
    pub learner_type: LearnerType,
    pub autism_score: f64,
    pub down_syndrome_score: f64,
    pub accuracy: f64,
    /// Content ids already assigned by the curator; never re-recommended.
    pub base_ids: Vec<String>,
    /// Candidate items the ranker may choose from.
    pub pool: Vec<ContentItem>,
}
