//! Central regeneration engine.
//!
//! Drives the per-student pipeline (load diagnostic → curate → rank →
//! write) across the whole roster with bounded parallelism. Each
//! student's run is isolated: one failure is recorded in the report and
//! never aborts the batch.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::curation::{curate, PreferenceSignals};
use crate::error::EngineError;
use crate::model::{ContentStatus, StudentPath};
use crate::paths::{PathWriter, RegenerationPolicy};
use crate::ranker::DEFAULT_MAX_CANDIDATES;
use crate::report::{RegenerationReport, StudentFailure};
use crate::scoring::classify;
use crate::traits::{
    ContentCatalog, DiagnosticStore, PathStore, RankRequest, Ranker, StudentDirectory,
};

/// Configuration for the regeneration engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum concurrent per-student regenerations. Bounds pressure on
    /// the external AI endpoint.
    pub parallelism: usize,
    /// What happens to entry progress on regeneration.
    pub policy: RegenerationPolicy,
    /// Size of the candidate pool handed to the ranker.
    pub pool_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            policy: RegenerationPolicy::default(),
            pool_limit: DEFAULT_MAX_CANDIDATES,
        }
    }
}

/// Outcome of a single student's regeneration.
#[derive(Debug, Clone)]
pub enum StudentOutcome {
    /// The path was (re)written.
    Regenerated {
        path: StudentPath,
        ai_count: usize,
    },
    /// The student has no completed diagnostic; nothing to do.
    Skipped,
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_student_start(&self, student_id: &str);
    fn on_student_complete(&self, student_id: &str, assigned: usize, ai_recommended: usize);
    fn on_student_skipped(&self, student_id: &str);
    fn on_student_error(&self, student_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, succeeded: usize, skipped: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_student_start(&self, _: &str) {}
    fn on_student_complete(&self, _: &str, _: usize, _: usize) {}
    fn on_student_skipped(&self, _: &str) {}
    fn on_student_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: usize, _: Duration) {}
}

/// The central regeneration engine.
pub struct RegenerationEngine {
    catalog: Arc<dyn ContentCatalog>,
    diagnostics: Arc<dyn DiagnosticStore>,
    directory: Arc<dyn StudentDirectory>,
    writer: PathWriter,
    ranker: Arc<dyn Ranker>,
    config: EngineConfig,
}

impl RegenerationEngine {
    pub fn new(
        catalog: Arc<dyn ContentCatalog>,
        diagnostics: Arc<dyn DiagnosticStore>,
        paths: Arc<dyn PathStore>,
        directory: Arc<dyn StudentDirectory>,
        ranker: Arc<dyn Ranker>,
        config: EngineConfig,
    ) -> Self {
        let writer = PathWriter::new(paths).with_policy(config.policy);
        Self {
            catalog,
            diagnostics,
            directory,
            writer,
            ranker,
            config,
        }
    }

    /// Regenerate one student's path.
    ///
    /// Returns [`StudentOutcome::Skipped`] when the student has no
    /// completed diagnostic; errors are real failures (broken catalog
    /// data, persistence) for the batch layer to record.
    pub async fn regenerate_student(
        &self,
        student_id: &str,
    ) -> Result<StudentOutcome, EngineError> {
        let Some(result) = self.diagnostics.get_result(student_id).await? else {
            return Ok(StudentOutcome::Skipped);
        };

        // Stored band when present; otherwise derived from accuracy,
        // which is what the backfill would assign anyway.
        let band = match self.directory.get_student(student_id).await? {
            Some(student) => student
                .current_difficulty
                .unwrap_or_else(|| classify(result.accuracy)),
            None => classify(result.accuracy),
        };

        let signals = self
            .diagnostics
            .get_answers(student_id)
            .await?
            .map(|answers| PreferenceSignals::from_answers(&answers))
            .unwrap_or_default();

        let curriculum = self
            .catalog
            .find_curriculum(result.determined_type)
            .await?
            .ok_or(EngineError::MissingCurriculum(result.determined_type))?;

        let base = curate(result.determined_type, band, &signals, self.catalog.as_ref()).await?;

        let pool = self
            .catalog
            .find_pool(ContentStatus::Published, &[band], self.config.pool_limit)
            .await?;

        let ai_ids = self
            .ranker
            .recommend(&RankRequest {
                learner_type: result.determined_type,
                autism_score: result.autism_score,
                down_syndrome_score: result.down_syndrome_score,
                accuracy: result.accuracy,
                base_ids: base.iter().map(|item| item.id.clone()).collect(),
                pool,
            })
            .await;

        let ai_count = ai_ids.len();
        let path = self
            .writer
            .write(student_id, &curriculum.id, &base, &ai_ids)
            .await?;

        tracing::info!(
            student_id,
            assigned = path.assigned_content.len(),
            ai_recommended = ai_count,
            band = %band,
            "path regenerated"
        );

        Ok(StudentOutcome::Regenerated { path, ai_count })
    }

    /// Regenerate paths for every student on the roster.
    ///
    /// Students without a determined type are skipped; per-student
    /// failures are recorded and do not stop other students. Only a
    /// roster listing failure aborts the batch.
    pub async fn regenerate_all(
        &self,
        progress: &dyn ProgressReporter,
    ) -> Result<RegenerationReport, EngineError> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let students = self.directory.list_students().await?;
        let total = students.len();
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut futures = FuturesUnordered::new();

        for student in &students {
            let semaphore = Arc::clone(&semaphore);
            let student_id = student.id.clone();
            let has_type = student.determined_type.is_some();

            futures.push(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        let err = EngineError::Persistence("semaphore closed".into());
                        return (student_id, Err(err));
                    }
                };

                if !has_type {
                    return (student_id, Ok(StudentOutcome::Skipped));
                }

                progress.on_student_start(&student_id);
                let outcome = self.regenerate_student(&student_id).await;
                (student_id, outcome)
            });
        }

        let mut succeeded = 0usize;
        let mut skipped = 0usize;
        let mut failed = Vec::new();

        while let Some((student_id, outcome)) = futures.next().await {
            match outcome {
                Ok(StudentOutcome::Regenerated { path, ai_count }) => {
                    progress.on_student_complete(&student_id, path.assigned_content.len(), ai_count);
                    succeeded += 1;
                }
                Ok(StudentOutcome::Skipped) => {
                    progress.on_student_skipped(&student_id);
                    skipped += 1;
                }
                Err(e) => {
                    tracing::error!("regeneration failed for {student_id}: {e:#}");
                    progress.on_student_error(&student_id, &e.to_string());
                    failed.push(StudentFailure {
                        student_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, succeeded, skipped, failed.len(), elapsed);

        Ok(RegenerationReport {
            id: run_id,
            created_at: chrono::Utc::now(),
            total_students: total,
            succeeded,
            skipped,
            failed,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
