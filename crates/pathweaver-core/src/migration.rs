//! One-time difficulty backfill.
//!
//! Students scored before the band feature existed have a TestResult
//! but no `current_difficulty`. This task derives the band from their
//! stored accuracy. It only touches students missing the field, so it
//! is safe to rerun; it is never part of the live submission path.

use crate::error::EngineError;
use crate::model::StudentRecord;
use crate::scoring::classify;
use crate::traits::{DiagnosticStore, StudentDirectory};

/// Outcome of a backfill run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackfillOutcome {
    /// Students who received a difficulty band.
    pub updated: usize,
    /// Students who already had one.
    pub skipped: usize,
}

/// Assign `current_difficulty` to every scored student missing it.
pub async fn backfill_difficulty(
    diagnostics: &dyn DiagnosticStore,
    directory: &dyn StudentDirectory,
) -> Result<BackfillOutcome, EngineError> {
    let mut outcome = BackfillOutcome::default();

    for result in diagnostics.list_results().await? {
        let band = classify(result.accuracy);

        match directory.get_student(&result.student_id).await? {
            Some(student) if student.current_difficulty.is_some() => {
                outcome.skipped += 1;
            }
            Some(_) => {
                directory.set_difficulty(&result.student_id, band).await?;
                outcome.updated += 1;
            }
            None => {
                // Scored before the roster record existed; create it.
                directory
                    .upsert_student(StudentRecord {
                        id: result.student_id.clone(),
                        display_name: String::new(),
                        determined_type: Some(result.determined_type),
                        current_difficulty: Some(band),
                    })
                    .await?;
                outcome.updated += 1;
            }
        }
    }

    tracing::info!(
        updated = outcome.updated,
        skipped = outcome.skipped,
        "difficulty backfill complete"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::model::{AnswerSet, DifficultyBand, LearnerType, TestResult};

    #[derive(Default)]
    struct Fixture {
        results: Vec<TestResult>,
        students: Mutex<HashMap<String, StudentRecord>>,
    }

    #[async_trait]
    impl DiagnosticStore for Fixture {
        async fn insert_result(&self, _result: TestResult) -> Result<(), EngineError> {
            unimplemented!("not exercised by backfill tests")
        }

        async fn get_result(&self, student_id: &str) -> Result<Option<TestResult>, EngineError> {
            Ok(self
                .results
                .iter()
                .find(|r| r.student_id == student_id)
                .cloned())
        }

        async fn list_results(&self) -> Result<Vec<TestResult>, EngineError> {
            Ok(self.results.clone())
        }

        async fn insert_answers(&self, _answers: AnswerSet) -> Result<(), EngineError> {
            unimplemented!("not exercised by backfill tests")
        }

        async fn get_answers(&self, _student_id: &str) -> Result<Option<AnswerSet>, EngineError> {
            Ok(None)
        }
    }

    #[async_trait]
    impl StudentDirectory for Fixture {
        async fn list_students(&self) -> Result<Vec<StudentRecord>, EngineError> {
            Ok(self.students.lock().unwrap().values().cloned().collect())
        }

        async fn get_student(
            &self,
            student_id: &str,
        ) -> Result<Option<StudentRecord>, EngineError> {
            Ok(self.students.lock().unwrap().get(student_id).cloned())
        }

        async fn upsert_student(&self, student: StudentRecord) -> Result<(), EngineError> {
            self.students
                .lock()
                .unwrap()
                .insert(student.id.clone(), student);
            Ok(())
        }

        async fn set_difficulty(
            &self,
            student_id: &str,
            band: DifficultyBand,
        ) -> Result<(), EngineError> {
            if let Some(student) = self.students.lock().unwrap().get_mut(student_id) {
                student.current_difficulty = Some(band);
            }
            Ok(())
        }
    }

    fn result(student_id: &str, accuracy: f64) -> TestResult {
        TestResult {
            student_id: student_id.into(),
            autism_score: 9.0,
            down_syndrome_score: 0.0,
            accuracy,
            determined_type: LearnerType::Autism,
            completed_at: Utc::now(),
        }
    }

    fn student(id: &str, band: Option<DifficultyBand>) -> StudentRecord {
        StudentRecord {
            id: id.into(),
            display_name: String::new(),
            determined_type: Some(LearnerType::Autism),
            current_difficulty: band,
        }
    }

    #[tokio::test]
    async fn backfills_only_students_missing_the_band() {
        let fixture = Fixture {
            results: vec![
                result("legacy", 0.9),
                result("current", 0.3),
                result("orphan", 0.6),
            ],
            students: Mutex::new(HashMap::from([
                ("legacy".to_string(), student("legacy", None)),
                (
                    "current".to_string(),
                    student("current", Some(DifficultyBand::Easy)),
                ),
            ])),
        };

        let outcome = backfill_difficulty(&fixture, &fixture).await.unwrap();
        assert_eq!(outcome.updated, 2);
        assert_eq!(outcome.skipped, 1);

        let students = fixture.students.lock().unwrap();
        assert_eq!(
            students.get("legacy").unwrap().current_difficulty,
            Some(DifficultyBand::Hard)
        );
        // Untouched: already had a band.
        assert_eq!(
            students.get("current").unwrap().current_difficulty,
            Some(DifficultyBand::Easy)
        );
        // Created from the result.
        assert_eq!(
            students.get("orphan").unwrap().current_difficulty,
            Some(DifficultyBand::Medium)
        );
    }

    #[tokio::test]
    async fn rerunning_is_a_no_op() {
        let fixture = Fixture {
            results: vec![result("s", 0.9)],
            students: Mutex::new(HashMap::from([("s".to_string(), student("s", None))])),
        };

        let first = backfill_difficulty(&fixture, &fixture).await.unwrap();
        assert_eq!(first.updated, 1);

        let second = backfill_difficulty(&fixture, &fixture).await.unwrap();
        assert_eq!(second.updated, 0);
        assert_eq!(second.skipped, 1);
    }
}
