//! Diagnostic quiz submission flow.
//!
//! Validates, scores, and persists a submission. The quiz is
//! single-attempt: a fast pre-check gives duplicate submitters a clean
//! domain error, and the store's atomic insert is the actual constraint
//! so a racing second submission still loses.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{AnswerSet, LearnerType, QuestionBank, StudentRecord};
use crate::scoring::{classify, score};
use crate::traits::{DiagnosticStore, StudentDirectory};

/// The preserved submission response contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub student_type: LearnerType,
    pub autism_score: f64,
    pub down_syndrome_score: f64,
    /// Accuracy as a 0-100 integer.
    pub accuracy: u8,
    pub message: String,
}

/// Score and persist a quiz submission.
///
/// Rejects malformed submissions with [`EngineError::Validation`] and
/// repeat attempts with [`EngineError::AlreadyCompleted`], leaving the
/// original result untouched.
pub async fn submit_answers(
    diagnostics: &dyn DiagnosticStore,
    directory: &dyn StudentDirectory,
    bank: &QuestionBank,
    answers: AnswerSet,
) -> Result<SubmissionOutcome, EngineError> {
    let student_id = answers.student_id.clone();

    // Fast user-facing rejection; the insert below is the real constraint.
    if diagnostics.get_result(&student_id).await?.is_some() {
        return Err(EngineError::AlreadyCompleted(student_id));
    }

    let result = score(&answers, bank)?;
    let band = classify(result.accuracy);

    diagnostics.insert_result(result.clone()).await?;
    diagnostics.insert_answers(answers).await?;

    let mut student = directory
        .get_student(&student_id)
        .await?
        .unwrap_or_else(|| StudentRecord {
            id: student_id.clone(),
            display_name: String::new(),
            determined_type: None,
            current_difficulty: None,
        });
    student.determined_type = Some(result.determined_type);
    student.current_difficulty = Some(band);
    directory.upsert_student(student).await?;

    tracing::info!(
        %student_id,
        learner_type = %result.determined_type,
        band = %band,
        accuracy = result.accuracy,
        "diagnostic scored"
    );

    Ok(SubmissionOutcome {
        student_type: result.determined_type,
        autism_score: result.autism_score,
        down_syndrome_score: result.down_syndrome_score,
        accuracy: (result.accuracy * 100.0).round() as u8,
        message: format!(
            "Diagnostic complete: {} profile, {} difficulty",
            result.determined_type, band
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::model::{
        DifficultyBand, OptionWeights, Question, Section, TestResult,
    };
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct MemoryDiagnostics {
        results: Mutex<HashMap<String, TestResult>>,
        answers: Mutex<HashMap<String, AnswerSet>>,
    }

    #[async_trait]
    impl DiagnosticStore for MemoryDiagnostics {
        async fn insert_result(&self, result: TestResult) -> Result<(), EngineError> {
            let mut results = self.results.lock().unwrap();
            if results.contains_key(&result.student_id) {
                return Err(EngineError::AlreadyCompleted(result.student_id));
            }
            results.insert(result.student_id.clone(), result);
            Ok(())
        }

        async fn get_result(&self, student_id: &str) -> Result<Option<TestResult>, EngineError> {
            Ok(self.results.lock().unwrap().get(student_id).cloned())
        }

        async fn list_results(&self) -> Result<Vec<TestResult>, EngineError> {
            Ok(self.results.lock().unwrap().values().cloned().collect())
        }

        async fn insert_answers(&self, answers: AnswerSet) -> Result<(), EngineError> {
            self.answers
                .lock()
                .unwrap()
                .insert(answers.student_id.clone(), answers);
            Ok(())
        }

        async fn get_answers(&self, student_id: &str) -> Result<Option<AnswerSet>, EngineError> {
            Ok(self.answers.lock().unwrap().get(student_id).cloned())
        }
    }

    #[derive(Default)]
    struct MemoryDirectory {
        students: Mutex<HashMap<String, StudentRecord>>,
    }

    #[async_trait]
    impl StudentDirectory for MemoryDirectory {
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

    fn bank() -> QuestionBank {
        let mut autism_heavy = BTreeMap::new();
        autism_heavy.insert(
            0,
            OptionWeights {
                autism: 9.0,
                down_syndrome: 0.0,
            },
        );
        QuestionBank {
            id: "b".into(),
            name: "Bank".into(),
            questions: vec![
                Question {
                    id: "s1-q1".into(),
                    section: Section::Traits,
                    order: 1,
                    prompt: String::new(),
                    options: vec!["a".into(), "b".into()],
                    scoring: autism_heavy,
                    correct_answer: None,
                },
                Question {
                    id: "s2-q1".into(),
                    section: Section::Knowledge,
                    order: 1,
                    prompt: String::new(),
                    options: vec!["a".into(), "b".into()],
                    scoring: BTreeMap::new(),
                    correct_answer: Some(0),
                },
                Question {
                    id: "s2-q2".into(),
                    section: Section::Knowledge,
                    order: 2,
                    prompt: String::new(),
                    options: vec!["a".into(), "b".into()],
                    scoring: BTreeMap::new(),
                    correct_answer: Some(0),
                },
            ],
        }
    }

    fn answers() -> AnswerSet {
        AnswerSet {
            student_id: "student-1".into(),
            section1: vec![0],
            section2: vec![0, 1],
            section3: vec![],
        }
    }

    #[tokio::test]
    async fn submission_scores_and_updates_the_student() {
        let diagnostics = MemoryDiagnostics::default();
        let directory = MemoryDirectory::default();

        let outcome = submit_answers(&diagnostics, &directory, &bank(), answers())
            .await
            .unwrap();

        assert_eq!(outcome.student_type, LearnerType::Autism);
        assert_eq!(outcome.accuracy, 50);

        let student = directory.get_student("student-1").await.unwrap().unwrap();
        assert_eq!(student.determined_type, Some(LearnerType::Autism));
        assert_eq!(student.current_difficulty, Some(DifficultyBand::Medium));
        assert!(diagnostics.get_answers("student-1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn second_submission_is_rejected_and_original_kept() {
        let diagnostics = MemoryDiagnostics::default();
        let directory = MemoryDirectory::default();

        submit_answers(&diagnostics, &directory, &bank(), answers())
            .await
            .unwrap();
        let original = diagnostics.get_result("student-1").await.unwrap().unwrap();

        let mut second = answers();
        second.section1 = vec![1]; // would classify differently
        let err = submit_answers(&diagnostics, &directory, &bank(), second)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::AlreadyCompleted(_)));
        let kept = diagnostics.get_result("student-1").await.unwrap().unwrap();
        assert_eq!(kept.autism_score, original.autism_score);
        assert_eq!(kept.completed_at, original.completed_at);
    }

    #[tokio::test]
    async fn malformed_submission_produces_no_result() {
        let diagnostics = MemoryDiagnostics::default();
        let directory = MemoryDirectory::default();

        let mut bad = answers();
        bad.section2 = vec![0]; // wrong length
        let err = submit_answers(&diagnostics, &directory, &bank(), bad)
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::Validation(_)));
        assert!(diagnostics.get_result("student-1").await.unwrap().is_none());
        assert!(directory.get_student("student-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn outcome_serializes_with_contract_field_names() {
        let outcome = SubmissionOutcome {
            student_type: LearnerType::Autism,
            autism_score: 9.0,
            down_syndrome_score: 3.0,
            accuracy: 50,
            message: "ok".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("studentType").is_some());
        assert!(json.get("autismScore").is_some());
        assert!(json.get("downSyndromeScore").is_some());
        assert_eq!(json.get("accuracy").unwrap(), 50);
    }
}
