//! In-memory store for tests and development.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use pathweaver_core::error::EngineError;
use pathweaver_core::model::{
    AnswerSet, ContentItem, ContentStatus, CurriculumPath, DifficultyBand, LearnerType,
    QuestionBank, StudentPath, StudentRecord, TestResult,
};
use pathweaver_core::question_source::QuestionSource;
use pathweaver_core::traits::{ContentCatalog, DiagnosticStore, PathStore, StudentDirectory};

#[derive(Default)]
struct Collections {
    students: BTreeMap<String, StudentRecord>,
    results: BTreeMap<String, TestResult>,
    answers: BTreeMap<String, AnswerSet>,
    paths: BTreeMap<String, StudentPath>,
    items: Vec<ContentItem>,
    curricula: Vec<CurriculumPath>,
    bank: Option<QuestionBank>,
}

/// Mutex-guarded in-memory store.
///
/// The one-result-per-student check and insert happen under the same
/// lock acquisition, so concurrent duplicate submissions cannot race.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the content catalog.
    pub fn with_items(self, items: Vec<ContentItem>) -> Self {
        self.inner.lock().unwrap().items = items;
        self
    }

    /// Seed the curriculum paths.
    pub fn with_curricula(self, curricula: Vec<CurriculumPath>) -> Self {
        self.inner.lock().unwrap().curricula = curricula;
        self
    }

    /// Seed the question bank.
    pub fn with_bank(self, bank: QuestionBank) -> Self {
        self.inner.lock().unwrap().bank = Some(bank);
        self
    }

}

#[async_trait]
impl ContentCatalog for MemoryStore {
    async fn find_items(
        &self,
        path_type: LearnerType,
        bands: &[DifficultyBand],
        status: ContentStatus,
    ) -> Result<Vec<ContentItem>, EngineError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .items
            .iter()
            .filter(|item| {
                item.path_type == path_type
                    && bands.contains(&item.difficulty)
                    && item.status == status
            })
            .cloned()
            .collect())
    }

    async fn find_pool(
        &self,
        status: ContentStatus,
        bands: &[DifficultyBand],
        limit: usize,
    ) -> Result<Vec<ContentItem>, EngineError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .items
            .iter()
            .filter(|item| item.status == status && bands.contains(&item.difficulty))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn find_curriculum(
        &self,
        path_type: LearnerType,
    ) -> Result<Option<CurriculumPath>, EngineError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .curricula
            .iter()
            .find(|c| c.path_type == path_type)
            .cloned())
    }
}

#[async_trait]
impl DiagnosticStore for MemoryStore {
    async fn insert_result(&self, result: TestResult) -> Result<(), EngineError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.results.contains_key(&result.student_id) {
            return Err(EngineError::AlreadyCompleted(result.student_id));
        }
        inner.results.insert(result.student_id.clone(), result);
        Ok(())
    }

    async fn get_result(&self, student_id: &str) -> Result<Option<TestResult>, EngineError> {
        Ok(self.inner.lock().unwrap().results.get(student_id).cloned())
    }

    async fn list_results(&self) -> Result<Vec<TestResult>, EngineError> {
        Ok(self.inner.lock().unwrap().results.values().cloned().collect())
    }

    async fn insert_answers(&self, answers: AnswerSet) -> Result<(), EngineError> {
        self.inner
            .lock()
            .unwrap()
            .answers
            .insert(answers.student_id.clone(), answers);
        Ok(())
    }

    async fn get_answers(&self, student_id: &str) -> Result<Option<AnswerSet>, EngineError> {
        Ok(self.inner.lock().unwrap().answers.get(student_id).cloned())
    }
}

#[async_trait]
impl PathStore for MemoryStore {
    async fn get_path(&self, student_id: &str) -> Result<Option<StudentPath>, EngineError> {
        Ok(self.inner.lock().unwrap().paths.get(student_id).cloned())
    }

    async fn upsert_path(&self, path: StudentPath) -> Result<(), EngineError> {
        self.inner
            .lock()
            .unwrap()
            .paths
            .insert(path.student_id.clone(), path);
        Ok(())
    }
}

#[async_trait]
impl StudentDirectory for MemoryStore {
    async fn list_students(&self) -> Result<Vec<StudentRecord>, EngineError> {
        Ok(self.inner.lock().unwrap().students.values().cloned().collect())
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>, EngineError> {
        Ok(self.inner.lock().unwrap().students.get(student_id).cloned())
    }

    async fn upsert_student(&self, student: StudentRecord) -> Result<(), EngineError> {
        self.inner
            .lock()
            .unwrap()
            .students
            .insert(student.id.clone(), student);
        Ok(())
    }

    async fn set_difficulty(
        &self,
        student_id: &str,
        band: DifficultyBand,
    ) -> Result<(), EngineError> {
        let mut inner = self.inner.lock().unwrap();
        let student = inner.students.get_mut(student_id).ok_or_else(|| {
            EngineError::Persistence(format!("unknown student: {student_id}"))
        })?;
        student.current_difficulty = Some(band);
        Ok(())
    }
}

impl QuestionSource for MemoryStore {
    fn load(&self) -> Result<QuestionBank> {
        self.inner
            .lock()
            .unwrap()
            .bank
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no question bank seeded in store"))
    }
}
