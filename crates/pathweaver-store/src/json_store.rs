//! JSON-file-backed store for single-node deployments.
//!
//! One JSON document per collection under a data directory. Collections
//! are loaded at open and held in memory; every mutation rewrites the
//! affected document via a temp-file-then-rename so a crash mid-write
//! never leaves a torn file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use pathweaver_core::error::EngineError;
use pathweaver_core::model::{
    AnswerSet, ContentItem, ContentStatus, CurriculumPath, DifficultyBand, LearnerType,
    QuestionBank, StudentPath, StudentRecord, TestResult,
};
use pathweaver_core::question_source::QuestionSource;
use pathweaver_core::traits::{ContentCatalog, DiagnosticStore, PathStore, StudentDirectory};

use crate::StoreError;

const STUDENTS_FILE: &str = "students.json";
const RESULTS_FILE: &str = "results.json";
const ANSWERS_FILE: &str = "answers.json";
const PATHS_FILE: &str = "paths.json";
const CATALOG_FILE: &str = "catalog.json";
const BANK_FILE: &str = "question_bank.json";

/// The catalog document: items plus the curriculum paths they hang off.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub items: Vec<ContentItem>,
    #[serde(default)]
    pub curricula: Vec<CurriculumPath>,
}

#[derive(Debug, Default)]
struct Collections {
    students: BTreeMap<String, StudentRecord>,
    results: BTreeMap<String, TestResult>,
    answers: BTreeMap<String, AnswerSet>,
    paths: BTreeMap<String, StudentPath>,
    catalog: CatalogDocument,
    bank: Option<QuestionBank>,
}

/// File-backed store rooted at a data directory.
#[derive(Debug)]
pub struct JsonStore {
    dir: PathBuf,
    inner: Mutex<Collections>,
}

impl JsonStore {
    /// Open (or create) a store at `dir`, loading every collection that
    /// already exists on disk.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let collections = Collections {
            students: read_collection(&dir.join(STUDENTS_FILE))?.unwrap_or_default(),
            results: read_collection(&dir.join(RESULTS_FILE))?.unwrap_or_default(),
            answers: read_collection(&dir.join(ANSWERS_FILE))?.unwrap_or_default(),
            paths: read_collection(&dir.join(PATHS_FILE))?.unwrap_or_default(),
            catalog: read_collection(&dir.join(CATALOG_FILE))?.unwrap_or_default(),
            bank: read_collection(&dir.join(BANK_FILE))?,
        };

        tracing::debug!(
            dir = %dir.display(),
            students = collections.students.len(),
            results = collections.results.len(),
            items = collections.catalog.items.len(),
            "store opened"
        );

        Ok(Self {
            dir,
            inner: Mutex::new(collections),
        })
    }

    /// Replace the catalog document and persist it. Used by seeding and
    /// by the (external) content-authoring sync.
    pub fn replace_catalog(&self, catalog: CatalogDocument) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.catalog = catalog;
        write_collection(&self.dir.join(CATALOG_FILE), &inner.catalog)
    }

    /// Replace the persisted question bank.
    pub fn replace_bank(&self, bank: QuestionBank) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.bank = Some(bank);
        write_collection(&self.dir.join(BANK_FILE), inner.bank.as_ref().unwrap())
    }

    fn persist<T: Serialize>(&self, file: &str, value: &T) -> Result<(), EngineError> {
        write_collection(&self.dir.join(file), value).map_err(EngineError::from)
    }
}

fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let value = serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Some(value))
}

fn write_collection<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Corrupt {
        path: path.display().to_string(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(|source| StoreError::Io {
        path: tmp.display().to_string(),
        source,
    })?;
    std::fs::rename(&tmp, path).map_err(|source| StoreError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(())
}

#[async_trait]
impl ContentCatalog for JsonStore {
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
            .catalog
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
            .catalog
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
            .catalog
            .curricula
            .iter()
            .find(|c| c.path_type == path_type)
            .cloned())
    }
}

#[async_trait]
impl DiagnosticStore for JsonStore {
    async fn insert_result(&self, result: TestResult) -> Result<(), EngineError> {
        // Check and insert under one lock; the file write happens while
        // still holding it so a racing duplicate cannot interleave.
        let mut inner = self.inner.lock().unwrap();
        if inner.results.contains_key(&result.student_id) {
            return Err(EngineError::AlreadyCompleted(result.student_id));
        }
        inner.results.insert(result.student_id.clone(), result);
        write_collection(&self.dir.join(RESULTS_FILE), &inner.results)
            .map_err(EngineError::from)
    }

    async fn get_result(&self, student_id: &str) -> Result<Option<TestResult>, EngineError> {
        Ok(self.inner.lock().unwrap().results.get(student_id).cloned())
    }

    async fn list_results(&self) -> Result<Vec<TestResult>, EngineError> {
        Ok(self.inner.lock().unwrap().results.values().cloned().collect())
    }

    async fn insert_answers(&self, answers: AnswerSet) -> Result<(), EngineError> {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            inner.answers.insert(answers.student_id.clone(), answers);
            inner.answers.clone()
        };
        self.persist(ANSWERS_FILE, &snapshot)
    }

    async fn get_answers(&self, student_id: &str) -> Result<Option<AnswerSet>, EngineError> {
        Ok(self.inner.lock().unwrap().answers.get(student_id).cloned())
    }
}

#[async_trait]
impl PathStore for JsonStore {
    async fn get_path(&self, student_id: &str) -> Result<Option<StudentPath>, EngineError> {
        Ok(self.inner.lock().unwrap().paths.get(student_id).cloned())
    }

    async fn upsert_path(&self, path: StudentPath) -> Result<(), EngineError> {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            inner.paths.insert(path.student_id.clone(), path);
            inner.paths.clone()
        };
        self.persist(PATHS_FILE, &snapshot)
    }
}

#[async_trait]
impl StudentDirectory for JsonStore {
    async fn list_students(&self) -> Result<Vec<StudentRecord>, EngineError> {
        Ok(self.inner.lock().unwrap().students.values().cloned().collect())
    }

    async fn get_student(&self, student_id: &str) -> Result<Option<StudentRecord>, EngineError> {
        Ok(self.inner.lock().unwrap().students.get(student_id).cloned())
    }

    async fn upsert_student(&self, student: StudentRecord) -> Result<(), EngineError> {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            inner.students.insert(student.id.clone(), student);
            inner.students.clone()
        };
        self.persist(STUDENTS_FILE, &snapshot)
    }

    async fn set_difficulty(
        &self,
        student_id: &str,
        band: DifficultyBand,
    ) -> Result<(), EngineError> {
        let snapshot = {
            let mut inner = self.inner.lock().unwrap();
            let student = inner.students.get_mut(student_id).ok_or_else(|| {
                EngineError::Persistence(format!("unknown student: {student_id}"))
            })?;
            student.current_difficulty = Some(band);
            inner.students.clone()
        };
        self.persist(STUDENTS_FILE, &snapshot)
    }
}

impl QuestionSource for JsonStore {
    fn load(&self) -> Result<QuestionBank> {
        self.inner.lock().unwrap().bank.clone().ok_or_else(|| {
            anyhow::anyhow!(
                "no question bank in store at {}; seed one or switch question_source to \"file\"",
                self.dir.display()
            )
        })
    }
}
