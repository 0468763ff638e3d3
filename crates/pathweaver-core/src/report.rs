//! Batch regeneration reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one batch regeneration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerationReport {
    /// Unique run identifier.
    pub id: Uuid,
    /// When the run started.
    pub created_at: DateTime<Utc>,
    /// Students considered by the run.
    pub total_students: usize,
    /// Paths successfully regenerated.
    pub succeeded: usize,
    /// Students without a completed diagnostic, skipped.
    pub skipped: usize,
    /// Per-student failures; never aborts the batch.
    pub failed: Vec<StudentFailure>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// One isolated per-student failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentFailure {
    pub student_id: String,
    pub error: String,
}

impl RegenerationReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: RegenerationReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Returns true if any per-student failure was recorded.
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip() {
        let report = RegenerationReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            total_students: 3,
            succeeded: 1,
            skipped: 1,
            failed: vec![StudentFailure {
                student_id: "s3".into(),
                error: "no curriculum path published for learner type autism".into(),
            }],
            duration_ms: 42,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");

        report.save_json(&path).unwrap();
        let loaded = RegenerationReport::load_json(&path).unwrap();

        assert_eq!(loaded.total_students, 3);
        assert_eq!(loaded.failed.len(), 1);
        assert!(loaded.has_failures());
        assert_eq!(loaded.failed[0].student_id, "s3");
    }

    #[test]
    fn load_missing_file_errors() {
        let err = RegenerationReport::load_json(Path::new("no_such_report.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read report"));
    }
}
