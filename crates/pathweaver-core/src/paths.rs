//! Path assembly and persistence.
//!
//! [`PathWriter`] turns a curated base set plus AI recommendations into
//! the persisted per-student path. Regeneration replaces the assignment
//! wholesale; whether entry progress survives is an explicit
//! [`RegenerationPolicy`], never an implicit side effect.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{
    AssignedContentEntry, ContentItem, EntryStatus, PathStatus, Priority, StudentPath,
};
use crate::traits::PathStore;

/// What happens to entry progress when a path is regenerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegenerationPolicy {
    /// The new assignment replaces the old one entirely; a re-diagnosis
    /// resets progress. This is the default.
    #[default]
    Replace,
    /// Entry statuses are carried over for content ids present in both
    /// the old and new assignment. Membership, ordering, and priorities
    /// still come from the fresh computation.
    PreserveStatus,
}

/// Assemble the ordered assignment: AI-recommended entries first (high
/// priority, skipping ids already in the base set), then the base set.
pub fn assemble_assigned_content(
    base: &[ContentItem],
    ai_ids: &[String],
    added_at: DateTime<Utc>,
) -> Vec<AssignedContentEntry> {
    let base_ids: HashSet<&str> = base.iter().map(|item| item.id.as_str()).collect();

    let mut assigned: Vec<AssignedContentEntry> = ai_ids
        .iter()
        .filter(|id| !base_ids.contains(id.as_str()))
        .map(|id| AssignedContentEntry {
            content_id: id.clone(),
            status: EntryStatus::Pending,
            priority: Priority::High,
            ai_recommended: true,
            added_at,
        })
        .collect();

    assigned.extend(base.iter().map(|item| AssignedContentEntry {
        content_id: item.id.clone(),
        status: EntryStatus::Pending,
        priority: Priority::Normal,
        ai_recommended: false,
        added_at,
    }));

    assigned
}

/// Writes per-student paths through the [`PathStore`] seam.
pub struct PathWriter {
    store: Arc<dyn PathStore>,
    policy: RegenerationPolicy,
}

impl PathWriter {
    pub fn new(store: Arc<dyn PathStore>) -> Self {
        Self {
            store,
            policy: RegenerationPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RegenerationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Create or regenerate a student's path.
    ///
    /// Idempotent: identical base and AI inputs produce an identical
    /// content-id sequence (timestamps aside).
    pub async fn write(
        &self,
        student_id: &str,
        curriculum_path_id: &str,
        base: &[ContentItem],
        ai_ids: &[String],
    ) -> Result<StudentPath, EngineError> {
        let mut assigned = assemble_assigned_content(base, ai_ids, Utc::now());

        if let Some(existing) = self.store.get_path(student_id).await? {
            if self.policy == RegenerationPolicy::PreserveStatus {
                carry_over_statuses(&existing.assigned_content, &mut assigned);
            }
            tracing::debug!(
                student_id,
                previous = existing.assigned_content.len(),
                replaced_with = assigned.len(),
                "regenerating existing path"
            );
        }

        let path = StudentPath {
            student_id: student_id.to_string(),
            curriculum_path_id: curriculum_path_id.to_string(),
            assigned_content: assigned,
            status: PathStatus::InProgress,
        };

        self.store.upsert_path(path.clone()).await?;
        Ok(path)
    }
}

/// Copy entry statuses from the old assignment onto matching ids in the
/// fresh one.
fn carry_over_statuses(old: &[AssignedContentEntry], fresh: &mut [AssignedContentEntry]) {
    let previous: HashMap<&str, EntryStatus> = old
        .iter()
        .map(|entry| (entry.content_id.as_str(), entry.status))
        .collect();

    for entry in fresh {
        if let Some(&status) = previous.get(entry.content_id.as_str()) {
            entry.status = status;
        }
    }
}
