//! Content curation: filtering, prioritization, and base-set sizing.
//!
//! The curator is deterministic. It queries the catalog for the exact
//! (learner type, difficulty band) partition, moves preferred content
//! types to the front with a stable partition, and takes a fixed
//! fraction as the base assignment, leaving headroom for AI-recommended
//! additions.

use crate::error::EngineError;
use crate::model::{
    AnswerSet, ContentItem, ContentStatus, ContentType, DifficultyBand, LearnerType,
};
use crate::traits::ContentCatalog;

/// Fraction of the prioritized list assigned as the base set, in
/// percent. Deliberate under-assignment; rounds up so a one-item
/// catalog still yields one assignment.
pub const BASE_SET_RATIO_PCT: usize = 70;

/// Section-1 option indices that indicate a visual learning preference.
pub const VISUAL_PREFERENCE_OPTIONS: [usize; 2] = [0, 2];

/// Stylistic preference signals extracted from a student's answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceSignals {
    /// Content type to prioritize, if any preference was detected.
    pub preferred_content_type: Option<ContentType>,
}

impl PreferenceSignals {
    /// Derive signals from a submission: any section-1 answer in the
    /// visual-preference indicator set selects video-first ordering.
    pub fn from_answers(answers: &AnswerSet) -> Self {
        let visual = answers
            .section1
            .iter()
            .any(|index| VISUAL_PREFERENCE_OPTIONS.contains(index));

        Self {
            preferred_content_type: visual.then_some(ContentType::Video),
        }
    }
}

/// Number of items in the base set for a prioritized list of length `n`.
pub fn base_set_size(n: usize) -> usize {
    (n * BASE_SET_RATIO_PCT).div_ceil(100)
}

/// Stable partition: items matching the preferred content type first,
/// relative order preserved within both groups. Not a full re-sort —
/// ties keep catalog order.
pub fn prioritize(items: Vec<ContentItem>, signals: &PreferenceSignals) -> Vec<ContentItem> {
    let Some(preferred) = signals.preferred_content_type else {
        return items;
    };

    let (matching, rest): (Vec<ContentItem>, Vec<ContentItem>) = items
        .into_iter()
        .partition(|item| item.content_type == preferred);

    let mut prioritized = matching;
    prioritized.extend(rest);
    prioritized
}

/// Curate the base assignment set for a student.
///
/// Filters the catalog to published items matching exactly the student's
/// learner type and difficulty band (never "this band or easier"),
/// prioritizes by preference, and takes the leading base-set fraction.
/// An empty catalog partition yields a valid empty base set.
pub async fn curate(
    learner_type: LearnerType,
    band: DifficultyBand,
    signals: &PreferenceSignals,
    catalog: &dyn ContentCatalog,
) -> Result<Vec<ContentItem>, EngineError> {
    let items = catalog
        .find_items(learner_type, &[band], ContentStatus::Published)
        .await?;

    if items.is_empty() {
        tracing::debug!(%learner_type, %band, "no published content for partition");
        return Ok(Vec::new());
    }

    let mut prioritized = prioritize(items, signals);
    prioritized.truncate(base_set_size(prioritized.len()));
    Ok(prioritized)
}
