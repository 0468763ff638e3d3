//! Core data model types for pathweaver.
//!
//! These are the fundamental types the entire pathweaver system uses to
//! represent diagnostic questions, quiz submissions, classified results,
//! the content catalog, and per-student learning paths.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The three sections of the diagnostic quiz.
///
/// Sections 1 and 3 carry per-option trait weights; section 2 is a
/// knowledge check with a correct-answer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Section {
    /// Section 1 — behavioral trait indicators.
    Traits,
    /// Section 2 — knowledge check scored against a correct answer.
    Knowledge,
    /// Section 3 — learning-style preferences.
    Preferences,
}

impl TryFrom<u8> for Section {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Section::Traits),
            2 => Ok(Section::Knowledge),
            3 => Ok(Section::Preferences),
            other => Err(format!("unknown section: {other} (expected 1, 2, or 3)")),
        }
    }
}

impl From<Section> for u8 {
    fn from(section: Section) -> u8 {
        match section {
            Section::Traits => 1,
            Section::Knowledge => 2,
            Section::Preferences => 3,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// Trait weights attached to a single answer option.
///
/// Options without an entry are scoring-neutral.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionWeights {
    /// Weight toward the autism profile.
    #[serde(default)]
    pub autism: f64,
    /// Weight toward the Down-syndrome profile.
    #[serde(default)]
    pub down_syndrome: f64,
}

/// A single diagnostic question.
///
/// Immutable once authored; edited only by an external admin tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for this question.
    pub id: String,
    /// The section this question belongs to.
    pub section: Section,
    /// Position within the section (1-based).
    pub order: u32,
    /// The question text shown to the student.
    pub prompt: String,
    /// Ordered answer option labels.
    pub options: Vec<String>,
    /// Per-option trait weights (sections 1 and 3). Missing entries
    /// contribute nothing to either score.
    #[serde(default)]
    pub scoring: BTreeMap<usize, OptionWeights>,
    /// Index of the correct option (section 2 only).
    #[serde(default)]
    pub correct_answer: Option<usize>,
}

/// The ordered catalog of diagnostic questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// All questions across all sections.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// Questions of one section, in `order` order.
    pub fn section(&self, section: Section) -> Vec<&Question> {
        let mut questions: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| q.section == section)
            .collect();
        questions.sort_by_key(|q| q.order);
        questions
    }

    /// Number of questions in one section.
    pub fn section_len(&self, section: Section) -> usize {
        self.questions.iter().filter(|q| q.section == section).count()
    }
}

/// A student's completed quiz submission.
///
/// Created exactly once per student; the quiz is single-attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSet {
    /// The submitting student.
    pub student_id: String,
    /// Selected option indices for section 1, in question order.
    pub section1: Vec<usize>,
    /// Selected option indices for section 2, in question order.
    pub section2: Vec<usize>,
    /// Selected option indices for section 3, in question order.
    pub section3: Vec<usize>,
}

impl AnswerSet {
    /// The answer list for one section.
    pub fn section(&self, section: Section) -> &[usize] {
        match section {
            Section::Traits => &self.section1,
            Section::Knowledge => &self.section2,
            Section::Preferences => &self.section3,
        }
    }
}

/// The learner-profile classification inferred from quiz answers.
///
/// Drives which content catalog partition a student sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearnerType {
    Autism,
    DownSyndrome,
}

impl fmt::Display for LearnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearnerType::Autism => write!(f, "autism"),
            LearnerType::DownSyndrome => write!(f, "down-syndrome"),
        }
    }
}

impl FromStr for LearnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "autism" => Ok(LearnerType::Autism),
            "down-syndrome" | "downsyndrome" | "down_syndrome" => Ok(LearnerType::DownSyndrome),
            other => Err(format!("unknown learner type: {other}")),
        }
    }
}

/// Easy/Medium/Hard tier derived from section-2 accuracy.
///
/// Gates content filtering independently of the learner type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyBand {
    Easy,
    Medium,
    Hard,
}

impl DifficultyBand {
    /// All bands, in ascending order.
    pub const ALL: [DifficultyBand; 3] = [
        DifficultyBand::Easy,
        DifficultyBand::Medium,
        DifficultyBand::Hard,
    ];
}

impl fmt::Display for DifficultyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifficultyBand::Easy => write!(f, "easy"),
            DifficultyBand::Medium => write!(f, "medium"),
            DifficultyBand::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for DifficultyBand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(DifficultyBand::Easy),
            "medium" => Ok(DifficultyBand::Medium),
            "hard" => Ok(DifficultyBand::Hard),
            other => Err(format!("unknown difficulty band: {other}")),
        }
    }
}

/// The scored outcome of a diagnostic submission.
///
/// Derived, immutable, one per student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// The student this result belongs to.
    pub student_id: String,
    /// Accumulated autism-profile score.
    pub autism_score: f64,
    /// Accumulated Down-syndrome-profile score.
    pub down_syndrome_score: f64,
    /// Section-2 accuracy in `[0, 1]`.
    pub accuracy: f64,
    /// The classified learner profile.
    pub determined_type: LearnerType,
    /// When the quiz was scored.
    pub completed_at: DateTime<Utc>,
}

/// Kind of content behind a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Video,
    Document,
    Image,
    Quiz,
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentType::Video => write!(f, "video"),
            ContentType::Document => write!(f, "document"),
            ContentType::Image => write!(f, "image"),
            ContentType::Quiz => write!(f, "quiz"),
        }
    }
}

/// Publication state of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Published,
    Draft,
}

/// A single item in the content catalog.
///
/// Owned by the content-authoring subsystem; read-only to the curator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique identifier.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Which learner-type catalog partition this item belongs to.
    pub path_type: LearnerType,
    /// Difficulty tier.
    pub difficulty: DifficultyBand,
    /// Kind of content.
    pub content_type: ContentType,
    /// Topic within the course.
    pub topic: String,
    /// The course (within the curriculum tree) this item belongs to.
    pub course_ref: String,
    /// Publication state.
    pub status: ContentStatus,
}

/// The admin-authored curriculum tree a set of content items hangs off.
///
/// Distinct from [`StudentPath`], which is the per-student filtered
/// assignment over this tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumPath {
    pub id: String,
    pub title: String,
    pub path_type: LearnerType,
}

/// Progress state of one assigned content entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    Pending,
    InProgress,
    Completed,
}

/// Assignment priority; AI-recommended entries are high priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

/// One content item assigned to a student's path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignedContentEntry {
    /// The assigned catalog item.
    pub content_id: String,
    /// The student's progress on this entry.
    pub status: EntryStatus,
    /// Assignment priority.
    pub priority: Priority,
    /// Whether this entry came from the AI ranking pass.
    pub ai_recommended: bool,
    /// When the entry was added to the path.
    pub added_at: DateTime<Utc>,
}

/// Overall state of a student's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathStatus {
    InProgress,
    Completed,
}

/// A student's individualized learning path.
///
/// One per student; regeneration replaces `assigned_content` wholesale,
/// with AI-recommended entries ordered first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentPath {
    pub student_id: String,
    /// The curriculum tree the assigned items belong to.
    pub curriculum_path_id: String,
    /// Ordered assignment; AI-recommended high-priority entries first.
    pub assigned_content: Vec<AssignedContentEntry>,
    pub status: PathStatus,
}

/// A student as the curation engine sees them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    /// Set once the diagnostic has been scored.
    #[serde(default)]
    pub determined_type: Option<LearnerType>,
    /// Set at submission; backfilled for students scored before the band
    /// feature existed.
    #[serde(default)]
    pub current_difficulty: Option<DifficultyBand>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_from_u8() {
        assert_eq!(Section::try_from(1).unwrap(), Section::Traits);
        assert_eq!(Section::try_from(2).unwrap(), Section::Knowledge);
        assert_eq!(Section::try_from(3).unwrap(), Section::Preferences);
        assert!(Section::try_from(4).is_err());
        assert!(Section::try_from(0).is_err());
    }

    #[test]
    fn learner_type_display_and_parse() {
        assert_eq!(LearnerType::Autism.to_string(), "autism");
        assert_eq!(LearnerType::DownSyndrome.to_string(), "down-syndrome");
        assert_eq!("autism".parse::<LearnerType>().unwrap(), LearnerType::Autism);
        assert_eq!(
            "down-syndrome".parse::<LearnerType>().unwrap(),
            LearnerType::DownSyndrome
        );
        assert_eq!(
            "downSyndrome".parse::<LearnerType>().unwrap(),
            LearnerType::DownSyndrome
        );
        assert!("typical".parse::<LearnerType>().is_err());
    }

    #[test]
    fn difficulty_band_display_and_parse() {
        assert_eq!(DifficultyBand::Easy.to_string(), "easy");
        assert_eq!("Medium".parse::<DifficultyBand>().unwrap(), DifficultyBand::Medium);
        assert!("impossible".parse::<DifficultyBand>().is_err());
    }

    #[test]
    fn bank_section_accessor_sorts_by_order() {
        let bank = QuestionBank {
            id: "b".into(),
            name: "Bank".into(),
            questions: vec![
                Question {
                    id: "q2".into(),
                    section: Section::Traits,
                    order: 2,
                    prompt: String::new(),
                    options: vec!["a".into()],
                    scoring: BTreeMap::new(),
                    correct_answer: None,
                },
                Question {
                    id: "q1".into(),
                    section: Section::Traits,
                    order: 1,
                    prompt: String::new(),
                    options: vec!["a".into()],
                    scoring: BTreeMap::new(),
                    correct_answer: None,
                },
                Question {
                    id: "k1".into(),
                    section: Section::Knowledge,
                    order: 1,
                    prompt: String::new(),
                    options: vec!["a".into()],
                    scoring: BTreeMap::new(),
                    correct_answer: Some(0),
                },
            ],
        };

        let section1 = bank.section(Section::Traits);
        assert_eq!(section1.len(), 2);
        assert_eq!(section1[0].id, "q1");
        assert_eq!(section1[1].id, "q2");
        assert_eq!(bank.section_len(Section::Knowledge), 1);
        assert_eq!(bank.section_len(Section::Preferences), 0);
    }

    #[test]
    fn question_serde_roundtrip() {
        let mut scoring = BTreeMap::new();
        scoring.insert(
            0,
            OptionWeights {
                autism: 2.0,
                down_syndrome: 0.0,
            },
        );
        let question = Question {
            id: "s1-q1".into(),
            section: Section::Traits,
            order: 1,
            prompt: "Prefers routines?".into(),
            options: vec!["Always".into(), "Sometimes".into()],
            scoring,
            correct_answer: None,
        };

        let json = serde_json::to_string(&question).unwrap();
        let deserialized: Question = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, "s1-q1");
        assert_eq!(deserialized.section, Section::Traits);
        assert_eq!(deserialized.scoring.get(&0).unwrap().autism, 2.0);
    }
}
