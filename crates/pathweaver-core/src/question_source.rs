//! Question bank loading and validation.
//!
//! Banks live either in a TOML file or in the persisted store; the
//! choice is a configuration flag on the [`QuestionSource`] seam, not a
//! runtime fallback cascade.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{OptionWeights, Question, QuestionBank, Section};

/// A source of the diagnostic question bank.
pub trait QuestionSource: Send + Sync {
    fn load(&self) -> Result<QuestionBank>;
}

/// Question bank backed by a TOML file.
pub struct FileQuestionSource {
    path: PathBuf,
}

impl FileQuestionSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl QuestionSource for FileQuestionSource {
    fn load(&self) -> Result<QuestionBank> {
        parse_question_bank(&self.path)
    }
}

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    question_bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    section: u8,
    order: u32,
    prompt: String,
    options: Vec<String>,
    /// Option-index (as a TOML key string) → trait weights.
    #[serde(default)]
    scoring: BTreeMap<String, TomlWeights>,
    #[serde(default)]
    correct_answer: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct TomlWeights {
    #[serde(default)]
    autism: f64,
    #[serde(default)]
    down_syndrome: f64,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_question_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_question_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_question_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let section = Section::try_from(q.section)
                .map_err(|e| anyhow::anyhow!("question '{}': {}", q.id, e))?;

            let scoring = q
                .scoring
                .into_iter()
                .map(|(key, weights)| {
                    let index: usize = key.parse().map_err(|_| {
                        anyhow::anyhow!(
                            "question '{}': scoring key '{}' is not an option index",
                            q.id,
                            key
                        )
                    })?;
                    Ok((
                        index,
                        OptionWeights {
                            autism: weights.autism,
                            down_syndrome: weights.down_syndrome,
                        },
                    ))
                })
                .collect::<Result<BTreeMap<usize, OptionWeights>>>()?;

            Ok(Question {
                id: q.id,
                section,
                order: q.order,
                prompt: q.prompt,
                options: q.options,
                scoring,
                correct_answer: q.correct_answer,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuestionBank {
        id: parsed.question_bank.id,
        name: parsed.question_bank.name,
        questions,
    })
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for common authoring mistakes.
pub fn validate_question_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question IDs
    let mut seen_ids = std::collections::HashSet::new();
    for question in &bank.questions {
        if !seen_ids.insert(&question.id) {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    for question in &bank.questions {
        if question.options.len() < 2 {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "fewer than two answer options".into(),
            });
        }

        if question.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(question.id.clone()),
                message: "prompt is empty".into(),
            });
        }

        // Scoring entries must point at real options
        for &index in question.scoring.keys() {
            if index >= question.options.len() {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!(
                        "scoring entry for option {index} but only {} options",
                        question.options.len()
                    ),
                });
            }
        }

        match question.section {
            Section::Knowledge => {
                match question.correct_answer {
                    None => warnings.push(ValidationWarning {
                        question_id: Some(question.id.clone()),
                        message: "section 2 question has no correct_answer".into(),
                    }),
                    Some(index) if index >= question.options.len() => {
                        warnings.push(ValidationWarning {
                            question_id: Some(question.id.clone()),
                            message: format!("correct_answer {index} is out of range"),
                        })
                    }
                    Some(_) => {}
                }
                if !question.scoring.is_empty() {
                    warnings.push(ValidationWarning {
                        question_id: Some(question.id.clone()),
                        message: "section 2 question carries trait weights; they are ignored"
                            .into(),
                    });
                }
            }
            Section::Traits | Section::Preferences => {
                if question.correct_answer.is_some() {
                    warnings.push(ValidationWarning {
                        question_id: Some(question.id.clone()),
                        message: "trait/preference question has a correct_answer; it is ignored"
                            .into(),
                    });
                }
            }
        }
    }

    // Non-contiguous ordering within a section
    for section in [Section::Traits, Section::Knowledge, Section::Preferences] {
        let questions = bank.section(section);
        for (position, question) in questions.iter().enumerate() {
            let expected = position as u32 + 1;
            if question.order != expected {
                warnings.push(ValidationWarning {
                    question_id: Some(question.id.clone()),
                    message: format!(
                        "section {section} order is not contiguous: expected {expected}, found {}",
                        question.order
                    ),
                });
                break;
            }
        }
    }

    warnings
}
