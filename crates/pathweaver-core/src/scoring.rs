//! Diagnostic scoring and difficulty classification.
//!
//! `score` maps a validated answer set to a [`TestResult`]; `classify`
//! maps accuracy to a [`DifficultyBand`]. Both are pure functions; the
//! submission flow in [`crate::quiz`] owns persistence and the
//! single-attempt check.

use chrono::Utc;

use crate::error::EngineError;
use crate::model::{AnswerSet, DifficultyBand, LearnerType, QuestionBank, Section, TestResult};

/// Accuracy below this adds the structured-support bonus to the
/// Down-syndrome score. A calibration heuristic, not a hard rule.
pub const LOW_ACCURACY_THRESHOLD: f64 = 0.5;

/// Bonus added to the Down-syndrome score for low-accuracy submissions.
pub const LOW_ACCURACY_SUPPORT_BONUS: f64 = 1.0;

/// Minimum autism score for an autism classification.
///
/// The 8-vs-6 asymmetry between the two floors is intentional
/// calibration; do not "fix" it to be symmetric.
pub const AUTISM_SCORE_FLOOR: f64 = 8.0;

/// Minimum Down-syndrome score for a Down-syndrome classification.
pub const DOWN_SYNDROME_SCORE_FLOOR: f64 = 6.0;

/// Check an answer set against the bank: per-section lengths must match
/// the section question counts and every index must be a valid option.
pub fn validate_answers(answers: &AnswerSet, bank: &QuestionBank) -> Result<(), EngineError> {
    for section in [Section::Traits, Section::Knowledge, Section::Preferences] {
        let questions = bank.section(section);
        let selected = answers.section(section);

        if selected.len() != questions.len() {
            return Err(EngineError::Validation(format!(
                "section {section} expects {} answers, got {}",
                questions.len(),
                selected.len()
            )));
        }

        for (position, (&index, question)) in selected.iter().zip(&questions).enumerate() {
            if index >= question.options.len() {
                return Err(EngineError::Validation(format!(
                    "section {section} question {} has {} options, got option index {index}",
                    position + 1,
                    question.options.len()
                )));
            }
        }
    }

    Ok(())
}

/// Score a completed answer set into a [`TestResult`].
///
/// Sections 1 and 3 accumulate per-option trait weights (options without
/// a scoring entry are neutral). Section 2 is compared against the
/// correct-answer key to produce accuracy, which feeds the low-accuracy
/// support bonus and, later, the difficulty band.
pub fn score(answers: &AnswerSet, bank: &QuestionBank) -> Result<TestResult, EngineError> {
    validate_answers(answers, bank)?;

    let mut autism = 0.0;
    let mut down_syndrome = 0.0;

    for section in [Section::Traits, Section::Preferences] {
        let questions = bank.section(section);
        for (&index, question) in answers.section(section).iter().zip(&questions) {
            if let Some(weights) = question.scoring.get(&index) {
                autism += weights.autism;
                down_syndrome += weights.down_syndrome;
            }
        }
    }

    let knowledge = bank.section(Section::Knowledge);
    let correct = answers
        .section2
        .iter()
        .zip(&knowledge)
        .filter(|(&index, question)| question.correct_answer == Some(index))
        .count();
    let accuracy = if knowledge.is_empty() {
        0.0
    } else {
        correct as f64 / knowledge.len() as f64
    };

    if accuracy < LOW_ACCURACY_THRESHOLD {
        down_syndrome += LOW_ACCURACY_SUPPORT_BONUS;
    }

    let determined_type = determine_type(autism, down_syndrome);

    Ok(TestResult {
        student_id: answers.student_id.clone(),
        autism_score: autism,
        down_syndrome_score: down_syndrome,
        accuracy,
        determined_type,
        completed_at: Utc::now(),
    })
}

/// Classify the two accumulated trait scores into a learner type.
fn determine_type(autism: f64, down_syndrome: f64) -> LearnerType {
    if autism > down_syndrome && autism >= AUTISM_SCORE_FLOOR {
        LearnerType::Autism
    } else if down_syndrome > autism && down_syndrome >= DOWN_SYNDROME_SCORE_FLOOR {
        LearnerType::DownSyndrome
    } else if down_syndrome > autism {
        // Below the floor but still the higher signal.
        LearnerType::DownSyndrome
    } else {
        // Higher autism signal, or a tie.
        LearnerType::Autism
    }
}

/// Map section-2 accuracy to a difficulty band.
///
/// Both boundaries (exactly 50% and exactly 80%) fall inside Medium.
pub fn classify(accuracy: f64) -> DifficultyBand {
    let percent = accuracy * 100.0;
    if percent < 50.0 {
        DifficultyBand::Easy
    } else if percent <= 80.0 {
        DifficultyBand::Medium
    } else {
        DifficultyBand::Hard
    }
}
