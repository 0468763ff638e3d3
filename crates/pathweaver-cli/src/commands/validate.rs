//! The `pathweaver validate` command.

use std::path::PathBuf;

use anyhow::Result;

use pathweaver_core::question_source::{parse_question_bank, validate_question_bank};

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let bank = parse_question_bank(&bank_path)?;

    println!("Question bank: {} ({} questions)", bank.name, bank.questions.len());

    let warnings = validate_question_bank(&bank);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
