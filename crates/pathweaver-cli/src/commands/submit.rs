//! The `pathweaver submit` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use pathweaver_core::model::AnswerSet;
use pathweaver_core::quiz::submit_answers;

pub async fn execute(answers_path: PathBuf, config_path: Option<PathBuf>) -> Result<()> {
    let (config, store) = super::open_store(config_path.as_deref())?;
    let bank = super::load_bank(&config, &store)?;

    let content = std::fs::read_to_string(&answers_path)
        .with_context(|| format!("failed to read answers from {}", answers_path.display()))?;
    let answers: AnswerSet =
        serde_json::from_str(&content).context("failed to parse answer set JSON")?;

    let outcome = submit_answers(store.as_ref(), store.as_ref(), &bank, answers).await?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
