//! CLI command implementations.

pub mod backfill;
pub mod init;
pub mod regenerate;
pub mod show;
pub mod submit;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use pathweaver_core::model::QuestionBank;
use pathweaver_core::question_source::{FileQuestionSource, QuestionSource};
use pathweaver_providers::config::{load_config_from, PathweaverConfig, QuestionSourceKind};
use pathweaver_store::JsonStore;

/// Load config and open the JSON store it points at.
pub fn open_store(config_path: Option<&Path>) -> Result<(PathweaverConfig, Arc<JsonStore>)> {
    let config = load_config_from(config_path)?;
    let store = JsonStore::open(&config.data_dir)
        .with_context(|| format!("failed to open store at {}", config.data_dir.display()))?;
    Ok((config, Arc::new(store)))
}

/// Load the question bank from the configured source.
pub fn load_bank(config: &PathweaverConfig, store: &JsonStore) -> Result<QuestionBank> {
    match config.question_source {
        QuestionSourceKind::File => FileQuestionSource::new(&config.question_bank_path).load(),
        QuestionSourceKind::Store => QuestionSource::load(store),
    }
}
