//! The `pathweaver backfill` command.

use std::path::PathBuf;

use anyhow::Result;

use pathweaver_core::migration::backfill_difficulty;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let (_config, store) = super::open_store(config_path.as_deref())?;

    let outcome = backfill_difficulty(store.as_ref(), store.as_ref()).await?;

    println!(
        "Backfill complete: {} updated, {} already had a band.",
        outcome.updated, outcome.skipped
    );
    Ok(())
}
