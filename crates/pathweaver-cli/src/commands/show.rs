//! The `pathweaver show` command — the student-facing path read surface.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use pathweaver_core::model::{
    AssignedContentEntry, ContentItem, ContentStatus, DifficultyBand, EntryStatus, Priority,
};
use pathweaver_core::traits::{ContentCatalog, PathStore, StudentDirectory};

pub async fn execute(student_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let (_config, store) = super::open_store(config_path.as_deref())?;

    let student = store
        .get_student(&student_id)
        .await?
        .with_context(|| format!("unknown student: {student_id}"))?;

    let Some(learner_type) = student.determined_type else {
        println!("{student_id} has not completed the diagnostic yet.");
        return Ok(());
    };

    let Some(path) = store.get_path(&student_id).await? else {
        println!("{student_id} has no learning path yet. Run: pathweaver regenerate --student {student_id}");
        return Ok(());
    };

    let curriculum = store.find_curriculum(learner_type).await?;
    let band = student
        .current_difficulty
        .map(|b| b.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    match curriculum {
        Some(c) => println!("Path: {} [{}] ({learner_type}, {band})", c.title, c.id),
        None => println!("Path: {} ({learner_type}, {band})", path.curriculum_path_id),
    }
    println!("Status: {:?}, {} entries\n", path.status, path.assigned_content.len());

    // Resolve assigned ids against the catalog to rebuild the
    // course -> topic -> item tree, filtered to the assignment.
    let catalog_items = store
        .find_items(learner_type, &DifficultyBand::ALL, ContentStatus::Published)
        .await?;

    let entries: BTreeMap<&str, &AssignedContentEntry> = path
        .assigned_content
        .iter()
        .map(|e| (e.content_id.as_str(), e))
        .collect();

    let mut tree: BTreeMap<&str, BTreeMap<&str, Vec<(&ContentItem, &AssignedContentEntry)>>> =
        BTreeMap::new();
    for item in &catalog_items {
        if let Some(entry) = entries.get(item.id.as_str()) {
            tree.entry(item.course_ref.as_str())
                .or_default()
                .entry(item.topic.as_str())
                .or_default()
                .push((item, entry));
        }
    }

    for (course, topics) in &tree {
        println!("{course}");
        for (topic, items) in topics {
            println!("  {topic}");
            for (item, entry) in items {
                println!(
                    "    [{}] {} ({}){}{}",
                    status_marker(entry.status),
                    item.title,
                    item.content_type,
                    if entry.priority == Priority::High { " *high*" } else { "" },
                    if entry.ai_recommended { " (AI)" } else { "" },
                );
            }
        }
    }

    // Entries whose items are no longer published still belong to the path.
    let orphaned = path
        .assigned_content
        .iter()
        .filter(|e| !catalog_items.iter().any(|i| i.id == e.content_id))
        .count();
    if orphaned > 0 {
        println!("\n{orphaned} assigned item(s) are no longer published.");
    }

    Ok(())
}

fn status_marker(status: EntryStatus) -> &'static str {
    match status {
        EntryStatus::Pending => " ",
        EntryStatus::InProgress => "~",
        EntryStatus::Completed => "x",
    }
}
