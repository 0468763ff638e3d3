//! The `pathweaver regenerate` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use pathweaver_core::engine::{
    EngineConfig, ProgressReporter, RegenerationEngine, StudentOutcome,
};
use pathweaver_core::report::RegenerationReport;
use pathweaver_providers::build_ranker;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_student_start(&self, student_id: &str) {
        eprintln!("  Starting: {student_id}");
    }

    fn on_student_complete(&self, student_id: &str, assigned: usize, ai_recommended: usize) {
        eprintln!("  Done: {student_id} ({assigned} entries, {ai_recommended} AI-recommended)");
    }

    fn on_student_skipped(&self, student_id: &str) {
        eprintln!("  Skipped: {student_id} (no completed diagnostic)");
    }

    fn on_student_error(&self, student_id: &str, error: &str) {
        eprintln!("  ERROR: {student_id}: {error}");
    }

    fn on_batch_complete(
        &self,
        total: usize,
        succeeded: usize,
        skipped: usize,
        failed: usize,
        elapsed: Duration,
    ) {
        eprintln!(
            "\nComplete: {succeeded}/{total} regenerated, {skipped} skipped, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    student: Option<String>,
    parallelism: Option<usize>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = super::open_store(config_path.as_deref())?;

    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let ranker = build_ranker(&config);
    let engine = RegenerationEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        ranker,
        EngineConfig {
            parallelism,
            policy: config.regeneration_policy,
            pool_limit: config.ranker.max_candidates,
        },
    );

    if let Some(student_id) = student {
        match engine.regenerate_student(&student_id).await? {
            StudentOutcome::Regenerated { path, ai_count } => {
                println!(
                    "Regenerated path for {student_id}: {} entries ({ai_count} AI-recommended)",
                    path.assigned_content.len()
                );
            }
            StudentOutcome::Skipped => {
                println!("Skipped {student_id}: no completed diagnostic.");
            }
        }
        return Ok(());
    }

    let report = engine.regenerate_all(&ConsoleReporter).await?;

    print_summary(&report);

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let report_path = config.output_dir.join(format!("regeneration-{timestamp}.json"));
    report.save_json(&report_path)?;
    eprintln!("Report saved to: {}", report_path.display());

    Ok(())
}

fn print_summary(report: &RegenerationReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Students", "Regenerated", "Skipped", "Failed", "Duration"]);
    table.add_row(vec![
        Cell::new(report.total_students),
        Cell::new(report.succeeded),
        Cell::new(report.skipped),
        Cell::new(report.failed.len()),
        Cell::new(format!("{}ms", report.duration_ms)),
    ]);
    eprintln!("\n{table}");

    if report.has_failures() {
        let mut failures = Table::new();
        failures.set_header(vec!["Student", "Error"]);
        for f in &report.failed {
            failures.add_row(vec![Cell::new(&f.student_id), Cell::new(&f.error)]);
        }
        eprintln!("{failures}");
    }
}
