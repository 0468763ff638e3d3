//! pathweaver CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "pathweaver",
    version,
    about = "Diagnostic classification and personalized content curation engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a diagnostic quiz submission
    Submit {
        /// Path to a JSON answer set file
        #[arg(long)]
        answers: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Regenerate learning paths (all students, or one)
    Regenerate {
        /// Regenerate only this student
        #[arg(long)]
        student: Option<String>,

        /// Max concurrent per-student regenerations
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a student's current learning path
    Show {
        /// The student to show
        #[arg(long)]
        student: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a question bank TOML file
    Validate {
        /// Path to the question bank file
        #[arg(long)]
        bank: PathBuf,
    },

    /// Backfill difficulty bands for students scored before the band feature
    Backfill {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config, example question bank, and seed catalog
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pathweaver=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Submit { answers, config } => commands::submit::execute(answers, config).await,
        Commands::Regenerate {
            student,
            parallelism,
            config,
        } => commands::regenerate::execute(student, parallelism, config).await,
        Commands::Show { student, config } => commands::show::execute(student, config).await,
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Backfill { config } => commands::backfill::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
