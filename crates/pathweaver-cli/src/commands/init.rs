//! The `pathweaver init` command.

use anyhow::Result;

use pathweaver_core::model::{
    ContentItem, ContentStatus, ContentType, CurriculumPath, DifficultyBand, LearnerType,
};
use pathweaver_store::json_store::CatalogDocument;
use pathweaver_store::JsonStore;

pub fn execute() -> Result<()> {
    // Create pathweaver.toml
    if std::path::Path::new("pathweaver.toml").exists() {
        println!("pathweaver.toml already exists, skipping.");
    } else {
        std::fs::write("pathweaver.toml", SAMPLE_CONFIG)?;
        println!("Created pathweaver.toml");
    }

    // Create example question bank
    std::fs::create_dir_all("question-banks")?;
    let bank_path = std::path::Path::new("question-banks/diagnostic.toml");
    if bank_path.exists() {
        println!("question-banks/diagnostic.toml already exists, skipping.");
    } else {
        std::fs::write(bank_path, EXAMPLE_BANK)?;
        println!("Created question-banks/diagnostic.toml");
    }

    // Seed the content catalog so regeneration works out of the box
    let store = JsonStore::open("pathweaver-data")?;
    if std::path::Path::new("pathweaver-data/catalog.json").exists() {
        println!("pathweaver-data/catalog.json already exists, skipping.");
    } else {
        store.replace_catalog(seed_catalog())?;
        println!("Created pathweaver-data/catalog.json (seed catalog)");
    }

    println!("\nNext steps:");
    println!("  1. Edit pathweaver.toml with your API key (or leave it to run without AI ranking)");
    println!("  2. Run: pathweaver validate --bank question-banks/diagnostic.toml");
    println!("  3. Score a submission: pathweaver submit --answers answers.json");
    println!("  4. Build paths: pathweaver regenerate");

    Ok(())
}

fn seed_catalog() -> CatalogDocument {
    let item = |id: &str,
                title: &str,
                path_type: LearnerType,
                difficulty: DifficultyBand,
                content_type: ContentType,
                topic: &str,
                course_ref: &str| ContentItem {
        id: id.into(),
        title: title.into(),
        path_type,
        difficulty,
        content_type,
        topic: topic.into(),
        course_ref: course_ref.into(),
        status: ContentStatus::Published,
    };

    use ContentType::*;
    use DifficultyBand::*;
    use LearnerType::*;

    CatalogDocument {
        items: vec![
            item("aut-e-1", "Matching Shapes", Autism, Easy, Video, "shapes", "aut-foundations"),
            item("aut-e-2", "Color Cards", Autism, Easy, Image, "colors", "aut-foundations"),
            item("aut-m-1", "Counting With Blocks", Autism, Medium, Video, "numbers", "aut-foundations"),
            item("aut-m-2", "Daily Routine Steps", Autism, Medium, Document, "routines", "aut-life-skills"),
            item("aut-m-3", "Emotions Picture Quiz", Autism, Medium, Quiz, "emotions", "aut-life-skills"),
            item("aut-m-4", "Story Sequencing", Autism, Medium, Video, "reading", "aut-foundations"),
            item("aut-h-1", "Two-Step Word Problems", Autism, Hard, Document, "numbers", "aut-foundations"),
            item("aut-h-2", "Conversation Practice", Autism, Hard, Video, "social", "aut-life-skills"),
            item("ds-e-1", "Big and Small", DownSyndrome, Easy, Video, "comparisons", "ds-foundations"),
            item("ds-e-2", "Animal Sounds", DownSyndrome, Easy, Image, "animals", "ds-foundations"),
            item("ds-m-1", "Letter Tracing", DownSyndrome, Medium, Document, "writing", "ds-foundations"),
            item("ds-m-2", "Simple Additions", DownSyndrome, Medium, Quiz, "numbers", "ds-foundations"),
            item("ds-h-1", "Reading Short Stories", DownSyndrome, Hard, Document, "reading", "ds-foundations"),
        ],
        curricula: vec![
            CurriculumPath {
                id: "path-autism".into(),
                title: "Foundations for Autism Learners".into(),
                path_type: Autism,
            },
            CurriculumPath {
                id: "path-down-syndrome".into(),
                title: "Foundations for Down Syndrome Learners".into(),
                path_type: DownSyndrome,
            },
        ],
    }
}

const SAMPLE_CONFIG: &str = r#"# pathweaver configuration

default_provider = "anthropic"
default_model = "claude-sonnet-4-20250514"

# "file" reads question_bank_path; "store" reads the persisted bank.
question_source = "file"
question_bank_path = "question-banks/diagnostic.toml"

data_dir = "./pathweaver-data"
output_dir = "./pathweaver-reports"
parallelism = 4

# "replace" resets progress on regeneration; "preserve-status" carries
# entry statuses over for items that survive the new filter.
regeneration_policy = "replace"

[providers.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[providers.ollama]
type = "ollama"
base_url = "http://localhost:11434"

[ranker]
max_candidates = 80
timeout_secs = 30
"#;

const EXAMPLE_BANK: &str = r#"[question_bank]
id = "diagnostic-v1"
name = "Diagnostic Intake Quiz"

# --- Section 1: behavioral trait indicators -------------------------------

[[questions]]
id = "s1-q1"
section = 1
order = 1
prompt = "How does the student respond to changes in daily routine?"
options = [
    "Significant distress, needs routines kept identical",
    "Needs extra guidance and reassurance",
    "Mild discomfort, adapts with support",
    "Adapts without difficulty",
]

[questions.scoring.0]
autism = 2.5

[questions.scoring.1]
down_syndrome = 2.0

[[questions]]
id = "s1-q2"
section = 1
order = 2
prompt = "How does the student communicate wants and needs?"
options = [
    "Prefers gestures or devices over speech",
    "Short phrases with physical prompting",
    "Full sentences with occasional support",
    "Fluent conversation",
]

[questions.scoring.0]
autism = 2.0

[questions.scoring.1]
down_syndrome = 2.0

[[questions]]
id = "s1-q3"
section = 1
order = 3
prompt = "During group activities, the student usually:"
options = [
    "Plays alone, avoids eye contact",
    "Watches others, joins with encouragement",
    "Joins in after warming up",
    "Seeks out group play",
]

[questions.scoring.0]
autism = 2.0

[questions.scoring.1]
down_syndrome = 1.5

[[questions]]
id = "s1-q4"
section = 1
order = 4
prompt = "How does the student react to loud noises or bright lights?"
options = [
    "Covers ears or eyes, becomes upset",
    "Notices but is easily redirected",
    "Briefly distracted",
    "No particular reaction",
]

[questions.scoring.0]
autism = 1.5

[questions.scoring.1]
down_syndrome = 1.0

[[questions]]
id = "s1-q5"
section = 1
order = 5
prompt = "When focused on a favorite activity, the student:"
options = [
    "Becomes absorbed and resists interruption",
    "Needs help switching between tasks",
    "Switches with a short warning",
    "Switches easily",
]

[questions.scoring.0]
autism = 1.0

[questions.scoring.1]
down_syndrome = 0.5

# --- Section 2: knowledge check -------------------------------------------

[[questions]]
id = "s2-q1"
section = 2
order = 1
prompt = "Which picture shows a circle?"
options = ["The square", "The circle", "The triangle", "The star"]
correct_answer = 1

[[questions]]
id = "s2-q2"
section = 2
order = 2
prompt = "How many apples are in the picture of three apples?"
options = ["Three", "One", "Five", "Two"]
correct_answer = 0

[[questions]]
id = "s2-q3"
section = 2
order = 3
prompt = "Which animal says 'moo'?"
options = ["Dog", "Cat", "Cow", "Bird"]
correct_answer = 2

[[questions]]
id = "s2-q4"
section = 2
order = 4
prompt = "Which color is the sky on a sunny day?"
options = ["Green", "Blue", "Red", "Black"]
correct_answer = 1

[[questions]]
id = "s2-q5"
section = 2
order = 5
prompt = "What comes after the number 2?"
options = ["One", "Five", "Zero", "Three"]
correct_answer = 3

# --- Section 3: learning-style preferences --------------------------------

[[questions]]
id = "s3-q1"
section = 3
order = 1
prompt = "Which activity does the student enjoy most?"
options = [
    "Watching short videos",
    "Listening to stories",
    "Looking at picture books",
    "Hands-on games",
]

[questions.scoring.0]
autism = 1.0

[questions.scoring.1]
down_syndrome = 1.0

[[questions]]
id = "s3-q2"
section = 3
order = 2
prompt = "The student remembers things best when they:"
options = [
    "See them demonstrated",
    "Hear them repeated",
    "Practice them hands-on",
    "A mix of everything",
]

[questions.scoring.0]
autism = 0.5

[questions.scoring.1]
down_syndrome = 0.5

[[questions]]
id = "s3-q3"
section = 3
order = 3
prompt = "How long can the student stay with one activity?"
options = [
    "A long time, if it interests them",
    "A few minutes with encouragement",
    "Varies day to day",
    "Moves between activities quickly",
]

[questions.scoring.0]
autism = 0.5

[questions.scoring.1]
down_syndrome = 0.5
"#;
