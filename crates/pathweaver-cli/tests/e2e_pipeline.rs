//! End-to-end pipeline tests over the library crates.
//!
//! These run the full flow (submit → classify → curate → rank → write)
//! against the in-memory store and the mock text generator, without
//! touching the binary or the network.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use pathweaver_core::engine::{EngineConfig, NoopReporter, RegenerationEngine};
use pathweaver_core::error::EngineError;
use pathweaver_core::model::{
    AnswerSet, ContentItem, ContentStatus, ContentType, CurriculumPath, DifficultyBand,
    LearnerType, OptionWeights, Question, QuestionBank, Section,
};
use pathweaver_core::quiz::submit_answers;
use pathweaver_core::ranker::AiRanker;
use pathweaver_core::traits::{DiagnosticStore, PathStore, Ranker, StudentDirectory};
use pathweaver_providers::mock::MockGenerator;
use pathweaver_store::MemoryStore;

/// Bank tuned so that all-zero section-1 answers plus a [0] section-3
/// answer score autism 9.0 / down-syndrome 3.0, and section 2 has 12
/// knowledge questions.
fn bank() -> QuestionBank {
    let weighted = |autism: f64, down: f64| {
        let mut scoring = BTreeMap::new();
        if autism > 0.0 {
            scoring.insert(
                0,
                OptionWeights {
                    autism,
                    down_syndrome: 0.0,
                },
            );
        }
        if down > 0.0 {
            scoring.insert(
                1,
                OptionWeights {
                    autism: 0.0,
                    down_syndrome: down,
                },
            );
        }
        scoring
    };

    let mut questions = vec![
        Question {
            id: "s1-q1".into(),
            section: Section::Traits,
            order: 1,
            prompt: "routine changes".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            scoring: weighted(5.0, 0.0),
            correct_answer: None,
        },
        Question {
            id: "s1-q2".into(),
            section: Section::Traits,
            order: 2,
            prompt: "communication".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            scoring: weighted(4.0, 0.0),
            correct_answer: None,
        },
        Question {
            id: "s3-q1".into(),
            section: Section::Preferences,
            order: 1,
            prompt: "support needs".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            scoring: weighted(0.0, 3.0),
            correct_answer: None,
        },
    ];

    for order in 1..=12u32 {
        questions.push(Question {
            id: format!("s2-q{order}"),
            section: Section::Knowledge,
            order,
            prompt: format!("knowledge {order}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            scoring: BTreeMap::new(),
            correct_answer: Some(0),
        });
    }

    QuestionBank {
        id: "e2e".into(),
        name: "E2E Bank".into(),
        questions,
    }
}

/// Answers: section-1 option 0 on q1 (visual indicator, autism 5.0) and
/// option 0 on q2 (autism 4.0); 6 of 12 knowledge questions correct;
/// section-3 option 1 (down-syndrome 3.0).
fn answers(student_id: &str) -> AnswerSet {
    let mut section2 = vec![0usize; 6];
    section2.extend(vec![1usize; 6]);
    AnswerSet {
        student_id: student_id.into(),
        section1: vec![0, 0],
        section2,
        section3: vec![1],
    }
}

/// 10 published autism/medium items, 3 of them video, in catalog order.
fn catalog_items() -> Vec<ContentItem> {
    let item = |id: &str, content_type: ContentType| ContentItem {
        id: id.into(),
        title: id.to_uppercase(),
        path_type: LearnerType::Autism,
        difficulty: DifficultyBand::Medium,
        content_type,
        topic: "topic".into(),
        course_ref: "course".into(),
        status: ContentStatus::Published,
    };

    vec![
        item("d1", ContentType::Document),
        item("v1", ContentType::Video),
        item("d2", ContentType::Document),
        item("i1", ContentType::Image),
        item("v2", ContentType::Video),
        item("d3", ContentType::Document),
        item("q1", ContentType::Quiz),
        item("v3", ContentType::Video),
        item("d4", ContentType::Document),
        item("i2", ContentType::Image),
    ]
}

fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new()
            .with_items(catalog_items())
            .with_curricula(vec![CurriculumPath {
                id: "path-autism".into(),
                title: "Autism Path".into(),
                path_type: LearnerType::Autism,
            }]),
    )
}

fn engine(store: Arc<MemoryStore>, ranker: Arc<dyn Ranker>) -> RegenerationEngine {
    RegenerationEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        ranker,
        EngineConfig::default(),
    )
}

#[tokio::test]
async fn submit_classifies_the_spec_scenario() {
    let store = seeded_store();

    let outcome = submit_answers(store.as_ref(), store.as_ref(), &bank(), answers("s1"))
        .await
        .unwrap();

    // autism 9 / down 3, accuracy exactly 0.5: autism profile, Medium
    // band (50% is inclusive of Medium), and no low-accuracy bonus.
    assert_eq!(outcome.student_type, LearnerType::Autism);
    assert_eq!(outcome.autism_score, 9.0);
    assert_eq!(outcome.down_syndrome_score, 3.0);
    assert_eq!(outcome.accuracy, 50);

    let student = store.get_student("s1").await.unwrap().unwrap();
    assert_eq!(student.determined_type, Some(LearnerType::Autism));
    assert_eq!(student.current_difficulty, Some(DifficultyBand::Medium));
}

#[tokio::test]
async fn full_pipeline_with_ai_recommendations() {
    let store = seeded_store();
    submit_answers(store.as_ref(), store.as_ref(), &bank(), answers("s1"))
        .await
        .unwrap();

    // Pool is in catalog order, so 1-based index 9 is "d4"; 8 ("v3") and
    // 1 ("d1") land in the base set and must be deduplicated away.
    let generator = Arc::new(MockGenerator::with_text("[8, 9, 1]"));
    let ranker = Arc::new(AiRanker::new(generator.clone(), "mock-model"));

    let report = engine(store.clone(), ranker)
        .regenerate_all(&NoopReporter)
        .await
        .unwrap();
    assert_eq!(report.succeeded, 1);
    assert!(report.failed.is_empty());
    assert_eq!(generator.call_count(), 1);

    let path = store.get_path("s1").await.unwrap().unwrap();
    assert_eq!(path.curriculum_path_id, "path-autism");

    // Base: ceil(0.7 * 10) = 7, videos first in stable order. One AI
    // entry survives dedup and is prepended with high priority.
    let ids: Vec<&str> = path
        .assigned_content
        .iter()
        .map(|e| e.content_id.as_str())
        .collect();
    assert_eq!(ids, vec!["d4", "v1", "v2", "v3", "d1", "d2", "i1", "d3"]);

    assert!(path.assigned_content[0].ai_recommended);
    assert!(path.assigned_content[1..]
        .iter()
        .all(|e| !e.ai_recommended));
}

#[tokio::test]
async fn degraded_ranker_still_curates_the_base_set() {
    for generator in [
        MockGenerator::failing("service unavailable"),
        MockGenerator::with_text("sorry, I cannot pick items"),
        MockGenerator::hanging(Duration::from_secs(60)),
    ] {
        let store = seeded_store();
        submit_answers(store.as_ref(), store.as_ref(), &bank(), answers("s1"))
            .await
            .unwrap();

        let ranker = Arc::new(
            AiRanker::new(Arc::new(generator), "mock-model")
                .with_timeout(Duration::from_millis(50)),
        );

        let report = engine(store.clone(), ranker)
            .regenerate_all(&NoopReporter)
            .await
            .unwrap();

        // Degraded AI is not a failure: the base set lands regardless.
        assert_eq!(report.succeeded, 1);
        assert!(report.failed.is_empty());

        let path = store.get_path("s1").await.unwrap().unwrap();
        assert_eq!(path.assigned_content.len(), 7);
        assert!(path.assigned_content.iter().all(|e| !e.ai_recommended));
    }
}

#[tokio::test]
async fn regeneration_is_idempotent() {
    let store = seeded_store();
    submit_answers(store.as_ref(), store.as_ref(), &bank(), answers("s1"))
        .await
        .unwrap();

    let ranker = Arc::new(AiRanker::new(
        Arc::new(MockGenerator::with_text("[9]")),
        "mock-model",
    ));
    let engine = engine(store.clone(), ranker);

    engine.regenerate_all(&NoopReporter).await.unwrap();
    let first = store.get_path("s1").await.unwrap().unwrap();

    engine.regenerate_all(&NoopReporter).await.unwrap();
    let second = store.get_path("s1").await.unwrap().unwrap();

    let ids = |p: &pathweaver_core::model::StudentPath| -> Vec<String> {
        p.assigned_content
            .iter()
            .map(|e| e.content_id.clone())
            .collect()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn duplicate_submission_races_admit_exactly_one() {
    let store = seeded_store();
    let bank = Arc::new(bank());

    let mut handles = Vec::new();
    for _ in 0..4 {
        let store = Arc::clone(&store);
        let bank = Arc::clone(&bank);
        handles.push(tokio::spawn(async move {
            submit_answers(store.as_ref(), store.as_ref(), &bank, answers("racer")).await
        }));
    }

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(EngineError::AlreadyCompleted(_)) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 1);
    assert_eq!(rejected, 3);
    assert_eq!(store.list_results().await.unwrap().len(), 1);
}
