//! End-to-end reconciliation passes against the in-memory store and
//! mock generator.

use ramayana_core::{Book, MemoryStore, MockGenerator, Progress, Reconciler};
use std::sync::Mutex;

const SCRIPT_LEN: usize = 4;

fn small_catalog() -> Vec<Book> {
    (1..=3)
        .map(|id| {
            Book::new(
                id,
                &format!("Pass Book {id}"),
                "A compact summary.",
                "Patience wins.",
            )
            .with_characters(&["Rama"])
            .with_beats(&["Begin", "Middle", "End"])
        })
        .collect()
}

fn engine() -> Reconciler<MemoryStore, MockGenerator> {
    Reconciler::new(
        MemoryStore::new(),
        MockGenerator::new().with_script_len(SCRIPT_LEN),
    )
}

fn silent() -> impl Fn(&Progress) + Send + Sync {
    |_: &Progress| {}
}

#[tokio::test]
async fn test_full_pass_fills_every_gap() {
    let engine = engine();
    let catalog = small_catalog();

    let report = engine.reconcile_all(&catalog, &silent()).await.unwrap();

    // Per book: one cover, one script, SCRIPT_LEN page images.
    let per_book = 2 + SCRIPT_LEN;
    assert_eq!(report.generated, catalog.len() * per_book);
    assert_eq!(report.verified, 0);
    assert!(report.is_clean());

    assert_eq!(engine.store().cover_count(), 3);
    assert_eq!(engine.store().script_count(), 3);
    assert_eq!(engine.store().page_image_count(), 3 * SCRIPT_LEN);
}

#[tokio::test]
async fn test_second_pass_is_a_no_op() {
    let engine = engine();
    let catalog = small_catalog();

    engine.reconcile_all(&catalog, &silent()).await.unwrap();
    let calls_after_first = engine.generator().total_calls();

    // Convergence: a repeated pass verifies everything and calls the
    // generator zero times.
    let report = engine.reconcile_all(&catalog, &silent()).await.unwrap();
    assert_eq!(report.generated, 0);
    assert_eq!(report.verified, catalog.len() * (2 + SCRIPT_LEN));
    assert_eq!(engine.generator().total_calls(), calls_after_first);
}

#[tokio::test]
async fn test_pass_resumes_past_preexisting_artifacts() {
    let engine = engine();
    let catalog = small_catalog();

    // Simulate an interrupted earlier pass: book 1 fully done, book 2's
    // cover done, book 3 untouched.
    engine.ensure_cover(&catalog[0]).await.unwrap();
    engine.ensure_script(&catalog[0]).await.unwrap();
    for page in 1..=SCRIPT_LEN as u32 {
        engine.ensure_page_image(&catalog[0], page).await.unwrap();
    }
    engine.ensure_cover(&catalog[1]).await.unwrap();
    let calls_before = engine.generator().total_calls();

    let report = engine.reconcile_all(&catalog, &silent()).await.unwrap();

    assert_eq!(report.verified, (2 + SCRIPT_LEN) + 1);
    assert_eq!(report.generated, (1 + SCRIPT_LEN) + (2 + SCRIPT_LEN));
    assert_eq!(
        engine.generator().total_calls(),
        calls_before + report.generated
    );
}

#[tokio::test]
async fn test_failures_are_reported_without_aborting_the_walk() {
    let engine = engine();
    let catalog = small_catalog();
    engine.generator().fail_scripts(true);

    let report = engine.reconcile_all(&catalog, &silent()).await.unwrap();

    // Covers still land for every book; each script failure is recorded
    // and its book's pages are skipped.
    assert_eq!(engine.store().cover_count(), 3);
    assert_eq!(engine.store().script_count(), 0);
    assert_eq!(engine.store().page_image_count(), 0);
    assert_eq!(report.failures.len(), 3);
    assert!(!report.is_clean());

    // A later healthy pass converges.
    engine.generator().fail_scripts(false);
    let report = engine.reconcile_all(&catalog, &silent()).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(engine.store().script_count(), 3);
    assert_eq!(engine.store().page_image_count(), 3 * SCRIPT_LEN);
}

#[tokio::test]
async fn test_progress_announces_each_generated_unit() {
    let engine = engine();
    let catalog = small_catalog();

    let seen: Mutex<Vec<String>> = Mutex::new(Vec::new());
    let sink = |p: &Progress| {
        seen.lock().unwrap().push(p.to_string());
    };

    let report = engine.reconcile_all(&catalog, &sink).await.unwrap();

    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), report.generated);
    assert!(seen[0].contains("Pass Book 1"));
    assert!(seen[0].contains("cover"));
    assert!(seen[1].contains("script"));
}

#[tokio::test]
async fn test_reset_then_pass_rebuilds_everything() {
    let engine = engine();
    let catalog = small_catalog();

    engine.reconcile_all(&catalog, &silent()).await.unwrap();
    engine.reset_all().await.unwrap();
    assert!(engine.store().is_empty());

    let report = engine.reconcile_all(&catalog, &silent()).await.unwrap();
    assert_eq!(report.generated, catalog.len() * (2 + SCRIPT_LEN));
    assert_eq!(report.verified, 0);
}
