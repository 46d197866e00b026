//! The reconciliation engine.
//!
//! Guarantees that, for any content unit (cover, script, page image,
//! lore), the persisted artifact and the displayed state eventually
//! agree, using at most one generation call per missing unit and never
//! clobbering an artifact that already exists.
//!
//! Per-unit state machine: `Absent -> Generating -> Present | Absent`.
//! `Present` is terminal for the automatic path; only [`Reconciler::reset_all`]
//! (or the explicit lore regeneration) re-enters generation for an
//! existing unit.

use crate::catalog::Book;
use crate::content::{Lore, Page};
use crate::generator::{ContentGenerator, GenerateError};
use crate::store::{ArtifactStore, StoreError};
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

/// Errors from engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("generation failed: {0}")]
    Generator(#[from] GenerateError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Painting was requested for a page whose script was never
    /// generated, or whose script has no such page number. Distinct from
    /// a generator failure: nothing was attempted.
    #[error("book {book_id} has no generated script page {page_number}")]
    MissingPage { book_id: u32, page_number: u32 },

    #[error("a full reconcile pass is already running")]
    PassInProgress,
}

/// A content unit within one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Cover,
    Script,
    PageImage(u32),
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Cover => write!(f, "cover"),
            Unit::Script => write!(f, "script"),
            Unit::PageImage(n) => write!(f, "image for page {n}"),
        }
    }
}

/// A progress event emitted before each generation call of a bulk pass.
#[derive(Debug, Clone)]
pub struct Progress {
    pub book_id: u32,
    pub book_title: String,
    pub unit: Unit,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book {} \u{201c}{}\u{201d}: generating {}",
            self.book_id, self.book_title, self.unit
        )
    }
}

/// Receiver for bulk-pass progress events.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: &Progress);
}

impl<F: Fn(&Progress) + Send + Sync> ProgressSink for F {
    fn report(&self, progress: &Progress) {
        self(progress)
    }
}

/// A unit that failed during a bulk pass.
#[derive(Debug, Clone)]
pub struct UnitFailure {
    pub book_id: u32,
    pub unit: Unit,
    pub error: String,
}

/// Outcome of one best-effort reconcile pass.
///
/// The pass is complete when every book has been visited once, not
/// necessarily when every gap is filled.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Units generated and persisted by this pass.
    pub generated: usize,
    /// Units that were already present and were skipped with zero
    /// generator calls.
    pub verified: usize,
    /// Units whose generation or persistence failed; they remain absent.
    pub failures: Vec<UnitFailure>,
}

impl PassReport {
    /// True when the pass filled every gap it found.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Read-only merged view of one catalog entry against the store: the
/// immutable book descriptor joined with its current artifact state.
#[derive(Debug, Clone)]
pub struct BookStatus<'a> {
    pub book: &'a Book,
    pub has_cover: bool,
    pub has_script: bool,
    pub is_generating: bool,
}

/// Transient per-unit "in progress" indicators, owned by the engine and
/// exposed to the presentation layer. Cleared on every exit path.
#[derive(Default)]
struct StatusBoard {
    covers: Mutex<HashSet<u32>>,
    pages: Mutex<HashSet<(u32, u32)>>,
}

impl StatusBoard {
    fn begin_cover(&self, book_id: u32) {
        self.covers.lock().expect("status lock").insert(book_id);
    }

    fn end_cover(&self, book_id: u32) {
        self.covers.lock().expect("status lock").remove(&book_id);
    }

    fn begin_page(&self, book_id: u32, page_number: u32) {
        self.pages
            .lock()
            .expect("status lock")
            .insert((book_id, page_number));
    }

    fn end_page(&self, book_id: u32, page_number: u32) {
        self.pages
            .lock()
            .expect("status lock")
            .remove(&(book_id, page_number));
    }

    fn clear(&self) {
        self.covers.lock().expect("status lock").clear();
        self.pages.lock().expect("status lock").clear();
    }
}

/// Clears the bulk-pass guard and progress message when the pass ends,
/// on success and failure alike.
struct PassGuard<'a> {
    active: &'a AtomicBool,
    message: &'a Mutex<Option<String>>,
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        *self.message.lock().expect("pass message lock") = None;
        self.active.store(false, Ordering::SeqCst);
    }
}

/// The reconciliation engine.
///
/// Walks content units, checks the store, and generates only what is
/// missing. Single-unit operations may interleave freely; the bulk pass
/// is mutually exclusive with itself via a check-and-set flag. There is
/// no unit-level lock: a single-unit action racing a bulk pass on the
/// same unit may generate twice, last write wins.
pub struct Reconciler<S, G> {
    store: S,
    generator: G,
    /// Scripts already loaded or generated this session, so page lookups
    /// avoid re-reading the store.
    scripts: RwLock<std::collections::HashMap<u32, Vec<Page>>>,
    status: StatusBoard,
    pass_active: AtomicBool,
    pass_message: Mutex<Option<String>>,
}

impl<S: ArtifactStore, G: ContentGenerator> Reconciler<S, G> {
    /// Create an engine over a store and a generator.
    pub fn new(store: S, generator: G) -> Self {
        Self {
            store,
            generator,
            scripts: RwLock::new(std::collections::HashMap::new()),
            status: StatusBoard::default(),
            pass_active: AtomicBool::new(false),
            pass_message: Mutex::new(None),
        }
    }

    /// The underlying artifact store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The underlying content generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }

    // ------------------------------------------------------------------
    // Transient state accessors
    // ------------------------------------------------------------------

    /// Whether a cover generation is in flight for this book.
    pub fn is_generating(&self, book_id: u32) -> bool {
        self.status
            .covers
            .lock()
            .expect("status lock")
            .contains(&book_id)
    }

    /// Whether a page image generation is in flight.
    pub fn is_painting(&self, book_id: u32, page_number: u32) -> bool {
        self.status
            .pages
            .lock()
            .expect("status lock")
            .contains(&(book_id, page_number))
    }

    /// Whether a bulk reconcile pass is running.
    pub fn pass_running(&self) -> bool {
        self.pass_active.load(Ordering::SeqCst)
    }

    /// The current bulk-pass progress message, if a pass is running.
    pub fn progress_message(&self) -> Option<String> {
        self.pass_message.lock().expect("pass message lock").clone()
    }

    // ------------------------------------------------------------------
    // Fail-open store reads
    // ------------------------------------------------------------------

    // Store read errors are treated as "not cached": the unit will be
    // regenerated rather than surfacing a read fault (spec'd fail-open
    // behavior for the read side).

    async fn stored_cover(&self, book_id: u32) -> Option<String> {
        match self.store.get_cover(book_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(book_id, error = %e, "cover read failed; treating as absent");
                None
            }
        }
    }

    async fn stored_script(&self, book_id: u32) -> Option<Vec<Page>> {
        match self.store.get_script(book_id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(book_id, error = %e, "script read failed; treating as absent");
                None
            }
        }
    }

    async fn stored_page_image(&self, book_id: u32, page_number: u32) -> Option<String> {
        match self.store.get_page_image(book_id, page_number).await {
            Ok(found) => found,
            Err(e) => {
                warn!(book_id, page_number, error = %e, "page image read failed; treating as absent");
                None
            }
        }
    }

    async fn stored_lore(&self) -> Option<Lore> {
        match self.store.get_lore().await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "lore read failed; treating as absent");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Single-unit operations
    // ------------------------------------------------------------------

    /// Return the book's cover, generating and persisting it first if the
    /// store has none. Exactly one store write on success, zero on failure.
    pub async fn ensure_cover(&self, book: &Book) -> Result<String, EngineError> {
        if let Some(image) = self.stored_cover(book.id).await {
            return Ok(image);
        }

        self.status.begin_cover(book.id);
        let generated = self.generator.paint_cover(book).await;
        self.status.end_cover(book.id);

        let image = generated?;
        self.store.put_cover(book.id, &image).await?;
        Ok(image)
    }

    /// Return the book's script, generating and persisting it first if
    /// the store has none. The script is cached in memory for page
    /// lookups within this session.
    pub async fn ensure_script(&self, book: &Book) -> Result<Vec<Page>, EngineError> {
        if let Some(pages) = self.cached_script(book.id).await {
            return Ok(pages);
        }

        if let Some(pages) = self.stored_script(book.id).await {
            self.cache_script(book.id, pages.clone()).await;
            return Ok(pages);
        }

        let pages = self.generator.write_script(book).await?;
        if pages.is_empty() {
            return Err(GenerateError::EmptyPayload("script contained no pages".to_string()).into());
        }

        self.store.put_script(book.id, &pages).await?;
        self.cache_script(book.id, pages.clone()).await;
        Ok(pages)
    }

    /// Return the image for one page, generating and persisting it first
    /// if the store has none.
    ///
    /// The target page is resolved from the in-memory script when
    /// present, else from a fresh read of the persisted script. A book
    /// with no script, or a script without this page number, fails with
    /// [`EngineError::MissingPage`] before any generation is attempted.
    pub async fn ensure_page_image(
        &self,
        book: &Book,
        page_number: u32,
    ) -> Result<String, EngineError> {
        let page = self
            .resolve_page(book.id, page_number)
            .await
            .ok_or(EngineError::MissingPage {
                book_id: book.id,
                page_number,
            })?;

        if let Some(image) = self.stored_page_image(book.id, page_number).await {
            return Ok(image);
        }

        self.status.begin_page(book.id, page_number);
        let generated = self.generator.paint_page(&page, &book.title).await;
        self.status.end_page(book.id, page_number);

        let image = generated?;
        self.store.put_page_image(book.id, page_number, &image).await?;
        Ok(image)
    }

    /// Return the shared lore object, generating and persisting it once
    /// if absent.
    pub async fn ensure_lore(&self) -> Result<Lore, EngineError> {
        if let Some(lore) = self.stored_lore().await {
            return Ok(lore);
        }
        self.generate_and_store_lore().await
    }

    /// Unconditionally regenerate the lore and overwrite the stored copy.
    ///
    /// Lore is the one artifact class with explicit overwrite-on-demand;
    /// covers, scripts and page images are only ever cleared wholesale.
    pub async fn regenerate_lore(&self) -> Result<Lore, EngineError> {
        self.generate_and_store_lore().await
    }

    async fn generate_and_store_lore(&self) -> Result<Lore, EngineError> {
        let lore = self.generator.write_lore().await?;
        self.store.put_lore(&lore).await?;
        Ok(lore)
    }

    /// Clear every artifact class in the store, along with the session's
    /// script cache and transient indicators. Irreversible.
    pub async fn reset_all(&self) -> Result<(), EngineError> {
        self.store.clear_all().await?;
        self.scripts.write().await.clear();
        self.status.clear();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bulk reconciliation
    // ------------------------------------------------------------------

    /// Walk the catalog in ascending book-id order and generate every
    /// missing unit: cover, then script, then page images in ascending
    /// page order. Already-present units are skipped with zero generator
    /// calls, which also makes an interrupted pass resumable: restarting
    /// re-verifies completed units and continues from the first gap.
    ///
    /// A unit's failure is recorded in the report and the walk proceeds
    /// to the next unit. Only one pass may run at a time; a concurrent
    /// invocation fails fast with [`EngineError::PassInProgress`].
    pub async fn reconcile_all(
        &self,
        catalog: &[Book],
        sink: &dyn ProgressSink,
    ) -> Result<PassReport, EngineError> {
        if self
            .pass_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(EngineError::PassInProgress);
        }
        let _guard = PassGuard {
            active: &self.pass_active,
            message: &self.pass_message,
        };

        let mut books: Vec<&Book> = catalog.iter().collect();
        books.sort_by_key(|b| b.id);

        let mut report = PassReport::default();

        for book in books {
            // Cover.
            if self.stored_cover(book.id).await.is_some() {
                report.verified += 1;
            } else {
                self.announce(sink, book, Unit::Cover);
                match self.ensure_cover(book).await {
                    Ok(_) => report.generated += 1,
                    Err(e) => report.failures.push(UnitFailure {
                        book_id: book.id,
                        unit: Unit::Cover,
                        error: e.to_string(),
                    }),
                }
            }

            // Script. Without one there are no pages to paint, so a
            // failure here moves on to the next book.
            let pages = if let Some(pages) = self.stored_script(book.id).await {
                report.verified += 1;
                self.cache_script(book.id, pages.clone()).await;
                Some(pages)
            } else {
                self.announce(sink, book, Unit::Script);
                match self.ensure_script(book).await {
                    Ok(pages) => {
                        report.generated += 1;
                        Some(pages)
                    }
                    Err(e) => {
                        report.failures.push(UnitFailure {
                            book_id: book.id,
                            unit: Unit::Script,
                            error: e.to_string(),
                        });
                        None
                    }
                }
            };
            let Some(mut pages) = pages else { continue };

            // Page images, ascending.
            pages.sort_by_key(|p| p.page_number);
            for page in &pages {
                if self.stored_page_image(book.id, page.page_number).await.is_some() {
                    report.verified += 1;
                    continue;
                }
                self.announce(sink, book, Unit::PageImage(page.page_number));
                match self.ensure_page_image(book, page.page_number).await {
                    Ok(_) => report.generated += 1,
                    Err(e) => report.failures.push(UnitFailure {
                        book_id: book.id,
                        unit: Unit::PageImage(page.page_number),
                        error: e.to_string(),
                    }),
                }
            }
        }

        Ok(report)
    }

    /// Compute the read-only merged view of the catalog against the
    /// store. The catalog itself is never mutated; generated state is
    /// joined on per call.
    pub async fn library_view<'a>(&self, catalog: &'a [Book]) -> Vec<BookStatus<'a>> {
        let mut view = Vec::with_capacity(catalog.len());
        for book in catalog {
            view.push(BookStatus {
                book,
                has_cover: self.stored_cover(book.id).await.is_some(),
                has_script: self.stored_script(book.id).await.is_some(),
                is_generating: self.is_generating(book.id),
            });
        }
        view
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn announce(&self, sink: &dyn ProgressSink, book: &Book, unit: Unit) {
        let progress = Progress {
            book_id: book.id,
            book_title: book.title.clone(),
            unit,
        };
        *self.pass_message.lock().expect("pass message lock") = Some(progress.to_string());
        sink.report(&progress);
    }

    async fn cached_script(&self, book_id: u32) -> Option<Vec<Page>> {
        self.scripts.read().await.get(&book_id).cloned()
    }

    async fn cache_script(&self, book_id: u32, pages: Vec<Page>) {
        self.scripts.write().await.insert(book_id, pages);
    }

    async fn resolve_page(&self, book_id: u32, page_number: u32) -> Option<Page> {
        let pages = match self.cached_script(book_id).await {
            Some(pages) => pages,
            None => {
                let pages = self.stored_script(book_id).await?;
                self.cache_script(book_id, pages.clone()).await;
                pages
            }
        };
        pages.into_iter().find(|p| p.page_number == page_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{sample_book, MockGenerator, TestHarness};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tokio::sync::Semaphore;

    #[tokio::test]
    async fn test_ensure_cover_generates_once() {
        let harness = TestHarness::new();
        let book = sample_book(1);

        let first = harness.engine.ensure_cover(&book).await.unwrap();
        assert_eq!(harness.engine.generator().cover_calls(), 1);
        assert_eq!(harness.engine.store().put_count(), 1);

        // Present is terminal: a second ensure returns the stored
        // artifact with zero further generator calls and zero writes.
        let second = harness.engine.ensure_cover(&book).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(harness.engine.generator().cover_calls(), 1);
        assert_eq!(harness.engine.store().put_count(), 1);
    }

    #[tokio::test]
    async fn test_ensure_cover_failure_writes_nothing() {
        let harness = TestHarness::new();
        harness.engine.generator().fail_covers(true);
        let book = sample_book(1);

        let result = harness.engine.ensure_cover(&book).await;
        assert!(matches!(result, Err(EngineError::Generator(_))));
        assert!(harness.engine.store().is_empty());
        // The transient indicator is cleared on the failure path too.
        assert!(!harness.engine.is_generating(1));
    }

    #[tokio::test]
    async fn test_ensure_script_round_trip_scenario() {
        // Store empty, book 1, 24-page script not yet generated.
        let harness = TestHarness::new();
        let book = sample_book(1);

        let pages = harness.engine.ensure_script(&book).await.unwrap();
        assert_eq!(pages.len(), 24);
        assert_eq!(harness.engine.store().script_count(), 1);

        let again = harness.engine.ensure_script(&book).await.unwrap();
        assert_eq!(again, pages);
        assert_eq!(harness.engine.generator().script_calls(), 1);
    }

    #[tokio::test]
    async fn test_ensure_script_propagates_empty_payload() {
        let harness = TestHarness::with_pages(0);
        let book = sample_book(1);

        let result = harness.engine.ensure_script(&book).await;
        assert!(matches!(
            result,
            Err(EngineError::Generator(GenerateError::EmptyPayload(_)))
        ));
        assert!(harness.engine.store().is_empty());
    }

    #[tokio::test]
    async fn test_page_image_requires_script() {
        let harness = TestHarness::new();
        let book = sample_book(3);

        // No script anywhere: painting must fail with the
        // missing-content condition, not silently skip or generate.
        let result = harness.engine.ensure_page_image(&book, 1).await;
        assert!(matches!(
            result,
            Err(EngineError::MissingPage {
                book_id: 3,
                page_number: 1
            })
        ));
        assert_eq!(harness.engine.generator().page_calls(), 0);
    }

    #[tokio::test]
    async fn test_page_image_unknown_page_number() {
        let harness = TestHarness::new();
        let book = sample_book(3);
        harness.engine.ensure_script(&book).await.unwrap();

        let result = harness.engine.ensure_page_image(&book, 99).await;
        assert!(matches!(result, Err(EngineError::MissingPage { .. })));
    }

    #[tokio::test]
    async fn test_page_image_cached_after_first_paint() {
        // Book 5 has a persisted script but no image for page 3.
        let harness = TestHarness::new();
        let book = sample_book(5);
        harness.engine.ensure_script(&book).await.unwrap();

        let image = harness.engine.ensure_page_image(&book, 3).await.unwrap();
        assert_eq!(harness.engine.generator().page_calls(), 1);

        let cached = harness.engine.ensure_page_image(&book, 3).await.unwrap();
        assert_eq!(cached, image);
        assert_eq!(harness.engine.generator().page_calls(), 1);
    }

    #[tokio::test]
    async fn test_page_image_resolves_from_persisted_script() {
        // Engine A generates the script; engine B shares the store but
        // has a cold cache and must resolve the page from persistence.
        let store = Arc::new(MemoryStore::new());
        let writer = Reconciler::new(Arc::clone(&store), MockGenerator::new());
        let book = sample_book(2);
        writer.ensure_script(&book).await.unwrap();

        let reader = Reconciler::new(store, MockGenerator::new());
        let image = reader.ensure_page_image(&book, 2).await.unwrap();
        assert!(!image.is_empty());
    }

    #[tokio::test]
    async fn test_page_paint_failure_clears_indicator() {
        let harness = TestHarness::new();
        let book = sample_book(1);
        harness.engine.ensure_script(&book).await.unwrap();
        harness.engine.generator().fail_pages(true);

        let result = harness.engine.ensure_page_image(&book, 1).await;
        assert!(result.is_err());
        assert!(!harness.engine.is_painting(1, 1));
        assert_eq!(harness.engine.store().page_image_count(), 0);
    }

    #[tokio::test]
    async fn test_lore_generated_once_then_overwritten_on_demand() {
        let harness = TestHarness::new();

        let first = harness.engine.ensure_lore().await.unwrap();
        let second = harness.engine.ensure_lore().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(harness.engine.generator().lore_calls(), 1);

        // Explicit regeneration bypasses the presence check.
        harness.engine.regenerate_lore().await.unwrap();
        assert_eq!(harness.engine.generator().lore_calls(), 2);
    }

    #[tokio::test]
    async fn test_reset_all_clears_every_class() {
        let harness = TestHarness::new();
        let book = sample_book(1);

        harness.engine.ensure_cover(&book).await.unwrap();
        harness.engine.ensure_script(&book).await.unwrap();
        harness.engine.ensure_page_image(&book, 1).await.unwrap();
        harness.engine.ensure_lore().await.unwrap();
        assert!(!harness.engine.store().is_empty());

        harness.engine.reset_all().await.unwrap();
        assert!(harness.engine.store().is_empty());

        // Regeneration after reset goes back through the generator.
        harness.engine.ensure_cover(&book).await.unwrap();
        assert_eq!(harness.engine.generator().cover_calls(), 2);
    }

    #[tokio::test]
    async fn test_generating_flag_visible_mid_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let generator = MockGenerator::new();
        generator.hold_at(Arc::clone(&gate));

        let engine = Arc::new(Reconciler::new(MemoryStore::new(), generator));
        let book = sample_book(1);

        let task = {
            let engine = Arc::clone(&engine);
            let book = book.clone();
            tokio::spawn(async move { engine.ensure_cover(&book).await })
        };

        // Wait for the generation to start, then observe the flag.
        while !engine.is_generating(1) {
            tokio::task::yield_now().await;
        }
        assert!(engine.is_generating(1));

        gate.add_permits(10);
        task.await.unwrap().unwrap();
        assert!(!engine.is_generating(1));
    }

    #[tokio::test]
    async fn test_second_bulk_pass_is_rejected_while_running() {
        let gate = Arc::new(Semaphore::new(0));
        let generator = MockGenerator::new().with_script_len(2);
        generator.hold_at(Arc::clone(&gate));

        let engine = Arc::new(Reconciler::new(MemoryStore::new(), generator));
        let catalog = vec![sample_book(1)];

        let task = {
            let engine = Arc::clone(&engine);
            let catalog = catalog.clone();
            tokio::spawn(async move { engine.reconcile_all(&catalog, &|_: &Progress| {}).await })
        };

        while !engine.pass_running() {
            tokio::task::yield_now().await;
        }

        let second = engine.reconcile_all(&catalog, &|_: &Progress| {}).await;
        assert!(matches!(second, Err(EngineError::PassInProgress)));

        gate.add_permits(100);
        let report = task.await.unwrap().unwrap();
        assert!(report.is_clean());

        // Guard released: a new pass may start.
        assert!(!engine.pass_running());
        assert!(engine.progress_message().is_none());
        engine.reconcile_all(&catalog, &|_: &Progress| {}).await.unwrap();
    }

    /// A store whose reads always fail; reads must fail open to "absent"
    /// so the unit is regenerated instead of surfacing the fault.
    struct UnreadableStore {
        inner: MemoryStore,
    }

    fn read_failure() -> StoreError {
        StoreError::Io(std::io::Error::other("disk on fire"))
    }

    #[async_trait]
    impl ArtifactStore for UnreadableStore {
        async fn get_cover(&self, _book_id: u32) -> Result<Option<String>, StoreError> {
            Err(read_failure())
        }
        async fn put_cover(&self, book_id: u32, image: &str) -> Result<(), StoreError> {
            self.inner.put_cover(book_id, image).await
        }
        async fn get_script(&self, _book_id: u32) -> Result<Option<Vec<Page>>, StoreError> {
            Err(read_failure())
        }
        async fn put_script(&self, book_id: u32, pages: &[Page]) -> Result<(), StoreError> {
            self.inner.put_script(book_id, pages).await
        }
        async fn get_page_image(
            &self,
            _book_id: u32,
            _page_number: u32,
        ) -> Result<Option<String>, StoreError> {
            Err(read_failure())
        }
        async fn put_page_image(
            &self,
            book_id: u32,
            page_number: u32,
            image: &str,
        ) -> Result<(), StoreError> {
            self.inner.put_page_image(book_id, page_number, image).await
        }
        async fn get_lore(&self) -> Result<Option<Lore>, StoreError> {
            Err(read_failure())
        }
        async fn put_lore(&self, lore: &Lore) -> Result<(), StoreError> {
            self.inner.put_lore(lore).await
        }
        async fn clear_all(&self) -> Result<(), StoreError> {
            self.inner.clear_all().await
        }
    }

    #[tokio::test]
    async fn test_store_read_failure_fails_open() {
        let store = UnreadableStore {
            inner: MemoryStore::new(),
        };
        let engine = Reconciler::new(store, MockGenerator::new());
        let book = sample_book(1);

        // The read fault is absorbed; the cover is generated and written.
        let image = engine.ensure_cover(&book).await.unwrap();
        assert!(image.starts_with("data:image/png;base64,"));
        assert_eq!(engine.generator().cover_calls(), 1);
        assert_eq!(engine.store().inner.cover_count(), 1);
    }

    /// A store whose writes always fail; a single-unit caller must see
    /// the store error, while a bulk pass records it and moves on.
    struct UnwritableStore {
        inner: MemoryStore,
    }

    fn write_failure() -> StoreError {
        StoreError::Io(std::io::Error::other("disk full"))
    }

    #[async_trait]
    impl ArtifactStore for UnwritableStore {
        async fn get_cover(&self, book_id: u32) -> Result<Option<String>, StoreError> {
            self.inner.get_cover(book_id).await
        }
        async fn put_cover(&self, _book_id: u32, _image: &str) -> Result<(), StoreError> {
            Err(write_failure())
        }
        async fn get_script(&self, book_id: u32) -> Result<Option<Vec<Page>>, StoreError> {
            self.inner.get_script(book_id).await
        }
        async fn put_script(&self, _book_id: u32, _pages: &[Page]) -> Result<(), StoreError> {
            Err(write_failure())
        }
        async fn get_page_image(
            &self,
            book_id: u32,
            page_number: u32,
        ) -> Result<Option<String>, StoreError> {
            self.inner.get_page_image(book_id, page_number).await
        }
        async fn put_page_image(
            &self,
            _book_id: u32,
            _page_number: u32,
            _image: &str,
        ) -> Result<(), StoreError> {
            Err(write_failure())
        }
        async fn get_lore(&self) -> Result<Option<Lore>, StoreError> {
            self.inner.get_lore().await
        }
        async fn put_lore(&self, _lore: &Lore) -> Result<(), StoreError> {
            Err(write_failure())
        }
        async fn clear_all(&self) -> Result<(), StoreError> {
            self.inner.clear_all().await
        }
    }

    #[tokio::test]
    async fn test_store_write_failure_surfaces_on_single_unit_path() {
        let store = UnwritableStore {
            inner: MemoryStore::new(),
        };
        let engine = Reconciler::new(store, MockGenerator::new());
        let book = sample_book(1);

        // Generation succeeded but persistence did not: the caller sees
        // the store error, nothing is stored, and the transient
        // indicator is cleared.
        let result = engine.ensure_cover(&book).await;
        assert!(matches!(result, Err(EngineError::Store(_))));
        assert_eq!(engine.generator().cover_calls(), 1);
        assert!(!engine.is_generating(1));
        assert!(engine.store().inner.is_empty());
    }

    #[tokio::test]
    async fn test_store_write_failures_recorded_without_aborting_pass() {
        let store = UnwritableStore {
            inner: MemoryStore::new(),
        };
        let engine = Reconciler::new(store, MockGenerator::new().with_script_len(2));
        let catalog = vec![sample_book(1), sample_book(2)];

        let report = engine
            .reconcile_all(&catalog, &|_: &Progress| {})
            .await
            .unwrap();

        // Per book the cover and script writes fail; with no persisted
        // script the pages are never attempted. The walk still visits
        // every book.
        assert_eq!(report.failures.len(), 4);
        assert_eq!(report.generated, 0);
        assert!(engine.store().inner.is_empty());
        assert!(report
            .failures
            .iter()
            .any(|f| f.book_id == 2 && f.unit == Unit::Script));
    }

    #[tokio::test]
    async fn test_library_view_joins_store_state() {
        let harness = TestHarness::new();
        let catalog = vec![sample_book(1), sample_book(2)];

        harness.engine.ensure_cover(&catalog[0]).await.unwrap();
        harness.engine.ensure_script(&catalog[1]).await.unwrap();

        let view = harness.engine.library_view(&catalog).await;
        assert_eq!(view.len(), 2);
        assert!(view[0].has_cover);
        assert!(!view[0].has_script);
        assert!(!view[1].has_cover);
        assert!(view[1].has_script);
    }

    #[test]
    fn test_progress_message_format() {
        let progress = Progress {
            book_id: 14,
            book_title: "Hanuman's Leap".to_string(),
            unit: Unit::PageImage(7),
        };
        let message = progress.to_string();
        assert!(message.contains("Book 14"));
        assert!(message.contains("Hanuman's Leap"));
        assert!(message.contains("image for page 7"));
    }
}
