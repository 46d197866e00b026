//! Test doubles for exercising the engine without network access.

use crate::catalog::Book;
use crate::content::{Lore, LoreCharacter, LoreEntry, Page};
use crate::engine::Reconciler;
use crate::generator::{ContentGenerator, GenerateError};
use crate::store::MemoryStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// A deterministic in-process stand-in for the AI generator.
///
/// Every call is counted, any call class can be made to fail, and an
/// optional semaphore gate lets a test hold generations mid-flight to
/// observe transient state.
pub struct MockGenerator {
    pages_per_script: usize,
    cover_calls: AtomicUsize,
    script_calls: AtomicUsize,
    page_calls: AtomicUsize,
    lore_calls: AtomicUsize,
    fail_covers: AtomicBool,
    fail_scripts: AtomicBool,
    fail_pages: AtomicBool,
    fail_lore: AtomicBool,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            pages_per_script: 24,
            cover_calls: AtomicUsize::new(0),
            script_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
            lore_calls: AtomicUsize::new(0),
            fail_covers: AtomicBool::new(false),
            fail_scripts: AtomicBool::new(false),
            fail_pages: AtomicBool::new(false),
            fail_lore: AtomicBool::new(false),
            gate: Mutex::new(None),
        }
    }

    /// Produce scripts with `len` pages instead of the default 24.
    pub fn with_script_len(mut self, len: usize) -> Self {
        self.pages_per_script = len;
        self
    }

    /// Every subsequent generation awaits a permit from `gate` before
    /// completing.
    pub fn hold_at(&self, gate: Arc<Semaphore>) {
        *self.gate.lock().expect("gate lock") = Some(gate);
    }

    pub fn cover_calls(&self) -> usize {
        self.cover_calls.load(Ordering::SeqCst)
    }

    pub fn script_calls(&self) -> usize {
        self.script_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn lore_calls(&self) -> usize {
        self.lore_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.cover_calls() + self.script_calls() + self.page_calls() + self.lore_calls()
    }

    pub fn fail_covers(&self, fail: bool) {
        self.fail_covers.store(fail, Ordering::SeqCst);
    }

    pub fn fail_scripts(&self, fail: bool) {
        self.fail_scripts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pages(&self, fail: bool) {
        self.fail_pages.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lore(&self, fail: bool) {
        self.fail_lore.store(fail, Ordering::SeqCst);
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().expect("gate lock").clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate semaphore closed").forget();
        }
    }

    fn failure(what: &str) -> GenerateError {
        GenerateError::EmptyPayload(format!("mock {what} failure"))
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentGenerator for MockGenerator {
    async fn paint_cover(&self, book: &Book) -> Result<String, GenerateError> {
        self.cover_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.fail_covers.load(Ordering::SeqCst) {
            return Err(Self::failure("cover"));
        }
        Ok(format!("data:image/png;base64,cover-{}", book.id))
    }

    async fn write_script(&self, book: &Book) -> Result<Vec<Page>, GenerateError> {
        self.script_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.fail_scripts.load(Ordering::SeqCst) {
            return Err(Self::failure("script"));
        }
        let mut pages = sample_script(self.pages_per_script);
        for page in &mut pages {
            page.title = format!("{} \u{2014} {}", book.title, page.title);
        }
        Ok(pages)
    }

    async fn paint_page(&self, page: &Page, book_title: &str) -> Result<String, GenerateError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.fail_pages.load(Ordering::SeqCst) {
            return Err(Self::failure("page"));
        }
        Ok(format!(
            "data:image/png;base64,page-{}-{}",
            book_title.len(),
            page.page_number
        ))
    }

    async fn write_lore(&self) -> Result<Lore, GenerateError> {
        self.lore_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        if self.fail_lore.load(Ordering::SeqCst) {
            return Err(Self::failure("lore"));
        }
        Ok(sample_lore())
    }
}

/// A synthetic script of `len` pages, numbered from 1.
pub fn sample_script(len: usize) -> Vec<Page> {
    (1..=len as u32)
        .map(|n| Page {
            page_number: n,
            title: format!("Page {n}"),
            image_description: format!("A wide painted panel for page {n}."),
            narration: format!("The tale continues on page {n}."),
            dialogue: "Rama: \"Onward.\"".to_string(),
            vocabulary_note: if n % 4 == 0 {
                Some("Dharma: the right way of living.".to_string())
            } else {
                None
            },
        })
        .collect()
}

/// A minimal but structurally complete lore object.
pub fn sample_lore() -> Lore {
    Lore {
        characters: vec![LoreCharacter {
            name: "Rama".to_string(),
            description: "The exiled prince of Ayodhya.".to_string(),
            visuals: "Blue-skinned, carrying a great bow.".to_string(),
        }],
        locations: vec![LoreEntry {
            name: "Ayodhya".to_string(),
            description: "The golden capital of Kosala.".to_string(),
        }],
        props: vec![LoreEntry {
            name: "The bow of Shiva".to_string(),
            description: "An ancient bow no ordinary hand can lift.".to_string(),
        }],
    }
}

/// A synthetic catalog entry for tests that do not care about the real
/// twenty books.
pub fn sample_book(id: u32) -> Book {
    Book::new(
        id,
        &format!("Test Book {id}"),
        "A short synthetic summary used in tests.",
        "Courage is quiet.",
    )
    .with_characters(&["Rama", "Sita"])
    .with_beats(&["An opening", "A trial", "A resolution"])
}

/// An engine wired to an in-memory store and the mock generator.
pub struct TestHarness {
    pub engine: Reconciler<MemoryStore, MockGenerator>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self {
            engine: Reconciler::new(MemoryStore::new(), MockGenerator::new()),
        }
    }

    /// A harness whose mock scripts carry `len` pages.
    pub fn with_pages(len: usize) -> Self {
        Self {
            engine: Reconciler::new(MemoryStore::new(), MockGenerator::new().with_script_len(len)),
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
