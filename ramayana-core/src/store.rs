//! Artifact persistence.
//!
//! Namespaced key-value storage for every generated artifact class:
//! covers and scripts keyed by book id, page images keyed by
//! `(book_id, page_number)`, and the single lore object under the
//! `"main"` sentinel. Read-your-writes within a process; no cross-key
//! transactions.

use crate::content::{Lore, Page};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tokio::fs;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value persistence for generated artifacts.
///
/// Presence of an artifact here is the sole source of truth for
/// "already generated". The reconciliation engine treats a failed read
/// as "absent" and a `put` as the final step of a successful generation.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn get_cover(&self, book_id: u32) -> Result<Option<String>, StoreError>;
    async fn put_cover(&self, book_id: u32, image: &str) -> Result<(), StoreError>;

    async fn get_script(&self, book_id: u32) -> Result<Option<Vec<Page>>, StoreError>;
    async fn put_script(&self, book_id: u32, pages: &[Page]) -> Result<(), StoreError>;

    async fn get_page_image(
        &self,
        book_id: u32,
        page_number: u32,
    ) -> Result<Option<String>, StoreError>;
    async fn put_page_image(
        &self,
        book_id: u32,
        page_number: u32,
        image: &str,
    ) -> Result<(), StoreError>;

    async fn get_lore(&self) -> Result<Option<Lore>, StoreError>;
    async fn put_lore(&self, lore: &Lore) -> Result<(), StoreError>;

    /// Unconditionally clear every artifact class. Irreversible.
    async fn clear_all(&self) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: ArtifactStore + ?Sized> ArtifactStore for std::sync::Arc<S> {
    async fn get_cover(&self, book_id: u32) -> Result<Option<String>, StoreError> {
        (**self).get_cover(book_id).await
    }

    async fn put_cover(&self, book_id: u32, image: &str) -> Result<(), StoreError> {
        (**self).put_cover(book_id, image).await
    }

    async fn get_script(&self, book_id: u32) -> Result<Option<Vec<Page>>, StoreError> {
        (**self).get_script(book_id).await
    }

    async fn put_script(&self, book_id: u32, pages: &[Page]) -> Result<(), StoreError> {
        (**self).put_script(book_id, pages).await
    }

    async fn get_page_image(
        &self,
        book_id: u32,
        page_number: u32,
    ) -> Result<Option<String>, StoreError> {
        (**self).get_page_image(book_id, page_number).await
    }

    async fn put_page_image(
        &self,
        book_id: u32,
        page_number: u32,
        image: &str,
    ) -> Result<(), StoreError> {
        (**self).put_page_image(book_id, page_number, image).await
    }

    async fn get_lore(&self) -> Result<Option<Lore>, StoreError> {
        (**self).get_lore().await
    }

    async fn put_lore(&self, lore: &Lore) -> Result<(), StoreError> {
        (**self).put_lore(lore).await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        (**self).clear_all().await
    }
}

// ============================================================================
// File-backed store
// ============================================================================

const DIR_COVERS: &str = "covers";
const DIR_SCRIPTS: &str = "scripts";
const DIR_PAGES: &str = "pages";
const DIR_LORE: &str = "lore";

/// The fixed key of the singleton lore artifact.
const LORE_KEY: &str = "main";

/// Directory-backed artifact store.
///
/// One subdirectory per artifact class under a root directory. Covers and
/// page images are stored as raw data-URL text, scripts and lore as JSON.
/// Page files use the `{book}_{page}` key shape.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given directory.
    ///
    /// The directory tree is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cover_path(&self, book_id: u32) -> PathBuf {
        self.root.join(DIR_COVERS).join(format!("{book_id}.txt"))
    }

    fn script_path(&self, book_id: u32) -> PathBuf {
        self.root.join(DIR_SCRIPTS).join(format!("{book_id}.json"))
    }

    fn page_path(&self, book_id: u32, page_number: u32) -> PathBuf {
        self.root
            .join(DIR_PAGES)
            .join(format!("{book_id}_{page_number}.txt"))
    }

    fn lore_path(&self) -> PathBuf {
        self.root.join(DIR_LORE).join(format!("{LORE_KEY}.json"))
    }

    async fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content).await?;
        Ok(())
    }

    async fn remove_namespace(&self, namespace: &str) -> Result<(), StoreError> {
        match fs::remove_dir_all(self.root.join(namespace)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ArtifactStore for FileStore {
    async fn get_cover(&self, book_id: u32) -> Result<Option<String>, StoreError> {
        Self::read_optional(&self.cover_path(book_id)).await
    }

    async fn put_cover(&self, book_id: u32, image: &str) -> Result<(), StoreError> {
        Self::write_atomic(&self.cover_path(book_id), image).await
    }

    async fn get_script(&self, book_id: u32) -> Result<Option<Vec<Page>>, StoreError> {
        match Self::read_optional(&self.script_path(book_id)).await? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    async fn put_script(&self, book_id: u32, pages: &[Page]) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(pages)?;
        Self::write_atomic(&self.script_path(book_id), &content).await
    }

    async fn get_page_image(
        &self,
        book_id: u32,
        page_number: u32,
    ) -> Result<Option<String>, StoreError> {
        Self::read_optional(&self.page_path(book_id, page_number)).await
    }

    async fn put_page_image(
        &self,
        book_id: u32,
        page_number: u32,
        image: &str,
    ) -> Result<(), StoreError> {
        Self::write_atomic(&self.page_path(book_id, page_number), image).await
    }

    async fn get_lore(&self) -> Result<Option<Lore>, StoreError> {
        match Self::read_optional(&self.lore_path()).await? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    async fn put_lore(&self, lore: &Lore) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(lore)?;
        Self::write_atomic(&self.lore_path(), &content).await
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        for namespace in [DIR_COVERS, DIR_SCRIPTS, DIR_PAGES, DIR_LORE] {
            self.remove_namespace(namespace).await?;
        }
        Ok(())
    }
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
struct MemoryInner {
    covers: HashMap<u32, String>,
    scripts: HashMap<u32, Vec<Page>>,
    pages: HashMap<(u32, u32), String>,
    lore: Option<Lore>,
}

/// In-memory artifact store for tests.
///
/// Counts every get and put so tests can assert the write-discipline
/// properties (exactly one write per successful generation, zero on
/// failure) without touching a filesystem.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of get operations performed.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Total number of put operations performed.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Number of covers currently stored.
    pub fn cover_count(&self) -> usize {
        self.inner.lock().expect("store lock").covers.len()
    }

    /// Number of scripts currently stored.
    pub fn script_count(&self) -> usize {
        self.inner.lock().expect("store lock").scripts.len()
    }

    /// Number of page images currently stored.
    pub fn page_image_count(&self) -> usize {
        self.inner.lock().expect("store lock").pages.len()
    }

    /// True when no artifact of any class is stored.
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.lock().expect("store lock");
        inner.covers.is_empty()
            && inner.scripts.is_empty()
            && inner.pages.is_empty()
            && inner.lore.is_none()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn get_cover(&self, book_id: u32) -> Result<Option<String>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.lock().expect("store lock").covers.get(&book_id).cloned())
    }

    async fn put_cover(&self, book_id: u32, image: &str) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner
            .lock()
            .expect("store lock")
            .covers
            .insert(book_id, image.to_string());
        Ok(())
    }

    async fn get_script(&self, book_id: u32) -> Result<Option<Vec<Page>>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.lock().expect("store lock").scripts.get(&book_id).cloned())
    }

    async fn put_script(&self, book_id: u32, pages: &[Page]) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner
            .lock()
            .expect("store lock")
            .scripts
            .insert(book_id, pages.to_vec());
        Ok(())
    }

    async fn get_page_image(
        &self,
        book_id: u32,
        page_number: u32,
    ) -> Result<Option<String>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .inner
            .lock()
            .expect("store lock")
            .pages
            .get(&(book_id, page_number))
            .cloned())
    }

    async fn put_page_image(
        &self,
        book_id: u32,
        page_number: u32,
        image: &str,
    ) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner
            .lock()
            .expect("store lock")
            .pages
            .insert((book_id, page_number), image.to_string());
        Ok(())
    }

    async fn get_lore(&self) -> Result<Option<Lore>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.inner.lock().expect("store lock").lore.clone())
    }

    async fn put_lore(&self, lore: &Lore) -> Result<(), StoreError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.lock().expect("store lock").lore = Some(lore.clone());
        Ok(())
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        inner.covers.clear();
        inner.scripts.clear();
        inner.pages.clear();
        inner.lore = None;
        Ok(())
    }
}
