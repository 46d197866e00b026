//! Reconciliation engine for an AI-illustrated, 20-volume Ramayana library.
//!
//! This crate provides:
//! - The fixed 20-book catalog
//! - A key-value artifact store for generated covers, scripts, page images
//!   and the shared lore object
//! - A content generator backed by the Gemini API
//! - The reconciliation engine that fills whatever the store is missing,
//!   one generation call per missing unit, and never regenerates what is
//!   already persisted
//! - Self-contained HTML export of one book or the whole library
//!
//! # Quick Start
//!
//! ```ignore
//! use ramayana_core::{catalog, FileStore, GeminiGenerator, Reconciler};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = FileStore::new("./universe");
//!     let generator = GeminiGenerator::from_env()?;
//!     let engine = Reconciler::new(store, generator);
//!
//!     let book = ramayana_core::book(1).unwrap();
//!     let pages = engine.ensure_script(book).await?;
//!     println!("Book 1 has {} pages", pages.len());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod content;
pub mod engine;
pub mod export;
pub mod generator;
pub mod store;
pub mod testing;

// Primary public API
pub use catalog::{book, catalog, Book, BOOK_COUNT, PAGES_PER_BOOK};
pub use content::{Lore, LoreCharacter, LoreEntry, Page};
pub use engine::{
    BookStatus, EngineError, PassReport, Progress, ProgressSink, Reconciler, Unit, UnitFailure,
};
pub use export::{export_book, export_master, ExportError};
pub use generator::{ContentGenerator, GenerateError, GeminiGenerator};
pub use store::{ArtifactStore, FileStore, MemoryStore, StoreError};
pub use testing::{MockGenerator, TestHarness};
