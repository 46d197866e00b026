//! Generated content shapes: script pages and the shared lore object.
//!
//! Field names serialize as camelCase to match the generator's JSON
//! response schemas, so generator output round-trips through the store
//! without renaming.

use serde::{Deserialize, Serialize};

/// One page of a book's script.
///
/// A book's full page set (its script) is generated as a unit and
/// persisted as a unit; each page's image is generated and persisted
/// independently, keyed by `(book_id, page_number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// 1-based position within the owning script.
    pub page_number: u32,
    pub title: String,
    /// Scene description handed to the image generator.
    pub image_description: String,
    pub narration: String,
    pub dialogue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary_note: Option<String>,
}

/// The cross-book reference object shared by the whole catalog.
///
/// Exactly one instance exists, persisted under the `"main"` key,
/// generated independently of any book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lore {
    pub characters: Vec<LoreCharacter>,
    pub locations: Vec<LoreEntry>,
    pub props: Vec<LoreEntry>,
}

/// A character sheet in the lore object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoreCharacter {
    pub name: String,
    pub description: String,
    /// Visual continuity notes for illustration.
    pub visuals: String,
}

/// A named lore entry (location or prop).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoreEntry {
    pub name: String,
    pub description: String,
}
