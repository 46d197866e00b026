//! AI content generation.
//!
//! The `ContentGenerator` trait is the engine's narrow interface to the
//! generative service: four request shapes, each of which may fail or
//! return an unusable payload. `GeminiGenerator` implements it over the
//! Gemini client, with structured JSON output for scripts and lore and
//! inline base64 images for covers and page panels.

use crate::catalog::{Book, PAGES_PER_BOOK};
use crate::content::{Lore, Page};
use async_trait::async_trait;
use gemini::{AspectRatio, Gemini, Request};
use serde_json::json;
use thiserror::Error;

/// Default model for script and lore generation.
const TEXT_MODEL: &str = "gemini-3-flash-preview";

/// Default model for cover and page illustration.
const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Errors from a generation attempt.
///
/// The reconciliation engine treats every variant the same way: the unit
/// failed, nothing is persisted, and a later pass may retry it.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Gemini API error: {0}")]
    Api(#[from] gemini::Error),

    #[error("generator returned no usable payload: {0}")]
    EmptyPayload(String),

    #[error("malformed generator payload: {0}")]
    Malformed(String),
}

/// The generative service behind the reconciliation engine.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate a cover illustration, returned as a data-URL string.
    async fn paint_cover(&self, book: &Book) -> Result<String, GenerateError>;

    /// Generate a book's full page sequence. All-or-nothing: an empty
    /// sequence is a failure, and page numbers are expected to be
    /// contiguous from 1 (generator contract, not re-validated here).
    async fn write_script(&self, book: &Book) -> Result<Vec<Page>, GenerateError>;

    /// Generate one page's panel illustration as a data-URL string.
    async fn paint_page(&self, page: &Page, book_title: &str) -> Result<String, GenerateError>;

    /// Generate the shared lore object.
    async fn write_lore(&self) -> Result<Lore, GenerateError>;
}

/// Gemini-backed content generator.
pub struct GeminiGenerator {
    client: Gemini,
    text_model: String,
    image_model: String,
}

impl GeminiGenerator {
    /// Create a generator over an existing client.
    pub fn new(client: Gemini) -> Self {
        Self {
            client,
            text_model: TEXT_MODEL.to_string(),
            image_model: IMAGE_MODEL.to_string(),
        }
    }

    /// Create a generator from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, gemini::Error> {
        Ok(Self::new(Gemini::from_env()?))
    }

    /// Override the text generation model.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// Override the image generation model.
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    async fn paint(
        &self,
        prompt: String,
        aspect_ratio: AspectRatio,
        what: &str,
    ) -> Result<String, GenerateError> {
        let request = Request::new(prompt)
            .with_model(&self.image_model)
            .with_aspect_ratio(aspect_ratio);

        let response = self.client.generate(request).await?;
        let (media_type, data) = response.inline_image().ok_or_else(|| {
            GenerateError::EmptyPayload(format!("{what} response contained no inline image"))
        })?;

        Ok(data_url(media_type, data))
    }
}

#[async_trait]
impl ContentGenerator for GeminiGenerator {
    async fn paint_cover(&self, book: &Book) -> Result<String, GenerateError> {
        self.paint(cover_prompt(book), AspectRatio::Portrait, "cover")
            .await
    }

    async fn write_script(&self, book: &Book) -> Result<Vec<Page>, GenerateError> {
        let request = Request::new(script_prompt(book))
            .with_model(&self.text_model)
            .with_response_schema(script_schema());

        let response = self.client.generate(request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenerateError::EmptyPayload(
                "script response contained no text".to_string(),
            ));
        }

        let pages: Vec<Page> = serde_json::from_str(&text)
            .map_err(|e| GenerateError::Malformed(format!("script JSON: {e}")))?;
        if pages.is_empty() {
            return Err(GenerateError::EmptyPayload(
                "script contained no pages".to_string(),
            ));
        }

        Ok(pages)
    }

    async fn paint_page(&self, page: &Page, book_title: &str) -> Result<String, GenerateError> {
        self.paint(
            page_prompt(page, book_title),
            AspectRatio::Widescreen,
            "page panel",
        )
        .await
    }

    async fn write_lore(&self) -> Result<Lore, GenerateError> {
        let request = Request::new(include_str!("prompts/lore_brief.txt").to_string())
            .with_model(&self.text_model)
            .with_response_schema(lore_schema());

        let response = self.client.generate(request).await?;
        let text = response.text();
        if text.trim().is_empty() {
            return Err(GenerateError::EmptyPayload(
                "lore response contained no text".to_string(),
            ));
        }

        serde_json::from_str(&text).map_err(|e| GenerateError::Malformed(format!("lore JSON: {e}")))
    }
}

// ============================================================================
// Prompts and schemas
// ============================================================================

fn script_prompt(book: &Book) -> String {
    format!(
        "Generate a full {PAGES_PER_BOOK}-page comic script for Book {}: {}.\n\
         Summary: {}\n\
         Key beats: {}\n\n{}",
        book.id,
        book.title,
        book.summary,
        book.beats.join(", "),
        include_str!("prompts/script_rules.txt"),
    )
}

fn cover_prompt(book: &Book) -> String {
    format!(
        "A classic Indian comic book cover art for the Ramayana. \
         Book title: \"{}\".\nScene: {}\n{}",
        book.title,
        book.summary,
        include_str!("prompts/cover_style.txt"),
    )
}

fn page_prompt(page: &Page, book_title: &str) -> String {
    format!(
        "Classic Indian comic panel art for \"{book_title}\". Page {}: {}.\n\
         Scene: {}\n{}",
        page.page_number,
        page.title,
        page.image_description,
        include_str!("prompts/page_style.txt"),
    )
}

fn script_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "pageNumber": { "type": "NUMBER" },
                "title": { "type": "STRING" },
                "imageDescription": { "type": "STRING" },
                "narration": { "type": "STRING" },
                "dialogue": { "type": "STRING" },
                "vocabularyNote": { "type": "STRING" }
            },
            "required": ["pageNumber", "title", "imageDescription", "narration", "dialogue"]
        }
    })
}

fn lore_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "characters": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "description": { "type": "STRING" },
                        "visuals": { "type": "STRING" }
                    },
                    "required": ["name", "description", "visuals"]
                }
            },
            "locations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["name", "description"]
                }
            },
            "props": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["name", "description"]
                }
            }
        },
        "required": ["characters", "locations", "props"]
    })
}

/// Build a self-contained data URL from an inline image payload.
fn data_url(media_type: &str, base64_data: &str) -> String {
    format!("data:{media_type};base64,{base64_data}")
}
