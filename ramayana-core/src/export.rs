//! Standalone HTML export of generated books.
//!
//! Exports read whatever the store holds and never trigger generation:
//! a book needs a persisted script to be exportable, while missing
//! covers and page images degrade to labelled placeholders.

use crate::catalog::Book;
use crate::content::Page;
use crate::store::{ArtifactStore, StoreError};
use thiserror::Error;

/// Errors from export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The book has no persisted script, so there is nothing to lay out.
    #[error("book {book_id} has no generated script to export")]
    NoScript { book_id: u32 },
}

const STYLE: &str = r#"
    body { font-family: Georgia, 'Times New Roman', serif; margin: 0; background: #f4ecd8; color: #2b1d0e; }
    .book { max-width: 52rem; margin: 0 auto; padding: 2rem; }
    .cover { text-align: center; padding: 3rem 0; }
    .cover img { max-width: 24rem; width: 100%; border: 6px double #8a6d3b; }
    h1 { font-size: 2.2rem; margin: 1rem 0 0.25rem; }
    .moral { font-style: italic; color: #6b5230; }
    .page { margin: 3rem 0; page-break-inside: avoid; }
    .page img { width: 100%; border: 3px solid #8a6d3b; }
    .page h2 { font-size: 1.3rem; border-bottom: 1px solid #c9b286; padding-bottom: 0.25rem; }
    .narration { line-height: 1.6; }
    .dialogue { margin: 0.75rem 0; padding-left: 1rem; border-left: 3px solid #c9b286; white-space: pre-line; }
    .vocab { background: #efe2c0; padding: 0.5rem 0.75rem; font-size: 0.9rem; }
    .placeholder { background: #e4d7b8; border: 3px dashed #8a6d3b; padding: 4rem 1rem; text-align: center; color: #6b5230; }
    .section-break { page-break-after: always; }
"#;

/// Render one book as a self-contained HTML document.
///
/// Every image is embedded as a data URL, so the file opens offline with
/// no companion assets. Missing images render as placeholders.
pub async fn export_book<S: ArtifactStore>(store: &S, book: &Book) -> Result<String, ExportError> {
    let pages = store
        .get_script(book.id)
        .await?
        .ok_or(ExportError::NoScript { book_id: book.id })?;

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&book.title)));
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

    render_book_body(store, book, &pages, &mut html).await?;

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

/// Render every book that has a persisted script into one HTML document,
/// in ascending book-id order, with print page breaks between books.
/// Books without a script are skipped, not failed.
pub async fn export_master<S: ArtifactStore>(
    store: &S,
    catalog: &[Book],
) -> Result<String, ExportError> {
    let mut books: Vec<&Book> = catalog.iter().collect();
    books.sort_by_key(|b| b.id);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>The Ramayana Comic Universe</title>\n");
    html.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

    for book in books {
        let Some(pages) = store.get_script(book.id).await? else {
            continue;
        };
        html.push_str("<div class=\"section-break\">\n");
        render_book_body(store, book, &pages, &mut html).await?;
        html.push_str("</div>\n");
    }

    html.push_str("</body>\n</html>\n");
    Ok(html)
}

async fn render_book_body<S: ArtifactStore>(
    store: &S,
    book: &Book,
    pages: &[Page],
    html: &mut String,
) -> Result<(), ExportError> {
    html.push_str("<div class=\"book\">\n<div class=\"cover\">\n");
    match store.get_cover(book.id).await.ok().flatten() {
        Some(cover) => html.push_str(&format!(
            "<img src=\"{}\" alt=\"Cover of {}\">\n",
            cover,
            escape_html(&book.title)
        )),
        None => html.push_str("<div class=\"placeholder\">Cover not yet painted</div>\n"),
    }
    html.push_str(&format!("<h1>Book {}: {}</h1>\n", book.id, escape_html(&book.title)));
    html.push_str(&format!(
        "<p class=\"moral\">{}</p>\n</div>\n",
        escape_html(&book.moral)
    ));

    let mut ordered: Vec<&Page> = pages.iter().collect();
    ordered.sort_by_key(|p| p.page_number);

    for page in ordered {
        html.push_str("<div class=\"page\">\n");
        html.push_str(&format!(
            "<h2>Page {}: {}</h2>\n",
            page.page_number,
            escape_html(&page.title)
        ));
        match store.get_page_image(book.id, page.page_number).await.ok().flatten() {
            Some(image) => html.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">\n",
                image,
                escape_html(&page.image_description)
            )),
            None => html.push_str("<div class=\"placeholder\">Panel not yet painted</div>\n"),
        }
        html.push_str(&format!(
            "<p class=\"narration\">{}</p>\n",
            escape_html(&page.narration)
        ));
        if !page.dialogue.is_empty() {
            html.push_str(&format!(
                "<div class=\"dialogue\">{}</div>\n",
                escape_html(&page.dialogue)
            ));
        }
        if let Some(note) = &page.vocabulary_note {
            html.push_str(&format!("<div class=\"vocab\">{}</div>\n", escape_html(note)));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</div>\n");
    Ok(())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
