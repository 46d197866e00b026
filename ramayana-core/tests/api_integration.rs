//! QA tests that exercise the real Gemini generator.
//!
//! These tests spend API quota and are ignored by default.
//! Run with: `GEMINI_API_KEY=$GEMINI_API_KEY cargo test -p ramayana-core --test api_integration -- --ignored --nocapture`

use ramayana_core::{book, ContentGenerator, GeminiGenerator};

/// Load environment variables from .env file
fn setup() {
    let _ = dotenvy::dotenv();
}

/// Check if API key is available
fn has_api_key() -> bool {
    std::env::var("GEMINI_API_KEY").is_ok()
}

#[tokio::test]
#[ignore]
async fn test_live_script_generation() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let generator = GeminiGenerator::from_env().expect("generator");
    let book = book(1).expect("catalog book 1");

    let pages = generator.write_script(book).await.expect("script generation");
    println!("SUCCESS: generated {} pages", pages.len());

    assert!(!pages.is_empty());
    for page in &pages {
        assert!(page.page_number >= 1);
        assert!(!page.narration.is_empty());
        assert!(!page.image_description.is_empty());
    }
}

#[tokio::test]
#[ignore]
async fn test_live_cover_generation() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let generator = GeminiGenerator::from_env().expect("generator");
    let book = book(1).expect("catalog book 1");

    let cover = generator.paint_cover(book).await.expect("cover generation");
    println!("SUCCESS: cover is {} bytes of data URL", cover.len());

    assert!(cover.starts_with("data:image/"));
    assert!(cover.contains(";base64,"));
}

#[tokio::test]
#[ignore]
async fn test_live_lore_generation() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let generator = GeminiGenerator::from_env().expect("generator");

    let lore = generator.write_lore().await.expect("lore generation");
    println!(
        "SUCCESS: {} characters, {} locations, {} props",
        lore.characters.len(),
        lore.locations.len(),
        lore.props.len()
    );

    assert!(!lore.characters.is_empty());
}
