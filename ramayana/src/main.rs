//! Command-line front end for the Ramayana comic universe generator.
//!
//! Generates and persists covers, scripts, page images and shared lore
//! for the fixed twenty-book catalog, on demand or in one bulk pass.
//!
//! ```bash
//! cargo run -p ramayana -- reconcile
//! cargo run -p ramayana -- open 4
//! ```

use ramayana_core::{
    catalog, export_book, export_master, ArtifactStore, FileStore, GeminiGenerator, Progress,
    Reconciler,
};
use std::io::Write;
use std::path::PathBuf;

type Engine = Reconciler<FileStore, GeminiGenerator>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // Status and exports only read the store; everything else needs a
    // generator and therefore a key.
    let command = args[1].as_str();
    tracing::debug!(command, data_dir = %data_dir().display(), "dispatching");

    if !matches!(command, "status" | "export" | "export-all" | "reset")
        && std::env::var("GEMINI_API_KEY").is_err()
    {
        eprintln!("Error: GEMINI_API_KEY environment variable not set.");
        eprintln!("Please set it in .env file or with: export GEMINI_API_KEY=your_key_here");
        std::process::exit(1);
    }

    match command {
        "status" => status().await?,
        "open" => open(parse_book_id(&args, 2)?).await?,
        "cover" => cover(parse_book_id(&args, 2)?).await?,
        "paint" => {
            let book_id = parse_book_id(&args, 2)?;
            let page = parse_number(&args, 3, "page number")?;
            paint(book_id, page).await?;
        }
        "lore" => lore(args.iter().any(|a| a == "--fresh")).await?,
        "reconcile" => reconcile().await?,
        "export" => export_one(parse_book_id(&args, 2)?).await?,
        "export-all" => export_all().await?,
        "reset" => reset(args.iter().any(|a| a == "--yes")).await?,
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            std::process::exit(2);
        }
    }

    Ok(())
}

fn print_help() {
    println!("Ramayana comic universe generator");
    println!();
    println!("Usage: ramayana <command> [args]");
    println!();
    println!("Commands:");
    println!("  status               Show each book's generated state");
    println!("  open <book>          Generate the book's script and first page image");
    println!("  cover <book>         Generate the book's cover if missing");
    println!("  paint <book> <page>  Generate one page image if missing");
    println!("  lore [--fresh]       Show the shared lore, regenerating with --fresh");
    println!("  reconcile            Fill every missing unit across all books");
    println!("  export <book>        Write the book as standalone HTML");
    println!("  export-all           Write every scripted book into one HTML file");
    println!("  reset [--yes]        Delete every generated artifact");
    println!();
    println!("Environment:");
    println!("  GEMINI_API_KEY       API key for generation commands");
    println!("  RAMAYANA_DATA_DIR    Artifact directory (default ./universe)");
}

fn data_dir() -> PathBuf {
    std::env::var_os("RAMAYANA_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./universe"))
}

fn store() -> FileStore {
    FileStore::new(data_dir())
}

fn engine() -> Result<Engine, Box<dyn std::error::Error>> {
    Ok(Reconciler::new(store(), GeminiGenerator::from_env()?))
}

fn parse_book_id(args: &[String], index: usize) -> Result<u32, Box<dyn std::error::Error>> {
    let id = parse_number(args, index, "book id")?;
    if ramayana_core::book(id).is_none() {
        return Err(format!("no such book: {id} (expected 1..={})", ramayana_core::BOOK_COUNT).into());
    }
    Ok(id)
}

fn parse_number(
    args: &[String],
    index: usize,
    what: &str,
) -> Result<u32, Box<dyn std::error::Error>> {
    let raw = args.get(index).ok_or_else(|| format!("missing {what}"))?;
    Ok(raw.parse::<u32>().map_err(|_| format!("invalid {what}: {raw}"))?)
}

async fn status() -> Result<(), Box<dyn std::error::Error>> {
    // Store-only view; no key needed and nothing is generated.
    let store = store();

    println!("{:>4}  {:<34} {:>5}  {:>6}", "id", "title", "cover", "script");
    for book in catalog() {
        let has_cover = store.get_cover(book.id).await?.is_some();
        let has_script = store.get_script(book.id).await?.is_some();
        println!(
            "{:>4}  {:<34} {:>5}  {:>6}",
            book.id,
            book.title,
            if has_cover { "yes" } else { "-" },
            if has_script { "yes" } else { "-" },
        );
    }
    Ok(())
}

async fn open(book_id: u32) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine()?;
    let book = ramayana_core::book(book_id).ok_or("unknown book")?;

    let pages = engine.ensure_script(book).await?;
    println!("Script ready: {} pages.", pages.len());

    let first = pages.iter().map(|p| p.page_number).min().unwrap_or(1);
    engine.ensure_page_image(book, first).await?;
    println!("Page {first} painted. Book {book_id} is ready to read.");
    Ok(())
}

async fn cover(book_id: u32) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine()?;
    let book = ramayana_core::book(book_id).ok_or("unknown book")?;
    let image = engine.ensure_cover(book).await?;
    println!("Cover ready for book {book_id} ({} bytes).", image.len());
    Ok(())
}

async fn paint(book_id: u32, page: u32) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine()?;
    let book = ramayana_core::book(book_id).ok_or("unknown book")?;
    let image = engine.ensure_page_image(book, page).await?;
    println!("Page {page} of book {book_id} painted ({} bytes).", image.len());
    Ok(())
}

async fn lore(fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine()?;
    let lore = if fresh {
        engine.regenerate_lore().await?
    } else {
        engine.ensure_lore().await?
    };

    println!("Characters:");
    for character in &lore.characters {
        println!("  {} - {}", character.name, character.description);
    }
    println!("Locations:");
    for location in &lore.locations {
        println!("  {} - {}", location.name, location.description);
    }
    println!("Props:");
    for prop in &lore.props {
        println!("  {} - {}", prop.name, prop.description);
    }
    Ok(())
}

async fn reconcile() -> Result<(), Box<dyn std::error::Error>> {
    let engine = engine()?;
    let sink = |progress: &Progress| println!("{progress}");

    let report = engine.reconcile_all(catalog(), &sink).await?;

    println!();
    println!(
        "Pass complete: {} generated, {} already present, {} failed.",
        report.generated,
        report.verified,
        report.failures.len()
    );
    for failure in &report.failures {
        eprintln!(
            "  book {} {}: {}",
            failure.book_id, failure.unit, failure.error
        );
    }
    if !report.is_clean() {
        eprintln!("Some units are still missing; run reconcile again to retry.");
        std::process::exit(1);
    }
    Ok(())
}

async fn export_one(book_id: u32) -> Result<(), Box<dyn std::error::Error>> {
    let store = store();
    let book = ramayana_core::book(book_id).ok_or("unknown book")?;

    let html = export_book(&store, book).await?;
    let path = format!("book_{book_id}.html");
    std::fs::write(&path, html)?;
    println!("Wrote {path}");
    Ok(())
}

async fn export_all() -> Result<(), Box<dyn std::error::Error>> {
    let store = store();
    let html = export_master(&store, catalog()).await?;
    let path = "ramayana_universe.html";
    std::fs::write(path, html)?;
    println!("Wrote {path}");
    Ok(())
}

async fn reset(confirmed: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirmed {
        print!("This deletes every generated artifact in {}. Type RESET to confirm: ", data_dir().display());
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        if line.trim() != "RESET" {
            println!("Aborted.");
            return Ok(());
        }
    }

    store().clear_all().await?;
    println!("All artifacts deleted.");
    Ok(())
}
