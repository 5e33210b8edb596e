//! epub-slicer - Extract chapters from an unpacked EPUB

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use epub_slicer::{Error, ExtractOptions, Extraction, ManifestBook, extract_chapters};

#[derive(Parser)]
#[command(name = "epub-slicer")]
#[command(version, about = "Extract chapters from an unpacked EPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    epub-slicer book/manifest.json                Print the chapter outline
    epub-slicer book/manifest.json --out html     Write one HTML file per chapter
    epub-slicer book/manifest.json --json         Dump chapters and outline as JSON")]
struct Cli {
    /// Book manifest (JSON)
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,

    /// Extraction options (JSON)
    #[arg(long, value_name = "FILE")]
    options: Option<PathBuf>,

    /// Directory to write chapter HTML files into
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Print the whole extraction as JSON
    #[arg(long)]
    json: bool,

    /// Log filter, e.g. `debug` or `epub_slicer=trace` (overrides RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let env_filter = level
        .and_then(|level| EnvFilter::builder().parse(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_filter(env_filter),
        )
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let options = match &cli.options {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            serde_json::from_str::<ExtractOptions>(&json)?
        }
        None => ExtractOptions::default(),
    };
    debug!(manifest = %cli.manifest.display(), "Opening book");

    let book = ManifestBook::open(&cli.manifest)?;
    let extraction = extract_chapters(&book, &options)?;

    if let Some(dir) = &cli.out {
        write_chapters(&extraction, dir)?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
    } else {
        print_outline(&extraction);
    }
    Ok(())
}

fn write_chapters(extraction: &Extraction, dir: &Path) -> Result<(), Error> {
    fs::create_dir_all(dir)?;
    for (index, chapter) in extraction.chapters.iter().enumerate() {
        fs::write(dir.join(chapter_file_name(index)), &chapter.content)?;
    }
    info!(
        dir = %dir.display(),
        chapters = extraction.chapters.len(),
        "Wrote chapter files"
    );
    Ok(())
}

fn chapter_file_name(index: usize) -> String {
    format!("{index:04}.html")
}

fn print_outline(extraction: &Extraction) {
    for entry in &extraction.entries {
        let index = entry
            .chapter_index
            .map_or_else(|| "-".to_string(), |i| i.to_string());
        println!("{:>5}  {}{}", index, "  ".repeat(entry.level), entry.title);
    }
    println!("Chapters: {}", extraction.chapters.len());
}
