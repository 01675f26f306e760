//! CLI tool for normalizing slide deck JSON and exporting it to PowerPoint.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use deck_core::{project_presentation, snapshot, write_deck, DocumentStore, ExportOptions, Presentation};
use deck_pptx::PptxWriter;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Normalize slide deck JSON files and export them.
#[derive(Parser, Debug)]
#[command(name = "deck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input deck file(s) (.json, either an outline or a saved snapshot)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// What to produce
    #[arg(short, long, value_enum, default_value_t = Target::Pptx)]
    to: Target,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print output to stdout instead of writing to file (text targets only)
    #[arg(short, long)]
    print: bool,

    /// Author recorded in exported decks
    #[arg(short, long)]
    author: Option<String>,

    /// Leave the export date out of .pptx file names
    #[arg(long)]
    no_date: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    /// PowerPoint deck
    Pptx,
    /// Normalized JSON snapshot
    Json,
    /// Positioned slide elements as JSON
    Projection,
}

/// A produced file, not yet written.
struct Output {
    filename: String,
    bytes: Vec<u8>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    if args.print && args.to == Target::Pptx {
        bail!("--print needs a text target (--to json or --to projection)");
    }

    let mut options = ExportOptions::new().with_date(!args.no_date);
    if let Some(author) = &args.author {
        options = options.with_author(author.as_str());
    }

    let mut failures = 0;
    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &options) {
            Ok(output) => {
                if args.print {
                    std::io::stdout().write_all(&output.bytes)?;
                    println!();
                } else {
                    let output_path = get_output_path(input_path, args.output.as_ref(), &output.filename)?;
                    write_output(&output_path, &output.bytes)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                failures += 1;
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} file(s) failed", failures, args.input.len());
    }
    Ok(())
}

/// Load one deck file through the document store.
fn load_presentation(input_path: &Path) -> Result<Presentation> {
    let text = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;

    let mut store = DocumentStore::new();
    store.import_json(&text)?;
    let presentation = store
        .presentation()
        .cloned()
        .context("Import produced no presentation")?;
    Ok(presentation)
}

/// Process a single deck file into the requested target.
fn process_file(input_path: &Path, args: &Args, options: &ExportOptions) -> Result<Output> {
    let presentation = load_presentation(input_path)?;

    if args.verbose {
        eprintln!("  \"{}\": {} slides", presentation.title, presentation.slide_count());
    }

    let output = match args.to {
        Target::Pptx => {
            log::debug!("Exporting as PPTX");
            let mut writer = PptxWriter::new();
            if let Some(parent) = input_path.parent() {
                writer = writer.with_base_dir(parent);
            }
            let bytes = write_deck(&presentation, &mut writer, options)?;
            Output {
                filename: snapshot::deck_filename(&presentation.title, export_date(options)),
                bytes,
            }
        }
        Target::Json => Output {
            filename: snapshot::json_filename(&presentation.title),
            bytes: snapshot::to_json(&presentation)?.into_bytes(),
        },
        Target::Projection => {
            let projections = project_presentation(&presentation);
            Output {
                filename: format!("{}.projection.json", snapshot::file_stem(&presentation.title)),
                bytes: serde_json::to_string_pretty(&projections)
                    .context("Failed to serialize projection")?
                    .into_bytes(),
            }
        }
    };

    Ok(output)
}

/// Calendar date for deck file names, taken in UTC like the browser export.
fn export_date(options: &ExportOptions) -> Option<chrono::NaiveDate> {
    options.include_date().then(|| chrono::Utc::now().date_naive())
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>, filename: &str) -> Result<PathBuf> {
    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(filename)
        }
        None => match input_path.parent() {
            Some(parent) => parent.join(filename),
            None => PathBuf::from(filename),
        },
    };

    Ok(output_path)
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
