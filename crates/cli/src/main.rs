//! CLI tool for converting PowerPoint decks into Markdown documents.

mod discover;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use slidemd_core::{Converter, Locale};
use slidemd_pptx::PptxParser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Convert .pptx files into Markdown with notes, images and shape summaries.
#[derive(Parser, Debug)]
#[command(name = "pptx2md")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input .pptx file(s) (default: every .pptx in --dir)
    input: Vec<PathBuf>,

    /// Directory scanned for .pptx files when no input is given
    #[arg(short, long, default_value = ".")]
    dir: PathBuf,

    /// Scan subdirectories of --dir as well
    #[arg(short, long)]
    recursive: bool,

    /// Output directory for Markdown files (images go to <output>/media)
    #[arg(short, long, default_value = "docs")]
    output: PathBuf,

    /// Language of the generated labels
    #[arg(short, long, value_enum, default_value_t = Lang::En)]
    lang: Lang,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Lang {
    /// English
    En,
    /// Indonesian
    Id,
}

impl From<Lang> for Locale {
    fn from(lang: Lang) -> Self {
        match lang {
            Lang::En => Locale::English,
            Lang::Id => Locale::Indonesian,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let inputs = if args.input.is_empty() {
        discover::find_presentations(&args.dir, &args.output, args.recursive)
            .with_context(|| format!("Failed to scan {}", args.dir.display()))?
    } else {
        args.input.clone()
    };

    if inputs.is_empty() {
        eprintln!("No .pptx files found in {}", args.dir.display());
        return Ok(());
    }

    let converter = Converter::new(&args.output).with_locale(args.lang.into());
    let mut failed = 0;

    for input_path in &inputs {
        log::debug!("Processing: {}", input_path.display());

        match process_file(input_path, &converter) {
            Ok(output_path) => println!("Wrote: {}", output_path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed", failed, inputs.len());
    }

    Ok(())
}

/// Convert a single deck and write its Markdown document.
fn process_file(input_path: &Path, converter: &Converter) -> Result<PathBuf> {
    let file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let reader = BufReader::new(file);

    let filename = deck_filename(input_path);

    let deck = PptxParser::new()
        .parse(reader, &filename)
        .context("Failed to read presentation")?;
    log::debug!("  Found {} slides", deck.slides.len());

    let result = converter.convert(&deck).context("Failed to export images")?;
    log::debug!("  Exported {} images", result.images.len());

    converter
        .write(&result)
        .context("Failed to write Markdown document")
}

/// File name used for the document title and output names.
///
/// Names that are not valid UTF-8 are converted lossily.
fn deck_filename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}
