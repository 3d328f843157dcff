//! pdfweight - Break down the size of PDF files by content kind
//!
//! This tool scans PDF files for their objects, reports how many bytes go to
//! images, fonts, metadata and text, and can dump embedded image streams.

mod report;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use pdfweight_core::{analyze_with, export_images_detailed, load, Scanner, ScannerConfig};
use report::{Exported, FileReport};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Break down the size of PDF files into images, fonts, metadata and text
#[derive(Parser, Debug)]
#[command(name = "pdfweight")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Write the payload of every image object into this directory
    #[arg(long, value_name = "DIR")]
    export_images: Option<PathBuf>,

    /// Print a per-image table with name, format, size and dimensions
    #[arg(long)]
    details: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Maximum number of objects to scan per file (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_objects: usize,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// PDF file to analyze, or a directory searched recursively for PDF files
    path: PathBuf,
}

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// One JSON document per file
    Json,
}

fn main() -> Result<()> {
    // Usage errors exit with 1; --help and --version are not errors
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.path.is_dir() {
        process_directory(&cli, &cli.path).map(|_| ())
    } else {
        process_single_file(&cli, &cli.path)
    }
}

/// Process a single PDF file
fn process_single_file(cli: &Cli, file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }

    let report = process_pdf(cli, file, cli.export_images.as_deref())?;
    print_report(cli, &report)
}

/// Counts from one directory run
#[derive(Debug, Default, PartialEq, Eq)]
struct DirectoryStats {
    /// Files that looked like PDFs
    matched: usize,
    /// Files that were loaded and reported
    processed: usize,
}

/// Process every PDF below a directory
fn process_directory(cli: &Cli, directory: &Path) -> Result<DirectoryStats> {
    info!("Scanning directory: {}", directory.display());

    let mut stats = DirectoryStats::default();

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        // Symlinks are kept so that a dangling one is reported, not ignored
        if entry.file_type().is_dir() || is_hidden(path) {
            continue;
        }
        if !has_pdf_extension(path) {
            trace!("Skipping non-PDF: {}", path.display());
            continue;
        }
        stats.matched += 1;

        let export_dir = cli
            .export_images
            .as_ref()
            .map(|dir| dir.join(export_subdir(directory, path)));

        debug!("Processing PDF: {}", path.display());
        match process_pdf(cli, path, export_dir.as_deref()) {
            Ok(report) => {
                print_report(cli, &report)?;
                stats.processed += 1;
            }
            // Log error but continue with other files
            Err(e) => warn!("Error processing {}: {:#}", path.display(), e),
        }
    }

    if stats.matched == 0 {
        warn!("No PDF files found in {}", directory.display());
    } else if stats.processed == 0 {
        warn!(
            "None of the {} PDF files in {} could be processed",
            stats.matched,
            directory.display()
        );
    }
    info!("Processed {} of {} PDF files", stats.processed, stats.matched);

    Ok(stats)
}

/// Load, scan, aggregate and optionally export one file
fn process_pdf(cli: &Cli, path: &Path, export_dir: Option<&Path>) -> Result<FileReport> {
    let data =
        load(path).with_context(|| format!("Failed to load PDF: {}", path.display()))?;

    let scanner = Scanner::with_config(ScannerConfig::new().max_objects(cli.max_objects));
    let analysis = analyze_with(&scanner, &data);

    debug!(
        "Found {} objects ({} images) in {}",
        analysis.objects.len(),
        analysis.breakdown.image_count,
        path.display()
    );

    let mut report = FileReport::new(path, analysis);

    if let Some(dir) = export_dir {
        let images = export_images_detailed(&data, &report.analysis.objects, dir);
        info!("Exported {} images to {}", images.len(), dir.display());
        report.exported = Some(Exported {
            directory: dir.to_path_buf(),
            images,
        });
    }

    Ok(report)
}

fn print_report(cli: &Cli, report: &FileReport) -> Result<()> {
    match cli.format {
        OutputFormat::Text => print!("{}", report.to_text(cli.details)),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("Failed to encode report")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Per-file export directory in directory mode: the file's path below
/// `root` without its extension, so `a/x.pdf` and `b/x.pdf` stay apart.
fn export_subdir(root: &Path, path: &Path) -> PathBuf {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let subdir: PathBuf = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if subdir.as_os_str().is_empty() {
        PathBuf::from("unnamed")
    } else {
        subdir
    }
}
