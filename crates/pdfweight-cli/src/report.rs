//! Rendering analysis results for the terminal.

use pdfweight_core::{Analysis, ExportedImage};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Everything printed for one input file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub analysis: Analysis,
    /// `None` when export was not requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported: Option<Exported>,
}

/// Result of an `--export-images` run
#[derive(Debug, Serialize)]
pub struct Exported {
    pub directory: PathBuf,
    pub images: Vec<ExportedImage>,
}

impl FileReport {
    pub fn new(path: &Path, analysis: Analysis) -> Self {
        Self {
            path: path.to_path_buf(),
            analysis,
            exported: None,
        }
    }

    /// Human-readable summary
    pub fn to_text(&self, details: bool) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail
        let _ = self.write_text(&mut out, details);
        out
    }

    fn write_text(&self, out: &mut String, details: bool) -> std::fmt::Result {
        let b = &self.analysis.breakdown;

        writeln!(out, "PDF Size Analysis: {}", self.path.display())?;
        if let Some(version) = &self.analysis.version {
            writeln!(out, "PDF Version: {}", version)?;
        }
        writeln!(out, "Total Size: {} bytes", b.total_size)?;
        writeln!(out, "Objects: {}", b.object_count)?;

        write!(out, "Images: {} bytes ({} images)", b.images_size, b.image_count)?;
        if !b.image_sizes.is_empty() {
            let sizes: Vec<String> = b.image_sizes.iter().map(|s| s.to_string()).collect();
            write!(out, " [{}]", sizes.join(", "))?;
        }
        writeln!(out)?;

        if details && b.image_count > 0 {
            writeln!(
                out,
                "  {:>4}  {:<16} {:<9} {:>12}  {}",
                "#", "Name", "Format", "Size", "Dimensions"
            )?;
            for (i, object) in self.analysis.images().enumerate() {
                let Some(info) = object.image() else {
                    continue;
                };
                let name = if info.name.is_empty() { "-" } else { &info.name };
                writeln!(
                    out,
                    "  {:>4}  {:<16} {:<9} {:>12}  {}x{}",
                    i + 1,
                    name,
                    info.format.to_string(),
                    object.content_size,
                    info.width,
                    info.height
                )?;
            }
        }

        writeln!(out, "Fonts: {} bytes", b.fonts_size)?;
        writeln!(out, "Metadata: {} bytes", b.metadata_size)?;
        writeln!(out, "Text: {} bytes", b.text_size)?;
        writeln!(out, "  - Real Text (BT...ET): {} bytes", b.real_text_size)?;
        writeln!(out, "  - Vector Text: {} bytes", b.vector_text_size)?;
        writeln!(out, "  - Other Text: {} bytes", b.other_text_size)?;

        if let Some(exported) = &self.exported {
            writeln!(
                out,
                "Exported {} image(s) to {}",
                exported.images.len(),
                exported.directory.display()
            )?;
            for image in &exported.images {
                writeln!(out, "  {} ({} bytes)", image.path.display(), image.size)?;
            }
        }

        Ok(())
    }
}
