//! # pdfweight-core
//!
//! A library for finding out what takes up the space in a PDF file.
//!
//! This crate provides the core functionality for:
//! - Scanning a PDF buffer for `obj ... endobj` units with literal byte search
//! - Classifying each object as image, font, metadata or text
//! - Summing the sizes per category, including bytes outside any object
//! - Dumping embedded image streams to disk
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`loader`]: Reading files into memory
//! - [`scanner`]: Object scanning and classification
//! - [`breakdown`]: Per-category size aggregation
//! - [`export`]: Image payload extraction
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use pdfweight_core::{aggregate, export_images, load, Scanner, ScanStrategy};
//! use std::path::Path;
//!
//! let data = load("report.pdf")?;
//! let objects = Scanner::new().scan(&data);
//! let breakdown = aggregate(&objects, data.len());
//!
//! println!("images: {} bytes in {} objects", breakdown.images_size, breakdown.image_count);
//!
//! for path in export_images(&data, &objects, Path::new("./images")) {
//!     println!("wrote {}", path.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Extensibility
//!
//! - [`ScanStrategy`]: Customize the object scanning algorithm
//!

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod breakdown;
pub mod error;
pub mod export;
pub mod loader;
pub mod scanner;

// Re-export primary types for convenience
pub use breakdown::{aggregate, Breakdown};
pub use error::{Error, Result};
pub use export::{export_images, export_images_detailed, ExportedImage};
pub use loader::{load, pdf_version};
pub use scanner::{
    scan, Category, ImageFormat, ImageInfo, ObjectKind, PdfObject, ScanStrategy, Scanner,
    ScannerConfig, TextSizes,
};

use serde::Serialize;
use std::path::Path;

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything learned from one scan of a buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// Version from the `%PDF-` header, if present
    pub version: Option<String>,
    /// Size totals per category
    pub breakdown: Breakdown,
    /// Scanned objects, in offset order
    pub objects: Vec<PdfObject>,
}

impl Analysis {
    /// Image objects, in offset order
    pub fn images(&self) -> impl Iterator<Item = &PdfObject> + '_ {
        self.objects
            .iter()
            .filter(|object| object.category() == Category::Image)
    }
}

/// Scan and aggregate a buffer with the given scanner
pub fn analyze_with(scanner: &dyn ScanStrategy, data: &[u8]) -> Analysis {
    let objects = scanner.scan(data);
    Analysis {
        version: pdf_version(data),
        breakdown: aggregate(&objects, data.len()),
        objects,
    }
}

/// Scan and aggregate a buffer with the default scanner
pub fn analyze(data: &[u8]) -> Analysis {
    analyze_with(&Scanner::new(), data)
}

/// Load, scan and aggregate a file
pub fn analyze_file(path: impl AsRef<Path>) -> Result<Analysis> {
    let data = load(path)?;
    Ok(analyze(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_analyze_empty_buffer() {
        let analysis = analyze(b"no objects here");

        assert_eq!(analysis.version, None);
        assert!(analysis.objects.is_empty());
        assert_eq!(analysis.breakdown.text_size, analysis.breakdown.total_size);
    }

    #[test]
    fn test_analyze_with_custom_strategy() {
        struct FirstByteOnly;

        impl ScanStrategy for FirstByteOnly {
            fn scan(&self, data: &[u8]) -> Vec<PdfObject> {
                if data.is_empty() {
                    return vec![];
                }
                vec![PdfObject {
                    start_offset: 0,
                    end_offset: 1,
                    content_size: 1,
                    kind: ObjectKind::Font,
                }]
            }
        }

        let analysis = analyze_with(&FirstByteOnly, b"%PDF-1.5 abc");
        assert_eq!(analysis.version.as_deref(), Some("1.5"));
        assert_eq!(analysis.breakdown.fonts_size, 1);
        assert_eq!(analysis.breakdown.text_size, 11);
    }

    #[test]
    fn test_analyze_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.3\n1 0 obj<</XObject>>stream\nxyzendstream endobj\n").unwrap();

        let analysis = analyze_file(&path).unwrap();
        assert_eq!(analysis.images().count(), 1);
        assert_eq!(analysis.breakdown.image_sizes, vec![3]);
        assert!(analysis.breakdown.is_balanced());
    }
}
