//! Byte-level object scanning and classification.
//!
//! This module walks a PDF buffer and finds the `N G obj ... endobj` units
//! inside it using literal marker search. It is not a PDF parser: there is no
//! tokenizer, no xref resolution and no stream decoding. Every decision is
//! made on raw byte patterns so the scan is safe on arbitrary binary content.
//!
//! ## Algorithm Overview
//!
//! 1. Search for the ` obj` marker from the cursor
//! 2. Backtrack to the start of that line to recover the object label
//! 3. Search forward for `endobj`; the object span ends right after it
//! 4. Narrow the content size to the `stream ... endstream` payload, if any
//! 5. Classify the object from its header bytes (image, font, metadata, text)
//! 6. Move the cursor to the end of the span and repeat
//!
//! A missing `endobj` stops the scan. The abandoned tail is not an error; the
//! aggregator folds it into the leftover bytes.
//!
//! Stream payloads may contain bytes that happen to spell `endobj` or
//! `stream`. Those produce wrong spans, and nothing here tries to
//! disambiguate them.
//!
//! ## Extensibility
//!
//! The [`ScanStrategy`] trait allows custom scanning algorithms:
//!
//! ```no_run
//! use pdfweight_core::scanner::{PdfObject, ScanStrategy};
//!
//! struct NoopScanner;
//!
//! impl ScanStrategy for NoopScanner {
//!     fn scan(&self, data: &[u8]) -> Vec<PdfObject> {
//!         let _ = data;
//!         vec![]
//!     }
//! }
//! ```

mod pattern;

use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::ops::Range;
use tracing::{debug, trace};

/// Marker that introduces an indirect object (`12 0 obj`)
const OBJ_MARKER: &[u8] = b" obj";

/// Marker that closes an indirect object
const ENDOBJ_MARKER: &[u8] = b"endobj";

/// Marker that opens an embedded stream
const STREAM_MARKER: &[u8] = b"stream";

/// Marker that closes an embedded stream
const ENDSTREAM_MARKER: &[u8] = b"endstream";

/// Classification keys, in precedence order
const CATEGORY_KEYS: [(&[u8], Category); 3] = [
    (b"/XObject", Category::Image),
    (b"/Font", Category::Font),
    (b"/Metadata", Category::Metadata),
];

/// Image filters, in precedence order
const FILTER_KEYS: [(&[u8], ImageFormat); 3] = [
    (b"/DCTDecode", ImageFormat::Jpeg),
    (b"/FlateDecode", ImageFormat::Flate),
    (b"/JPXDecode", ImageFormat::Jpeg2000),
];

/// Path construction operators that mark glyphs drawn as vectors
const PATH_OPERATORS: [&[u8]; 3] = [b" m", b" l", b" c"];

/// Default number of leading span bytes inspected for classification
pub const DEFAULT_SNIPPET_LEN: usize = 100;

/// Content category of a scanned object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Image XObject
    Image,
    /// Font dictionary or font program
    Font,
    /// Metadata stream
    Metadata,
    /// Anything else, including page content streams
    Text,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Image => "Image",
            Self::Font => "Font",
            Self::Metadata => "Metadata",
            Self::Text => "Text",
        };
        f.write_str(name)
    }
}

/// Encoding of an image payload, derived from its `/Filter`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ImageFormat {
    /// `/DCTDecode`
    #[serde(rename = "JPEG")]
    Jpeg,
    /// `/FlateDecode`
    #[serde(rename = "Flate")]
    Flate,
    /// `/JPXDecode`
    #[serde(rename = "JPEG2000")]
    Jpeg2000,
    /// Never produced by [`Scanner`]; kept so exporters can map it.
    #[serde(rename = "PNG")]
    Png,
    /// No recognised filter
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl ImageFormat {
    /// File extension used when the payload is written to disk
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Jpeg2000 => "jp2",
            Self::Flate => "dat",
            Self::Png => "png",
            Self::Unknown => "bin",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Flate => "Flate",
            Self::Jpeg2000 => "JPEG2000",
            Self::Png => "PNG",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Best-effort details of an image object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImageInfo {
    /// Resource label from `/Name`, empty when absent
    pub name: String,
    /// Format derived from the filter keys
    pub format: ImageFormat,
    /// `/Width`, 0 when absent or unparseable
    pub width: u32,
    /// `/Height`, 0 when absent or unparseable
    pub height: u32,
}

/// Diagnostic split of a text object.
///
/// The three fields are independent heuristics, not a partition: vector text
/// is attributed the whole span, so `real + vector` can exceed the span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextSizes {
    /// Bytes from the first `BT` through the following `ET`
    pub real: usize,
    /// Whole span when any path operator is present, otherwise 0
    pub vector: usize,
    /// `span - real - vector`, clamped at 0
    pub other: usize,
}

/// Category-specific data attached to an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ObjectKind {
    /// Image XObject with its extracted details
    Image(ImageInfo),
    /// Font object
    Font,
    /// Metadata object
    Metadata,
    /// Text object with its sub-classification
    Text(TextSizes),
}

impl ObjectKind {
    /// The plain category of this kind
    pub fn category(&self) -> Category {
        match self {
            Self::Image(_) => Category::Image,
            Self::Font => Category::Font,
            Self::Metadata => Category::Metadata,
            Self::Text(_) => Category::Text,
        }
    }
}

/// A single object found in the buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfObject {
    /// Offset of the first byte of the object's line
    pub start_offset: usize,
    /// Offset just past `endobj`
    pub end_offset: usize,
    /// Bytes attributed to this object: the stream payload if there is one,
    /// the whole span otherwise
    pub content_size: usize,
    /// Category and the data specific to it
    #[serde(flatten)]
    pub kind: ObjectKind,
}

impl PdfObject {
    /// Byte range of the whole object span
    pub fn span(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }

    /// Length of the whole object span
    pub fn span_len(&self) -> usize {
        self.end_offset - self.start_offset
    }

    /// The object's category
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Image details, if this is an image
    pub fn image(&self) -> Option<&ImageInfo> {
        match &self.kind {
            ObjectKind::Image(info) => Some(info),
            _ => None,
        }
    }

    /// Text sub-classification, if this is a text object
    pub fn text(&self) -> Option<&TextSizes> {
        match &self.kind {
            ObjectKind::Text(sizes) => Some(sizes),
            _ => None,
        }
    }
}

/// Configuration for the scanner
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Maximum number of objects to return (0 = unlimited)
    pub max_objects: usize,
    /// Number of leading span bytes inspected for classification
    pub snippet_len: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_objects: 0,
            snippet_len: DEFAULT_SNIPPET_LEN,
        }
    }
}

impl ScannerConfig {
    /// Creates a new scanner config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of objects to return
    pub fn max_objects(mut self, max: usize) -> Self {
        self.max_objects = max;
        self
    }

    /// Sets the length of the classification window
    pub fn snippet_len(mut self, len: usize) -> Self {
        self.snippet_len = len;
        self
    }
}

/// Trait for implementing custom scanning strategies
///
/// Implementations must return objects in increasing offset order without
/// overlap; the aggregator relies on it to keep the size total balanced.
pub trait ScanStrategy: Send + Sync {
    /// Scan the provided buffer for objects
    fn scan(&self, data: &[u8]) -> Vec<PdfObject>;
}

/// Literal-marker object scanner
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScannerConfig,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    /// Creates a new scanner with default configuration
    pub fn new() -> Self {
        Self {
            config: ScannerConfig::default(),
        }
    }

    /// Creates a new scanner with custom configuration
    pub fn with_config(config: ScannerConfig) -> Self {
        Self { config }
    }

    /// Finds the next object at or after `position`.
    ///
    /// The span runs from the start of the marker's line (bounded by
    /// `position`) through the end of the first `endobj` after the marker.
    ///
    /// Returns `None` when no further complete object exists, which ends the scan.
    fn next_object(&self, data: &[u8], position: usize) -> Option<PdfObject> {
        let marker = pattern::find_from(data, position, OBJ_MARKER)?;

        // Never backtrack past the cursor, or a second object on the same
        // line as the previous one would overlap it.
        let start = data[position..marker]
            .iter()
            .rposition(|&b| b == b'\n' || b == b'\r')
            .map_or(position, |eol| position + eol + 1);

        let Some(endobj) = pattern::find_from(data, marker, ENDOBJ_MARKER) else {
            trace!("Unterminated object at {}, abandoning scan", start);
            return None;
        };
        let end = endobj + ENDOBJ_MARKER.len();
        let span = &data[start..end];

        let content_size = locate_stream(data, start..end).map_or(span.len(), |p| p.len());

        let kind = match self.classify(span) {
            Category::Image => ObjectKind::Image(image_info(span)),
            Category::Font => ObjectKind::Font,
            Category::Metadata => ObjectKind::Metadata,
            Category::Text => ObjectKind::Text(text_sizes(span)),
        };

        Some(PdfObject {
            start_offset: start,
            end_offset: end,
            content_size,
            kind,
        })
    }

    /// Classifies a span by the keys in its leading bytes.
    fn classify(&self, span: &[u8]) -> Category {
        let snippet = &span[..span.len().min(self.config.snippet_len)];
        CATEGORY_KEYS
            .iter()
            .find(|(key, _)| pattern::contains(snippet, key))
            .map_or(Category::Text, |&(_, category)| category)
    }
}

impl ScanStrategy for Scanner {
    fn scan(&self, data: &[u8]) -> Vec<PdfObject> {
        let mut objects = Vec::new();
        let mut position = 0;

        debug!("Starting scan of {} bytes", data.len());

        while position < data.len() {
            let Some(object) = self.next_object(data, position) else {
                break;
            };

            trace!(
                "Found {} object at {}..{} ({} content bytes)",
                object.category(),
                object.start_offset,
                object.end_offset,
                object.content_size
            );

            position = object.end_offset;
            objects.push(object);

            if self.config.max_objects > 0 && objects.len() >= self.config.max_objects {
                debug!("Reached object limit of {}", self.config.max_objects);
                break;
            }
        }

        debug!("Scan complete: found {} objects", objects.len());
        objects
    }
}

/// Locates the stream payload inside an object span.
///
/// The payload starts right after `stream` plus at most one CR or LF byte and
/// ends at `endstream`. Returns `None` when either marker is missing from the
/// span, or when the first `stream` hit is the tail of `endstream` itself.
/// The returned range is absolute, i.e. an index into `data`.
pub fn locate_stream(data: &[u8], span: Range<usize>) -> Option<Range<usize>> {
    let bytes = data.get(span.clone())?;
    let stream = pattern::find(bytes, STREAM_MARKER)?;
    let endstream = pattern::find(bytes, ENDSTREAM_MARKER)?;

    let mut payload = stream + STREAM_MARKER.len();
    if matches!(bytes.get(payload), Some(b'\r' | b'\n')) {
        payload += 1;
    }
    if payload > endstream {
        return None;
    }

    Some(span.start + payload..span.start + endstream)
}

/// Splits a text span into its real, vector and other byte counts.
fn text_sizes(span: &[u8]) -> TextSizes {
    let real = pattern::find(span, b"BT")
        .and_then(|bt| Some((bt, pattern::find_from(span, bt, b"ET")?)))
        .filter(|&(bt, et)| et > bt)
        .map_or(0, |(bt, et)| et + 2 - bt);

    // TODO: decide whether vector text should exclude the BT..ET range once
    // there are sample files where both occur in a single content stream.
    let vector = if PATH_OPERATORS.iter().any(|op| pattern::contains(span, op)) {
        span.len()
    } else {
        0
    };

    TextSizes {
        real,
        vector,
        other: span.len().saturating_sub(real + vector),
    }
}

/// Extracts name, format and dimensions from an image span.
fn image_info(span: &[u8]) -> ImageInfo {
    let name = pattern::value_after(span, b"/Name")
        .map(|raw| String::from_utf8_lossy(raw).into_owned())
        .unwrap_or_default();

    let format = FILTER_KEYS
        .iter()
        .find(|(key, _)| pattern::contains(span, key))
        .map_or(ImageFormat::Unknown, |&(_, format)| format);

    ImageInfo {
        name,
        format,
        width: pattern::number_after(span, b"/Width"),
        height: pattern::number_after(span, b"/Height"),
    }
}

/// Scan a buffer with the default scanner
pub fn scan(data: &[u8]) -> Vec<PdfObject> {
    Scanner::new().scan(data)
}

/// Scan a file for objects
///
/// This is a convenience function that reads the file and scans it.
pub fn scan_file(path: impl AsRef<std::path::Path>) -> Result<Vec<PdfObject>> {
    let data = crate::loader::load(path)?;
    Ok(scan(&data))
}

/// Scan a file with custom configuration
pub fn scan_file_with_config(
    path: impl AsRef<std::path::Path>,
    config: ScannerConfig,
) -> Result<Vec<PdfObject>> {
    let data = crate::loader::load(path)?;
    Ok(Scanner::with_config(config).scan(&data))
}
