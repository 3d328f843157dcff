//! Size breakdown by content category.
//!
//! [`aggregate`] sums the content sizes of scanned objects per category.
//! Bytes not attributed to any object (header, xref table, trailer, or a
//! tail the scanner abandoned) are added to the text bucket, so the four
//! category totals always add up to the file size.
//!
//! The real/vector/other text totals are a separate axis. They come from
//! per-object heuristics and do not reconcile with `text_size`.

use crate::scanner::{ObjectKind, PdfObject};
use serde::Serialize;
use tracing::{debug, warn};

/// Aggregate sizes for one buffer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Breakdown {
    /// Length of the scanned buffer
    pub total_size: usize,
    /// Content bytes of image objects
    pub images_size: usize,
    /// Content bytes of font objects
    pub fonts_size: usize,
    /// Content bytes of metadata objects
    pub metadata_size: usize,
    /// Content bytes of text objects plus all leftover bytes
    pub text_size: usize,
    /// Sum of `BT..ET` sizes over text objects
    pub real_text_size: usize,
    /// Sum of vector text sizes over text objects
    pub vector_text_size: usize,
    /// Sum of other text sizes over text objects
    pub other_text_size: usize,
    /// Content size of each image, in scan order
    pub image_sizes: Vec<usize>,
    /// Number of image objects
    pub image_count: usize,
    /// Number of scanned objects of any category
    pub object_count: usize,
}

impl Breakdown {
    /// Sum of the four category buckets
    pub fn categorized(&self) -> usize {
        self.images_size + self.fonts_size + self.metadata_size + self.text_size
    }

    /// Returns true if the category buckets add up to the total size
    pub fn is_balanced(&self) -> bool {
        self.categorized() == self.total_size
    }
}

/// Compute the size breakdown of `objects` scanned from a buffer of
/// `total_size` bytes.
pub fn aggregate(objects: &[PdfObject], total_size: usize) -> Breakdown {
    let mut breakdown = Breakdown {
        total_size,
        object_count: objects.len(),
        ..Breakdown::default()
    };
    let mut accounted = 0usize;

    for object in objects {
        accounted += object.content_size;

        match &object.kind {
            ObjectKind::Image(_) => {
                breakdown.images_size += object.content_size;
                breakdown.image_sizes.push(object.content_size);
                breakdown.image_count += 1;
            }
            ObjectKind::Font => breakdown.fonts_size += object.content_size,
            ObjectKind::Metadata => breakdown.metadata_size += object.content_size,
            ObjectKind::Text(sizes) => {
                breakdown.text_size += object.content_size;
                breakdown.real_text_size += sizes.real;
                breakdown.vector_text_size += sizes.vector;
                breakdown.other_text_size += sizes.other;
            }
        }
    }

    if accounted < total_size {
        let leftover = total_size - accounted;
        debug!("Attributing {} leftover bytes to text", leftover);
        breakdown.text_size += leftover;
    } else if accounted > total_size {
        warn!(
            "Objects account for {} bytes but the buffer has only {}",
            accounted, total_size
        );
    }

    breakdown
}
