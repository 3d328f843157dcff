//! Writing embedded image payloads to disk.
//!
//! Payloads are written verbatim: a `/DCTDecode` stream is already a JPEG
//! file, a `/JPXDecode` stream is a JPEG 2000 codestream, and anything else is
//! dumped with a neutral extension since nothing here decodes streams.

use crate::error::{Error, Result};
use crate::scanner::{locate_stream, ImageFormat, PdfObject};
use serde::Serialize;
use std::fs;
use std::ops::Range;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, error, warn};

/// One image payload written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedImage {
    /// 1-based position among the image objects of the buffer
    pub index: usize,
    /// Where the payload was written
    pub path: PathBuf,
    /// Format used to pick the extension
    pub format: ImageFormat,
    /// Number of bytes written
    pub size: usize,
}

/// Write the payload of every image object into `output_dir`.
///
/// Returns the paths that were written successfully, in scan order.
pub fn export_images(data: &[u8], objects: &[PdfObject], output_dir: &Path) -> Vec<PathBuf> {
    export_images_detailed(data, objects, output_dir)
        .into_iter()
        .map(|image| image.path)
        .collect()
}

/// Like [`export_images`], but returns a record per written image.
///
/// Failing to create `output_dir` aborts the export and yields an empty list.
/// A failed write is logged and skipped; later images are still attempted.
pub fn export_images_detailed(
    data: &[u8],
    objects: &[PdfObject],
    output_dir: &Path,
) -> Vec<ExportedImage> {
    if let Err(e) = fs::create_dir_all(output_dir)
        .map_err(|e| Error::directory_create(output_dir, e))
    {
        error!("{}", e);
        return Vec::new();
    }

    let mut exported = Vec::new();
    let images = objects
        .iter()
        .filter_map(|object| object.image().map(|info| (object, info)));

    for (i, (object, info)) in images.enumerate() {
        let index = i + 1;
        let file_name = image_file_name(index, &info.name, info.format);
        let range = payload_range(data, object);

        match write_payload(output_dir, &file_name, &data[range.clone()]) {
            Ok(path) => {
                debug!("Wrote image {} ({} bytes) to {}", index, range.len(), path.display());
                exported.push(ExportedImage {
                    index,
                    path,
                    format: info.format,
                    size: range.len(),
                });
            }
            Err(e) => warn!("Skipping image {}: {}", index, e),
        }
    }

    exported
}

/// Byte range to export for an image object.
///
/// Prefers the stream payload; otherwise takes `content_size` bytes from the
/// start of the object, clamped to the buffer.
fn payload_range(data: &[u8], object: &PdfObject) -> Range<usize> {
    locate_stream(data, object.span()).unwrap_or_else(|| {
        let start = object.start_offset.min(data.len());
        let end = start.saturating_add(object.content_size).min(data.len());
        start..end
    })
}

/// Build `image_<n>[_<name>].<ext>` with the name reduced to safe characters.
fn image_file_name(index: usize, name: &str, format: ImageFormat) -> String {
    let name: String = name
        .trim_start_matches('.')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() {
        format!("image_{}.{}", index, format.extension())
    } else {
        format!("image_{}_{}.{}", index, name, format.extension())
    }
}

/// Write one payload, refusing names that would leave `output_dir`.
fn write_payload(output_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let relative = Path::new(file_name);
    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_)))
    {
        return Err(Error::path_traversal(relative));
    }

    let path = output_dir.join(relative);
    fs::write(&path, bytes).map_err(|e| Error::file_write(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{scan, ImageInfo, ObjectKind};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn image_object(start: usize, content_size: usize, format: ImageFormat) -> PdfObject {
        PdfObject {
            start_offset: start,
            end_offset: start + content_size,
            content_size,
            kind: ObjectKind::Image(ImageInfo {
                format,
                ..ImageInfo::default()
            }),
        }
    }

    #[test]
    fn test_image_file_name() {
        assert_eq!(image_file_name(1, "", ImageFormat::Jpeg), "image_1.jpg");
        assert_eq!(image_file_name(2, "Im0", ImageFormat::Jpeg2000), "image_2_Im0.jp2");
        assert_eq!(image_file_name(3, "a b", ImageFormat::Flate), "image_3_a_b.dat");
        assert_eq!(image_file_name(4, "..\\evil", ImageFormat::Png), "image_4__evil.png");
        assert_eq!(image_file_name(5, "x", ImageFormat::Unknown), "image_5_x.bin");
    }

    #[test]
    fn test_write_payload_rejects_traversal() {
        let dir = TempDir::new().unwrap();
        let err = write_payload(dir.path(), "../escape.bin", b"x").unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_exports_stream_payloads_in_order() {
        let data: &[u8] = b"%PDF-1.4\n\
            1 0 obj << /Type /XObject /Name Im1 /Filter /DCTDecode >> stream\n\xFF\xD8\xFF\xD9endstream\nendobj\n\
            2 0 obj << /Type /Font >> endobj\n\
            3 0 obj << /Type /XObject /Filter /JPXDecode >> stream\r\n\x00\x00\x00\x0CjPendstream\nendobj\n";
        let objects = scan(data);
        let dir = TempDir::new().unwrap();

        let exported = export_images_detailed(data, &objects, dir.path());

        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0].path, dir.path().join("image_1_Im1.jpg"));
        assert_eq!(exported[1].path, dir.path().join("image_2.jp2"));
        assert_eq!(fs::read(&exported[0].path).unwrap(), b"\xFF\xD8\xFF\xD9");
        assert_eq!(fs::read(&exported[1].path).unwrap(), b"\n\x00\x00\x00\x0CjP");
        assert_eq!(exported[1].size, 7);
    }

    #[test]
    fn test_creates_missing_output_dir() {
        let data = b"1 0 obj<</XObject>>stream\nabcendstream endobj";
        let objects = scan(data);
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let paths = export_images(data, &objects, &nested);
        assert_eq!(paths, vec![nested.join("image_1.bin")]);
    }

    #[test]
    fn test_fallback_is_clamped_to_buffer() {
        let data = b"0123456789";
        let objects = [image_object(6, 100, ImageFormat::Unknown)];
        let dir = TempDir::new().unwrap();

        let exported = export_images_detailed(data, &objects, dir.path());
        assert_eq!(exported.len(), 1);
        assert_eq!(fs::read(&exported[0].path).unwrap(), b"6789");
    }

    #[test]
    fn test_fallback_past_buffer_end_writes_empty_file() {
        let data = b"0123";
        let objects = [image_object(50, 10, ImageFormat::Jpeg)];
        let dir = TempDir::new().unwrap();

        let exported = export_images_detailed(data, &objects, dir.path());
        assert_eq!(exported[0].size, 0);
    }

    #[test]
    fn test_output_dir_failure_returns_empty() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"not a directory").unwrap();

        let data = b"1 0 obj<</XObject>>endobj";
        let paths = export_images(data, &scan(data), &blocker.join("out"));
        assert!(paths.is_empty());
    }

    #[test]
    fn test_failed_write_does_not_stop_export() {
        let data = b"1 0 obj<</XObject /Name a>>endobj\n2 0 obj<</XObject>>endobj";
        let objects = scan(data);
        let dir = TempDir::new().unwrap();
        // A directory squatting on the first target makes its write fail
        fs::create_dir(dir.path().join("image_1_a.bin")).unwrap();

        let paths = export_images(data, &objects, dir.path());
        assert_eq!(paths, vec![dir.path().join("image_2.bin")]);
    }

    #[test]
    fn test_non_image_objects_are_skipped() {
        let data = b"1 0 obj<</Font>>stream\nxendstream endobj";
        let dir = TempDir::new().unwrap();
        assert!(export_images(data, &scan(data), dir.path()).is_empty());
    }
}
