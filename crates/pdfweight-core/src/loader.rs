//! Reading input files into memory.

use crate::error::{Error, Result};
use std::path::Path;
use tracing::{trace, warn};

/// PDF header magic: `%PDF-`
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Length of the version that follows the magic, e.g. `1.7`
const VERSION_LEN: usize = 3;

/// Read a whole file into an owned byte buffer.
///
/// This is the only fallible step before reporting; everything downstream
/// works on the returned buffer by reference.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| Error::file_read(path, e))?;

    trace!("Read {} bytes from {}", data.len(), path.display());
    if pdf_version(&data).is_none() {
        warn!("{} has no %PDF- header, scanning anyway", path.display());
    }

    Ok(data)
}

/// Returns the version from a leading `%PDF-x.y` header, if there is one.
pub fn pdf_version(data: &[u8]) -> Option<String> {
    let version = data
        .strip_prefix(PDF_MAGIC)?
        .get(..VERSION_LEN)?;

    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Some(format!("{}.{}", *major as char, *minor as char))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_reads_all_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        let content = b"%PDF-1.4\n\x00\xFFbinary\x00";
        file.write_all(content).unwrap();

        let data = load(file.path()).unwrap();
        assert_eq!(data, content);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("missing.pdf")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_pdf_version() {
        assert_eq!(pdf_version(b"%PDF-1.7\n%\xE2\xE3"), Some("1.7".to_string()));
        assert_eq!(pdf_version(b"%PDF-2.0"), Some("2.0".to_string()));
        assert_eq!(pdf_version(b"%PDF-1"), None);
        assert_eq!(pdf_version(b"%PDF-x.y"), None);
        assert_eq!(pdf_version(b"GIF89a"), None);
        assert_eq!(pdf_version(b""), None);
    }
}
