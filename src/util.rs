//! Input reading and text helpers shared across the pipeline.

use std::borrow::Cow;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};

/// Decode bytes to a string, handling legacy encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. Falls back to Windows-1252 (common for files saved by older editors)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Read a required input file as raw bytes.
///
/// A missing file is reported as [`Error::MissingInputFile`]; any other
/// I/O failure is passed through.
pub fn read_required_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| missing_or_io(path, e))
}

/// Read a required input file as text.
pub fn read_required_text(path: &Path) -> Result<String> {
    let bytes = read_required_bytes(path)?;
    Ok(decode_text(&bytes).into_owned())
}

fn missing_or_io(path: &Path, e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::MissingInputFile {
            path: path.to_path_buf(),
        }
    } else {
        Error::Io(e)
    }
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
