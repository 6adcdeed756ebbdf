use crate::error::{ParseCmError, Result};
use std::path::Path;

/// Read `path` fully and hand its text to `parse`.
///
/// Any failure, including the read itself, is reported against `path`.
pub fn parse_file<T>(path: &Path, parse: impl FnOnce(&str) -> Result<T>) -> Result<T> {
    let text =
        std::fs::read_to_string(path).map_err(|e| ParseCmError::from(e).in_file(path))?;
    parse(&text).map_err(|e| e.in_file(path))
}
