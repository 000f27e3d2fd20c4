//! Polem Parser - Loading and writing label batches
//!
//! Batches arrive as JSON files of the form
//! `{ "docs": [ { "labels": [ ... ] }, ... ] }`. The loader validates the
//! path before touching the file and leaves structural validation of the
//! batch to the pipeline.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while loading or writing a batch
#[derive(Error, Debug)]
pub enum ParserError {
    /// Path does not exist
    #[error("File doesn't exist: {0}")]
    NotFound(String),

    /// File is not a JSON file
    #[error("File is not of .json type: {0}")]
    UnsupportedFormat(String),

    /// IO error while reading the file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid JSON
    #[error("Invalid JSON in {path}: {source}")]
    InvalidJson {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Output could not be serialized or written
    #[error("Failed to write JSON: {0}")]
    WriteError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ParserError>;

/// Whether the path carries a `.json` extension
pub fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Read and parse a JSON batch file
pub fn read_json_from_disk(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let display = path.display().to_string();

    if !path.exists() {
        return Err(ParserError::NotFound(display));
    }
    if !is_json_path(path) {
        return Err(ParserError::UnsupportedFormat(display));
    }

    let content = fs::read(path).map_err(|e| ParserError::IoError {
        path: display.clone(),
        source: e,
    })?;

    serde_json::from_slice(&content).map_err(|e| ParserError::InvalidJson {
        path: display,
        source: e,
    })
}

/// Write `value` as pretty JSON indented by `indent` spaces
pub fn write_json_pretty<W: Write>(value: &Value, writer: W, indent: usize) -> Result<()> {
    let indent = " ".repeat(indent);
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

/// Render `value` as pretty JSON indented by `indent` spaces
pub fn to_pretty_string(value: &Value, indent: usize) -> Result<String> {
    let mut buffer = Vec::new();
    write_json_pretty(value, &mut buffer, indent)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

// ============================================================================
// Tests
// ============================================================================
