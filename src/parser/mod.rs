//! CSV reading with encoding auto-detection.
//!
//! HR exports arrive in whatever encoding the source system produced
//! (UTF-8, ISO-8859-1, Windows-1252). This module detects the encoding with
//! chardet, decodes with encoding_rs, and hands the decoded text to the
//! `csv` crate for typed deserialization.

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::FileResult;

/// Result of reading a CSV file, with metadata about how it was read.
#[derive(Debug, Clone)]
pub struct ParseResult<T> {
    /// Typed records, one per data row.
    pub records: Vec<T>,
    /// Column headers as they appeared in the file.
    pub headers: Vec<String>,
    /// Detected encoding.
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the detected encoding.
///
/// Unknown encodings fall back to lossy UTF-8 so a stray byte never aborts
/// the run before validation can report something useful.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding {
        "utf-8" => String::from_utf8_lossy(bytes).to_string(),
        "iso-8859-1" | "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        _ => String::from_utf8_lossy(bytes).to_string(),
    }
}

/// Read a comma-separated CSV file into typed records.
///
/// Whitespace around fields is trimmed. Quoted fields may contain commas,
/// which is how `memberOf` lists arrive in `group_membership.csv`.
///
/// # Example
/// ```ignore
/// let result: ParseResult<GroupRecord> = read_csv_file(Path::new("files/groups.csv"))?;
/// println!("{} groups ({})", result.records.len(), result.encoding);
/// ```
pub fn read_csv_file<T: DeserializeOwned>(path: &Path) -> FileResult<ParseResult<T>> {
    let bytes = std::fs::read(path)?;
    read_csv_bytes(&bytes)
}

/// Read comma-separated CSV bytes into typed records.
pub fn read_csv_bytes<T: DeserializeOwned>(bytes: &[u8]) -> FileResult<ParseResult<T>> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }

    Ok(ParseResult {
        records,
        headers,
        encoding,
    })
}

/// Read only the header row of a CSV file.
///
/// Used when the header set must be checked before any row is deserialized,
/// so a renamed column reports as a header mismatch rather than a serde error.
pub fn read_csv_headers(path: &Path) -> FileResult<Vec<String>> {
    let bytes = std::fs::read(path)?;
    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, &encoding);

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    Ok(reader.headers()?.iter().map(String::from).collect())
}
