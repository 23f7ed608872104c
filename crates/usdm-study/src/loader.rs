//! Reading study documents from disk.

use crate::error::StudyError;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read and parse a JSON document. The root shape is not checked here.
pub fn load_document(path: impl AsRef<Path>) -> Result<Value, StudyError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| StudyError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let document = parse_document(&bytes, &path.display().to_string())?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "document loaded");
    Ok(document)
}

pub fn parse_document(bytes: &[u8], origin: &str) -> Result<Value, StudyError> {
    serde_json::from_slice(bytes).map_err(|source| StudyError::ParseJson {
        path: origin.to_string(),
        source,
    })
}
