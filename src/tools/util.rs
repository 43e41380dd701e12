//! Utility functions for tools

use std::fs;
use std::io::{self, Read};

use serde::Serialize;

use crate::error::AppError;
use crate::record::Record;

/// Read a whole input file, `-` meaning stdin
pub fn read_input(path: &str) -> Result<String, AppError> {
    if path == "-" {
        let mut data = String::new();
        io::stdin().read_to_string(&mut data)?;
        return Ok(data);
    }

    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => AppError::NotFound(format!("Input file '{}' does not exist", path)),
        _ => AppError::Io(format!("Failed to read '{}': {}", path, e)),
    })
}

/// Parse a JSON array of records
pub fn parse_records(data: &str) -> Result<Vec<Record>, AppError> {
    match serde_json::from_str::<Record>(data)? {
        Record::Array(items) => Ok(items),
        other => Err(AppError::InvalidInput(format!(
            "Expected a JSON array of records, found {}",
            json_kind(&other)
        ))),
    }
}

pub fn load_records(path: &str) -> Result<Vec<Record>, AppError> {
    parse_records(&read_input(path)?)
}

/// Pretty-printed JSON for `--json` output
pub fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(format!("Failed to serialize output: {}", e)))
}

fn json_kind(value: &Record) -> &'static str {
    match value {
        Record::Null => "null",
        Record::Bool(_) => "a boolean",
        Record::Number(_) => "a number",
        Record::String(_) => "a string",
        Record::Array(_) => "an array",
        Record::Object(_) => "an object",
    }
}
