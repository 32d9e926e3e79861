use crate::error::{ConvertError, Result};
use serde_json::{Map, Value};
use std::io::BufRead;

/// Iterate over the non-blank lines of `reader`, paired with their 1-based line number.
pub fn lines<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(usize, String)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(Ok((idx + 1, line))),
            Err(e) => Some(Err(ConvertError::Io(e))),
        })
}

/// Parse one line as a JSON object.
pub fn parse_object(line_no: usize, line: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(line).map_err(|source| ConvertError::Json {
        line: line_no,
        source,
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(ConvertError::NotAnObject { line: line_no }),
    }
}
