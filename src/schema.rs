//! Column discovery and projection for the generic-schema mode.
//!
//! Nested objects are flattened into dotted paths (`parent.child`). When
//! array flattening is on, arrays of objects are flattened too, with the
//! element index as a path segment (`parent.0.child`).

use crate::error::{ConvertError, Result};
use crate::input::{lines, parse_object};
use crate::render::cell;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::BufRead;

/// Visit every leaf of `map` with its flattened path, in key order.
fn walk<F>(map: &Map<String, Value>, prefix: &str, flatten_arrays: bool, visit: &mut F) -> Result<()>
where
    F: FnMut(String, &Value) -> Result<()>,
{
    for (key, value) in map {
        walk_value(format!("{prefix}{key}"), value, flatten_arrays, visit)?;
    }
    Ok(())
}

fn walk_value<F>(path: String, value: &Value, flatten_arrays: bool, visit: &mut F) -> Result<()>
where
    F: FnMut(String, &Value) -> Result<()>,
{
    match value {
        Value::Object(map) => walk(map, &format!("{path}."), flatten_arrays, visit),
        Value::Array(items) if flatten_arrays && is_object_array(items) => {
            for (idx, item) in items.iter().enumerate() {
                walk_value(format!("{path}.{idx}"), item, flatten_arrays, visit)?;
            }
            Ok(())
        }
        leaf => visit(path, leaf),
    }
}

fn is_object_array(items: &[Value]) -> bool {
    !items.is_empty() && items.iter().all(Value::is_object)
}

/// Ordered set of flattened field paths, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    headers: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every line of `reader` and collect its field paths.
    pub fn discover<R: BufRead>(reader: R, flatten_arrays: bool) -> Result<Self> {
        let mut schema = Self::new();
        for line in lines(reader) {
            let (line_no, line) = line?;
            schema.observe(&parse_object(line_no, &line)?, flatten_arrays)?;
        }
        Ok(schema)
    }

    /// Append any path of `event` not seen before.
    pub fn observe(&mut self, event: &Map<String, Value>, flatten_arrays: bool) -> Result<()> {
        walk(event, "", flatten_arrays, &mut |path: String, _: &Value| {
            if !self.positions.contains_key(&path) {
                self.positions.insert(path.clone(), self.headers.len());
                self.headers.push(path);
            }
            Ok(())
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn position(&self, path: &str) -> Option<usize> {
        self.positions.get(path).copied()
    }

    /// Render `event` as one row aligned to the headers; absent fields stay blank.
    pub fn project(&self, event: &Map<String, Value>, flatten_arrays: bool) -> Result<Vec<String>> {
        let mut row = vec![String::new(); self.headers.len()];
        walk(event, "", flatten_arrays, &mut |path: String, value: &Value| {
            let idx = self
                .position(&path)
                .ok_or(ConvertError::FieldNotInSchema { path })?;
            row[idx] = cell(value);
            Ok(())
        })?;
        Ok(row)
    }
}
