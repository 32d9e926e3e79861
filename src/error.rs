use crate::entity::EntityKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot open input file {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot create output file {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parse error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Line {line} is not a JSON object")]
    NotAnObject { line: usize },

    #[error("Line {line} has no `{field}` field")]
    MissingField { line: usize, field: &'static str },

    #[error("Line {line}: cannot decode {kind} event: {source}")]
    InvalidEvent {
        line: usize,
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} {id} completed without a matching start event")]
    MissingEntity { kind: EntityKind, id: i64 },

    #[error("Field `{path}` is not in the discovered header set")]
    FieldNotInSchema { path: String },

    #[error("Delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
