use crate::error::{ConvertError, Result};
use clap::ValueEnum;

/// How columns are chosen for the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Hand-maintained field lists per event kind, plus job/stage/task tables
    #[default]
    Fixed,
    /// Columns discovered from every field path present in the file
    Generic,
}

/// What to do when an end event has no recorded start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Pairing {
    /// Abort the conversion
    #[default]
    Strict,
    /// Build the record from the end event alone and keep going
    Lenient,
}

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub mode: Mode,
    pub pairing: Pairing,
    pub flatten_arrays: bool,
    pub delimiter: u8,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Fixed,
            pairing: Pairing::Strict,
            flatten_arrays: false,
            delimiter: b';',
        }
    }
}

/// Parse a delimiter given on the command line.
pub fn parse_delimiter(s: &str) -> Result<u8> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ if s == "\\t" => Ok(b'\t'),
        _ => Err(ConvertError::InvalidDelimiter(s.to_string())),
    }
}
