use crate::config::{ConvertConfig, Mode};
use crate::entity::{Entity, EntityTable};
use crate::error::{ConvertError, Result};
use crate::event::Event;
use crate::input::{lines, parse_object};
use crate::passthrough::Tracker;
use crate::schema::Schema;
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const JOBS_SUFFIX: &str = "_jobs_.csv";
pub const STAGES_SUFFIX: &str = "_stages_.csv";
pub const TASKS_SUFFIX: &str = "_tasks_.csv";

/// Input path with a trailing `.json` removed.
pub fn output_stem(input: &Path) -> PathBuf {
    match input.extension() {
        Some(ext) if ext == "json" => input.with_extension(""),
        _ => input.to_path_buf(),
    }
}

pub fn output_path(stem: &Path, suffix: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[derive(Debug)]
pub struct Summary {
    pub events: usize,
    pub outputs: Vec<PathBuf>,
}

/// Single pass: write one pass-through row per event and fold lifecycle
/// events into the entity tables.
pub fn convert_fixed<R: BufRead, W: Write>(
    reader: R,
    writer: W,
    config: &ConvertConfig,
) -> Result<(Tracker, usize)> {
    let mut wtr = WriterBuilder::new()
        .delimiter(config.delimiter)
        .flexible(true)
        .from_writer(writer);
    let mut tracker = Tracker::new(config.pairing);
    let mut events = 0;

    for line in lines(reader) {
        let (line_no, line) = line?;
        let event = Event::parse(line_no, &line)?;
        wtr.write_record(tracker.observe(&event)?)?;
        events += 1;
    }

    wtr.flush()?;
    debug!(
        events,
        jobs = tracker.tables.jobs.len(),
        stages = tracker.tables.stages.len(),
        tasks = tracker.tables.tasks.len(),
        "Fixed-schema pass complete"
    );
    Ok((tracker, events))
}

/// Two passes over the same input: discover the header set, rewind, then
/// write one row per event aligned to it.
pub fn convert_generic<R: BufRead + Seek, W: Write>(
    mut reader: R,
    writer: W,
    config: &ConvertConfig,
) -> Result<(Schema, usize)> {
    let schema = Schema::discover(&mut reader, config.flatten_arrays)?;
    debug!(columns = schema.len(), "Header discovery complete");
    reader.rewind()?;

    let mut wtr = WriterBuilder::new()
        .delimiter(config.delimiter)
        .from_writer(writer);
    if !schema.is_empty() {
        wtr.write_record(schema.headers())?;
    }

    let mut events = 0;
    for line in lines(reader) {
        let (line_no, line) = line?;
        let row = schema.project(&parse_object(line_no, &line)?, config.flatten_arrays)?;
        // A zero-column row would still be written as `""`.
        if !row.is_empty() {
            wtr.write_record(row)?;
        }
        events += 1;
    }

    wtr.flush()?;
    Ok((schema, events))
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| ConvertError::Output {
        path: path.to_path_buf(),
        source,
    })
}

fn write_table<T: Entity>(table: &EntityTable<T>, path: PathBuf, delimiter: u8) -> Result<PathBuf> {
    table.write_csv(create(&path)?, delimiter)?;
    debug!(kind = %T::KIND, rows = table.len(), path = %path.display(), "Wrote entity table");
    Ok(path)
}

/// Convert `input` into CSV file(s) next to it.
pub fn run(input: &Path, config: &ConvertConfig) -> Result<Summary> {
    let file = File::open(input).map_err(|source| ConvertError::Input {
        path: input.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let stem = output_stem(input);
    let main_path = output_path(&stem, ".csv");
    let out = create(&main_path)?;
    info!(input = %input.display(), mode = ?config.mode, "Converting event log");

    let summary = match config.mode {
        Mode::Fixed => {
            let (tracker, events) = convert_fixed(reader, out, config)?;
            let tables = &tracker.tables;
            let outputs = vec![
                main_path,
                write_table(&tables.jobs, output_path(&stem, JOBS_SUFFIX), config.delimiter)?,
                write_table(&tables.stages, output_path(&stem, STAGES_SUFFIX), config.delimiter)?,
                write_table(&tables.tasks, output_path(&stem, TASKS_SUFFIX), config.delimiter)?,
            ];
            Summary { events, outputs }
        }
        Mode::Generic => {
            let (_, events) = convert_generic(reader, out, config)?;
            Summary {
                events,
                outputs: vec![main_path],
            }
        }
    };

    Ok(summary)
}
