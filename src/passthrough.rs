//! One-row-per-event output of the fixed-schema mode.
//!
//! Each known event kind maps to a [`Handler`]: either a short list of fields
//! copied from the event, or a lifecycle step that updates the entity tables
//! and yields the entity ID. Unknown kinds produce a row holding only the
//! kind name.

use crate::config::Pairing;
use crate::entity::{EntityKind, EntityTables};
use crate::error::Result;
use crate::event::Event;
use crate::render::cell;
use tracing::trace;

#[derive(Debug, Clone, Copy)]
enum Style {
    Plain,
    /// Compact JSON, for nested structures.
    Json,
    /// Value prefixed with a label, e.g. `Timestamp: 1700000000000`.
    Labeled(&'static str),
}

#[derive(Debug, Clone, Copy)]
struct Field {
    key: &'static str,
    style: Style,
}

const fn plain(key: &'static str) -> Field {
    Field { key, style: Style::Plain }
}

const fn json(key: &'static str) -> Field {
    Field { key, style: Style::Json }
}

const fn labeled(key: &'static str, label: &'static str) -> Field {
    Field { key, style: Style::Labeled(label) }
}

const TIMESTAMP: Field = labeled("Timestamp", "Timestamp: ");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    End,
}

#[derive(Debug, Clone, Copy)]
enum Handler {
    Fields(&'static [Field]),
    Lifecycle(EntityKind, Phase),
}

static HANDLERS: &[(&str, Handler)] = &[
    ("LogStart", Handler::Fields(&[labeled("Spark Version", "Spark Version: ")])),
    ("ExecutorAdded", Handler::Fields(&[plain("Executor ID"), json("Executor Info"), TIMESTAMP])),
    ("ExecutorRemoved", Handler::Fields(&[plain("Executor ID"), plain("Removed Reason"), TIMESTAMP])),
    ("BlockManagerAdded", Handler::Fields(&[json("Block Manager ID"), TIMESTAMP])),
    ("BlockManagerRemoved", Handler::Fields(&[json("Block Manager ID"), TIMESTAMP])),
    ("EnvironmentUpdate", Handler::Fields(&[json("JVM Information")])),
    ("ApplicationStart", Handler::Fields(&[plain("App Name"), plain("App ID"), plain("User"), TIMESTAMP])),
    ("ApplicationEnd", Handler::Fields(&[TIMESTAMP])),
    ("UnpersistRDD", Handler::Fields(&[plain("RDD ID")])),
    ("JobStart", Handler::Lifecycle(EntityKind::Job, Phase::Start)),
    ("JobEnd", Handler::Lifecycle(EntityKind::Job, Phase::End)),
    ("StageSubmitted", Handler::Lifecycle(EntityKind::Stage, Phase::Start)),
    ("StageCompleted", Handler::Lifecycle(EntityKind::Stage, Phase::End)),
    ("TaskStart", Handler::Lifecycle(EntityKind::Task, Phase::Start)),
    ("TaskEnd", Handler::Lifecycle(EntityKind::Task, Phase::End)),
];

fn handler_for(kind: &str) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(name, _)| *name == kind)
        .map(|(_, handler)| *handler)
}

fn render(event: &Event, field: &Field) -> String {
    let Some(value) = event.get(field.key).filter(|v| !v.is_null()) else {
        return String::new();
    };

    match field.style {
        Style::Plain => cell(value),
        Style::Json => value.to_string(),
        Style::Labeled(label) => format!("{label}{}", cell(value)),
    }
}

/// Owned state of one fixed-schema conversion run.
#[derive(Debug, Default)]
pub struct Tracker {
    pub tables: EntityTables,
    pairing: Pairing,
}

impl Tracker {
    pub fn new(pairing: Pairing) -> Self {
        Self {
            tables: EntityTables::default(),
            pairing,
        }
    }

    /// Fold one event into the entity tables and build its pass-through row.
    pub fn observe(&mut self, event: &Event) -> Result<Vec<String>> {
        let mut row = vec![event.kind.clone()];

        match handler_for(&event.kind) {
            Some(Handler::Fields(fields)) => {
                row.extend(fields.iter().map(|field| render(event, field)));
            }
            Some(Handler::Lifecycle(kind, phase)) => {
                let id = self.lifecycle(event, kind, phase)?;
                row.push(id.to_string());
            }
            None => trace!(kind = %event.kind, line = event.line, "No rule for event kind"),
        }

        Ok(row)
    }

    fn lifecycle(&mut self, event: &Event, kind: EntityKind, phase: Phase) -> Result<i64> {
        let tables = &mut self.tables;
        match (kind, phase) {
            (EntityKind::Job, Phase::Start) => tables.jobs.observe_start(event),
            (EntityKind::Job, Phase::End) => tables.jobs.observe_end(event, self.pairing),
            (EntityKind::Stage, Phase::Start) => tables.stages.observe_start(event),
            (EntityKind::Stage, Phase::End) => tables.stages.observe_end(event, self.pairing),
            (EntityKind::Task, Phase::Start) => tables.tasks.observe_start(event),
            (EntityKind::Task, Phase::End) => tables.tasks.observe_end(event, self.pairing),
        }
    }
}
