//! Job, stage and task records built from paired start/end events.
//!
//! Each record is created by its start (or submit) event and completed by the
//! matching end event. Tables are keyed by entity ID, so a repeated start
//! event replaces the earlier record.

use crate::config::Pairing;
use crate::error::{ConvertError, Result};
use crate::event::{Event, JobEndEvent, JobStartEvent, StageEvent, TaskEvent};
use crate::render::opt;
use csv::WriterBuilder;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Job,
    Stage,
    Task,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Job => "job",
            EntityKind::Stage => "stage",
            EntityKind::Task => "task",
        };
        f.write_str(name)
    }
}

pub trait Entity: Sized + Default {
    const KIND: EntityKind;
    /// Column titles, in the order [`Entity::row`] renders values.
    const HEADERS: &'static [&'static str];

    type Start: DeserializeOwned;
    type End: DeserializeOwned;

    fn start(event: &Event, start: Self::Start) -> Self;

    /// ID of the entity a completion event refers to.
    fn end_id(end: &Self::End) -> i64;

    fn finish(&mut self, event: &Event, end: Self::End);

    /// Record for a completion event whose start was never seen.
    fn orphan(event: &Event, end: Self::End) -> Self {
        let mut record = Self::default();
        record.finish(event, end);
        record
    }

    fn id(&self) -> i64;

    fn row(&self) -> Vec<String>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Job {
    pub event: String,
    pub id: i64,
    /// `(stage, attempt)` pairs joined by commas.
    pub stages_info: String,
    pub submission_time: Option<i64>,
    pub completion_time: Option<i64>,
    pub result: Option<String>,
    pub raw: String,
}

impl Entity for Job {
    const KIND: EntityKind = EntityKind::Job;
    const HEADERS: &'static [&'static str] = &[
        "Event",
        "ID",
        "Stages Info",
        "Submission Time",
        "Completion Time",
        "Result",
        "Raw",
    ];

    type Start = JobStartEvent;
    type End = JobEndEvent;

    fn start(event: &Event, start: JobStartEvent) -> Self {
        let stages_info = start
            .stage_infos
            .iter()
            .map(|s| format!("({}, {})", s.stage_id, opt(&s.attempt_id)))
            .collect::<Vec<_>>()
            .join(",");

        Self {
            event: event.kind.clone(),
            id: start.job_id,
            stages_info,
            submission_time: start.submission_time,
            completion_time: None,
            result: None,
            raw: event.raw.clone(),
        }
    }

    fn end_id(end: &JobEndEvent) -> i64 {
        end.job_id
    }

    fn finish(&mut self, event: &Event, end: JobEndEvent) {
        self.event = event.kind.clone();
        self.id = end.job_id;
        self.completion_time = end.completion_time;
        self.result = end.job_result.and_then(|r| r.result);
        self.raw = event.raw.clone();
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.event.clone(),
            self.id.to_string(),
            self.stages_info.clone(),
            opt(&self.submission_time),
            opt(&self.completion_time),
            opt(&self.result),
            self.raw.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stage {
    pub event: String,
    pub id: i64,
    pub attempt_id: Option<i64>,
    pub name: Option<String>,
    pub number_of_tasks: Option<i64>,
    pub rdd_info: Option<Value>,
    pub submission_time: Option<i64>,
    pub completion_time: Option<i64>,
    pub failure_reason: Option<String>,
    pub raw: String,
}

impl Entity for Stage {
    const KIND: EntityKind = EntityKind::Stage;
    const HEADERS: &'static [&'static str] = &[
        "Event",
        "ID",
        "Attempt ID",
        "Name",
        "Number of Tasks",
        "RDD Info",
        "Submission Time",
        "Completion Time",
        "Failure Reason",
        "Raw",
    ];

    type Start = StageEvent;
    type End = StageEvent;

    fn start(event: &Event, start: StageEvent) -> Self {
        let info = start.stage_info;
        Self {
            event: event.kind.clone(),
            id: info.stage_id,
            attempt_id: info.attempt_id,
            name: info.name,
            number_of_tasks: info.number_of_tasks,
            rdd_info: info.rdd_info,
            submission_time: info.submission_time,
            completion_time: None,
            failure_reason: None,
            raw: event.raw.clone(),
        }
    }

    fn end_id(end: &StageEvent) -> i64 {
        end.stage_info.stage_id
    }

    fn finish(&mut self, event: &Event, end: StageEvent) {
        let info = end.stage_info;
        self.event = event.kind.clone();
        self.id = info.stage_id;
        // Descriptive fields are only filled where the start left them absent.
        self.attempt_id = self.attempt_id.or(info.attempt_id);
        self.name = self.name.take().or(info.name);
        self.number_of_tasks = self.number_of_tasks.or(info.number_of_tasks);
        self.rdd_info = self.rdd_info.take().or(info.rdd_info);
        self.submission_time = self.submission_time.or(info.submission_time);
        self.completion_time = info.completion_time;
        self.failure_reason = info.failure_reason;
        self.raw = event.raw.clone();
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.event.clone(),
            self.id.to_string(),
            opt(&self.attempt_id),
            opt(&self.name),
            opt(&self.number_of_tasks),
            self.rdd_info.as_ref().map(Value::to_string).unwrap_or_default(),
            opt(&self.submission_time),
            opt(&self.completion_time),
            opt(&self.failure_reason),
            self.raw.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    pub event: String,
    pub id: i64,
    pub index: Option<i64>,
    pub attempt: Option<i64>,
    pub executor_id: Option<String>,
    pub host: Option<String>,
    pub launch_time: Option<i64>,
    pub getting_result_time: Option<i64>,
    pub finish_time: Option<i64>,
    pub failed: Option<bool>,
    pub task_type: Option<String>,
    pub end_reason: Option<String>,
    pub raw: String,
}

impl Task {
    fn from_event(event: &Event, task: TaskEvent) -> Self {
        let info = task.task_info;
        Self {
            event: event.kind.clone(),
            id: info.task_id,
            index: info.index,
            attempt: info.attempt,
            executor_id: info.executor_id,
            host: info.host,
            launch_time: info.launch_time,
            getting_result_time: info.getting_result_time,
            finish_time: info.finish_time,
            failed: info.failed,
            task_type: task.task_type,
            end_reason: task.end_reason.and_then(|r| r.reason),
            raw: event.raw.clone(),
        }
    }
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;
    const HEADERS: &'static [&'static str] = &[
        "Event",
        "ID",
        "Index",
        "Attempt",
        "Executor ID",
        "Host",
        "Launch Time",
        "Getting Result Time",
        "Finish Time",
        "Failed",
        "Task Type",
        "End Reason",
        "Raw",
    ];

    type Start = TaskEvent;
    type End = TaskEvent;

    fn start(event: &Event, start: TaskEvent) -> Self {
        Self::from_event(event, start)
    }

    fn end_id(end: &TaskEvent) -> i64 {
        end.task_info.task_id
    }

    // Spark repeats the whole task info on the end event, so the record is
    // rebuilt from it rather than patched.
    fn finish(&mut self, event: &Event, end: TaskEvent) {
        *self = Self::from_event(event, end);
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.event.clone(),
            self.id.to_string(),
            opt(&self.index),
            opt(&self.attempt),
            opt(&self.executor_id),
            opt(&self.host),
            opt(&self.launch_time),
            opt(&self.getting_result_time),
            opt(&self.finish_time),
            opt(&self.failed),
            opt(&self.task_type),
            opt(&self.end_reason),
            self.raw.clone(),
        ]
    }
}

/// Records of one entity kind, keyed and ordered by ID.
#[derive(Debug)]
pub struct EntityTable<T> {
    records: BTreeMap<i64, T>,
}

impl<T> Default for EntityTable<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }
}

impl<T: Entity> EntityTable<T> {
    pub fn observe_start(&mut self, event: &Event) -> Result<i64> {
        let record = T::start(event, event.decode()?);
        let id = record.id();

        if self.records.insert(id, record).is_some() {
            debug!(kind = %T::KIND, id, line = event.line, "Replacing record on repeated start");
        }

        Ok(id)
    }

    pub fn observe_end(&mut self, event: &Event, pairing: Pairing) -> Result<i64> {
        let end: T::End = event.decode()?;
        let id = T::end_id(&end);

        match self.records.get_mut(&id) {
            Some(record) => record.finish(event, end),
            None => match pairing {
                Pairing::Strict => {
                    return Err(ConvertError::MissingEntity { kind: T::KIND, id });
                }
                Pairing::Lenient => {
                    warn!(kind = %T::KIND, id, line = event.line, "Completion without start event");
                    self.records.insert(id, T::orphan(event, end));
                }
            },
        }

        Ok(id)
    }

    pub fn get(&self, id: i64) -> Option<&T> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the header row followed by one row per record.
    pub fn write_csv<W: Write>(&self, writer: W, delimiter: u8) -> Result<()> {
        let mut wtr = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);

        wtr.write_record(T::HEADERS)?;
        for record in self.records.values() {
            wtr.write_record(record.row())?;
        }

        wtr.flush()?;
        Ok(())
    }
}

/// Per-run state of a fixed-schema conversion.
#[derive(Debug, Default)]
pub struct EntityTables {
    pub jobs: EntityTable<Job>,
    pub stages: EntityTable<Stage>,
    pub tasks: EntityTable<Task>,
}
