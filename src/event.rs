use crate::error::{ConvertError, Result};
use crate::input::parse_object;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Field naming the kind of every event.
pub const DISCRIMINATOR: &str = "Event";

/// Common prefix of Spark listener event names.
pub const PREFIX: &str = "SparkListener";

/// One decoded line of an event log.
#[derive(Debug, Clone)]
pub struct Event {
    pub line: usize,
    /// Event name with [`PREFIX`] stripped.
    pub kind: String,
    pub body: Value,
    /// The input line, verbatim.
    pub raw: String,
}

impl Event {
    pub fn parse(line_no: usize, line: &str) -> Result<Self> {
        let body = parse_object(line_no, line)?;

        let kind = match body.get(DISCRIMINATOR) {
            Some(Value::String(name)) => kind_name(name).to_string(),
            _ => {
                return Err(ConvertError::MissingField {
                    line: line_no,
                    field: DISCRIMINATOR,
                });
            }
        };

        Ok(Self {
            line: line_no,
            kind,
            body: Value::Object(body),
            raw: line.trim().to_string(),
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Decode the event body into a kind-specific structure.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(&self.body).map_err(|source| ConvertError::InvalidEvent {
            line: self.line,
            kind: self.kind.clone(),
            source,
        })
    }
}

pub fn kind_name(discriminator: &str) -> &str {
    discriminator
        .strip_prefix(PREFIX)
        .unwrap_or(discriminator)
}

// Shapes of the lifecycle events, as written by Spark's JsonProtocol.

#[derive(Debug, Deserialize)]
pub struct JobStartEvent {
    #[serde(rename = "Job ID")]
    pub job_id: i64,
    #[serde(rename = "Submission Time")]
    pub submission_time: Option<i64>,
    #[serde(rename = "Stage Infos", default)]
    pub stage_infos: Vec<StageRef>,
}

#[derive(Debug, Deserialize)]
pub struct StageRef {
    #[serde(rename = "Stage ID")]
    pub stage_id: i64,
    #[serde(rename = "Stage Attempt ID")]
    pub attempt_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct JobEndEvent {
    #[serde(rename = "Job ID")]
    pub job_id: i64,
    #[serde(rename = "Completion Time")]
    pub completion_time: Option<i64>,
    #[serde(rename = "Job Result")]
    pub job_result: Option<JobResult>,
}

#[derive(Debug, Deserialize)]
pub struct JobResult {
    #[serde(rename = "Result")]
    pub result: Option<String>,
}

/// Both `StageSubmitted` and `StageCompleted`.
#[derive(Debug, Deserialize)]
pub struct StageEvent {
    #[serde(rename = "Stage Info")]
    pub stage_info: StageInfo,
}

#[derive(Debug, Deserialize)]
pub struct StageInfo {
    #[serde(rename = "Stage ID")]
    pub stage_id: i64,
    #[serde(rename = "Stage Attempt ID")]
    pub attempt_id: Option<i64>,
    #[serde(rename = "Stage Name")]
    pub name: Option<String>,
    #[serde(rename = "Number of Tasks")]
    pub number_of_tasks: Option<i64>,
    #[serde(rename = "RDD Info")]
    pub rdd_info: Option<Value>,
    #[serde(rename = "Submission Time")]
    pub submission_time: Option<i64>,
    #[serde(rename = "Completion Time")]
    pub completion_time: Option<i64>,
    #[serde(rename = "Failure Reason")]
    pub failure_reason: Option<String>,
}

/// Both `TaskStart` and `TaskEnd`; the end-only fields are absent on start.
#[derive(Debug, Deserialize)]
pub struct TaskEvent {
    #[serde(rename = "Task Info")]
    pub task_info: TaskInfo,
    #[serde(rename = "Task Type")]
    pub task_type: Option<String>,
    #[serde(rename = "Task End Reason")]
    pub end_reason: Option<TaskEndReason>,
}

#[derive(Debug, Deserialize)]
pub struct TaskInfo {
    #[serde(rename = "Task ID")]
    pub task_id: i64,
    #[serde(rename = "Index")]
    pub index: Option<i64>,
    #[serde(rename = "Attempt")]
    pub attempt: Option<i64>,
    #[serde(rename = "Executor ID")]
    pub executor_id: Option<String>,
    #[serde(rename = "Host")]
    pub host: Option<String>,
    #[serde(rename = "Launch Time")]
    pub launch_time: Option<i64>,
    #[serde(rename = "Getting Result Time")]
    pub getting_result_time: Option<i64>,
    #[serde(rename = "Finish Time")]
    pub finish_time: Option<i64>,
    #[serde(rename = "Failed")]
    pub failed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TaskEndReason {
    #[serde(rename = "Reason")]
    pub reason: Option<String>,
}
