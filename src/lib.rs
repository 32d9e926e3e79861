//! Convert Spark event logs (one JSON event per line) into CSV tables.
//!
//! Two strategies are available:
//!
//! - **Fixed schema** ([`Mode::Fixed`]): a pass-through row per event using a
//!   small field list per known event kind, plus job, stage and task tables
//!   that merge each entity's start and end events into one row.
//! - **Generic schema** ([`Mode::Generic`]): the columns are the union of all
//!   flattened field paths in the file, discovered in a first pass; a second
//!   pass writes every event aligned to them.

pub mod config;
pub mod convert;
pub mod entity;
pub mod error;
pub mod event;
pub mod input;
pub mod passthrough;
pub mod render;
pub mod schema;

pub use config::{ConvertConfig, Mode, Pairing};
pub use convert::{Summary, convert_fixed, convert_generic, run};
pub use entity::{Entity, EntityKind, EntityTable, EntityTables, Job, Stage, Task};
pub use error::{ConvertError, Result};
pub use event::Event;
pub use passthrough::Tracker;
pub use schema::Schema;
