//! planwise-core: task extraction and time-block scheduling.
//!
//! Two engines, both pure and synchronous:
//! - [`TaskParser`] turns free text into a [`ParsedTask`].
//! - [`Scheduler`] places [`Task`]s into working-hour blocks over a date range.

pub mod config;
pub mod extract;
pub mod ics;
pub mod keywords;
pub mod request;
pub mod schedule;
pub mod task;
pub mod time;

pub use config::{PlacementPolicy, SchedulerConfig};
pub use extract::TaskParser;
pub use ics::entries_to_ics;
pub use keywords::{DurationRule, KeywordTables};
pub use request::{ScheduleRequest, ScheduleResponse, WorkHours, plan, suggest_next};
pub use schedule::{ScheduledEntry, Scheduler, TimeBlock, assign_day, build_day, reschedule, sort_tasks};
pub use task::{Category, ParsedTask, Priority, Task};
