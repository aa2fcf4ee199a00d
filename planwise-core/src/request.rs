//! Request/response wrapper around the scheduler, plus next-task suggestion.
//!
//! This is the shape an outer transport (CLI, HTTP) hands in: an optional
//! range, optional working-hour override and whether completed tasks count.

use std::cmp::Reverse;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{SchedulerConfig, hhmm};
use crate::schedule::{ScheduledEntry, Scheduler};
use crate::task::{Priority, Task};

pub const DEFAULT_RANGE_DAYS: u64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHours {
    /// "HH:MM"
    pub start: Option<String>,
    /// "HH:MM"
    pub end: Option<String>,
}

impl WorkHours {
    pub fn apply(&self, mut config: SchedulerConfig) -> Result<SchedulerConfig> {
        if let Some(start) = &self.start {
            config.work_start =
                hhmm::parse(start).with_context(|| format!("invalid work_hours.start '{start}'"))?;
        }
        if let Some(end) = &self.end {
            config.work_end = hhmm::parse(end).with_context(|| format!("invalid work_hours.end '{end}'"))?;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Defaults to "now".
    #[serde(default)]
    pub start_date: Option<NaiveDateTime>,
    /// Defaults to start + 7 days.
    #[serde(default)]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub work_hours: Option<WorkHours>,
    #[serde(default)]
    pub include_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub message: String,
    pub schedule: Vec<ScheduledEntry>,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub tasks_scheduled: usize,
}

/// Resolve the request against `base` config and `now`, then schedule the
/// pending tasks.
pub fn plan(
    base: &SchedulerConfig,
    tasks: &[Task],
    request: &ScheduleRequest,
    now: NaiveDateTime,
) -> Result<ScheduleResponse> {
    let start = request.start_date.unwrap_or(now);
    let end = match request.end_date {
        Some(end) => end,
        None => start
            .checked_add_days(Days::new(DEFAULT_RANGE_DAYS))
            .context("end date out of range")?,
    };

    let config = match &request.work_hours {
        Some(hours) => hours.apply(base.clone())?,
        None => base.clone(),
    };
    config.validate().context("invalid scheduler configuration")?;

    let pending: Vec<Task> = tasks
        .iter()
        .filter(|t| request.include_completed || !t.is_completed)
        .cloned()
        .collect();

    if pending.is_empty() {
        return Ok(ScheduleResponse {
            message: "No tasks to schedule".to_string(),
            schedule: Vec::new(),
            start_date: start,
            end_date: end,
            tasks_scheduled: 0,
        });
    }

    let schedule = Scheduler::new(config).create_schedule(&pending, start, end);
    info!(pending = pending.len(), entries = schedule.len(), %start, %end, "plan complete");

    Ok(ScheduleResponse {
        message: "Schedule generated successfully".to_string(),
        tasks_scheduled: schedule.len(),
        schedule,
        start_date: start,
        end_date: end,
    })
}

/// The task to work on next: highest priority among incomplete tasks, then
/// earliest due date (undated last). Ties keep input order.
pub fn suggest_next(tasks: &[Task]) -> Option<&Task> {
    tasks
        .iter()
        .filter(|t| !t.is_completed)
        .min_by_key(|t| suggestion_key(t.priority, t.due_date))
}

fn suggestion_key(priority: Priority, due: Option<NaiveDate>) -> (Reverse<Priority>, bool, Option<NaiveDate>) {
    (Reverse(priority), due.is_none(), due)
}
