//! Scheduling engine: tasks + date range -> time-blocked entries.
//!
//! Each working day is cut into fixed blocks separated by breaks, then tasks
//! (priority desc, duration asc) are placed greedily into the first block
//! that fits. No backtracking, no carry-over of unplaced tasks.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{MINUTES_PER_DAY, PlacementPolicy, SchedulerConfig};
use crate::task::{Category, Priority, Task};

/// One placed task. Persisted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEntry {
    pub task_id: String,
    pub title: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub priority: Priority,
    pub energy_level: u8,
    pub category: Category,
}

impl ScheduledEntry {
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// A slot inside one day's working window. Lives only for one daily pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeBlock {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub assigned_task: Option<String>,
}

impl TimeBlock {
    pub fn new(start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            end_time,
            assigned_task: None,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    pub fn is_available(&self) -> bool {
        self.assigned_task.is_none()
    }
}

/// Cut `date`'s working window into blocks of at most `max_block_minutes`,
/// separated by `break_minutes`. The last block is clipped to `work_end`.
pub fn build_day(date: NaiveDate, config: &SchedulerConfig) -> Vec<TimeBlock> {
    let day_start = date.and_time(config.work_start);
    let day_end = date.and_time(config.work_end);
    if config.max_block_minutes <= 0 || config.break_minutes < 0 || day_end <= day_start {
        return Vec::new();
    }

    let block_len = Duration::minutes(config.max_block_minutes.min(MINUTES_PER_DAY));
    let break_len = Duration::minutes(config.break_minutes.min(MINUTES_PER_DAY));

    let mut blocks = Vec::new();
    let mut cursor = day_start;
    while cursor < day_end {
        let end = (cursor + block_len).min(day_end);
        blocks.push(TimeBlock::new(cursor, end));
        cursor = end + break_len;
    }
    blocks
}

/// Greedy single pass over pre-sorted tasks.
///
/// A block fits when `block minutes >= fit_ratio * estimate`. The entry keeps
/// the task's own estimate, so it may run past the block's end. Tasks that fit
/// nowhere are dropped. Output is in block (chronological) order.
pub fn assign_day(blocks: &mut [TimeBlock], tasks: &[&Task], fit_ratio: f64) -> Vec<ScheduledEntry> {
    let mut placed: Vec<(usize, ScheduledEntry)> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for task in tasks {
        if seen.contains(task.id.as_str()) {
            continue;
        }

        let needed = task.estimated_duration as f64 * fit_ratio;
        let slot = blocks
            .iter()
            .position(|b| b.is_available() && b.duration_minutes() as f64 >= needed);

        let Some(idx) = slot else {
            debug!(task_id = %task.id, minutes = task.estimated_duration, "no block fits");
            continue;
        };

        let block = &mut blocks[idx];
        let Some(end_time) = Duration::try_minutes(task.estimated_duration)
            .and_then(|d| block.start_time.checked_add_signed(d))
        else {
            warn!(task_id = %task.id, minutes = task.estimated_duration, "estimate out of range");
            continue;
        };
        block.assigned_task = Some(task.id.clone());
        seen.insert(task.id.as_str());

        debug!(
            task_id = %task.id,
            start = %block.start_time,
            block_minutes = block.duration_minutes(),
            "placed task"
        );
        placed.push((
            idx,
            ScheduledEntry {
                task_id: task.id.clone(),
                title: task.title.clone(),
                start_time: block.start_time,
                end_time,
                priority: task.priority,
                energy_level: task.energy_level,
                category: task.category,
            },
        ));
    }

    placed.sort_by_key(|(idx, _)| *idx);
    placed.into_iter().map(|(_, entry)| entry).collect()
}

/// Priority descending, then estimate ascending. Stable.
pub fn sort_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.estimated_duration.cmp(&b.estimated_duration))
    });
    sorted
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn build_day(&self, date: NaiveDate) -> Vec<TimeBlock> {
        build_day(date, &self.config)
    }

    /// Place `tasks` into working-day blocks from `start`'s date to `end`'s
    /// date inclusive. An inverted range yields an empty schedule.
    pub fn create_schedule(
        &self,
        tasks: &[Task],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Vec<ScheduledEntry> {
        let valid: Vec<Task> = tasks
            .iter()
            .filter(|t| {
                if t.estimated_duration <= 0 {
                    warn!(task_id = %t.id, minutes = t.estimated_duration, "skipping task with non-positive duration");
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect();
        let sorted = sort_tasks(&valid);

        let mut schedule = Vec::new();
        let mut placed_ids: HashSet<String> = HashSet::new();
        let mut day = start.date();
        let last = end.date();
        let mut days = 0usize;

        while day <= last {
            if !(self.config.skip_weekends && is_weekend(day)) {
                let candidates: Vec<&Task> = match self.config.placement {
                    PlacementPolicy::RepeatEachDay => sorted.clone(),
                    PlacementPolicy::OncePerRange => sorted
                        .iter()
                        .copied()
                        .filter(|t| !placed_ids.contains(&t.id))
                        .collect(),
                };

                let mut blocks = self.build_day(day);
                let entries = assign_day(&mut blocks, &candidates, self.config.fit_ratio);
                debug!(%day, blocks = blocks.len(), placed = entries.len(), "scheduled day");

                placed_ids.extend(entries.iter().map(|e| e.task_id.clone()));
                schedule.extend(entries);
                days += 1;
            }

            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        info!(
            tasks = tasks.len(),
            working_days = days,
            entries = schedule.len(),
            "schedule created"
        );
        schedule
    }

    pub fn reschedule(
        &self,
        task_id: &str,
        schedule: Vec<ScheduledEntry>,
        new_start: NaiveDateTime,
    ) -> Vec<ScheduledEntry> {
        reschedule(task_id, schedule, new_start)
    }
}

/// Move `task_id` to `new_start`, keeping its duration, then re-sort by start
/// time. Every entry for the id is removed and only the last one is put back,
/// so a task repeated across days collapses to a single entry. Unknown ids
/// leave the schedule untouched. No overlap check is made against other
/// entries.
pub fn reschedule(
    task_id: &str,
    schedule: Vec<ScheduledEntry>,
    new_start: NaiveDateTime,
) -> Vec<ScheduledEntry> {
    let Some(last) = schedule.iter().rposition(|e| e.task_id == task_id) else {
        debug!(task_id, "reschedule: task not in schedule");
        return schedule;
    };

    let duration = schedule[last].end_time - schedule[last].start_time;
    let Some(new_end) = new_start.checked_add_signed(duration) else {
        warn!(task_id, %new_start, "reschedule: end time out of range");
        return schedule;
    };

    let mut moved = schedule[last].clone();
    moved.start_time = new_start;
    moved.end_time = new_end;

    let mut updated: Vec<ScheduledEntry> = schedule
        .into_iter()
        .filter(|e| e.task_id != task_id)
        .collect();
    updated.push(moved);
    updated.sort_by_key(|e| e.start_time);
    updated
}
