//! Task model shared by the extraction and scheduling engines.
//!
//! Storage and identity belong to the caller; these are value snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    Low = 1,
    #[default]
    Medium = 2,
    High = 3,
}

impl Priority {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Low),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::High),
            other => Err(format!("priority must be 1, 2 or 3 (got {other})")),
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.as_u8()
    }
}

/// Closed task category set. Declaration order is the tie-break order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Study,
    Personal,
    Health,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Study => "Study",
            Category::Personal => "Personal",
            Category::Health => "Health",
            Category::Other => "Other",
        }
    }
}

pub const DEFAULT_ENERGY_LEVEL: u8 = 3;
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

fn default_energy() -> u8 {
    DEFAULT_ENERGY_LEVEL
}

fn default_duration() -> i64 {
    DEFAULT_DURATION_MINUTES
}

/// Structured output of text extraction. Every field has a total default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTask {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    /// 1-5.
    pub energy_level: u8,
    /// Minutes.
    pub estimated_duration: i64,
    pub due_date: Option<NaiveDate>,
}

impl ParsedTask {
    /// Defaults plus the given title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: Category::Other,
            priority: Priority::Medium,
            energy_level: DEFAULT_ENERGY_LEVEL,
            estimated_duration: DEFAULT_DURATION_MINUTES,
            due_date: None,
        }
    }

    pub fn into_task(self, id: impl Into<String>) -> Task {
        Task {
            id: id.into(),
            title: self.title,
            description: self.description,
            category: self.category,
            priority: self.priority,
            energy_level: self.energy_level,
            estimated_duration: self.estimated_duration,
            due_date: self.due_date,
            is_completed: false,
        }
    }
}

/// Task snapshot handed in by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_energy")]
    pub energy_level: u8,
    /// Minutes.
    #[serde(default = "default_duration")]
    pub estimated_duration: i64,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_completed: bool,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        ParsedTask::with_title(title).into_task(id)
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.estimated_duration = minutes;
        self
    }

    pub fn with_energy(mut self, energy_level: u8) -> Self {
        self.energy_level = energy_level;
        self
    }

    pub fn with_due_date(mut self, due: NaiveDate) -> Self {
        self.due_date = Some(due);
        self
    }

    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }

    /// Experience points awarded on completion, clamped to 5..=100.
    pub fn xp_value(&self) -> i64 {
        let mut xp = 10;
        xp += (i64::from(self.priority.as_u8()) - 1) * 5;
        if self.estimated_duration > 0 {
            xp += (self.estimated_duration / 60) * 5;
        }
        if self.energy_level > 0 {
            xp += (i64::from(self.energy_level) - 1) * 2;
        }
        xp.clamp(5, 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_wire_format_is_integer() {
        let t = Task::new("t1", "write report").with_priority(Priority::High);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["priority"], 3);
        assert_eq!(json["category"], "Other");
    }

    #[test]
    fn test_task_decodes_with_defaults() {
        let t: Task = serde_json::from_str(r#"{"id": "a", "title": "call mom"}"#).unwrap();
        assert_eq!(t.priority, Priority::Medium);
        assert_eq!(t.energy_level, 3);
        assert_eq!(t.estimated_duration, 30);
        assert_eq!(t.category, Category::Other);
        assert!(!t.is_completed);
        assert!(t.due_date.is_none());
    }

    #[test]
    fn test_priority_out_of_range_rejected() {
        let res: Result<Task, _> = serde_json::from_str(r#"{"id": "a", "title": "x", "priority": 7}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_xp_value() {
        // 10 + 10 (high) + 10 (2h) + 6 (energy 4)
        let t = Task::new("t", "deep work")
            .with_priority(Priority::High)
            .with_duration(120)
            .with_energy(4);
        assert_eq!(t.xp_value(), 36);

        let huge = Task::new("t", "marathon").with_duration(60 * 100);
        assert_eq!(huge.xp_value(), 100);
    }
}
