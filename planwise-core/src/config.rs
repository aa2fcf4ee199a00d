//! Scheduler configuration: working hours, block sizing and placement policy.

use anyhow::{Result, bail};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// What happens to a task once it has been placed on an earlier day of the
/// same range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementPolicy {
    /// Every working day starts from the full task list, so a task can be
    /// placed once per day.
    #[default]
    RepeatEachDay,
    /// A task placed on one day is not offered to later days.
    OncePerRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    #[serde(with = "hhmm")]
    pub work_start: NaiveTime,
    #[serde(with = "hhmm")]
    pub work_end: NaiveTime,
    /// Gap between consecutive blocks, minutes.
    pub break_minutes: i64,
    /// Longest single block, minutes.
    pub max_block_minutes: i64,
    /// A block fits a task when `block >= fit_ratio * estimate`.
    pub fit_ratio: f64,
    pub skip_weekends: bool,
    pub placement: PlacementPolicy,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            work_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            work_end: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
            break_minutes: 15,
            max_block_minutes: 90,
            fit_ratio: 0.8,
            skip_weekends: true,
            placement: PlacementPolicy::RepeatEachDay,
        }
    }
}

impl SchedulerConfig {
    pub fn with_work_hours(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.work_start = start;
        self.work_end = end;
        self
    }

    pub fn with_placement(mut self, placement: PlacementPolicy) -> Self {
        self.placement = placement;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.work_end <= self.work_start {
            bail!(
                "work_end ({}) must be after work_start ({})",
                self.work_end.format("%H:%M"),
                self.work_start.format("%H:%M")
            );
        }
        if !(1..=MINUTES_PER_DAY).contains(&self.max_block_minutes) {
            bail!("max_block_minutes must be within 1..={MINUTES_PER_DAY} (got {})", self.max_block_minutes);
        }
        if !(0..=MINUTES_PER_DAY).contains(&self.break_minutes) {
            bail!("break_minutes must be within 0..={MINUTES_PER_DAY} (got {})", self.break_minutes);
        }
        if !self.fit_ratio.is_finite() || self.fit_ratio <= 0.0 {
            bail!("fit_ratio must be a positive number (got {})", self.fit_ratio);
        }
        Ok(())
    }

    /// Length of the working window in minutes.
    pub fn window_minutes(&self) -> i64 {
        (self.work_end - self.work_start).num_minutes().max(0)
    }
}

/// `HH:MM` (seconds optional on input) for working-hour fields.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(s: &str) -> Option<NaiveTime> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
            .ok()
    }

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid time of day '{raw}', expected HH:MM")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = SchedulerConfig::default();
        assert_eq!(c.work_start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(c.work_end, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert_eq!(c.break_minutes, 15);
        assert_eq!(c.max_block_minutes, 90);
        assert_eq!(c.window_minutes(), 720);
        assert_eq!(c.placement, PlacementPolicy::RepeatEachDay);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_hours() {
        let c = SchedulerConfig::default().with_work_hours(
            NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );
        let err = c.validate().unwrap_err().to_string();
        assert!(err.contains("work_end"), "{err}");
    }

    #[test]
    fn test_validate_rejects_zero_block() {
        let c = SchedulerConfig {
            max_block_minutes: 0,
            ..SchedulerConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_json_roundtrip_uses_hhmm() {
        let json = serde_json::to_value(SchedulerConfig::default()).unwrap();
        assert_eq!(json["work_start"], "09:00");
        assert_eq!(json["placement"], "repeat_each_day");

        let partial: SchedulerConfig =
            serde_json::from_str(r#"{"work_start": "08:30", "placement": "once_per_range"}"#).unwrap();
        assert_eq!(partial.work_start, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(partial.work_end, NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert_eq!(partial.placement, PlacementPolicy::OncePerRange);
    }

    #[test]
    fn test_bad_time_rejected() {
        let res: Result<SchedulerConfig, _> = serde_json::from_str(r#"{"work_start": "9am"}"#);
        assert!(res.is_err());
    }
}
