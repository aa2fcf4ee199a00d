//! Minimal iCalendar export for a produced schedule.
//!
//! DTSTART/DTEND are written in UTC; entry times are local to `tz`.

use anyhow::Result;
use chrono_tz::Tz;

use crate::schedule::ScheduledEntry;
use crate::time::local_to_utc;

/// Render entries as a VCALENDAR with one VEVENT each.
///
/// UIDs are derived from task id + start, so re-exporting the same schedule
/// yields the same UIDs.
pub fn entries_to_ics(entries: &[ScheduledEntry], tz: Tz) -> Result<String> {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Planwise//EN\r\n");

    for e in entries {
        let start = local_to_utc(e.start_time, tz)?;
        let end = local_to_utc(e.end_time, tz)?;
        let dtstart = start.format("%Y%m%dT%H%M%SZ");

        s.push_str("BEGIN:VEVENT\r\n");
        s.push_str(&format!("UID:{}-{}@planwise\r\n", escape_ics(&e.task_id), dtstart));
        s.push_str(&format!("DTSTART:{}\r\n", dtstart));
        s.push_str(&format!("DTEND:{}\r\n", end.format("%Y%m%dT%H%M%SZ")));
        s.push_str(&format!("SUMMARY:{}\r\n", escape_ics(&e.title)));
        s.push_str(&format!(
            "DESCRIPTION:{}\r\n",
            escape_ics(&format!(
                "TaskId: {}\nPriority: {}\nEnergy: {}\nCategory: {}",
                e.task_id,
                e.priority.as_u8(),
                e.energy_level,
                e.category.as_str()
            ))
        ));
        s.push_str(&format!("CATEGORIES:{}\r\n", e.category.as_str().to_uppercase()));
        s.push_str("END:VEVENT\r\n");
    }

    s.push_str("END:VCALENDAR\r\n");
    Ok(s)
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Category, Priority};
    use chrono::NaiveDate;

    fn entry(title: &str) -> ScheduledEntry {
        let start = NaiveDate::from_ymd_opt(2026, 7, 6)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        ScheduledEntry {
            task_id: "t-1".to_string(),
            title: title.to_string(),
            start_time: start,
            end_time: start + chrono::Duration::minutes(45),
            priority: Priority::High,
            energy_level: 4,
            category: Category::Work,
        }
    }

    #[test]
    fn test_ics_event_in_utc() {
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        let ics = entries_to_ics(&[entry("Quarterly report")], tz).unwrap();

        // July: CEST (UTC+2)
        assert!(ics.contains("DTSTART:20260706T070000Z"));
        assert!(ics.contains("DTEND:20260706T074500Z"));
        assert!(ics.contains("SUMMARY:Quarterly report"));
        assert!(ics.contains("CATEGORIES:WORK"));
        assert!(ics.starts_with("BEGIN:VCALENDAR"));
        assert!(ics.trim_end().ends_with("END:VCALENDAR"));
    }

    #[test]
    fn test_ics_escapes_text() {
        let ics = entries_to_ics(&[entry("Buy milk, eggs; bread")], Tz::UTC).unwrap();
        assert!(ics.contains("SUMMARY:Buy milk\\, eggs\\; bread"));
        assert!(ics.contains("TaskId: t-1\\nPriority: 3"));
    }

    #[test]
    fn test_ics_empty_schedule() {
        let ics = entries_to_ics(&[], Tz::UTC).unwrap();
        assert!(!ics.contains("VEVENT"));
    }
}
