use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use planwise_core::{
    Category, PlacementPolicy, Priority, ScheduledEntry, Scheduler, SchedulerConfig, TaskParser,
    reschedule,
};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn parsed_tasks(now: NaiveDateTime) -> Vec<planwise_core::Task> {
    let parser = TaskParser::new().unwrap();
    [
        "Study for math exam tomorrow, high priority, 2 hours",
        "Buy groceries after work, quick, 20 min",
        "Finish the quarterly report, urgent, 90 min",
        "Go for a run someday, 45 minutes",
        "Call mom",
    ]
    .iter()
    .enumerate()
    .map(|(i, text)| parser.parse(text, now).into_task(format!("task-{i}")))
    .collect()
}

/// Text goes in, a week of blocks comes out.
#[test]
fn test_parse_then_schedule_week() {
    // Saturday
    let now = at(2026, 3, 7, 10, 0);
    let tasks = parsed_tasks(now);

    assert_eq!(tasks[0].category, Category::Study);
    assert_eq!(tasks[0].estimated_duration, 120);
    assert_eq!(tasks[1].energy_level, 1);
    assert_eq!(tasks[3].priority, Priority::Low);
    assert_eq!(tasks[3].category, Category::Health);
    assert_eq!(tasks[4].title, "Call mom");

    let scheduler = Scheduler::default();
    let schedule = scheduler.create_schedule(&tasks, now, at(2026, 3, 13, 21, 0));

    // Nothing lands on the weekend.
    assert!(schedule.iter().all(|e| !matches!(e.start_time.weekday(), Weekday::Sat | Weekday::Sun)));

    // The 120-minute study task never fits a 90-minute block (96 > 90).
    assert!(schedule.iter().all(|e| e.task_id != "task-0"));

    // Monday: high priority first (report), then medium by duration, then low.
    let monday: Vec<&ScheduledEntry> = schedule
        .iter()
        .filter(|e| e.start_time.date() == NaiveDate::from_ymd_opt(2026, 3, 9).unwrap())
        .collect();
    let ids: Vec<&str> = monday.iter().map(|e| e.task_id.as_str()).collect();
    assert_eq!(ids, vec!["task-2", "task-1", "task-4", "task-3"]);
    assert_eq!(monday[0].start_time, at(2026, 3, 9, 9, 0));
    assert_eq!(monday[0].end_time, at(2026, 3, 9, 10, 30));

    // Repeat policy: the same four tasks every weekday.
    assert_eq!(schedule.len(), 4 * 5);
}

#[test]
fn test_once_per_range_schedules_each_task_once() {
    let now = at(2026, 3, 9, 8, 0);
    let tasks = parsed_tasks(now);
    let config = SchedulerConfig::default().with_placement(PlacementPolicy::OncePerRange);
    let schedule = Scheduler::new(config).create_schedule(&tasks, now, at(2026, 3, 13, 21, 0));

    assert_eq!(schedule.len(), 4);
    assert!(schedule.iter().all(|e| e.start_time.date() == now.date()));
}

#[test]
fn test_reschedule_round_trip_over_json() {
    let now = at(2026, 3, 9, 8, 0);
    let tasks = parsed_tasks(now);
    let schedule = Scheduler::default().create_schedule(&tasks, now, now);

    let json = serde_json::to_string(&schedule).unwrap();
    assert!(json.contains("\"start_time\":\"2026-03-09T09:00:00\""));
    let decoded: Vec<ScheduledEntry> = serde_json::from_str(&json).unwrap();

    let updated = reschedule("task-2", decoded, at(2026, 3, 9, 19, 30));
    let moved = updated.iter().find(|e| e.task_id == "task-2").unwrap();
    assert_eq!(moved.duration_minutes(), 90);
    assert_eq!(updated.last().unwrap().task_id, "task-2");
    for w in updated.windows(2) {
        assert!(w[0].start_time <= w[1].start_time);
    }
}
