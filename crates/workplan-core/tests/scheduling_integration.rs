//! Integration tests for end-to-end scheduling runs.
//!
//! All runs start on Monday 2026-10-19 unless stated otherwise.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use workplan_core::{
    Backlog, BlockedTime, CapacityBudget, ScheduledKind, Scheduler, Step, Task, TaskCategory, Termination,
    WorkHours, WorkSettings, Workflow,
};

fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, day, hour, minute, 0).unwrap()
}

fn monday_nine() -> DateTime<Utc> {
    at(19, 9, 0)
}

#[test]
fn single_task_lands_at_start() {
    let mut settings = WorkSettings::default().with_capacity(CapacityBudget::new(8.0, 3.0));
    settings.default_hours = WorkHours::new("08:00", "18:00").with_lunch("12:00", 60);

    let tasks = vec![Task::new("t1", "Draft proposal")
        .with_duration(60)
        .with_category(TaskCategory::Focused)];

    let outcome = Scheduler::with_settings(settings).schedule(&tasks, &[], monday_nine());
    let item = outcome.find("t1").unwrap();

    assert_eq!(item.kind, ScheduledKind::Task);
    assert_eq!(item.start_time, at(19, 9, 0));
    assert_eq!(item.end_time, at(19, 10, 0));
    assert_eq!(item.color, "#3b82f6");
    assert!(outcome.is_complete());
}

#[test]
fn exhausted_budget_rolls_to_next_day() {
    let settings = WorkSettings::default()
        .without_lunch()
        .with_capacity(CapacityBudget::new(6.0, 3.0));
    let tasks = vec![
        Task::new("first", "First").with_duration(300),
        Task::new("second", "Second").with_duration(300),
    ];

    let outcome = Scheduler::with_settings(settings).schedule(&tasks, &[], monday_nine());

    let first = outcome.find("first").unwrap();
    assert_eq!((first.start_time, first.end_time), (at(19, 9, 0), at(19, 14, 0)));

    let second = outcome.find("second").unwrap();
    assert_eq!((second.start_time, second.end_time), (at(20, 9, 0), at(20, 14, 0)));
    assert_eq!(outcome.capacity[0].focused_used, 300);
}

#[test]
fn async_wait_gates_workflow_successor() {
    let workflow = Workflow::new("wf", "Publish post")
        .with_step(Step::new("a", "Write", 30))
        .with_step(Step::new("b", "Send for review", 20).depends_on(["a"]).with_async_wait(120))
        .with_step(Step::new("c", "Publish", 15).depends_on(["b"]));

    let outcome = Scheduler::new().schedule(&[], &[workflow], monday_nine());
    assert!(outcome.is_complete());

    let a = outcome.find("a").unwrap();
    let b = outcome.find("b").unwrap();
    let c = outcome.find("c").unwrap();
    assert_eq!(a.start_time, monday_nine());
    assert_eq!(b.start_time, a.end_time);

    let wait = outcome
        .items
        .iter()
        .find(|i| i.kind == ScheduledKind::AsyncWait)
        .unwrap();
    assert_eq!(wait.start_time, b.end_time);
    assert_eq!(wait.end_time, b.end_time + Duration::minutes(120));
    assert_eq!(wait.work_item_id.as_deref(), Some("b"));

    assert!(c.start_time >= b.end_time + Duration::minutes(120));
    // 11:50 would run into lunch.
    assert_eq!(c.start_time, at(19, 13, 5));
}

#[test]
fn fully_blocked_day_gets_no_work() {
    let settings = WorkSettings::default()
        .without_lunch()
        .with_capacity(CapacityBudget::new(1.0, 1.0))
        .with_blocked_time(BlockedTime::weekly("Offsite", "09:00", "18:00", vec![Weekday::Wed]));
    let tasks: Vec<Task> = (0..5)
        .map(|i| Task::new(format!("t{i}"), format!("Task {i}")).with_duration(60))
        .collect();

    let outcome = Scheduler::with_settings(settings).schedule(&tasks, &[], monday_nine());
    assert!(outcome.is_complete());

    let wednesday = NaiveDate::from_ymd_opt(2026, 10, 21).unwrap();
    assert!(outcome.work_items().all(|i| i.date != wednesday));

    let wednesday_items: Vec<_> = outcome.items.iter().filter(|i| i.date == wednesday).collect();
    assert_eq!(wednesday_items.len(), 1);
    assert_eq!(wednesday_items[0].kind, ScheduledKind::BlockedTime);
    assert_eq!(wednesday_items[0].name, "Offsite");

    let days: Vec<Weekday> = outcome.work_items().map(|i| i.date.weekday()).collect();
    assert_eq!(days, vec![Weekday::Mon, Weekday::Tue, Weekday::Thu, Weekday::Fri, Weekday::Mon]);
}

#[test]
fn oversized_task_is_never_placed() {
    let settings = WorkSettings::default()
        .without_lunch()
        .with_capacity(CapacityBudget::new(8.0, 3.0));
    let tasks = vec![
        Task::new("huge", "Rewrite everything").with_duration(500),
        Task::new("ok", "Small fix").with_duration(30),
    ];

    let outcome = Scheduler::with_settings(settings).schedule(&tasks, &[], monday_nine());

    assert_eq!(outcome.termination, Termination::HorizonReached);
    assert_eq!(outcome.unplaced, vec!["huge".to_string()]);
    assert!(outcome.find("huge").is_none());
    assert!(outcome.find("ok").is_some());
    assert!(outcome.finished_at > monday_nine() + Duration::days(28));
}

#[test]
fn repeated_runs_are_identical() {
    let backlog = sample_backlog();
    let scheduler = Scheduler::new();
    let first = scheduler.schedule_backlog(&backlog, monday_nine());
    let second = scheduler.schedule_backlog(&backlog, monday_nine());

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn rerun_with_scheduled_work_marked_done_places_only_new_work() {
    let backlog = sample_backlog();
    let scheduler = Scheduler::new();
    let first = scheduler.schedule_backlog(&backlog, monday_nine());
    assert!(first.is_complete());

    let mut remainder = backlog.without_scheduled(&first);
    assert_eq!(remainder.open_item_count(), 0);
    // Caller's backlog is untouched.
    assert!(backlog.open_item_count() > 0);

    remainder.tasks.push(
        Task::new("follow-up", "Follow up on launch")
            .with_duration(30)
            .with_dependencies(["launch"]),
    );

    let second = scheduler.schedule_backlog(&remainder, first.finished_at);
    let placed: Vec<&str> = second.work_items().map(|i| i.id.as_str()).collect();
    assert_eq!(placed, vec!["follow-up"]);
    assert!(second.find("follow-up").unwrap().start_time >= first.finished_at);
    assert!(second.is_complete());
}

#[test]
fn rerun_waits_out_async_wait_of_previous_run() {
    let backlog = Backlog::new(
        vec![Task::new("submit", "Submit for review").with_duration(30).with_async_wait(120)],
        Vec::new(),
    );
    let scheduler = Scheduler::new();
    let first = scheduler.schedule_backlog(&backlog, monday_nine());
    let submit = first.find("submit").unwrap();
    assert_eq!(submit.end_time, at(19, 9, 30));
    assert_eq!(first.finished_at, at(19, 11, 30));

    let mut remainder = backlog.without_scheduled(&first);
    remainder.tasks.push(
        Task::new("merge", "Merge after review")
            .with_duration(30)
            .with_dependencies(["submit"]),
    );

    let second = scheduler.schedule_backlog(&remainder, first.finished_at);
    let merge = second.find("merge").unwrap();
    assert!(merge.start_time >= submit.end_time + Duration::minutes(120));
    assert_eq!(merge.start_time, at(19, 11, 30));
}

#[test]
fn admin_work_uses_its_own_budget() {
    let tasks = vec![
        Task::new("inbox", "Inbox").with_duration(120).with_category(TaskCategory::Admin),
        Task::new("expenses", "Expenses").with_duration(120).with_category(TaskCategory::Admin),
    ];
    let outcome = Scheduler::new().schedule(&tasks, &[], monday_nine());

    let inbox = outcome.find("inbox").unwrap();
    let expenses = outcome.find("expenses").unwrap();
    assert_eq!(inbox.start_time, at(19, 9, 0));
    // 180 admin minutes per day: the second 120 does not fit on Monday.
    assert_eq!(expenses.start_time, at(20, 9, 0));
    assert_eq!(expenses.color, "#f59e0b");
}

#[test]
fn per_date_budget_override_applies() {
    let tuesday = NaiveDate::from_ymd_opt(2026, 10, 20).unwrap();
    let settings = WorkSettings::default().with_capacity_override(tuesday, CapacityBudget::new(0.0, 0.0));
    let tasks = vec![
        Task::new("a", "A").with_duration(240),
        Task::new("b", "B").with_duration(240),
    ];

    let outcome = Scheduler::with_settings(settings).schedule(&tasks, &[], monday_nine());
    assert_eq!(outcome.find("a").unwrap().date.weekday(), Weekday::Mon);
    assert_eq!(outcome.find("b").unwrap().date.weekday(), Weekday::Wed);
}

#[test]
fn weekend_start_rolls_to_monday() {
    let saturday = Utc.with_ymd_and_hms(2026, 10, 24, 10, 0, 0).unwrap();
    let outcome = Scheduler::new().schedule(&[Task::new("t", "T").with_duration(30)], &[], saturday);
    assert_eq!(outcome.find("t").unwrap().start_time, at(26, 9, 0));
}

fn sample_backlog() -> Backlog {
    Backlog::new(
        vec![
            Task::new("review", "Code review").with_duration(45).with_priority(4, 4),
            Task::new("invoices", "Invoices")
                .with_duration(60)
                .with_category(TaskCategory::Admin)
                .with_priority(2, 3),
            Task::new("gym", "Gym")
                .with_duration(60)
                .with_category(TaskCategory::Personal)
                .with_priority(1, 1),
        ],
        vec![Workflow::new("release", "Release 1.2")
            .with_priority(5, 4)
            .with_step(Step::new("build", "Build", 60))
            .with_step(Step::new("qa", "QA sign-off", 30).depends_on(["build"]).with_async_wait(90))
            .with_step(Step::new("launch", "Launch", 30).depends_on(["qa"]))],
    )
}
