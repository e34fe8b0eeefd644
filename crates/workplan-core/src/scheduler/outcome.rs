//! Result of a scheduling run.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ScheduledItem, ScheduledKind};
use crate::capacity::DailyCapacity;
use crate::model::TaskCategory;

/// Why the placement loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every work item was placed.
    Completed,
    /// The horizon passed with work still pending.
    HorizonReached,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Ordered output intervals, calendar entries included.
    pub items: Vec<ScheduledItem>,
    /// Ids of work items that were never placed, in priority order.
    pub unplaced: Vec<String>,
    pub termination: Termination,
    pub started_at: DateTime<Utc>,
    /// Earliest instant a follow-up run may start: the final cursor, or
    /// the end of the last async wait if that is later.
    pub finished_at: DateTime<Utc>,
    /// Capacity of every day the cursor visited.
    pub capacity: Vec<DailyCapacity>,
}

impl ScheduleOutcome {
    pub fn is_complete(&self) -> bool {
        self.termination == Termination::Completed && self.unplaced.is_empty()
    }

    /// Task and workflow-step intervals only.
    pub fn work_items(&self) -> impl Iterator<Item = &ScheduledItem> {
        self.items.iter().filter(|item| item.kind.is_work())
    }

    /// Lunch and blocked-time intervals only.
    pub fn calendar_items(&self) -> impl Iterator<Item = &ScheduledItem> {
        self.items.iter().filter(|item| item.kind.is_calendar())
    }

    pub fn find(&self, id: &str) -> Option<&ScheduledItem> {
        self.work_items().find(|item| item.id == id)
    }

    /// Ids of every placed task and step.
    pub fn completed_ids(&self) -> Vec<String> {
        self.work_items().map(|item| item.id.clone()).collect()
    }

    /// Minutes of placed work per date and category, personal work included.
    pub fn daily_usage(&self) -> BTreeMap<(NaiveDate, TaskCategory), u32> {
        let mut usage = BTreeMap::new();
        for item in self.work_items() {
            let Some(category) = item.category else { continue };
            *usage.entry((item.date, category)).or_insert(0) += item.duration;
        }
        usage
    }

    pub fn count_of(&self, kind: ScheduledKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Task;
    use crate::scheduler::Scheduler;
    use chrono::TimeZone;

    fn run() -> ScheduleOutcome {
        let tasks = vec![
            Task::new("deep", "Deep").with_duration(60),
            Task::new("mail", "Mail").with_duration(30).with_category(TaskCategory::Admin),
            Task::new("gym", "Gym").with_duration(45).with_category(TaskCategory::Personal),
            Task::new("notes", "Notes").with_duration(20),
        ];
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        Scheduler::new().schedule(&tasks, &[], start)
    }

    #[test]
    fn daily_usage_sums_work_per_category() {
        let outcome = run();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let usage = outcome.daily_usage();

        assert_eq!(usage.len(), 3);
        assert_eq!(usage[&(monday, TaskCategory::Focused)], 80);
        assert_eq!(usage[&(monday, TaskCategory::Admin)], 30);
        assert_eq!(usage[&(monday, TaskCategory::Personal)], 45);
    }

    #[test]
    fn completed_ids_list_placed_work_only() {
        let outcome = run();
        assert!(outcome.is_complete());
        assert_eq!(outcome.completed_ids(), vec!["deep", "mail", "gym", "notes"]);
        assert!(outcome.count_of(ScheduledKind::Lunch) >= 1);
    }
}
