//! Output records of a scheduling run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::TaskCategory;
use crate::work_item::{WorkItem, WorkItemKind};

const ASYNC_WAIT_COLOR: &str = "#9ca3af";
const BLOCKED_COLOR: &str = "#ef4444";
const LUNCH_COLOR: &str = "#a3a3a3";

/// What occupies a scheduled interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduledKind {
    Task,
    WorkflowStep,
    AsyncWait,
    BlockedTime,
    Lunch,
}

impl ScheduledKind {
    /// Task or workflow step: consumes capacity and may not overlap.
    pub fn is_work(&self) -> bool {
        matches!(self, ScheduledKind::Task | ScheduledKind::WorkflowStep)
    }

    /// Derived from the work calendar rather than the backlog.
    pub fn is_calendar(&self) -> bool {
        matches!(self, ScheduledKind::BlockedTime | ScheduledKind::Lunch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduledKind::Task => "task",
            ScheduledKind::WorkflowStep => "workflow-step",
            ScheduledKind::AsyncWait => "async-wait",
            ScheduledKind::BlockedTime => "blocked-time",
            ScheduledKind::Lunch => "lunch",
        }
    }
}

/// One time-stamped interval of the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledItem {
    pub id: String,
    pub name: String,
    pub kind: ScheduledKind,
    pub priority: u32,
    /// Minutes.
    pub duration: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Calendar day whose capacity/calendar this interval belongs to.
    pub date: NaiveDate,
    pub category: Option<TaskCategory>,
    pub color: String,
    /// Originating work item; `None` for lunch and blocked time.
    pub work_item_id: Option<String>,
    pub workflow_id: Option<String>,
}

impl ScheduledItem {
    /// Active-work interval for a placed work item.
    pub fn work(item: &WorkItem, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        let kind = match item.kind {
            WorkItemKind::Task => ScheduledKind::Task,
            WorkItemKind::WorkflowStep => ScheduledKind::WorkflowStep,
        };
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            kind,
            priority: item.priority,
            duration: item.duration,
            start_time,
            end_time,
            date: start_time.date_naive(),
            category: Some(item.category),
            color: item.category.color().to_string(),
            work_item_id: Some(item.id.clone()),
            workflow_id: item.workflow_id.clone(),
        }
    }

    /// Async-wait placeholder following a work interval.
    pub fn async_wait(item: &WorkItem, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}:wait", item.id),
            name: format!("Waiting: {}", item.name),
            kind: ScheduledKind::AsyncWait,
            priority: item.priority,
            duration: item.async_wait_minutes,
            start_time,
            end_time,
            date: start_time.date_naive(),
            category: Some(item.category),
            color: ASYNC_WAIT_COLOR.to_string(),
            work_item_id: Some(item.id.clone()),
            workflow_id: item.workflow_id.clone(),
        }
    }

    pub fn lunch(date: NaiveDate, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self::calendar(
            format!("lunch:{date}"),
            "Lunch".to_string(),
            ScheduledKind::Lunch,
            LUNCH_COLOR,
            date,
            start_time,
            end_time,
        )
    }

    pub fn blocked(
        name: &str,
        date: NaiveDate,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self::calendar(
            format!("blocked:{name}:{date}"),
            name.to_string(),
            ScheduledKind::BlockedTime,
            BLOCKED_COLOR,
            date,
            start_time,
            end_time,
        )
    }

    fn calendar(
        id: String,
        name: String,
        kind: ScheduledKind,
        color: &str,
        date: NaiveDate,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            priority: 0,
            duration: (end_time - start_time).num_minutes().max(0) as u32,
            start_time,
            end_time,
            date,
            category: None,
            color: color.to_string(),
            work_item_id: None,
            workflow_id: None,
        }
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn overlap_is_half_open() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 10, 19, 13, 0, 0).unwrap();
        let lunch = ScheduledItem::lunch(date, start, end);

        assert_eq!(lunch.duration, 60);
        assert!(lunch.overlaps(start - chrono::Duration::minutes(30), start + chrono::Duration::minutes(1)));
        assert!(!lunch.overlaps(end, end + chrono::Duration::minutes(30)));
        assert!(!lunch.overlaps(start - chrono::Duration::minutes(30), start));
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ScheduledKind::AsyncWait).unwrap();
        assert_eq!(json, "\"async_wait\"");
        assert!(ScheduledKind::WorkflowStep.is_work());
        assert!(ScheduledKind::Lunch.is_calendar());
        assert!(!ScheduledKind::AsyncWait.is_work());
    }
}
