//! Greedy placement of work items onto the work calendar.
//!
//! The scheduler walks a cursor forward through working time. At each
//! position it releases finished async waits, then takes the highest-priority
//! pending work item that:
//! - has every dependency completed
//! - fits in the remaining focused/admin budget of the day
//! - fits inside the day's work window
//! - does not collide with lunch, blocked time or already-placed work
//!
//! When nothing fits the cursor moves by a fixed quantum. The run ends when
//! the backlog is empty or the horizon (one month by default) has passed.

mod item;
mod outcome;

pub use item::{ScheduledItem, ScheduledKind};
pub use outcome::{ScheduleOutcome, Termination};

use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use tracing::{debug, info, trace};

use crate::calendar::{DayWindow, WorkCalendar};
use crate::capacity::CapacityTracker;
use crate::dependency::DependencyGate;
use crate::model::{Backlog, Task, Workflow};
use crate::settings::WorkSettings;
use crate::work_item::{build_work_items, completed_ids, WorkItem};

/// Calendar state of the date under the cursor.
struct Day {
    date: NaiveDate,
    window: Option<DayWindow>,
    blocked: Vec<ScheduledItem>,
    placed: Vec<(DateTime<Utc>, DateTime<Utc>)>,
}

impl Day {
    fn enter(calendar: &WorkCalendar<'_>, date: NaiveDate) -> Self {
        Self {
            date,
            window: calendar.window(date),
            blocked: calendar.blocked_entries(date),
            placed: Vec::new(),
        }
    }

    fn is_free(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let in_window = self.window.is_some_and(|w| w.contains(start, end));
        in_window
            && !self.blocked.iter().any(|b| b.overlaps(start, end))
            && !self.placed.iter().any(|&(s, e)| s < end && e > start)
    }
}

/// Calendar-aware greedy scheduler.
#[derive(Debug, Clone)]
pub struct Scheduler {
    settings: WorkSettings,
}

impl Scheduler {
    /// Create a scheduler with default settings
    pub fn new() -> Self {
        Self {
            settings: WorkSettings::default(),
        }
    }

    /// Create with custom settings
    pub fn with_settings(settings: WorkSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &WorkSettings {
        &self.settings
    }

    pub fn schedule_backlog(&self, backlog: &Backlog, start: DateTime<Utc>) -> ScheduleOutcome {
        self.schedule(&backlog.tasks, &backlog.workflows, start)
    }

    /// Place `tasks` and `workflows` starting at `start`.
    ///
    /// Inputs are only read. The same inputs always give the same outcome.
    /// Work that can never be placed shows up in
    /// [`ScheduleOutcome::unplaced`] rather than as an error.
    pub fn schedule(
        &self,
        tasks: &[Task],
        workflows: &[Workflow],
        start: DateTime<Utc>,
    ) -> ScheduleOutcome {
        let options = &self.settings.scheduler;
        let calendar = WorkCalendar::new(&self.settings);
        let mut capacity = CapacityTracker::new(&self.settings);
        let mut gate = DependencyGate::new(options.composite_step_keys);
        gate.seed(completed_ids(tasks, workflows, options.composite_step_keys));

        let mut pending = build_work_items(tasks, workflows);
        let total = pending.len();
        let horizon = start
            .checked_add_months(Months::new(options.horizon_months))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let step = Duration::minutes(i64::from(options.step_minutes.max(1)));

        let mut items: Vec<ScheduledItem> = Vec::new();
        let mut cursor = calendar.next_working_instant(start);
        let mut day = Day::enter(&calendar, cursor.date_naive());
        debug!(date = %day.date, blocked = day.blocked.len(), "entered day");
        items.extend(day.blocked.iter().cloned());

        let termination = loop {
            if pending.is_empty() {
                break Termination::Completed;
            }
            if cursor > horizon {
                break Termination::HorizonReached;
            }

            for id in gate.release_until(cursor) {
                trace!(%id, %cursor, "async wait finished");
            }

            let slot = pending
                .iter()
                .position(|item| Self::is_placeable(item, cursor, &day, &mut capacity, &gate));

            match slot {
                Some(index) => {
                    let item = pending.remove(index);
                    let end = cursor + Duration::minutes(i64::from(item.duration));
                    capacity.record(day.date, item.category, item.duration);
                    day.placed.push((cursor, end));
                    items.push(ScheduledItem::work(&item, cursor, end));

                    if item.has_async_wait() {
                        let release = end + Duration::minutes(i64::from(item.async_wait_minutes));
                        items.push(ScheduledItem::async_wait(&item, end, release));
                        gate.on_placed(&item, Some(release));
                    } else {
                        gate.on_placed(&item, None);
                    }

                    debug!(
                        id = %item.id,
                        priority = item.priority,
                        start = %cursor,
                        end = %end,
                        category = item.category.as_str(),
                        "placed work item"
                    );
                    cursor = end;
                }
                None => {
                    trace!(%cursor, pending = pending.len(), "nothing placeable; advancing");
                    cursor += step;
                }
            }

            cursor = calendar.next_working_instant(cursor);
            if cursor.date_naive() != day.date && cursor <= horizon {
                day = Day::enter(&calendar, cursor.date_naive());
                debug!(date = %day.date, blocked = day.blocked.len(), "entered day");
                items.extend(day.blocked.iter().cloned());
            }
        };

        // A re-run may only start once every async wait of this run is over.
        let finished_at = gate.last_release().map_or(cursor, |release| release.max(cursor));

        let unplaced: Vec<String> = pending.into_iter().map(|item| item.id).collect();
        info!(
            placed = total - unplaced.len(),
            unplaced = unplaced.len(),
            pending_waits = gate.pending_releases(),
            ?termination,
            %finished_at,
            "scheduling finished"
        );

        ScheduleOutcome {
            items,
            unplaced,
            termination,
            started_at: start,
            finished_at,
            capacity: capacity.into_days(),
        }
    }

    fn is_placeable(
        item: &WorkItem,
        cursor: DateTime<Utc>,
        day: &Day,
        capacity: &mut CapacityTracker<'_>,
        gate: &DependencyGate,
    ) -> bool {
        let end = cursor + Duration::minutes(i64::from(item.duration));
        gate.is_satisfied(item)
            && capacity.can_place(day.date, item.category, item.duration)
            && day.is_free(cursor, end)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
