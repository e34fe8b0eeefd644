//! # Workplan Core Library
//!
//! This library places a backlog of tasks and multi-step workflows onto a
//! calendar. It is a deterministic greedy heuristic: no I/O, no clock reads,
//! no shared state between runs. The `workplan` CLI is a thin shell over
//! the same library.
//!
//! ## Architecture
//!
//! - **Work items**: tasks and workflow steps flattened into one
//!   priority-sorted list
//! - **Calendar**: per-day work windows, lunch and blocked time, plus the
//!   time advancer that skips nights and weekends
//! - **Capacity**: separate daily budgets for focused and admin work
//! - **Dependency gate**: dependency and async-wait tracking
//! - **Scheduler**: the placement loop tying the above together
//!
//! ## Key Components
//!
//! - [`Scheduler`]: runs a schedule from an explicit start instant
//! - [`ScheduleOutcome`]: placed intervals plus anything left unplaced
//! - [`WorkSettings`]: TOML-backed work settings

pub mod calendar;
pub mod capacity;
pub mod dependency;
pub mod error;
pub mod model;
pub mod scheduler;
pub mod settings;
pub mod work_item;

pub use calendar::{DayWindow, WorkCalendar};
pub use capacity::{CapacityTracker, DailyCapacity};
pub use dependency::DependencyGate;
pub use error::{ConfigError, CoreError, Result, ValidationError};
pub use model::{Backlog, Step, StepStatus, Task, TaskCategory, Workflow, WorkflowStatus};
pub use scheduler::{ScheduleOutcome, ScheduledItem, ScheduledKind, Scheduler, Termination};
pub use settings::{BlockedTime, CapacityBudget, LunchBreak, Recurrence, SchedulerOptions, WorkHours, WorkSettings};
pub use work_item::{build_work_items, WorkItem, WorkItemKind};
