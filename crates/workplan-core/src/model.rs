//! Backlog types: standalone tasks and multi-step workflows.
//!
//! These are the caller-owned inputs of a scheduling run. The engine only
//! ever borrows them; [`Backlog::without_scheduled`] produces a fresh copy
//! rather than touching the original records.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::scheduler::{ScheduleOutcome, ScheduledKind};

/// Work category used to apply separate daily budgets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    /// Deep work, drawn from the focused budget
    #[default]
    Focused,
    /// Shallow/administrative work, drawn from the admin budget
    Admin,
    /// Personal errands; not budgeted
    Personal,
}

impl TaskCategory {
    /// Display color used for scheduled intervals of this category.
    pub fn color(&self) -> &'static str {
        match self {
            TaskCategory::Focused => "#3b82f6",
            TaskCategory::Admin => "#f59e0b",
            TaskCategory::Personal => "#10b981",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Focused => "focused",
            TaskCategory::Admin => "admin",
            TaskCategory::Personal => "personal",
        }
    }
}

/// A standalone unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Minutes of active work.
    pub duration: u32,
    /// 1-10, multiplied with urgency to form the priority scalar.
    #[serde(default = "default_factor")]
    pub importance: u32,
    /// 1-10, multiplied with importance to form the priority scalar.
    #[serde(default = "default_factor")]
    pub urgency: u32,
    #[serde(default)]
    pub category: TaskCategory,
    /// Minutes after the work ends before dependents may start.
    #[serde(default)]
    pub async_wait_minutes: u32,
    #[serde(default)]
    pub completed: bool,
    /// Ids of other tasks that must finish first.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Informational only; not enforced by the scheduler.
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

fn default_factor() -> u32 {
    5
}

impl Task {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration: 30,
            importance: default_factor(),
            urgency: default_factor(),
            category: TaskCategory::Focused,
            async_wait_minutes: 0,
            completed: false,
            dependencies: Vec::new(),
            deadline: None,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }

    pub fn with_priority(mut self, importance: u32, urgency: u32) -> Self {
        self.importance = importance;
        self.urgency = urgency;
        self
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_async_wait(mut self, minutes: u32) -> Self {
        self.async_wait_minutes = minutes;
        self
    }

    pub fn with_dependencies<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// importance × urgency
    pub fn priority(&self) -> u32 {
        self.importance.saturating_mul(self.urgency)
    }
}

/// Lifecycle of a workflow as a whole.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    NotStarted,
    InProgress,
    Waiting,
    Completed,
}

/// Lifecycle of a single workflow step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Waiting,
    Completed,
}

/// One ordered step of a [`Workflow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub name: String,
    /// Minutes of active work.
    pub duration: u32,
    #[serde(default)]
    pub category: TaskCategory,
    #[serde(default)]
    pub async_wait_minutes: u32,
    /// Ids of other steps in the same workflow.
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub status: StepStatus,
}

impl Step {
    pub fn new(id: impl Into<String>, name: impl Into<String>, duration: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            duration,
            category: TaskCategory::Focused,
            async_wait_minutes: 0,
            depends_on: Vec::new(),
            status: StepStatus::Pending,
        }
    }

    pub fn with_category(mut self, category: TaskCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_async_wait(mut self, minutes: u32) -> Self {
        self.async_wait_minutes = minutes;
        self
    }

    pub fn depends_on<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: StepStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

/// A named group of ordered steps sharing one priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default = "default_factor")]
    pub importance: u32,
    #[serde(default = "default_factor")]
    pub urgency: u32,
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Workflow {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            importance: default_factor(),
            urgency: default_factor(),
            status: WorkflowStatus::NotStarted,
            steps: Vec::new(),
        }
    }

    pub fn with_priority(mut self, importance: u32, urgency: u32) -> Self {
        self.importance = importance;
        self.urgency = urgency;
        self
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_status(mut self, status: WorkflowStatus) -> Self {
        self.status = status;
        self
    }

    /// importance × urgency, shared by every step
    pub fn priority(&self) -> u32 {
        self.importance.saturating_mul(self.urgency)
    }

    pub fn is_completed(&self) -> bool {
        self.status == WorkflowStatus::Completed
    }
}

/// Tasks and workflows loaded together from one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backlog {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub workflows: Vec<Workflow>,
}

impl Backlog {
    pub fn new(tasks: Vec<Task>, workflows: Vec<Workflow>) -> Self {
        Self { tasks, workflows }
    }

    /// Load a backlog from a `.toml` or `.json` file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
            .into()),
        }
    }

    /// Copy of this backlog with every task and step placed by `outcome`
    /// marked completed.
    ///
    /// A workflow whose steps all end up completed is marked completed too.
    pub fn without_scheduled(&self, outcome: &ScheduleOutcome) -> Self {
        let mut placed_tasks: HashSet<&str> = HashSet::new();
        let mut placed_steps: HashSet<(&str, &str)> = HashSet::new();

        for item in outcome.work_items() {
            match (item.kind, item.workflow_id.as_deref()) {
                (ScheduledKind::Task, _) => {
                    placed_tasks.insert(item.id.as_str());
                }
                (ScheduledKind::WorkflowStep, Some(workflow_id)) => {
                    placed_steps.insert((workflow_id, item.id.as_str()));
                }
                _ => {}
            }
        }

        let tasks = self
            .tasks
            .iter()
            .map(|task| {
                let mut task = task.clone();
                if placed_tasks.contains(task.id.as_str()) {
                    task.completed = true;
                }
                task
            })
            .collect();

        let workflows = self
            .workflows
            .iter()
            .map(|workflow| {
                let mut workflow = workflow.clone();
                for step in workflow.steps.iter_mut() {
                    if placed_steps.contains(&(workflow.id.as_str(), step.id.as_str())) {
                        step.status = StepStatus::Completed;
                    }
                }
                if !workflow.steps.is_empty() && workflow.steps.iter().all(Step::is_completed) {
                    workflow.status = WorkflowStatus::Completed;
                }
                workflow
            })
            .collect();

        Self { tasks, workflows }
    }

    /// Number of tasks and steps still waiting to be scheduled.
    pub fn open_item_count(&self) -> usize {
        let tasks = self.tasks.iter().filter(|t| !t.completed).count();
        let steps: usize = self
            .workflows
            .iter()
            .filter(|w| !w.is_completed())
            .map(|w| w.steps.iter().filter(|s| !s.is_completed()).count())
            .sum();
        tasks + steps
    }
}
