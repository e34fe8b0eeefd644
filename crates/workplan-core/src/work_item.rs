//! Flattening of tasks and workflows into uniform schedulable units.

use serde::{Deserialize, Serialize};

use crate::model::{Task, TaskCategory, Workflow};

/// Where a work item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkItemKind {
    Task,
    WorkflowStep,
}

/// One placeable unit: a task or a single workflow step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    pub name: String,
    pub kind: WorkItemKind,
    pub priority: u32,
    /// Minutes of active work.
    pub duration: u32,
    pub async_wait_minutes: u32,
    pub category: TaskCategory,
    pub workflow_id: Option<String>,
    /// Position in the workflow's step list.
    pub step_index: Option<usize>,
    pub dependencies: Vec<String>,
}

impl WorkItem {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            kind: WorkItemKind::Task,
            priority: task.priority(),
            duration: task.duration,
            async_wait_minutes: task.async_wait_minutes,
            category: task.category,
            workflow_id: None,
            step_index: None,
            dependencies: task.dependencies.clone(),
        }
    }

    /// Alternate key `{workflow_id}-step-{index}` some workflow definitions
    /// use when referring to a step.
    pub fn composite_key(&self) -> Option<String> {
        match (&self.workflow_id, self.step_index) {
            (Some(workflow_id), Some(index)) => Some(composite_step_key(workflow_id, index)),
            _ => None,
        }
    }

    pub fn has_async_wait(&self) -> bool {
        self.async_wait_minutes > 0
    }
}

pub fn composite_step_key(workflow_id: &str, index: usize) -> String {
    format!("{workflow_id}-step-{index}")
}

/// Build the priority-sorted list of work items for a run.
///
/// Completed tasks, completed workflows and completed steps are dropped.
/// The sort is stable, so equal priorities keep input order (tasks first,
/// then workflow steps in declaration order).
pub fn build_work_items(tasks: &[Task], workflows: &[Workflow]) -> Vec<WorkItem> {
    let mut items: Vec<WorkItem> = tasks
        .iter()
        .filter(|t| !t.completed)
        .map(WorkItem::from_task)
        .collect();

    for workflow in workflows.iter().filter(|w| !w.is_completed()) {
        let priority = workflow.priority();
        items.extend(
            workflow
                .steps
                .iter()
                .enumerate()
                .filter(|(_, step)| !step.is_completed())
                .map(|(index, step)| WorkItem {
                    id: step.id.clone(),
                    name: step.name.clone(),
                    kind: WorkItemKind::WorkflowStep,
                    priority,
                    duration: step.duration,
                    async_wait_minutes: step.async_wait_minutes,
                    category: step.category,
                    workflow_id: Some(workflow.id.clone()),
                    step_index: Some(index),
                    dependencies: step.depends_on.clone(),
                }),
        );
    }

    items.sort_by(|a, b| b.priority.cmp(&a.priority));
    items
}

/// Ids already finished before the run starts.
///
/// Seeding the dependency gate with these lets remaining work that depends
/// on finished work proceed.
pub fn completed_ids(tasks: &[Task], workflows: &[Workflow], composite_keys: bool) -> Vec<String> {
    let mut ids: Vec<String> = tasks
        .iter()
        .filter(|t| t.completed)
        .map(|t| t.id.clone())
        .collect();

    for workflow in workflows {
        for (index, step) in workflow.steps.iter().enumerate() {
            if workflow.is_completed() || step.is_completed() {
                ids.push(step.id.clone());
                if composite_keys {
                    ids.push(composite_step_key(&workflow.id, index));
                }
            }
        }
    }

    ids
}
