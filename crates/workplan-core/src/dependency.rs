//! Dependency gate: which work items have finished as of the cursor.
//!
//! Items without an async wait complete the instant they are placed. Items
//! with one complete when the cursor reaches the end of their wait; those
//! pending completions sit in a min-heap keyed by instant, so two completions
//! at the same instant never collide.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use chrono::{DateTime, Utc};

use crate::work_item::WorkItem;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DeferredCompletion {
    at: DateTime<Utc>,
    seq: u64,
    id: String,
    alias: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGate {
    completed: HashSet<String>,
    deferred: BinaryHeap<Reverse<DeferredCompletion>>,
    composite_keys: bool,
    seq: u64,
}

impl DependencyGate {
    /// `composite_keys` also registers steps under `{workflow_id}-step-{index}`.
    pub fn new(composite_keys: bool) -> Self {
        Self {
            composite_keys,
            ..Self::default()
        }
    }

    /// Mark ids as already finished before the run.
    pub fn seed<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.completed.extend(ids);
    }

    /// Every dependency of `item` has completed.
    pub fn is_satisfied(&self, item: &WorkItem) -> bool {
        item.dependencies.iter().all(|dep| self.completed.contains(dep))
    }

    fn alias_for(&self, item: &WorkItem) -> Option<String> {
        if self.composite_keys {
            item.composite_key()
        } else {
            None
        }
    }

    /// Record a placed item. `release_at` is the end of its async wait;
    /// `None` completes it right away.
    pub fn on_placed(&mut self, item: &WorkItem, release_at: Option<DateTime<Utc>>) {
        let alias = self.alias_for(item);
        match release_at {
            None => {
                self.completed.insert(item.id.clone());
                self.completed.extend(alias);
            }
            Some(at) => {
                self.seq += 1;
                self.deferred.push(Reverse(DeferredCompletion {
                    at,
                    seq: self.seq,
                    id: item.id.clone(),
                    alias,
                }));
            }
        }
    }

    /// Complete every deferred item whose wait ended at or before `cursor`.
    /// Returns the released ids in release order.
    pub fn release_until(&mut self, cursor: DateTime<Utc>) -> Vec<String> {
        let mut released = Vec::new();
        while let Some(Reverse(next)) = self.deferred.peek() {
            if next.at > cursor {
                break;
            }
            let Some(Reverse(done)) = self.deferred.pop() else { break };
            self.completed.insert(done.id.clone());
            self.completed.extend(done.alias);
            released.push(done.id);
        }
        released
    }

    /// Latest async completion still pending.
    pub fn last_release(&self) -> Option<DateTime<Utc>> {
        self.deferred.iter().map(|Reverse(d)| d.at).max()
    }

    pub fn pending_releases(&self) -> usize {
        self.deferred.len()
    }
}
