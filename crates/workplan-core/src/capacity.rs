//! Per-day capacity tracking for focused and admin work.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::TaskCategory;
use crate::settings::WorkSettings;

/// Minutes used and available in each budgeted category on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCapacity {
    pub date: NaiveDate,
    pub focused_used: u32,
    pub admin_used: u32,
    pub focused_budget: u32,
    pub admin_budget: u32,
}

impl DailyCapacity {
    fn new(date: NaiveDate, settings: &WorkSettings) -> Self {
        let budget = settings.capacity_for(date);
        Self {
            date,
            focused_used: 0,
            admin_used: 0,
            focused_budget: budget.focused_minutes(),
            admin_budget: budget.admin_minutes(),
        }
    }

    /// Minutes left for `category`; `None` if the category is not budgeted.
    pub fn remaining(&self, category: TaskCategory) -> Option<u32> {
        match category {
            TaskCategory::Focused => Some(self.focused_budget.saturating_sub(self.focused_used)),
            TaskCategory::Admin => Some(self.admin_budget.saturating_sub(self.admin_used)),
            TaskCategory::Personal => None,
        }
    }

    /// Whether `minutes` more of `category` fit. Exact fits are allowed.
    pub fn fits(&self, category: TaskCategory, minutes: u32) -> bool {
        match category {
            TaskCategory::Focused => self.focused_used.saturating_add(minutes) <= self.focused_budget,
            TaskCategory::Admin => self.admin_used.saturating_add(minutes) <= self.admin_budget,
            TaskCategory::Personal => true,
        }
    }

    fn consume(&mut self, category: TaskCategory, minutes: u32) {
        match category {
            TaskCategory::Focused => self.focused_used = self.focused_used.saturating_add(minutes),
            TaskCategory::Admin => self.admin_used = self.admin_used.saturating_add(minutes),
            TaskCategory::Personal => {}
        }
    }
}

/// Lazily-created [`DailyCapacity`] per date for one run.
#[derive(Debug, Clone)]
pub struct CapacityTracker<'a> {
    settings: &'a WorkSettings,
    days: BTreeMap<NaiveDate, DailyCapacity>,
}

impl<'a> CapacityTracker<'a> {
    pub fn new(settings: &'a WorkSettings) -> Self {
        Self {
            settings,
            days: BTreeMap::new(),
        }
    }

    /// Capacity for `date`, creating it from the settings on first use.
    pub fn day(&mut self, date: NaiveDate) -> &mut DailyCapacity {
        let settings = self.settings;
        self.days
            .entry(date)
            .or_insert_with(|| DailyCapacity::new(date, settings))
    }

    pub fn can_place(&mut self, date: NaiveDate, category: TaskCategory, minutes: u32) -> bool {
        self.day(date).fits(category, minutes)
    }

    pub fn record(&mut self, date: NaiveDate, category: TaskCategory, minutes: u32) {
        self.day(date).consume(category, minutes);
    }

    /// Every day touched so far, in date order.
    pub fn into_days(self) -> Vec<DailyCapacity> {
        self.days.into_values().collect()
    }
}
