//! TOML-based work settings.
//!
//! Describes the shape of a working week:
//! - Default and per-weekday work windows, each with an optional lunch
//! - Daily capacity budgets for focused and admin work, with per-date overrides
//! - Recurring and one-off blocked intervals
//! - Engine knobs (stall quantum, horizon, step-key compatibility)
//!
//! Settings are stored at `~/.config/workplan/settings.toml`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result, ValidationError};

/// Parse an `HH:mm` clock time.
pub fn parse_clock(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

/// Lunch break attached to a work window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunchBreak {
    /// HH:mm
    pub start: String,
    #[serde(default = "default_lunch_minutes")]
    pub duration_minutes: u32,
}

/// Working-hour window for a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkHours {
    /// HH:mm
    pub start: String,
    /// HH:mm
    pub end: String,
    #[serde(default)]
    pub lunch: Option<LunchBreak>,
}

impl WorkHours {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            lunch: None,
        }
    }

    pub fn with_lunch(mut self, start: impl Into<String>, duration_minutes: u32) -> Self {
        self.lunch = Some(LunchBreak {
            start: start.into(),
            duration_minutes,
        });
        self
    }
}

/// Daily budget per work category, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapacityBudget {
    #[serde(default = "default_focused_hours")]
    pub focused_hours: f64,
    #[serde(default = "default_admin_hours")]
    pub admin_hours: f64,
}

impl CapacityBudget {
    pub fn new(focused_hours: f64, admin_hours: f64) -> Self {
        Self {
            focused_hours,
            admin_hours,
        }
    }

    pub fn focused_minutes(&self) -> u32 {
        hours_to_minutes(self.focused_hours)
    }

    pub fn admin_minutes(&self) -> u32 {
        hours_to_minutes(self.admin_hours)
    }
}

fn hours_to_minutes(hours: f64) -> u32 {
    if hours.is_finite() && hours > 0.0 {
        (hours * 60.0).round() as u32
    } else {
        0
    }
}

/// How a blocked interval repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    /// Applies only on its `date`
    #[default]
    #[serde(rename = "none", alias = "once")]
    Once,
    /// Every day
    Daily,
    /// On the listed weekdays
    Weekly,
}

/// A calendar interval during which nothing may be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockedTime {
    pub name: String,
    /// HH:mm
    pub start: String,
    /// HH:mm
    pub end: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Weekdays for `weekly` recurrence.
    #[serde(default)]
    pub days: Vec<Weekday>,
    /// Date for `none` recurrence (and fallback weekday for `weekly`).
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl BlockedTime {
    pub fn daily(name: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: start.into(),
            end: end.into(),
            recurrence: Recurrence::Daily,
            days: Vec::new(),
            date: None,
        }
    }

    pub fn weekly(
        name: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        days: Vec<Weekday>,
    ) -> Self {
        Self {
            recurrence: Recurrence::Weekly,
            days,
            ..Self::daily(name, start, end)
        }
    }

    pub fn once(
        name: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            recurrence: Recurrence::Once,
            date: Some(date),
            ..Self::daily(name, start, end)
        }
    }

    /// Whether this interval applies on `date`.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match self.recurrence {
            Recurrence::Once => self.date == Some(date),
            Recurrence::Daily => true,
            Recurrence::Weekly => {
                if self.days.is_empty() {
                    self.date.map(|d| d.weekday()) == Some(date.weekday())
                } else {
                    self.days.contains(&date.weekday())
                }
            }
        }
    }
}

/// Knobs of the placement loop itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerOptions {
    /// Minutes the cursor moves when nothing can be placed.
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
    /// Months past the start instant after which the run gives up.
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,
    /// Also complete steps under `{workflow_id}-step-{index}`.
    #[serde(default = "default_true")]
    pub composite_step_keys: bool,
}

/// Work settings.
///
/// Serialized to/from TOML at `~/.config/workplan/settings.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSettings {
    #[serde(default = "default_hours")]
    pub default_hours: WorkHours,
    /// Per-weekday window overrides, keyed by weekday name.
    #[serde(default)]
    pub day_hours: HashMap<Weekday, WorkHours>,
    #[serde(default)]
    pub default_capacity: CapacityBudget,
    /// Per-date budget overrides, keyed by ISO date.
    #[serde(default)]
    pub capacity_overrides: BTreeMap<NaiveDate, CapacityBudget>,
    #[serde(default)]
    pub blocked_times: Vec<BlockedTime>,
    /// Schedule on Saturdays and Sundays too.
    #[serde(default)]
    pub include_weekends: bool,
    #[serde(default)]
    pub scheduler: SchedulerOptions,
}

// Default functions
fn default_hours() -> WorkHours {
    WorkHours::new("09:00", "18:00").with_lunch("12:00", default_lunch_minutes())
}
fn default_lunch_minutes() -> u32 {
    60
}
fn default_focused_hours() -> f64 {
    4.0
}
fn default_admin_hours() -> f64 {
    3.0
}
fn default_step_minutes() -> u32 {
    15
}
fn default_horizon_months() -> u32 {
    1
}
fn default_true() -> bool {
    true
}

impl Default for CapacityBudget {
    fn default() -> Self {
        Self {
            focused_hours: default_focused_hours(),
            admin_hours: default_admin_hours(),
        }
    }
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            step_minutes: default_step_minutes(),
            horizon_months: default_horizon_months(),
            composite_step_keys: true,
        }
    }
}

impl Default for WorkSettings {
    fn default() -> Self {
        Self {
            default_hours: default_hours(),
            day_hours: HashMap::new(),
            default_capacity: CapacityBudget::default(),
            capacity_overrides: BTreeMap::new(),
            blocked_times: Vec::new(),
            include_weekends: false,
            scheduler: SchedulerOptions::default(),
        }
    }
}

/// Returns `~/.config/workplan[-dev]/` based on WORKPLAN_ENV.
///
/// Set WORKPLAN_ENV=dev to use the development directory.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .ok_or(ConfigError::NoConfigDir)?;

    let env = std::env::var("WORKPLAN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("workplan-dev")
    } else {
        base_dir.join("workplan")
    };

    Ok(dir)
}

impl WorkSettings {
    /// Window for `weekday`: its override if configured, else the default.
    pub fn hours_for(&self, weekday: Weekday) -> &WorkHours {
        self.day_hours.get(&weekday).unwrap_or(&self.default_hours)
    }

    /// Budget for `date`: its override if configured, else the default.
    pub fn capacity_for(&self, date: NaiveDate) -> CapacityBudget {
        self.capacity_overrides
            .get(&date)
            .copied()
            .unwrap_or(self.default_capacity)
    }

    pub fn with_day_hours(mut self, weekday: Weekday, hours: WorkHours) -> Self {
        self.day_hours.insert(weekday, hours);
        self
    }

    pub fn with_capacity(mut self, budget: CapacityBudget) -> Self {
        self.default_capacity = budget;
        self
    }

    pub fn with_capacity_override(mut self, date: NaiveDate, budget: CapacityBudget) -> Self {
        self.capacity_overrides.insert(date, budget);
        self
    }

    pub fn with_blocked_time(mut self, blocked: BlockedTime) -> Self {
        self.blocked_times.push(blocked);
        self
    }

    pub fn without_lunch(mut self) -> Self {
        self.default_hours.lunch = None;
        self
    }

    /// Default settings path.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("settings.toml"))
    }

    /// Load from the default path, or return defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load_or_default() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Check every window, lunch, budget and blocked interval.
    ///
    /// The scheduler never calls this; malformed entries there just make the
    /// affected slots unusable. Returns every problem found.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        validate_hours("default_hours", &self.default_hours, &mut errors);
        let mut overrides: Vec<_> = self.day_hours.iter().collect();
        overrides.sort_by_key(|(day, _)| day.num_days_from_monday());
        for (day, hours) in overrides {
            validate_hours(&format!("day_hours.{day}"), hours, &mut errors);
        }

        validate_budget("default_capacity", &self.default_capacity, &mut errors);
        for (date, budget) in &self.capacity_overrides {
            validate_budget(&format!("capacity_overrides.{date}"), budget, &mut errors);
        }

        for blocked in &self.blocked_times {
            let field = format!("blocked_times.{}", blocked.name);
            if let Some((start, end)) = validate_range(&field, &blocked.start, &blocked.end, &mut errors) {
                if end <= start {
                    errors.push(ValidationError::InvalidTimeRange {
                        field,
                        start: blocked.start.clone(),
                        end: blocked.end.clone(),
                    });
                }
            }
            if blocked.recurrence == Recurrence::Once && blocked.date.is_none() {
                errors.push(ValidationError::MissingDate {
                    name: blocked.name.clone(),
                });
            }
            if blocked.recurrence == Recurrence::Weekly && blocked.days.is_empty() && blocked.date.is_none() {
                errors.push(ValidationError::MissingWeekdays {
                    name: blocked.name.clone(),
                });
            }
        }

        errors
    }

    /// First validation problem, as an error.
    pub fn ensure_valid(&self) -> Result<()> {
        match self.validate().into_iter().next() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

fn validate_range(
    field: &str,
    start: &str,
    end: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<(NaiveTime, NaiveTime)> {
    let parsed_start = parse_clock(start);
    let parsed_end = parse_clock(end);
    if parsed_start.is_none() {
        errors.push(ValidationError::InvalidClockTime {
            field: format!("{field}.start"),
            value: start.to_string(),
        });
    }
    if parsed_end.is_none() {
        errors.push(ValidationError::InvalidClockTime {
            field: format!("{field}.end"),
            value: end.to_string(),
        });
    }
    Some((parsed_start?, parsed_end?))
}

fn validate_hours(field: &str, hours: &WorkHours, errors: &mut Vec<ValidationError>) {
    let Some((start, end)) = validate_range(field, &hours.start, &hours.end, errors) else {
        return;
    };
    if end <= start {
        errors.push(ValidationError::InvalidTimeRange {
            field: field.to_string(),
            start: hours.start.clone(),
            end: hours.end.clone(),
        });
        return;
    }

    let Some(lunch) = &hours.lunch else { return };
    let Some(lunch_start) = parse_clock(&lunch.start) else {
        errors.push(ValidationError::InvalidClockTime {
            field: format!("{field}.lunch.start"),
            value: lunch.start.clone(),
        });
        return;
    };
    let lunch_end = lunch_start + chrono::Duration::minutes(i64::from(lunch.duration_minutes));
    if lunch_start < start || lunch_end > end || lunch_end < lunch_start {
        errors.push(ValidationError::LunchOutsideWindow {
            field: field.to_string(),
            start: lunch.start.clone(),
            minutes: lunch.duration_minutes,
        });
    }
}

fn validate_budget(field: &str, budget: &CapacityBudget, errors: &mut Vec<ValidationError>) {
    for (name, hours) in [("focused_hours", budget.focused_hours), ("admin_hours", budget.admin_hours)] {
        if !hours.is_finite() || hours < 0.0 {
            errors.push(ValidationError::InvalidBudget {
                field: format!("{field}.{name}"),
                hours,
            });
        }
    }
}
