//! Work calendar: day windows, lunch, blocked time, and time advancement.
//!
//! All clock times are interpreted as wall-clock times in UTC; callers that
//! work in a local zone convert at the edge.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use tracing::warn;

use crate::scheduler::ScheduledItem;
use crate::settings::{parse_clock, WorkHours, WorkSettings};

/// Days the advancer will roll forward looking for a usable window.
const MAX_DAY_ROLLS: u32 = 14;

/// Resolved working window of one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn contains(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start >= self.start && end <= self.end
    }
}

fn at(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    at(date, NaiveTime::MIN)
}

/// Calendar view over [`WorkSettings`].
///
/// Every method is pure; resolving the same date twice yields the same result.
#[derive(Debug, Clone, Copy)]
pub struct WorkCalendar<'a> {
    settings: &'a WorkSettings,
}

impl<'a> WorkCalendar<'a> {
    pub fn new(settings: &'a WorkSettings) -> Self {
        Self { settings }
    }

    pub fn is_work_day(&self, date: NaiveDate) -> bool {
        self.settings.include_weekends || !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    fn hours(&self, date: NaiveDate) -> &'a WorkHours {
        self.settings.hours_for(date.weekday())
    }

    /// Working window for `date`, or `None` if the configured window is
    /// unparsable or empty.
    pub fn window(&self, date: NaiveDate) -> Option<DayWindow> {
        let hours = self.hours(date);
        let (Some(start), Some(end)) = (parse_clock(&hours.start), parse_clock(&hours.end)) else {
            warn!(%date, start = %hours.start, end = %hours.end, "unparsable work window; day unusable");
            return None;
        };
        if end <= start {
            return None;
        }
        Some(DayWindow {
            start: at(date, start),
            end: at(date, end),
        })
    }

    /// Lunch interval for `date`, if its window configures one.
    pub fn lunch(&self, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let lunch = self.hours(date).lunch.as_ref()?;
        let Some(start) = parse_clock(&lunch.start) else {
            warn!(%date, lunch = %lunch.start, "unparsable lunch start; skipped");
            return None;
        };
        let start = at(date, start);
        Some((start, start + Duration::minutes(i64::from(lunch.duration_minutes))))
    }

    /// Lunch and blocked intervals applying on `date`, lunch first, then
    /// blocked time in configuration order.
    pub fn blocked_entries(&self, date: NaiveDate) -> Vec<ScheduledItem> {
        let mut entries = Vec::new();

        if let Some((start, end)) = self.lunch(date) {
            entries.push(ScheduledItem::lunch(date, start, end));
        }

        for blocked in self.settings.blocked_times.iter().filter(|b| b.applies_on(date)) {
            match (parse_clock(&blocked.start), parse_clock(&blocked.end)) {
                (Some(start), Some(end)) => {
                    entries.push(ScheduledItem::blocked(&blocked.name, date, at(date, start), at(date, end)));
                }
                _ => warn!(%date, name = %blocked.name, "unparsable blocked time; skipped"),
            }
        }

        entries
    }

    /// Clamp `t` forward to the next valid working instant.
    ///
    /// Before the window snaps to its start; at or after the window end (or on
    /// a non-work day) rolls to the next work day's window start. Idempotent.
    pub fn next_working_instant(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let mut t = t;
        for _ in 0..=MAX_DAY_ROLLS {
            let date = t.date_naive();
            if self.is_work_day(date) {
                if let Some(window) = self.window(date) {
                    if t < window.start {
                        return window.start;
                    }
                    if t < window.end {
                        return t;
                    }
                }
            }
            t = match date.succ_opt() {
                Some(next) => start_of_day(next),
                None => return t,
            };
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BlockedTime;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    // 2026-10-19 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn snaps_to_window_start() {
        let settings = WorkSettings::default();
        let cal = WorkCalendar::new(&settings);
        assert_eq!(cal.next_working_instant(utc(2026, 10, 19, 6, 30)), utc(2026, 10, 19, 9, 0));
    }

    #[test]
    fn inside_window_is_unchanged_and_idempotent() {
        let settings = WorkSettings::default();
        let cal = WorkCalendar::new(&settings);
        let t = utc(2026, 10, 19, 10, 15);
        assert_eq!(cal.next_working_instant(t), t);
        let rolled = cal.next_working_instant(utc(2026, 10, 19, 18, 0));
        assert_eq!(cal.next_working_instant(rolled), rolled);
    }

    #[test]
    fn window_end_rolls_to_next_day() {
        let settings = WorkSettings::default();
        let cal = WorkCalendar::new(&settings);
        assert_eq!(cal.next_working_instant(utc(2026, 10, 19, 18, 0)), utc(2026, 10, 20, 9, 0));
    }

    #[test]
    fn skips_weekends_unless_included() {
        let settings = WorkSettings::default();
        let cal = WorkCalendar::new(&settings);
        // Friday evening -> Monday morning
        assert_eq!(cal.next_working_instant(utc(2026, 10, 23, 19, 0)), utc(2026, 10, 26, 9, 0));
        // Saturday noon -> Monday morning
        assert_eq!(cal.next_working_instant(utc(2026, 10, 24, 12, 0)), utc(2026, 10, 26, 9, 0));

        let settings = WorkSettings {
            include_weekends: true,
            ..WorkSettings::default()
        };
        let cal = WorkCalendar::new(&settings);
        assert_eq!(cal.next_working_instant(utc(2026, 10, 23, 19, 0)), utc(2026, 10, 24, 9, 0));
    }

    #[test]
    fn weekday_override_selects_window() {
        let settings = WorkSettings::default()
            .with_day_hours(Weekday::Tue, WorkHours::new("07:00", "11:00"));
        let cal = WorkCalendar::new(&settings);
        assert_eq!(cal.next_working_instant(utc(2026, 10, 19, 18, 30)), utc(2026, 10, 20, 7, 0));
        assert_eq!(cal.next_working_instant(utc(2026, 10, 20, 11, 0)), utc(2026, 10, 21, 9, 0));
        // Override carries no lunch.
        assert!(cal.lunch(NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()).is_none());
    }

    #[test]
    fn broken_window_makes_day_unusable() {
        let settings = WorkSettings::default()
            .with_day_hours(Weekday::Mon, WorkHours::new("nine", "18:00"));
        let cal = WorkCalendar::new(&settings);
        assert!(cal.window(monday()).is_none());
        assert_eq!(cal.next_working_instant(utc(2026, 10, 19, 10, 0)), utc(2026, 10, 20, 9, 0));
    }

    #[test]
    fn blocked_entries_for_date() {
        let settings = WorkSettings::default()
            .with_blocked_time(BlockedTime::weekly("Standup", "09:30", "09:45", vec![Weekday::Mon]))
            .with_blocked_time(BlockedTime::weekly("Retro", "16:00", "17:00", vec![Weekday::Fri]));
        let cal = WorkCalendar::new(&settings);

        let entries = cal.blocked_entries(monday());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "lunch:2026-10-19");
        assert_eq!(entries[0].start_time, utc(2026, 10, 19, 12, 0));
        assert_eq!(entries[0].end_time, utc(2026, 10, 19, 13, 0));
        assert_eq!(entries[1].name, "Standup");
        assert_eq!(entries[1].duration, 15);

        // Pure: same input, same output.
        assert_eq!(cal.blocked_entries(monday()), entries);
    }
}
