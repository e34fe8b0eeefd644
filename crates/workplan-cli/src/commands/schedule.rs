use std::path::PathBuf;

use chrono::{DateTime, NaiveDateTime, Utc};
use clap::Args;
use workplan_core::{Backlog, ScheduleOutcome, ScheduledItem, Scheduler, Termination};

#[derive(Args)]
pub struct ScheduleArgs {
    /// Backlog file with tasks and workflows (.toml or .json)
    backlog: PathBuf,
    /// Settings file (defaults to the persisted settings)
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Start instant: "YYYY-MM-DD HH:MM" or RFC 3339 (defaults to now)
    #[arg(long)]
    start: Option<String>,
    /// Output JSON
    #[arg(long)]
    json: bool,
}

fn parse_start(value: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .map_err(|e| format!("invalid start '{value}': {e}"))?;
    Ok(naive.and_utc())
}

pub fn run(args: ScheduleArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = super::load_settings(args.settings.as_deref())?;
    settings.ensure_valid()?;

    let backlog = Backlog::load_from(&args.backlog)?;
    let start = match args.start.as_deref() {
        Some(value) => parse_start(value)?,
        None => Utc::now(),
    };

    let outcome = Scheduler::with_settings(settings).schedule_backlog(&backlog, start);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_table(&backlog, &outcome);
    }
    Ok(())
}

fn format_row(item: &ScheduledItem) -> String {
    let category = item
        .category
        .map(|c| format!(" [{}]", c.as_str()))
        .unwrap_or_default();
    format!(
        "  {}-{}  {:<13}  {}{}",
        item.start_time.format("%H:%M"),
        item.end_time.format("%H:%M"),
        item.kind.as_str(),
        item.name,
        category
    )
}

fn print_table(backlog: &Backlog, outcome: &ScheduleOutcome) {
    let mut items: Vec<&ScheduledItem> = outcome.items.iter().collect();
    items.sort_by_key(|item| (item.date, item.start_time));

    let mut current_date = None;
    for item in items {
        if current_date != Some(item.date) {
            current_date = Some(item.date);
            println!("{}", item.date.format("%a %Y-%m-%d"));
        }
        println!("{}", format_row(item));
    }

    let placed = outcome.completed_ids().len();
    println!();
    println!(
        "placed {placed} of {} open items (ended {})",
        backlog.open_item_count(),
        outcome.finished_at.format("%Y-%m-%d %H:%M")
    );

    println!("usage:");
    for ((date, category), minutes) in outcome.daily_usage() {
        println!("  {date}  {:<8}  {minutes}m", category.as_str());
    }

    if outcome.termination == Termination::HorizonReached {
        println!("horizon reached; unplaced:");
        for id in &outcome.unplaced {
            println!("  {id}");
        }
    }
}
