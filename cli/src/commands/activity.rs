use std::path::Path;
use std::process;

use anyhow::Result;
use tabled::{Table, Tabled, builder::Builder, settings::Style};

use fit28_core::grid::{CellKey, Week, WeekGrid, activities_in_week};
use fit28_core::service::{ActivityDraft, Session, Tracker};

use super::helpers::{json_error, parse_day, parse_slot, truncate};
use crate::photo::load_optional;

const CELL_WIDTH: usize = 12;

#[allow(clippy::too_many_arguments)]
pub(crate) async fn cmd_activity_log(
    tracker: &Tracker,
    session: &Session,
    day: &str,
    slot: &str,
    kind: &str,
    details: Option<String>,
    photo: Option<&Path>,
    json: bool,
) -> Result<()> {
    let day = parse_day(session.week, day)?;
    let slot = parse_slot(slot)?;
    let key = CellKey::for_cell(session.week, day, slot.index())?;
    let photo = load_optional(photo).await?;

    let record = tracker.log_activity(
        session,
        key,
        ActivityDraft {
            kind: kind.to_string(),
            details: details.unwrap_or_default(),
            photo,
        },
    )?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "key": key, "activity": record }))?
        );
    } else {
        println!(
            "Logged {} on {} {} {}",
            record.kind,
            key.date.format("%a %b %-d"),
            key.slot,
            record.energy.stars()
        );
        if record.photo.is_some() {
            println!("Photo added to the week {} gallery", session.week);
        }
    }
    Ok(())
}

fn cell_text(grid: &WeekGrid, day: usize, row: usize) -> String {
    grid.rows[row]
        .cells
        .get(day)
        .and_then(|c| c.activity.as_ref())
        .map(|a| truncate(&a.kind, CELL_WIDTH))
        .unwrap_or_default()
}

pub(crate) fn cmd_activity_grid(tracker: &Tracker, week: Week, json: bool) -> Result<()> {
    let grid = tracker.week_grid(week)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
        return Ok(());
    }

    let mut builder = Builder::default();
    let mut header = vec!["Time".to_string()];
    header.extend(grid.days.iter().map(|d| format!("{} {}", d.name, d.label)));
    builder.push_record(header);
    for (i, row) in grid.rows.iter().enumerate() {
        let mut record = vec![row.slot.to_string()];
        record.extend((0..grid.days.len()).map(|day| cell_text(&grid, day, i)));
        builder.push_record(record);
    }

    println!("{}", grid.label);
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    println!("{} activities this week", grid.activity_count());
    Ok(())
}

pub(crate) fn cmd_activity_list(tracker: &Tracker, week: Week, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct ActivityRow {
        #[tabled(rename = "Day")]
        day: String,
        #[tabled(rename = "Time")]
        slot: &'static str,
        #[tabled(rename = "Type")]
        kind: String,
        #[tabled(rename = "Details")]
        details: String,
        #[tabled(rename = "Energy")]
        energy: String,
        #[tabled(rename = "Photo")]
        photo: &'static str,
    }

    let activities = tracker.activities()?;
    let in_week: Vec<_> = activities_in_week(&activities, week).collect();

    if in_week.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No activities logged in {}", week.label());
        }
        process::exit(2);
    }

    if json {
        let items: Vec<_> = in_week
            .iter()
            .map(|(key, record)| serde_json::json!({ "key": key, "activity": record }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let rows: Vec<ActivityRow> = in_week
        .iter()
        .map(|(key, a)| ActivityRow {
            day: key.date.format("%a %b %-d").to_string(),
            slot: key.slot.label(),
            kind: truncate(&a.kind, 20),
            details: truncate(&a.details, 40),
            energy: a.energy.stars(),
            photo: if a.photo.is_some() { "yes" } else { "" },
        })
        .collect();
    println!("{}", week.label());
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_activity_show(
    tracker: &Tracker,
    week: Week,
    day: &str,
    slot: &str,
    json: bool,
) -> Result<()> {
    let day = parse_day(week, day)?;
    let key = CellKey::for_cell(week, day, parse_slot(slot)?.index())?;

    let Some(record) = tracker.activity(key)? else {
        if json {
            println!("{}", json_error(&format!("No activity at {key}")));
        } else {
            eprintln!("No activity logged at {key}");
        }
        process::exit(2);
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "key": key, "activity": record }))?
        );
    } else {
        println!("{} {}", key.date.format("%A %b %-d"), key.slot);
        println!("  Type:    {}", record.kind);
        if !record.details.is_empty() {
            println!("  Details: {}", record.details);
        }
        println!("  Energy:  {}", record.energy.stars());
        println!("  Logged:  {}", record.timestamp);
        if record.photo.is_some() {
            println!("  Photo attached");
        }
    }
    Ok(())
}
