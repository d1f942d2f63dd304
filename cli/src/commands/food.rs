use std::path::Path;
use std::process;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fit28_core::food::{DailyLog, NewFoodEntry};
use fit28_core::models::validate_meal_type;
use fit28_core::service::{Session, Tracker};

use super::helpers::{grams, json_error, no_neg_zero, truncate};
use crate::photo::load_optional;

const BAR_WIDTH: usize = 20;

#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
fn progress_bar(pct: f64) -> String {
    let filled = ((pct / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn print_daily_log(daily: &DailyLog) {
    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Food")]
        name: String,
        #[tabled(rename = "Qty")]
        quantity: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
        #[tabled(rename = "Calories")]
        calories: String,
    }

    println!("=== {} ===\n", daily.date);
    for meal in &daily.meals {
        let sub_cal = no_neg_zero(meal.subtotal.calories);
        println!("  {} ({sub_cal:.0} kcal)", meal.meal_type.to_uppercase());
        let rows: Vec<EntryRow> = meal
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| EntryRow {
                idx: i,
                name: truncate(&e.name, 30),
                quantity: truncate(&e.quantity, 15),
                protein: grams(e.protein),
                carbs: grams(e.carbs),
                fat: grams(e.fat),
                calories: format!("{:.0}", no_neg_zero(e.calories)),
            })
            .collect();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
            .to_string();
        println!("{table}\n");
    }

    let t = &daily.totals;
    let p = &daily.progress;
    println!(
        "  TOTAL: {:.0} kcal | P:{} C:{} F:{}",
        no_neg_zero(t.calories),
        grams(t.protein),
        grams(t.carbs),
        grams(t.fat)
    );
    println!(
        "  Protein  {} {:.0}/{:.0}g ({:.0}%)",
        progress_bar(p.protein_pct),
        no_neg_zero(p.protein_g),
        p.protein_target_g,
        p.protein_pct
    );
    println!(
        "  Calories {} {:.0}/{:.0} ({:.0}%)",
        progress_bar(p.calories_pct),
        no_neg_zero(p.calories),
        p.calories_target,
        p.calories_pct
    );
}

pub(crate) async fn cmd_food_add(
    tracker: &Tracker,
    session: &Session,
    date: NaiveDate,
    meal: &str,
    entry: NewFoodEntry,
    photo: Option<&Path>,
    json: bool,
) -> Result<()> {
    entry.validate()?;
    let photo = load_optional(photo).await?;
    let name = entry.name.clone();
    let daily = tracker.add_food(session, date, meal, NewFoodEntry { photo, ..entry })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&daily)?);
    } else {
        println!("Added {name} to {meal} on {}\n", daily.date);
        print_daily_log(&daily);
    }
    Ok(())
}

pub(crate) fn cmd_food_show(tracker: &Tracker, date: NaiveDate, json: bool) -> Result<()> {
    let daily = tracker.daily_log(date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&daily)?);
        return Ok(());
    }
    if daily.is_empty() {
        eprintln!("No food logged for {}", daily.date);
        process::exit(2);
    }
    print_daily_log(&daily);
    Ok(())
}

pub(crate) fn cmd_food_remove(
    tracker: &Tracker,
    date: NaiveDate,
    meal: &str,
    index: usize,
    json: bool,
) -> Result<()> {
    let meal = validate_meal_type(meal)?;
    let count = tracker
        .food_log()?
        .get(&date)
        .and_then(|day| day.get(&meal))
        .map_or(0, Vec::len);
    if index >= count {
        let message = format!("No {meal} entry #{index} on {date} ({count} entries)");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    }
    let removed = tracker.remove_food(date, &meal, index)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&removed)?);
    } else {
        println!("Removed {} from {meal} on {date}", removed.name);
    }
    Ok(())
}

pub(crate) fn cmd_food_history(tracker: &Tracker, days: u32, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
    }

    let logs = tracker.history(Local::now().date_naive(), days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&logs)?);
        return Ok(());
    }
    if logs.iter().all(DailyLog::is_empty) {
        eprintln!("No food logged in the last {days} days");
        process::exit(2);
    }

    let rows: Vec<HistoryRow> = logs
        .iter()
        .map(|d| HistoryRow {
            date: d.date.clone(),
            calories: format!("{:.0}", no_neg_zero(d.totals.calories)),
            protein: grams(d.totals.protein),
            carbs: grams(d.totals.carbs),
            fat: grams(d.totals.fat),
        })
        .collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0), "░".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(100.0), "█".repeat(BAR_WIDTH));
        assert_eq!(progress_bar(50.0).matches('█').count(), BAR_WIDTH / 2);
    }
}
