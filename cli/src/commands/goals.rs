use std::process;

use anyhow::Result;
use tabled::{Table, Tabled, settings::Style};

use fit28_core::goals::{GoalInput, GoalPreset};
use fit28_core::models::GoalRecord;
use fit28_core::service::Tracker;

use super::helpers::json_error;

fn print_goal(goal: &GoalRecord) {
    #[derive(Tabled)]
    struct GoalRow {
        #[tabled(rename = "Field")]
        field: &'static str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let row = |field, value: &str| GoalRow {
        field,
        value: value.to_string(),
    };
    let fitt = &goal.fitt;
    let rows = vec![
        row("Specific", &goal.specific),
        row("Measurable", &goal.measurable),
        row("Achievable", &goal.achievable),
        row("Relevant", &goal.relevant),
        row("Frequency", &fitt.frequency),
        row("Intensity", &fitt.intensity),
        row("Time", &fitt.time),
        row("Type", &fitt.exercise_types.join(", ")),
    ];
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn cmd_goals_set(tracker: &Tracker, input: GoalInput, json: bool) -> Result<()> {
    let requested = input.exercise_types.len();
    let goal = tracker.save_goals(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&goal)?);
        return Ok(());
    }
    let kept = goal.fitt.exercise_types.len();
    if kept < requested {
        eprintln!(
            "Note: kept {kept} of {requested} exercise types; the rest are not offered for '{}'",
            goal.specific
        );
    }
    println!("Goals saved");
    print_goal(&goal);
    Ok(())
}

pub(crate) fn cmd_goals_show(tracker: &Tracker, json: bool) -> Result<()> {
    let Some(goal) = tracker.goals()? else {
        if json {
            println!("{}", json_error("No goals saved"));
        } else {
            eprintln!("No goals saved. Use `fit28 goals set` to create them.");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&goal)?);
    } else {
        print_goal(&goal);
    }
    Ok(())
}

/// Exercise types offered for a goal (all of them when no goal is given).
pub(crate) fn cmd_goals_types(goal: Option<&str>, json: bool) -> Result<()> {
    let types = GoalPreset::from_specific(goal.unwrap_or_default()).exercise_types();
    if json {
        println!("{}", serde_json::to_string_pretty(&types)?);
    } else {
        for t in types {
            println!("{t}");
        }
    }
    Ok(())
}
