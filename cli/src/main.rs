mod commands;
mod config;
mod photo;
mod server;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_activity_grid, cmd_activity_list, cmd_activity_log, cmd_activity_show, cmd_bmi_calc,
    cmd_bmi_photo, cmd_bmi_show, cmd_coach, cmd_export, cmd_food_add, cmd_food_history,
    cmd_food_remove, cmd_food_show, cmd_gallery, cmd_goals_set, cmd_goals_show, cmd_goals_types,
    cmd_import, cmd_theme_set, cmd_theme_show, cmd_theme_toggle, parse_date,
};
use crate::config::Config;
use fit28_core::food::{MAX_HISTORY_DAYS, NewFoodEntry};
use fit28_core::goals::GoalInput;
use fit28_core::grid::Week;
use fit28_core::models::EnergyLevel;
use fit28_core::service::{Session, Tracker};

#[derive(Parser)]
#[command(
    name = "fit28",
    version,
    about = "A 28-day fitness tracker: BMI, SMART goals, weekly activity grid, food log",
    long_about = "\n\n  ███████╗██╗████████╗ ██████╗  █████╗
  ██╔════╝██║╚══██╔══╝ ╚════██╗██╔══██╗
  █████╗  ██║   ██║     █████╔╝╚█████╔╝
  ██╔══╝  ██║   ██║    ██╔═══╝ ██╔══██╗
  ██║     ██║   ██║    ███████╗╚█████╔╝
  ╚═╝     ╚═╝   ╚═╝    ╚══════╝ ╚════╝
        four weeks, one grid.
"
)]
struct Cli {
    /// Active week (1-4) for the grid and for new gallery photos
    #[arg(short, long, global = true, default_value = "1")]
    week: Week,
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the color theme
    Theme {
        #[command(subcommand)]
        command: ThemeCommands,
    },
    /// Calculate and show body-mass index
    Bmi {
        #[command(subcommand)]
        command: BmiCommands,
    },
    /// Manage SMART goals and the FITT plan
    Goals {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Log and view activities on the weekly grid
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Log and view food intake
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// List progress photos
    Gallery {
        /// Photo type: all, bmi, workout, food
        #[arg(long = "type", default_value = "all")]
        kind: String,
        /// Only photos stamped with this week (1-4), or "all"
        #[arg(long = "of-week", default_value = "all")]
        of_week: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Ask the coach about food, workout, or protein
    Coach {
        /// Topic: food, workout, protein (omit for a greeting)
        topic: Option<String>,
        /// Day whose food log is used (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export all data to a JSON file
    Export {
        /// Output file (default: 28fit-data-YYYY-MM-DD.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the export to stdout instead of writing a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import data from an export file
    Import {
        /// Path to the export file
        file: PathBuf,
        /// Clear all data before importing
        #[arg(long)]
        replace: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
        /// Disable API key authentication (for development/testing)
        #[arg(long)]
        no_auth: bool,
    },
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Show the current theme
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the theme
    Set {
        /// light or dark
        theme: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Switch between light and dark
    Toggle {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum BmiCommands {
    /// Calculate BMI and save it as the current measurement
    Calc {
        /// Height in centimeters
        #[arg(long)]
        height: Option<f64>,
        /// Weight in kilograms
        #[arg(long)]
        weight: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the current measurement
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Attach a photo to the current measurement
    Photo {
        /// Image file
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Save goals, replacing any previous ones
    Set {
        /// Specific goal, e.g. "build muscle", "lose fat", "improve endurance"
        specific: String,
        /// How progress is measured
        #[arg(long, default_value = "")]
        measurable: String,
        /// Training days per week (1-7)
        #[arg(long, default_value = "")]
        achievable: String,
        /// Why the goal matters
        #[arg(long, default_value = "")]
        relevant: String,
        /// FITT frequency (default: derived from --achievable)
        #[arg(long)]
        frequency: Option<String>,
        /// FITT intensity
        #[arg(long, default_value = "")]
        intensity: String,
        /// FITT time per session
        #[arg(long, default_value = "")]
        time: String,
        /// FITT exercise type (repeatable)
        #[arg(long = "type", value_name = "TYPE")]
        exercise_types: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show saved goals
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List exercise types offered for a goal
    Types {
        /// Goal to filter by (default: all types)
        goal: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ActivityCommands {
    /// Log an activity in one grid cell (overwrites the cell)
    Log {
        /// Day: 1-7, a weekday like "Tue", or a date in the active week
        day: String,
        /// Time slot: 1-17 or a label like "7AM-8AM"
        slot: String,
        /// Activity type, e.g. "cardio"
        #[arg(short = 't', long = "type")]
        kind: String,
        /// Free-form details
        #[arg(short, long)]
        details: Option<String>,
        /// Energy level 1-5
        #[arg(short, long, default_value = "3")]
        energy: u8,
        /// Photo to attach (also added to the gallery)
        #[arg(long)]
        photo: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the active week's grid
    Grid {
        /// Show the week before the active one (stays on week 1)
        #[arg(long, conflicts_with = "next")]
        prev: bool,
        /// Show the week after the active one (stays on week 4)
        #[arg(long)]
        next: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the active week's activities
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one cell of the active week
    Show {
        /// Day: 1-7, a weekday like "Tue", or a date in the active week
        day: String,
        /// Time slot: 1-17 or a label like "7AM-8AM"
        slot: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Log a food entry
    Add {
        /// Food name
        name: String,
        /// Meal type: breakfast, lunch, dinner, snack
        #[arg(short, long, default_value = "snack")]
        meal: String,
        /// Quantity as written, e.g. "150g" or "1 cup"
        #[arg(short, long, default_value = "")]
        quantity: String,
        /// Protein in grams
        #[arg(long, default_value = "0")]
        protein: f64,
        /// Carbs in grams
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fat in grams
        #[arg(long, default_value = "0")]
        fat: f64,
        /// Calories (kcal)
        #[arg(long, default_value = "0")]
        calories: f64,
        /// Photo to attach (also added to the gallery)
        #[arg(long)]
        photo: Option<PathBuf>,
        /// Date to log for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one day's log with totals and progress
    Show {
        /// Date to show (YYYY-MM-DD, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an entry by its position within a meal
    Remove {
        /// Meal type: breakfast, lunch, dinner, snack
        meal: String,
        /// Entry position as listed by `food show` (starting at 0)
        index: usize,
        /// Date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show totals for the last N days
    History {
        /// Number of days to show (1-366)
        #[arg(
            short,
            long,
            default_value = "7",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_HISTORY_DAYS))
        )]
        days: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool, serving: bool) {
    let default = match (verbose, serving) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, matches!(cli.command, Commands::Serve { .. }));

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let tracker = Tracker::open(&config.db_path)?;
    let mut session = Session {
        week: cli.week,
        energy: EnergyLevel::default(),
    };

    match cli.command {
        Commands::Theme { command } => match command {
            ThemeCommands::Show { json } => cmd_theme_show(&tracker, json),
            ThemeCommands::Set { theme, json } => cmd_theme_set(&tracker, &theme, json),
            ThemeCommands::Toggle { json } => cmd_theme_toggle(&tracker, json),
        },
        Commands::Bmi { command } => match command {
            BmiCommands::Calc {
                height,
                weight,
                json,
            } => cmd_bmi_calc(&tracker, height, weight, json),
            BmiCommands::Show { json } => cmd_bmi_show(&tracker, json),
            BmiCommands::Photo { path, json } => {
                cmd_bmi_photo(&tracker, &session, &path, json).await
            }
        },
        Commands::Goals { command } => match command {
            GoalCommands::Set {
                specific,
                measurable,
                achievable,
                relevant,
                frequency,
                intensity,
                time,
                exercise_types,
                json,
            } => cmd_goals_set(
                &tracker,
                GoalInput {
                    specific,
                    measurable,
                    achievable,
                    relevant,
                    frequency,
                    intensity,
                    time,
                    exercise_types,
                },
                json,
            ),
            GoalCommands::Show { json } => cmd_goals_show(&tracker, json),
            GoalCommands::Types { goal, json } => cmd_goals_types(goal.as_deref(), json),
        },
        Commands::Activity { command } => match command {
            ActivityCommands::Log {
                day,
                slot,
                kind,
                details,
                energy,
                photo,
                json,
            } => {
                session.energy = EnergyLevel::new(energy)?;
                cmd_activity_log(
                    &tracker,
                    &session,
                    &day,
                    &slot,
                    &kind,
                    details,
                    photo.as_deref(),
                    json,
                )
                .await
            }
            ActivityCommands::Grid { prev, next, json } => cmd_activity_grid(
                &tracker,
                session.week.shift(grid_step(prev, next)),
                json,
            ),
            ActivityCommands::List { json } => cmd_activity_list(&tracker, session.week, json),
            ActivityCommands::Show { day, slot, json } => {
                cmd_activity_show(&tracker, session.week, &day, &slot, json)
            }
        },
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                meal,
                quantity,
                protein,
                carbs,
                fat,
                calories,
                photo,
                date,
                json,
            } => {
                let date = parse_date(date)?;
                let entry = NewFoodEntry {
                    name,
                    quantity,
                    protein,
                    carbs,
                    fat,
                    calories,
                    photo: None,
                };
                cmd_food_add(
                    &tracker,
                    &session,
                    date,
                    &meal,
                    entry,
                    photo.as_deref(),
                    json,
                )
                .await
            }
            FoodCommands::Show { date, json } => cmd_food_show(&tracker, parse_date(date)?, json),
            FoodCommands::Remove {
                meal,
                index,
                date,
                json,
            } => cmd_food_remove(&tracker, parse_date(date)?, &meal, index, json),
            FoodCommands::History { days, json } => cmd_food_history(&tracker, days, json),
        },
        Commands::Gallery {
            kind,
            of_week,
            json,
        } => cmd_gallery(&tracker, &kind, &of_week, json),
        Commands::Coach { topic, date, json } => {
            cmd_coach(&tracker, topic.as_deref(), parse_date(date)?, json)
        }
        Commands::Export {
            output,
            stdout,
            json,
        } => cmd_export(&tracker, output, stdout, json).await,
        Commands::Import {
            file,
            replace,
            json,
        } => cmd_import(&tracker, &file, replace, json).await,
        Commands::Serve {
            port,
            bind,
            no_auth,
        } => {
            let api_key = if no_auth {
                None
            } else {
                let (key, _) = config.load_or_create_api_key()?;
                Some(key)
            };
            server::start_server(tracker, port, &bind, api_key).await
        }
    }
}

fn grid_step(prev: bool, next: bool) -> i64 {
    i64::from(next) - i64::from(prev)
}
