use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{FoodEntry, FoodLog, MEAL_TYPES, timestamp, validate_meal_type};

pub const PROTEIN_TARGET_G: f64 = 140.0;
pub const CALORIE_TARGET_KCAL: f64 = 2000.0;
/// Longest span a history query may cover.
pub const MAX_HISTORY_DAYS: u32 = 366;

#[derive(Debug, Clone, Default)]
pub struct NewFoodEntry {
    pub name: String,
    pub quantity: String,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: f64,
    pub photo: Option<String>,
}

impl NewFoodEntry {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("Food name must not be empty");
        }
        for (field, value) in [
            ("protein", self.protein),
            ("carbs", self.carbs),
            ("fat", self.fat),
            ("calories", self.calories),
        ] {
            if !value.is_finite() {
                bail!("{field} must be a number");
            }
            if value < 0.0 {
                bail!("{field} must not be negative");
            }
        }
        Ok(())
    }

    pub fn into_entry(self) -> Result<FoodEntry> {
        self.validate()?;
        Ok(FoodEntry {
            name: self.name.trim().to_string(),
            quantity: self.quantity.trim().to_string(),
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            calories: self.calories,
            timestamp: timestamp(),
            photo: self.photo,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroTotals {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub calories: f64,
}

impl MacroTotals {
    fn add(&mut self, entry: &FoodEntry) {
        self.protein += entry.protein;
        self.carbs += entry.carbs;
        self.fat += entry.fat;
        self.calories += entry.calories;
    }

    fn of<'a>(entries: impl IntoIterator<Item = &'a FoodEntry>) -> Self {
        let mut totals = Self::default();
        for e in entries {
            totals.add(e);
        }
        totals
    }
}

/// Share of `target` reached, as a percentage capped at 100.
#[must_use]
pub fn progress_pct(current: f64, target: f64) -> f64 {
    (current / target * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroProgress {
    pub protein_g: f64,
    pub protein_target_g: f64,
    pub protein_pct: f64,
    pub calories: f64,
    pub calories_target: f64,
    pub calories_pct: f64,
}

impl MacroProgress {
    #[must_use]
    pub fn from_totals(totals: &MacroTotals) -> Self {
        Self {
            protein_g: totals.protein,
            protein_target_g: PROTEIN_TARGET_G,
            protein_pct: progress_pct(totals.protein, PROTEIN_TARGET_G),
            calories: totals.calories,
            calories_target: CALORIE_TARGET_KCAL,
            calories_pct: progress_pct(totals.calories, CALORIE_TARGET_KCAL),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MealGroup {
    pub meal_type: String,
    pub entries: Vec<FoodEntry>,
    pub subtotal: MacroTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailyLog {
    pub date: String,
    pub meals: Vec<MealGroup>,
    pub totals: MacroTotals,
    pub progress: MacroProgress,
}

impl DailyLog {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }
}

/// Append `entry` under `log[date][meal]`, keeping insertion order.
pub fn add_entry(log: &mut FoodLog, date: NaiveDate, meal: &str, entry: FoodEntry) -> Result<()> {
    let meal = validate_meal_type(meal)?;
    log.entry(date).or_default().entry(meal).or_default().push(entry);
    Ok(())
}

/// Remove the `index`-th entry of a meal, pruning emptied meals and days.
pub fn remove_entry(
    log: &mut FoodLog,
    date: NaiveDate,
    meal: &str,
    index: usize,
) -> Result<FoodEntry> {
    let meal = validate_meal_type(meal)?;
    let day = log
        .get_mut(&date)
        .with_context(|| format!("No food logged for {date}"))?;
    let entries = day
        .get_mut(&meal)
        .with_context(|| format!("No {meal} entries for {date}"))?;
    if index >= entries.len() {
        bail!(
            "Entry {index} not found in {meal} for {date} ({} entries)",
            entries.len()
        );
    }
    let removed = entries.remove(index);
    if entries.is_empty() {
        day.remove(&meal);
    }
    if day.is_empty() {
        log.remove(&date);
    }
    Ok(removed)
}

/// Sum of every entry across every meal on `date`.
#[must_use]
pub fn daily_totals(log: &FoodLog, date: NaiveDate) -> MacroTotals {
    log.get(&date)
        .map(|day| MacroTotals::of(day.values().flatten()))
        .unwrap_or_default()
}

/// Meals for `date` in breakfast/lunch/dinner/snack order, then any other
/// meal names alphabetically.
#[must_use]
pub fn build_daily_log(log: &FoodLog, date: NaiveDate) -> DailyLog {
    let empty = BTreeMap::new();
    let day = log.get(&date).unwrap_or(&empty);

    let known = MEAL_TYPES
        .iter()
        .filter_map(|m| day.get_key_value(*m));
    let others = day
        .iter()
        .filter(|(name, _)| !MEAL_TYPES.contains(&name.as_str()));

    let meals: Vec<MealGroup> = known
        .chain(others)
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(name, entries)| MealGroup {
            meal_type: name.clone(),
            entries: entries.clone(),
            subtotal: MacroTotals::of(entries),
        })
        .collect();

    let totals = daily_totals(log, date);
    DailyLog {
        date: date.format("%Y-%m-%d").to_string(),
        meals,
        totals,
        progress: MacroProgress::from_totals(&totals),
    }
}
