//! Weekly activity grid: 7 days by 17 one-hour slots, for four weeks counted
//! from a fixed epoch date.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{ActivityMap, ActivityRecord};

pub const WEEK_COUNT: u8 = 4;
pub const DAYS_PER_WEEK: usize = 7;

pub const TIME_SLOT_LABELS: [&str; 17] = [
    "5AM-6AM", "6AM-7AM", "7AM-8AM", "8AM-9AM", "9AM-10AM", "10AM-11AM", "11AM-12PM", "12PM-1PM",
    "1PM-2PM", "2PM-3PM", "3PM-4PM", "4PM-5PM", "5PM-6PM", "6PM-7PM", "7PM-8PM", "8PM-9PM",
    "9PM-10PM",
];

/// First day of week 1.
#[must_use]
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 10, 20).expect("valid epoch date")
}

/// Short "Oct 20" style label.
#[must_use]
pub fn short_label(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

// --- Week ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Week(u8);

impl Week {
    pub fn new(index: u8) -> Result<Self> {
        if !(1..=WEEK_COUNT).contains(&index) {
            bail!("Week must be between 1 and {WEEK_COUNT} (got {index})");
        }
        Ok(Self(index))
    }

    /// Nearest valid week for any index.
    #[must_use]
    pub fn clamped(index: i64) -> Self {
        Self(index.clamp(1, i64::from(WEEK_COUNT)) as u8)
    }

    #[must_use]
    pub fn shift(self, direction: i64) -> Self {
        Self::clamped(i64::from(self.0) + direction)
    }

    /// Step for [`Week::shift`]: "prev", "next", or a signed count.
    pub fn parse_step(s: &str) -> Result<i64> {
        match s.trim().to_lowercase().as_str() {
            "prev" | "previous" => Ok(-1),
            "next" => Ok(1),
            other => other
                .parse()
                .with_context(|| format!("Invalid week step '{s}'. Use prev, next, or a number")),
        }
    }

    #[must_use]
    pub fn index(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn start(self) -> NaiveDate {
        epoch() + Duration::days(i64::from(self.0 - 1) * 7)
    }

    /// Last day of the week, inclusive.
    #[must_use]
    pub fn end(self) -> NaiveDate {
        self.start() + Duration::days(6)
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.start() <= date && date <= self.end()
    }

    /// The week a date falls in, if it is inside the four tracked weeks.
    #[must_use]
    pub fn containing(date: NaiveDate) -> Option<Self> {
        (1..=WEEK_COUNT).map(Self).find(|w| w.contains(date))
    }

    #[must_use]
    pub fn days(self) -> [NaiveDate; DAYS_PER_WEEK] {
        let start = self.start();
        std::array::from_fn(|d| start + Duration::days(d as i64))
    }

    #[must_use]
    pub fn label(self) -> String {
        format!(
            "Week {}: {} - {}",
            self.0,
            short_label(self.start()),
            short_label(self.end())
        )
    }
}

impl Default for Week {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Week> for u8 {
    fn from(week: Week) -> Self {
        week.0
    }
}

impl TryFrom<u8> for Week {
    type Error = anyhow::Error;

    fn try_from(index: u8) -> Result<Self> {
        Self::new(index)
    }
}

impl FromStr for Week {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let index: u8 = s
            .trim()
            .parse()
            .with_context(|| format!("Invalid week '{s}'. Use 1-{WEEK_COUNT}"))?;
        Self::new(index)
    }
}

/// Calendar date of column `day` (0 = first day) in `week`.
#[must_use]
pub fn day_date(day: usize, week: Week) -> NaiveDate {
    week.start() + Duration::days(day as i64)
}

// --- Time slots ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(u8);

impl TimeSlot {
    pub const COUNT: usize = TIME_SLOT_LABELS.len();

    pub fn from_index(index: usize) -> Result<Self> {
        if index >= Self::COUNT {
            bail!("Time slot index {index} out of range (0-{})", Self::COUNT - 1);
        }
        Ok(Self(index as u8))
    }

    /// Case-insensitive lookup of a label like "7AM-8AM".
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        TIME_SLOT_LABELS
            .iter()
            .position(|l| l.eq_ignore_ascii_case(wanted))
            .map(|i| Self(i as u8))
    }

    pub fn all() -> impl Iterator<Item = TimeSlot> {
        (0..Self::COUNT).map(|i| Self(i as u8))
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        TIME_SLOT_LABELS[self.index()]
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).with_context(|| {
            format!(
                "Unknown time slot '{s}'. Use one of: {}",
                TIME_SLOT_LABELS.join(", ")
            )
        })
    }
}

// --- Cell keys ---

/// Address of one grid cell: a calendar date and a time slot.
///
/// Stored as `"<YYYY-MM-DD>-<slot label>"`, e.g. `"2024-10-21-7AM-8AM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellKey {
    pub date: NaiveDate,
    pub slot: TimeSlot,
}

impl CellKey {
    #[must_use]
    pub fn new(date: NaiveDate, slot: TimeSlot) -> Self {
        Self { date, slot }
    }

    pub fn for_cell(week: Week, day: usize, slot: usize) -> Result<Self> {
        if day >= DAYS_PER_WEEK {
            bail!("Day index {day} out of range (0-{})", DAYS_PER_WEEK - 1);
        }
        Ok(Self::new(day_date(day, week), TimeSlot::from_index(slot)?))
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.date.format("%Y-%m-%d"), self.slot.label())
    }
}

impl CellKey {
    /// Older keys carry only a "Mon D" label, e.g. `"Oct 21-7AM-8AM"`.
    /// The year is taken from the epoch.
    fn parse_short_form(s: &str) -> Option<Self> {
        let (day_label, slot_label) = s.split_once('-')?;
        let date = NaiveDate::parse_from_str(
            &format!("{} {}", day_label.trim(), epoch().year()),
            "%b %d %Y",
        )
        .ok()?;
        Some(Self::new(date, TimeSlot::from_label(slot_label)?))
    }
}

impl FromStr for CellKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let iso = s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
        let Some(date) = iso else {
            return Self::parse_short_form(s).with_context(|| {
                format!("Invalid cell key '{s}'. Expected '<YYYY-MM-DD>-<slot>'")
            });
        };
        let slot_label = s[10..]
            .strip_prefix('-')
            .with_context(|| format!("Invalid cell key '{s}'. Expected '<YYYY-MM-DD>-<slot>'"))?;
        let slot = slot_label.parse()?;
        Ok(Self { date, slot })
    }
}

impl From<CellKey> for String {
    fn from(key: CellKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for CellKey {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

// --- Grid view ---

#[derive(Debug, Clone, Serialize)]
pub struct DayHeader {
    pub name: String,
    pub date: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridCell {
    pub key: CellKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<ActivityRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GridRow {
    pub slot: &'static str,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekGrid {
    pub week: Week,
    pub label: String,
    pub days: Vec<DayHeader>,
    pub rows: Vec<GridRow>,
}

impl WeekGrid {
    /// Lay out `week` and overlay the activities whose dates fall inside it.
    #[must_use]
    pub fn build(week: Week, activities: &ActivityMap) -> Self {
        let dates = week.days();
        let days = dates
            .iter()
            .map(|&date| DayHeader {
                name: date.format("%a").to_string(),
                date,
                label: short_label(date),
            })
            .collect();

        let rows = TimeSlot::all()
            .map(|slot| GridRow {
                slot: slot.label(),
                cells: dates
                    .iter()
                    .map(|&date| {
                        let key = CellKey::new(date, slot);
                        GridCell {
                            key,
                            activity: activities.get(&key).cloned(),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            week,
            label: week.label(),
            days,
            rows,
        }
    }

    #[must_use]
    pub fn cell(&self, day: usize, slot: TimeSlot) -> Option<&GridCell> {
        self.rows.get(slot.index())?.cells.get(day)
    }

    #[must_use]
    pub fn activity_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .filter(|c| c.activity.is_some())
            .count()
    }
}

/// Stored activities that belong to `week`, in key order.
pub fn activities_in_week(
    activities: &ActivityMap,
    week: Week,
) -> impl Iterator<Item = (&CellKey, &ActivityRecord)> {
    activities.iter().filter(move |(k, _)| week.contains(k.date))
}
