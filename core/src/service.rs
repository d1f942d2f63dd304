use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{Duration, NaiveDate};

use crate::bmi::{self, BmiReport};
use crate::coach::{self, Exchange, Topic};
use crate::food::{self, DailyLog, NewFoodEntry};
use crate::gallery::{self, GalleryFilter};
use crate::goals::{self, GoalInput};
use crate::grid::{CellKey, Week, WeekGrid};
use crate::models::{
    ActivityMap, ActivityRecord, BmiRecord, EnergyLevel, ExportData, FoodEntry, FoodLog,
    GalleryItem, GalleryKind, GoalRecord, ImportSummary, Theme, timestamp,
};
use crate::photo::validate_data_url;
use crate::store::{Store, StoreKey};

/// UI state that handlers need: which week is on screen and the energy
/// level currently selected for new activities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    pub week: Week,
    pub energy: EnergyLevel,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityDraft {
    pub kind: String,
    pub details: String,
    pub photo: Option<String>,
}

pub struct Tracker {
    store: Store,
}

impl Tracker {
    pub fn open(path: &Path) -> Result<Self> {
        let store = Store::open(path)?;
        Ok(Self { store })
    }

    pub fn new_in_memory() -> Result<Self> {
        let store = Store::open_in_memory()?;
        Ok(Self { store })
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    // --- Theme ---

    pub fn theme(&self) -> Result<Theme> {
        self.store.get_or_default(StoreKey::Theme)
    }

    pub fn set_theme(&self, theme: Theme) -> Result<Theme> {
        self.store.set(StoreKey::Theme, &theme)?;
        Ok(theme)
    }

    pub fn toggle_theme(&self) -> Result<Theme> {
        let theme = self.theme()?.toggled();
        self.set_theme(theme)
    }

    // --- BMI ---

    /// Compute and store a new measurement, replacing the previous one.
    pub fn record_bmi(&self, height_cm: Option<f64>, weight_kg: Option<f64>) -> Result<BmiReport> {
        let value = bmi::calculate(height_cm, weight_kg)?;
        let record = BmiRecord {
            value,
            category: bmi::categorize(value),
            date: timestamp(),
            height: height_cm.unwrap_or_default(),
            weight: weight_kg.unwrap_or_default(),
            photo: None,
        };
        self.store.set(StoreKey::Bmi, &record)?;
        tracing::info!(bmi = %bmi::display_value(value), category = %record.category, "recorded BMI");
        Ok(BmiReport::from_record(record))
    }

    pub fn bmi(&self) -> Result<Option<BmiReport>> {
        Ok(self
            .store
            .get::<BmiRecord>(StoreKey::Bmi)?
            .map(BmiReport::from_record))
    }

    pub fn attach_bmi_photo(&self, session: &Session, photo: String) -> Result<BmiReport> {
        validate_data_url(&photo)?;
        let Some(mut record) = self.store.get::<BmiRecord>(StoreKey::Bmi)? else {
            bail!("No BMI measurement recorded yet. Record one before adding a photo");
        };
        record.photo = Some(photo.clone());
        self.store.set(StoreKey::Bmi, &record)?;
        self.add_to_gallery(
            session,
            GalleryKind::Bmi,
            photo,
            gallery::BMI_DESCRIPTION.to_string(),
        )?;
        Ok(BmiReport::from_record(record))
    }

    // --- Goals ---

    pub fn save_goals(&self, input: GoalInput) -> Result<GoalRecord> {
        let record = goals::build_record(input)?;
        self.replace_goals(&record)?;
        Ok(record)
    }

    /// Store an already-built goal record as the single saved goal.
    pub fn replace_goals(&self, record: &GoalRecord) -> Result<()> {
        self.store.set(StoreKey::Goals, record)?;
        tracing::info!(goal = %record.specific, "saved goals");
        Ok(())
    }

    pub fn goals(&self) -> Result<Option<GoalRecord>> {
        self.store.get(StoreKey::Goals)
    }

    // --- Activities ---

    /// Create or overwrite the activity in one grid cell.
    pub fn log_activity(
        &self,
        session: &Session,
        key: CellKey,
        draft: ActivityDraft,
    ) -> Result<ActivityRecord> {
        let kind = draft.kind.trim().to_string();
        if kind.is_empty() {
            bail!("Activity type must not be empty");
        }
        if let Some(photo) = &draft.photo {
            validate_data_url(photo)?;
        }

        let record = ActivityRecord {
            kind,
            details: draft.details.trim().to_string(),
            energy: session.energy,
            timestamp: timestamp(),
            photo: draft.photo,
        };

        let mut activities = self.activities()?;
        if activities.insert(key, record.clone()).is_some() {
            tracing::debug!(%key, "overwriting activity");
        }
        self.store.set(StoreKey::Activities, &activities)?;

        if let Some(photo) = &record.photo {
            self.add_to_gallery(
                session,
                GalleryKind::Workout,
                photo.clone(),
                gallery::workout_description(&record.kind),
            )?;
        }
        Ok(record)
    }

    pub fn activity(&self, key: CellKey) -> Result<Option<ActivityRecord>> {
        Ok(self.activities()?.remove(&key))
    }

    pub fn activities(&self) -> Result<ActivityMap> {
        self.store.get_or_default(StoreKey::Activities)
    }

    pub fn week_grid(&self, week: Week) -> Result<WeekGrid> {
        Ok(WeekGrid::build(week, &self.activities()?))
    }

    // --- Food ---

    pub fn add_food(
        &self,
        session: &Session,
        date: NaiveDate,
        meal: &str,
        entry: NewFoodEntry,
    ) -> Result<DailyLog> {
        if let Some(photo) = &entry.photo {
            validate_data_url(photo)?;
        }
        let entry = entry.into_entry()?;
        let photo = entry.photo.clone();
        let name = entry.name.clone();

        let mut log = self.food_log()?;
        food::add_entry(&mut log, date, meal, entry)?;
        self.store.set(StoreKey::FoodLog, &log)?;

        if let Some(photo) = photo {
            self.add_to_gallery(
                session,
                GalleryKind::Food,
                photo,
                gallery::food_description(&name),
            )?;
        }
        Ok(food::build_daily_log(&log, date))
    }

    pub fn remove_food(&self, date: NaiveDate, meal: &str, index: usize) -> Result<FoodEntry> {
        let mut log = self.food_log()?;
        let removed = food::remove_entry(&mut log, date, meal, index)?;
        self.store.set(StoreKey::FoodLog, &log)?;
        Ok(removed)
    }

    pub fn food_log(&self) -> Result<FoodLog> {
        self.store.get_or_default(StoreKey::FoodLog)
    }

    pub fn daily_log(&self, date: NaiveDate) -> Result<DailyLog> {
        Ok(food::build_daily_log(&self.food_log()?, date))
    }

    /// Daily logs for `today` and the `days - 1` days before it, newest first.
    /// Stops early at the first representable date.
    pub fn history(&self, today: NaiveDate, days: u32) -> Result<Vec<DailyLog>> {
        if days > food::MAX_HISTORY_DAYS {
            bail!(
                "History covers at most {} days (got {days})",
                food::MAX_HISTORY_DAYS
            );
        }
        let log = self.food_log()?;
        Ok((0..days)
            .map_while(|i| today.checked_sub_signed(Duration::days(i64::from(i))))
            .map(|date| food::build_daily_log(&log, date))
            .collect())
    }

    // --- Gallery ---

    pub fn add_to_gallery(
        &self,
        session: &Session,
        kind: GalleryKind,
        photo: String,
        description: String,
    ) -> Result<GalleryItem> {
        let mut items: Vec<GalleryItem> = self.store.get_or_default(StoreKey::Gallery)?;
        let item = gallery::new_item(kind, photo, description, session.week);
        items.push(item.clone());
        self.store.set(StoreKey::Gallery, &items)?;
        tracing::debug!(kind = %kind, week = %session.week, "added gallery item");
        Ok(item)
    }

    pub fn gallery(&self, filter: &GalleryFilter) -> Result<Vec<GalleryItem>> {
        let items: Vec<GalleryItem> = self.store.get_or_default(StoreKey::Gallery)?;
        Ok(items.into_iter().filter(|i| filter.matches(i)).collect())
    }

    // --- Coach ---

    pub fn suggest(&self, topic: Option<Topic>, today: NaiveDate) -> Result<Exchange> {
        let protein = food::daily_totals(&self.food_log()?, today).protein;
        let goal = match topic {
            Some(Topic::Workout) => self.goals()?.map(|g| g.specific),
            _ => None,
        };
        Ok(coach::respond(topic, protein, goal.as_deref()))
    }

    // --- Export / Import ---

    pub fn export_all(&self) -> Result<ExportData> {
        Ok(ExportData {
            theme: self.store.get(StoreKey::Theme)?,
            bmi: self.store.get(StoreKey::Bmi)?,
            goals: self.store.get(StoreKey::Goals)?,
            activities: self.store.get(StoreKey::Activities)?,
            food_log: self.store.get(StoreKey::FoodLog)?,
            gallery: self.store.get(StoreKey::Gallery)?,
            export_date: timestamp(),
        })
    }

    /// Delete every stored section.
    pub fn reset(&self) -> Result<()> {
        for key in StoreKey::ALL {
            self.store.remove(key)?;
        }
        tracing::info!("cleared all stored data");
        Ok(())
    }

    /// Write every section present in `data` back to the store, replacing
    /// what is there. Absent sections are left untouched.
    pub fn import_all(&self, data: &ExportData) -> Result<ImportSummary> {
        validate_export(data)?;
        let mut summary = ImportSummary::default();
        if let Some(theme) = &data.theme {
            self.store.set(StoreKey::Theme, theme)?;
            summary.theme = true;
        }
        if let Some(bmi) = &data.bmi {
            self.store.set(StoreKey::Bmi, bmi)?;
            summary.bmi = true;
        }
        if let Some(goals) = &data.goals {
            self.store.set(StoreKey::Goals, goals)?;
            summary.goals = true;
        }
        if let Some(activities) = &data.activities {
            self.store.set(StoreKey::Activities, activities)?;
            summary.activities = activities.len();
        }
        if let Some(log) = &data.food_log {
            self.store.set(StoreKey::FoodLog, log)?;
            summary.food_entries = log.values().flat_map(|d| d.values()).map(Vec::len).sum();
        }
        if let Some(items) = &data.gallery {
            self.store.set(StoreKey::Gallery, items)?;
            summary.gallery_items = items.len();
        }
        tracing::info!(?summary, "imported data");
        Ok(summary)
    }
}

/// Reject an export document whose photos are not image data URLs.
pub fn validate_export(data: &ExportData) -> Result<()> {
    let bmi_photo = data.bmi.iter().filter_map(|b| b.photo.as_deref());
    let activity_photos = data
        .activities
        .iter()
        .flat_map(|a| a.values())
        .filter_map(|a| a.photo.as_deref());
    let food_photos = data
        .food_log
        .iter()
        .flat_map(|log| log.values())
        .flat_map(|day| day.values())
        .flatten()
        .filter_map(|e| e.photo.as_deref());
    let gallery_photos = data.gallery.iter().flatten().map(|g| g.photo.as_str());

    for photo in bmi_photo
        .chain(activity_photos)
        .chain(food_photos)
        .chain(gallery_photos)
    {
        validate_data_url(photo).context("Import contains an invalid photo")?;
    }
    Ok(())
}

/// Download name for an export made on `date`.
#[must_use]
pub fn export_file_name(date: NaiveDate) -> String {
    format!("28fit-data-{}.json", date.format("%Y-%m-%d"))
}
