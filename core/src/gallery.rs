use anyhow::Result;

use crate::grid::Week;
use crate::models::{GalleryItem, GalleryKind, timestamp};

/// Kind and week constraints; `None` matches anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GalleryFilter {
    pub kind: Option<GalleryKind>,
    pub week: Option<Week>,
}

impl GalleryFilter {
    /// Parse the filter form values, where `"all"` (or empty) is a wildcard.
    pub fn parse(kind: &str, week: &str) -> Result<Self> {
        let kind = match kind.trim() {
            "" | "all" => None,
            k => Some(k.parse()?),
        };
        let week = match week.trim() {
            "" | "all" => None,
            w => Some(w.parse()?),
        };
        Ok(Self { kind, week })
    }

    #[must_use]
    pub fn matches(&self, item: &GalleryItem) -> bool {
        self.kind.is_none_or(|k| k == item.kind) && self.week.is_none_or(|w| w == item.week)
    }

    pub fn apply<'a>(&self, items: &'a [GalleryItem]) -> Vec<&'a GalleryItem> {
        items.iter().filter(|i| self.matches(i)).collect()
    }
}

#[must_use]
pub fn new_item(kind: GalleryKind, photo: String, description: String, week: Week) -> GalleryItem {
    GalleryItem {
        kind,
        photo,
        description,
        date: timestamp(),
        week,
    }
}

pub const BMI_DESCRIPTION: &str = "BMI Measurement";

#[must_use]
pub fn workout_description(activity_type: &str) -> String {
    format!("Workout: {activity_type}")
}

#[must_use]
pub fn food_description(name: &str) -> String {
    format!("Food: {name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: GalleryKind, week: u8) -> GalleryItem {
        new_item(
            kind,
            "data:image/png;base64,AAAA".to_string(),
            format!("{kind} in week {week}"),
            Week::new(week).unwrap(),
        )
    }

    fn sample() -> Vec<GalleryItem> {
        vec![
            item(GalleryKind::Food, 1),
            item(GalleryKind::Food, 2),
            item(GalleryKind::Workout, 2),
            item(GalleryKind::Bmi, 3),
            item(GalleryKind::Food, 2),
        ]
    }

    #[test]
    fn test_filter_kind_and_week() {
        let items = sample();
        let filter = GalleryFilter::parse("food", "2").unwrap();
        let hits = filter.apply(&items);
        assert_eq!(hits.len(), 2);
        assert!(
            hits.iter()
                .all(|i| i.kind == GalleryKind::Food && i.week.index() == 2)
        );
    }

    #[test]
    fn test_filter_wildcards() {
        let items = sample();
        assert_eq!(GalleryFilter::parse("all", "all").unwrap().apply(&items).len(), 5);
        assert_eq!(GalleryFilter::parse("food", "all").unwrap().apply(&items).len(), 3);
        assert_eq!(GalleryFilter::parse("", "2").unwrap().apply(&items).len(), 3);
        assert_eq!(GalleryFilter::default().apply(&items).len(), 5);
    }

    #[test]
    fn test_filter_preserves_order() {
        let items = sample();
        let hits = GalleryFilter::parse("all", "2").unwrap().apply(&items);
        let kinds: Vec<GalleryKind> = hits.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![GalleryKind::Food, GalleryKind::Workout, GalleryKind::Food]
        );
    }

    #[test]
    fn test_filter_parse_rejects_bad_values() {
        assert!(GalleryFilter::parse("selfie", "all").is_err());
        assert!(GalleryFilter::parse("all", "9").is_err());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(workout_description("cardio"), "Workout: cardio");
        assert_eq!(food_description("Oats"), "Food: Oats");
    }
}
