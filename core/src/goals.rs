use anyhow::{Result, bail};

use crate::models::{Fitt, GoalRecord, timestamp};

pub const EXERCISE_TYPES: &[&str] = &[
    "Strength Training",
    "Cardio",
    "Bodyweight Exercises",
    "Yoga",
    "Running",
    "Cycling",
    "Swimming",
    "Sports",
    "HIIT",
];

pub const DEFAULT_GOAL: &str = "general fitness";

/// Goal presets that narrow the exercise types on offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalPreset {
    BuildMuscle,
    LoseFat,
    ImproveEndurance,
    General,
}

impl GoalPreset {
    #[must_use]
    pub fn from_specific(specific: &str) -> Self {
        match specific.trim().to_lowercase().as_str() {
            "build muscle" => Self::BuildMuscle,
            "lose fat" => Self::LoseFat,
            "improve endurance" => Self::ImproveEndurance,
            _ => Self::General,
        }
    }

    #[must_use]
    pub fn allows(self, exercise_type: &str) -> bool {
        let lower = exercise_type.to_lowercase();
        let allowed: &[&str] = match self {
            Self::BuildMuscle => &["strength training", "bodyweight exercises", "hiit"],
            Self::LoseFat => &["cardio", "hiit", "running", "cycling", "swimming"],
            Self::ImproveEndurance => &["cardio", "running", "cycling", "swimming", "sports"],
            Self::General => return true,
        };
        allowed.contains(&lower.as_str())
    }

    #[must_use]
    pub fn exercise_types(self) -> Vec<&'static str> {
        EXERCISE_TYPES
            .iter()
            .copied()
            .filter(|t| self.allows(t))
            .collect()
    }
}

/// Canonical spelling of a known exercise type, matched case-insensitively.
pub fn canonical_exercise_type(name: &str) -> Result<&'static str> {
    let wanted = name.trim();
    EXERCISE_TYPES
        .iter()
        .copied()
        .find(|t| t.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown exercise type '{name}'. Must be one of: {}",
                EXERCISE_TYPES.join(", ")
            )
        })
}

/// "4 days/week" when `achievable` is a day count.
#[must_use]
pub fn frequency_label(achievable: &str) -> Option<String> {
    let days: u8 = achievable.trim().parse().ok()?;
    (1..=7).contains(&days).then(|| format!("{days} days/week"))
}

#[derive(Debug, Clone, Default)]
pub struct GoalInput {
    pub specific: String,
    pub measurable: String,
    pub achievable: String,
    pub relevant: String,
    pub frequency: Option<String>,
    pub intensity: String,
    pub time: String,
    pub exercise_types: Vec<String>,
}

/// Validate and normalize a goal form into the stored record.
///
/// Exercise types are canonicalized and deduplicated; types the goal preset
/// does not allow are dropped. Frequency falls back to the achievable day count.
pub fn build_record(input: GoalInput) -> Result<GoalRecord> {
    let specific = input.specific.trim().to_string();
    if specific.is_empty() {
        bail!("Goal (specific) must not be empty");
    }
    let preset = GoalPreset::from_specific(&specific);

    let mut exercise_types: Vec<String> = Vec::new();
    for name in &input.exercise_types {
        let canonical = canonical_exercise_type(name)?;
        if !preset.allows(canonical) {
            tracing::debug!(exercise = canonical, goal = %specific, "dropping exercise type not offered for goal");
            continue;
        }
        if !exercise_types.iter().any(|t| t == canonical) {
            exercise_types.push(canonical.to_string());
        }
    }

    let frequency = match input.frequency {
        Some(f) if !f.trim().is_empty() => f.trim().to_string(),
        _ => frequency_label(&input.achievable).unwrap_or_default(),
    };

    Ok(GoalRecord {
        specific,
        measurable: input.measurable.trim().to_string(),
        achievable: input.achievable.trim().to_string(),
        relevant: input.relevant.trim().to_string(),
        fitt: Fitt {
            frequency,
            intensity: input.intensity.trim().to_string(),
            time: input.time.trim().to_string(),
            exercise_types,
        },
        date: timestamp(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(specific: &str, types: &[&str]) -> GoalInput {
        GoalInput {
            specific: specific.to_string(),
            measurable: "lose 4kg".to_string(),
            achievable: "4".to_string(),
            relevant: "feel better".to_string(),
            frequency: None,
            intensity: "moderate".to_string(),
            time: "45 minutes".to_string(),
            exercise_types: types.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_preset_exercise_types() {
        assert_eq!(
            GoalPreset::BuildMuscle.exercise_types(),
            vec!["Strength Training", "Bodyweight Exercises", "HIIT"]
        );
        assert_eq!(
            GoalPreset::LoseFat.exercise_types(),
            vec!["Cardio", "Running", "Cycling", "Swimming", "HIIT"]
        );
        assert_eq!(
            GoalPreset::ImproveEndurance.exercise_types(),
            vec!["Cardio", "Running", "Cycling", "Swimming", "Sports"]
        );
        assert_eq!(GoalPreset::General.exercise_types().len(), 9);
        assert_eq!(GoalPreset::from_specific("Lose Fat"), GoalPreset::LoseFat);
        assert_eq!(GoalPreset::from_specific("run a 10k"), GoalPreset::General);
    }

    #[test]
    fn test_frequency_label() {
        assert_eq!(frequency_label("4").as_deref(), Some("4 days/week"));
        assert_eq!(frequency_label(" 7 ").as_deref(), Some("7 days/week"));
        assert!(frequency_label("0").is_none());
        assert!(frequency_label("often").is_none());
    }

    #[test]
    fn test_build_record_filters_and_dedups_types() {
        let record =
            build_record(input("lose fat", &["cardio", "Yoga", "HIIT", "Cardio"])).unwrap();
        assert_eq!(record.fitt.exercise_types, vec!["Cardio", "HIIT"]);
        assert_eq!(record.fitt.frequency, "4 days/week");
        assert_eq!(record.specific, "lose fat");
        assert!(!record.date.is_empty());
    }

    #[test]
    fn test_build_record_explicit_frequency_wins() {
        let mut goal = input("build muscle", &[]);
        goal.frequency = Some("every other day".to_string());
        let record = build_record(goal).unwrap();
        assert_eq!(record.fitt.frequency, "every other day");
    }

    #[test]
    fn test_build_record_rejects_unknown_type() {
        assert!(build_record(input("lose fat", &["Pilates"])).is_err());
    }

    #[test]
    fn test_build_record_requires_goal() {
        assert!(build_record(input("  ", &[])).is_err());
    }
}
