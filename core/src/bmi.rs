use anyhow::{Result, bail};
use serde::Serialize;

use crate::models::{BmiCategory, BmiRecord};

pub const MISSING_MEASUREMENTS: &str = "Please enter both height and weight.";

/// Body-mass index from height in centimeters and weight in kilograms.
pub fn calculate(height_cm: Option<f64>, weight_kg: Option<f64>) -> Result<f64> {
    let (Some(height_cm), Some(weight_kg)) = (height_cm, weight_kg) else {
        bail!(MISSING_MEASUREMENTS);
    };
    if !usable(height_cm) || !usable(weight_kg) {
        bail!(MISSING_MEASUREMENTS);
    }
    let height_m = height_cm / 100.0;
    Ok(weight_kg / (height_m * height_m))
}

fn usable(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

#[must_use]
pub fn categorize(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Needle position on a 0-100 meter split into four equal bands.
#[must_use]
pub fn meter_position(bmi: f64) -> f64 {
    let position = if bmi < 18.5 {
        bmi / 18.5 * 25.0
    } else if bmi < 25.0 {
        25.0 + (bmi - 18.5) / 6.5 * 25.0
    } else if bmi < 30.0 {
        50.0 + (bmi - 25.0) / 5.0 * 25.0
    } else {
        75.0 + ((bmi - 30.0) / 10.0).min(1.0) * 25.0
    };
    position.clamp(0.0, 100.0)
}

/// BMI rounded to one decimal, as shown to the user.
#[must_use]
pub fn display_value(bmi: f64) -> String {
    format!("{bmi:.1}")
}

#[derive(Debug, Clone, Serialize)]
pub struct BmiReport {
    pub record: BmiRecord,
    pub display: String,
    pub meter_position: f64,
}

impl BmiReport {
    #[must_use]
    pub fn from_record(record: BmiRecord) -> Self {
        Self {
            display: display_value(record.value),
            meter_position: meter_position(record.value),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_boundaries() {
        assert_eq!(categorize(18.4), BmiCategory::Underweight);
        assert_eq!(categorize(18.5), BmiCategory::Normal);
        assert_eq!(categorize(24.9), BmiCategory::Normal);
        assert_eq!(categorize(25.0), BmiCategory::Overweight);
        assert_eq!(categorize(29.9), BmiCategory::Overweight);
        assert_eq!(categorize(30.0), BmiCategory::Obese);
    }

    #[test]
    fn test_calculate() {
        let bmi = calculate(Some(175.0), Some(70.0)).unwrap();
        assert!((bmi - 22.857).abs() < 0.001);
        assert_eq!(display_value(bmi), "22.9");
    }

    #[test]
    fn test_calculate_requires_both_measurements() {
        for (h, w) in [
            (None, Some(70.0)),
            (Some(175.0), None),
            (Some(0.0), Some(70.0)),
            (Some(175.0), Some(f64::NAN)),
            (Some(-175.0), Some(70.0)),
        ] {
            let err = calculate(h, w).unwrap_err();
            assert_eq!(err.to_string(), MISSING_MEASUREMENTS);
        }
    }

    #[test]
    fn test_meter_band_edges() {
        assert!((meter_position(18.5) - 25.0).abs() < 1e-9);
        assert!((meter_position(25.0) - 50.0).abs() < 1e-9);
        assert!((meter_position(30.0) - 75.0).abs() < 1e-9);
        assert!((meter_position(40.0) - 100.0).abs() < 1e-9);
        assert!((meter_position(55.0) - 100.0).abs() < 1e-9);
        assert!(meter_position(0.0).abs() < 1e-9);
    }

    #[test]
    fn test_meter_monotonic_and_bounded() {
        let mut previous = f64::NEG_INFINITY;
        let mut bmi = 0.0;
        while bmi <= 60.0 {
            let pos = meter_position(bmi);
            assert!((0.0..=100.0).contains(&pos), "bmi {bmi} -> {pos}");
            assert!(pos >= previous, "not monotonic at bmi {bmi}");
            previous = pos;
            bmi += 0.05;
        }
    }

    #[test]
    fn test_report_from_record() {
        let record = BmiRecord {
            value: 27.5,
            category: categorize(27.5),
            date: String::new(),
            height: 180.0,
            weight: 89.1,
            photo: None,
        };
        let report = BmiReport::from_record(record);
        assert_eq!(report.display, "27.5");
        assert!((report.meter_position - 62.5).abs() < 1e-9);
        assert_eq!(report.record.category, BmiCategory::Overweight);
    }
}
