use std::path::Path;
use std::process;

use anyhow::Result;

use fit28_core::bmi::BmiReport;
use fit28_core::service::{Session, Tracker};

use super::helpers::json_error;
use crate::photo::load_photo;

const METER_WIDTH: usize = 40;

/// Text rendition of the four-band meter with the needle at `position` percent.
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
fn meter(position: f64) -> String {
    let needle = ((position / 100.0) * (METER_WIDTH - 1) as f64).round() as usize;
    let bar: String = (0..METER_WIDTH)
        .map(|i| {
            if i == needle.min(METER_WIDTH - 1) {
                '▲'
            } else {
                match i * 4 / METER_WIDTH {
                    0 => '░',
                    1 => '▒',
                    2 => '▓',
                    _ => '█',
                }
            }
        })
        .collect();
    format!("[{bar}]\n Under     Normal    Over      Obese")
}

fn print_report(report: &BmiReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    let r = &report.record;
    println!("BMI: {} ({})", report.display, r.category);
    println!("Height {:.1} cm, weight {:.1} kg", r.height, r.weight);
    println!("{}", meter(report.meter_position));
    if r.photo.is_some() {
        println!("Photo attached");
    }
    Ok(())
}

pub(crate) fn cmd_bmi_calc(
    tracker: &Tracker,
    height: Option<f64>,
    weight: Option<f64>,
    json: bool,
) -> Result<()> {
    let report = tracker.record_bmi(height, weight)?;
    print_report(&report, json)
}

pub(crate) fn cmd_bmi_show(tracker: &Tracker, json: bool) -> Result<()> {
    let Some(report) = tracker.bmi()? else {
        if json {
            println!("{}", json_error("No BMI measurement recorded"));
        } else {
            eprintln!("No BMI measurement recorded. Use `fit28 bmi calc` first.");
        }
        process::exit(2);
    };
    print_report(&report, json)
}

pub(crate) async fn cmd_bmi_photo(
    tracker: &Tracker,
    session: &Session,
    path: &Path,
    json: bool,
) -> Result<()> {
    let photo = load_photo(path).await?;
    let report = tracker.attach_bmi_photo(session, photo)?;
    if !json {
        eprintln!("Added BMI photo to the week {} gallery", session.week);
    }
    print_report(&report, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_needle_position() {
        let start = meter(0.0);
        assert!(start.starts_with("[▲"));
        let end = meter(100.0);
        assert!(end.lines().next().unwrap().ends_with("▲]"));
        assert_eq!(meter(50.0).matches('▲').count(), 1);
    }
}
