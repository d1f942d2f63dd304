use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use fit28_core::grid::{DAYS_PER_WEEK, TimeSlot, Week};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Column of `week` named by a 1-7 position, a weekday ("Tue"), or a date in the week.
pub(crate) fn parse_day(week: Week, s: &str) -> Result<usize> {
    let s = s.trim();
    if let Ok(n) = s.parse::<usize>() {
        if !(1..=DAYS_PER_WEEK).contains(&n) {
            bail!("Day must be between 1 and {DAYS_PER_WEEK} (got {n})");
        }
        return Ok(n - 1);
    }

    let days = week.days();
    if let Some(i) = days.iter().position(|d| {
        let short = d.format("%a").to_string();
        let long = d.format("%A").to_string();
        short.eq_ignore_ascii_case(s) || long.eq_ignore_ascii_case(s)
    }) {
        return Ok(i);
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return days
            .iter()
            .position(|d| *d == date)
            .with_context(|| format!("{date} is not in {}", week.label()));
    }

    bail!("Invalid day '{s}'. Use 1-{DAYS_PER_WEEK}, a weekday like 'Tue', or a date in the week")
}

/// Time slot named by a 1-17 position or a label like "7AM-8AM".
pub(crate) fn parse_slot(s: &str) -> Result<TimeSlot> {
    let s = s.trim();
    if let Ok(n) = s.parse::<usize>() {
        if n == 0 || n > TimeSlot::COUNT {
            bail!("Time slot must be between 1 and {} (got {n})", TimeSlot::COUNT);
        }
        return TimeSlot::from_index(n - 1);
    }
    s.parse()
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Grams with at most one decimal, without a trailing ".0".
pub(crate) fn grams(v: f64) -> String {
    let v = no_neg_zero((v * 10.0).round() / 10.0);
    if v.fract() == 0.0 {
        format!("{v:.0}g")
    } else {
        format!("{v:.1}g")
    }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-10-27".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 10, 27).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_parse_day_forms() {
        let week = Week::new(2).unwrap();
        assert_eq!(parse_day(week, "1").unwrap(), 0);
        assert_eq!(parse_day(week, "7").unwrap(), 6);
        // Week 2 starts on Sunday Oct 27.
        assert_eq!(parse_day(week, "sun").unwrap(), 0);
        assert_eq!(parse_day(week, "Tuesday").unwrap(), 2);
        assert_eq!(parse_day(week, "2024-11-02").unwrap(), 6);
    }

    #[test]
    fn test_parse_day_invalid() {
        let week = Week::default();
        assert!(parse_day(week, "0").is_err());
        assert!(parse_day(week, "8").is_err());
        assert!(parse_day(week, "2024-11-02").is_err());
        assert!(parse_day(week, "someday").is_err());
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!(parse_slot("1").unwrap().label(), "5AM-6AM");
        assert_eq!(parse_slot("17").unwrap().label(), "9PM-10PM");
        assert_eq!(parse_slot("7am-8am").unwrap().label(), "7AM-8AM");
        assert!(parse_slot("0").is_err());
        assert!(parse_slot("18").is_err());
        assert!(parse_slot("noon").is_err());
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("bad \"x\""), r#"{"error":"bad \"x\""}"#);
    }

    #[test]
    fn test_grams() {
        assert_eq!(grams(31.0), "31g");
        assert_eq!(grams(35.56), "35.6g");
        assert_eq!(grams(-0.0), "0g");
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }
}
