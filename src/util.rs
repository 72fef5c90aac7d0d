use crate::error::{InsightsError, Result};
use crate::model::{DateRange, Period};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeDelta, TimeZone, Utc};

/// First calendar day of the period containing `date`.
pub fn period_start(date: NaiveDate, period: Period) -> NaiveDate {
    match period {
        Period::Day => date,
        Period::Week => {
            let back = date.weekday().num_days_from_monday() as u64;
            date.checked_sub_days(Days::new(back)).unwrap_or(date)
        }
        Period::Month => date.with_day(1).unwrap_or(date),
    }
}

/// Start of the period following the one starting at `start`.
pub fn next_period_start(start: NaiveDate, period: Period) -> Option<NaiveDate> {
    match period {
        Period::Day => start.succ_opt(),
        Period::Week => start.checked_add_days(Days::new(7)),
        Period::Month => start.checked_add_months(Months::new(1)),
    }
}

pub fn period_label(start: NaiveDate, period: Period) -> String {
    match period {
        Period::Day => start.format("%Y-%m-%d").to_string(),
        Period::Week => {
            let iso = start.iso_week();
            format!("{}-W{:02}", iso.year(), iso.week())
        }
        Period::Month => start.format("%Y-%m").to_string(),
    }
}

/// Parses RFC 3339, `YYYY-MM-DD` (midnight UTC) or a relative `<duration> ago`.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
    }

    // "2weeks ago", "90d ago"
    let ago = input.strip_suffix("ago")?;
    let duration = humantime::parse_duration(ago.trim()).ok()?;
    let delta = TimeDelta::from_std(duration).ok()?;
    Utc::now().checked_sub_signed(delta)
}

/// Builds a range from date strings only; revisions need [`crate::git::GitRepo::resolve_range`].
pub fn resolve_dates(since: Option<&str>, until: Option<&str>) -> Result<DateRange> {
    let parse = |s: &str| {
        parse_date(s).ok_or_else(|| InsightsError::config(format!("invalid date '{s}'")))
    };
    let since = since.map(parse).transpose()?;
    let until = until.map(parse).transpose()?;
    DateRange::new(since, until)
}

pub fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-01-07 is a Sunday
        assert_eq!(period_start(date(2024, 1, 7), Period::Week), date(2024, 1, 1));
        assert_eq!(period_start(date(2024, 1, 8), Period::Week), date(2024, 1, 8));
    }

    #[test]
    fn month_rolls_over_year() {
        let dec = period_start(date(2023, 12, 31), Period::Month);
        assert_eq!(dec, date(2023, 12, 1));
        assert_eq!(next_period_start(dec, Period::Month), Some(date(2024, 1, 1)));
    }

    #[test]
    fn iso_week_label_uses_iso_year() {
        // 2024-12-30 belongs to ISO week 1 of 2025
        assert_eq!(period_label(date(2024, 12, 30), Period::Week), "2025-W01");
        assert_eq!(period_label(date(2024, 3, 1), Period::Month), "2024-03");
        assert_eq!(period_label(date(2024, 3, 1), Period::Day), "2024-03-01");
    }

    #[test]
    fn parses_supported_date_forms() {
        let midnight = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-02-01"), Some(midnight));
        assert_eq!(parse_date("2024-02-01T02:00:00+02:00"), Some(midnight));
        assert!(parse_date("3days ago").is_some_and(|d| d < Utc::now()));
        assert_eq!(parse_date("yesterday-ish"), None);
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let err = resolve_dates(Some("2024-03-01"), Some("2024-01-01")).unwrap_err();
        assert!(matches!(err, InsightsError::Configuration(_)));
        assert!(resolve_dates(Some("not a date"), None).is_err());
        assert_eq!(resolve_dates(None, None).unwrap(), DateRange::unbounded());
    }

    #[test]
    fn ratio_of_zero_whole_is_zero() {
        assert_eq!(ratio(5, 0), 0.0);
        assert_eq!(ratio(1, 4), 0.25);
    }
}
