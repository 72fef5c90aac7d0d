use super::contributors::ContributorAccum;
use crate::model::ActivityRates;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;

pub const DAYS_PER_WEEK: f64 = 7.0;
pub const DAYS_PER_MONTH: f64 = 30.44;

/// Calendar days from the first to the last commit, inclusive, on UTC dates.
pub(crate) fn span_days(first: Option<DateTime<Utc>>, last: Option<DateTime<Utc>>) -> u64 {
    match (first, last) {
        (Some(first), Some(last)) => {
            let days = (last.date_naive() - first.date_naive()).num_days();
            days.max(0) as u64 + 1
        }
        _ => 0,
    }
}

/// Weekly and monthly figures scale the daily mean; see [`ActivityRates`].
pub(crate) fn activity_rates(total_commits: u64, span_days: u64) -> ActivityRates {
    if total_commits == 0 {
        return ActivityRates::default();
    }
    let daily = total_commits as f64 / span_days.max(1) as f64;
    ActivityRates {
        daily,
        weekly: daily * DAYS_PER_WEEK,
        monthly: daily * DAYS_PER_MONTH,
    }
}

/// Contributors whose latest commit falls within `window_days` before `latest`.
pub(crate) fn active_contributors(
    contributors: &HashMap<String, ContributorAccum>,
    latest: Option<DateTime<Utc>>,
    window_days: i64,
) -> u64 {
    let Some(latest) = latest else {
        return 0;
    };
    let cutoff = TimeDelta::try_days(window_days).and_then(|w| latest.checked_sub_signed(w));
    contributors
        .values()
        .filter(|c| cutoff.map_or(true, |cutoff| c.last_commit >= cutoff))
        .count() as u64
}
