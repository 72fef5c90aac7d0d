use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone, Utc};
use gitinsights::config::InsightsConfig;
use gitinsights::insights::aggregate;
use gitinsights::model::{AuthorIdentity, CommitRecord, DateRange, FileChange, Period};
use proptest::prelude::*;
use std::collections::BTreeSet;

const EXTENSIONS: &[&str] = &["rs", "py", "md", "js", "go", "bin"];

fn base() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().fixed_offset()
}

fn record(i: usize, author: u8, minutes: i64, files: Vec<(u8, u32, u32)>) -> CommitRecord {
    let email = format!("dev{author}@example.com");
    CommitRecord {
        id: format!("{i:040x}"),
        author: AuthorIdentity::new(format!("Dev {author}"), email),
        timestamp: base() + chrono::TimeDelta::minutes(minutes),
        files: files
            .into_iter()
            .map(|(ext, ins, del)| {
                let ext = EXTENSIONS[ext as usize % EXTENSIONS.len()];
                FileChange::new(format!("src/file.{ext}"), ins, del)
            })
            .collect(),
        branches: BTreeSet::from(["main".to_string()]),
        parent_count: 1,
    }
}

fn commits() -> impl Strategy<Value = Vec<CommitRecord>> {
    prop::collection::vec(
        (
            0u8..6,
            0i64..(60 * 24 * 120),
            prop::collection::vec((any::<u8>(), 0u32..500, 0u32..500), 0..4),
        ),
        0..40,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(i, (author, minutes, files))| record(i, author, minutes, files))
            .collect()
    })
}

#[test]
fn empty_input_gives_zeroed_result() {
    let result = aggregate(&[], &DateRange::unbounded(), &InsightsConfig::default()).unwrap();
    assert_eq!(result.summary.total_commits, 0);
    assert_eq!(result.activity.daily, 0.0);
    assert!(result.contributors.is_empty());
    assert!(result.languages.is_empty());
    assert!(result.trend.points.is_empty());
}

proptest! {
    #[test]
    fn totals_are_consistent(commits in commits()) {
        let result = aggregate(&commits, &DateRange::unbounded(), &InsightsConfig::default()).unwrap();
        prop_assert_eq!(result.summary.total_commits, commits.len() as u64);

        let ranked: u64 = result.contributors.iter().map(|c| c.commits).sum();
        prop_assert_eq!(ranked, commits.len() as u64);

        let bucketed: u64 = result.trend.points.iter().map(|p| p.commits).sum();
        prop_assert_eq!(bucketed, commits.len() as u64);
    }

    #[test]
    fn language_shares_sum_to_hundred(commits in commits()) {
        let result = aggregate(&commits, &DateRange::unbounded(), &InsightsConfig::default()).unwrap();
        if !result.languages.is_empty() {
            let total: f64 = result.languages.iter().map(|l| l.percentage).sum();
            prop_assert!((total - 100.0).abs() < 1e-6, "sum was {}", total);
        }
    }

    #[test]
    fn contributors_ranked_by_commits_then_identity(commits in commits()) {
        let result = aggregate(&commits, &DateRange::unbounded(), &InsightsConfig::default()).unwrap();
        for pair in result.contributors.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            prop_assert!(a.commits > b.commits || (a.commits == b.commits && a.identity < b.identity));
        }

        let mut reversed = commits.clone();
        reversed.reverse();
        let again = aggregate(&reversed, &DateRange::unbounded(), &InsightsConfig::default()).unwrap();
        prop_assert_eq!(result.contributors, again.contributors);
    }

    #[test]
    fn daily_trend_has_no_gaps(days in prop::collection::btree_set(0u64..60, 1..20)) {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let commits: Vec<CommitRecord> = days
            .iter()
            .enumerate()
            .map(|(i, d)| record(i, 0, (*d as i64) * 24 * 60 + 60 * 24 * 60, vec![]))
            .collect();
        let config = InsightsConfig { period: Period::Day, ..InsightsConfig::default() };
        let result = aggregate(&commits, &DateRange::unbounded(), &config).unwrap();

        let first = *days.iter().next().unwrap();
        let last = *days.iter().next_back().unwrap();
        prop_assert_eq!(result.trend.points.len() as u64, last - first + 1);
        prop_assert_eq!(
            result.trend.points[0].period_start,
            start.checked_add_days(Days::new(first)).unwrap()
        );
    }

    #[test]
    fn range_filter_matches_manual_count(commits in commits(), cut in 0i64..120) {
        let until = base().with_timezone(&Utc) + chrono::TimeDelta::days(cut);
        let range = DateRange::unbounded().with_until(until);
        let result = aggregate(&commits, &range, &InsightsConfig::default()).unwrap();
        let expected = commits.iter().filter(|c| c.utc_timestamp() < until).count() as u64;
        prop_assert_eq!(result.summary.total_commits, expected);
    }
}

#[test]
fn inverted_range_is_rejected() {
    let since = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let until = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let range = DateRange { since: Some(since), until: Some(until) };
    assert!(aggregate(&[], &range, &InsightsConfig::default()).is_err());
}
