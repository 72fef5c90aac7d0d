//! Metrics aggregation over commit records.
//!
//! [`aggregate`] is the single entry point; [`InsightsBuilder`] exposes the
//! same single-pass accumulation for callers that stream records.

pub mod code;
mod contributors;
pub mod language;
mod recommend;
mod summary;
mod trend;

pub use language::{LanguageTable, OTHER_LANGUAGE};
pub use recommend::{recommend, recommend_code};
pub use summary::{DAYS_PER_MONTH, DAYS_PER_WEEK};

use crate::config::InsightsConfig;
use crate::error::Result;
use crate::model::{BranchStats, CommitRecord, DateRange, InsightsResult, Summary};
use crate::util::period_start;
use chrono::{DateTime, NaiveDate, Utc};
use contributors::ContributorAccum;
use std::collections::{BTreeMap, HashMap, HashSet};
use trend::Bucket;

/// Aggregates `commits` falling inside `range`.
///
/// Fails only with a configuration error (inverted range or invalid settings).
/// Empty input yields zero counts and empty collections.
pub fn aggregate(
    commits: &[CommitRecord],
    range: &DateRange,
    config: &InsightsConfig,
) -> Result<InsightsResult> {
    let mut builder = InsightsBuilder::new(range, config)?;
    for commit in commits {
        builder.push(commit);
    }
    Ok(builder.finish())
}

struct BranchAccum {
    commits: u64,
    last_commit: DateTime<Utc>,
}

/// Running accumulators for one aggregation. Holds no commit records.
pub struct InsightsBuilder<'a> {
    range: DateRange,
    config: &'a InsightsConfig,
    languages: LanguageTable,
    total_commits: u64,
    insertions: u64,
    deletions: u64,
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
    files: HashSet<String>,
    contributors: HashMap<String, ContributorAccum>,
    language_lines: HashMap<String, u64>,
    buckets: BTreeMap<NaiveDate, Bucket>,
    branches: BTreeMap<String, BranchAccum>,
}

impl<'a> InsightsBuilder<'a> {
    pub fn new(range: &DateRange, config: &'a InsightsConfig) -> Result<Self> {
        range.validate()?;
        config.validate()?;
        Ok(Self {
            range: range.clone(),
            config,
            languages: LanguageTable::new(&config.languages),
            total_commits: 0,
            insertions: 0,
            deletions: 0,
            first: None,
            last: None,
            files: HashSet::new(),
            contributors: HashMap::new(),
            language_lines: HashMap::new(),
            buckets: BTreeMap::new(),
            branches: BTreeMap::new(),
        })
    }

    /// Folds one record in. Returns `false` when it lies outside the range.
    pub fn push(&mut self, commit: &CommitRecord) -> bool {
        let ts = commit.utc_timestamp();
        if !self.range.contains(&ts) {
            return false;
        }

        let insertions = commit.insertions();
        let deletions = commit.deletions();
        let lines = insertions + deletions;

        self.total_commits += 1;
        self.insertions += insertions;
        self.deletions += deletions;
        self.first = Some(self.first.map_or(ts, |f| f.min(ts)));
        self.last = Some(self.last.map_or(ts, |l| l.max(ts)));

        let contributor = self
            .contributors
            .entry(commit.author.key())
            .or_insert_with(|| ContributorAccum::new(&commit.author.name, &commit.author.email, ts));
        contributor.commits += 1;
        contributor.insertions += insertions;
        contributor.deletions += deletions;
        contributor.last_commit = contributor.last_commit.max(ts);

        for file in &commit.files {
            if !contributor.files.contains(&file.path) {
                contributor.files.insert(file.path.clone());
            }
            if !self.files.contains(&file.path) {
                self.files.insert(file.path.clone());
            }
            let language = self.languages.classify(&file.path);
            match self.language_lines.get_mut(language) {
                Some(total) => *total += file.lines_changed(),
                None => {
                    self.language_lines.insert(language.to_string(), file.lines_changed());
                }
            }
        }

        let key = period_start(ts.date_naive(), self.config.period);
        let bucket = self.buckets.entry(key).or_default();
        bucket.commits += 1;
        bucket.lines_changed += lines;

        for branch in &commit.branches {
            let entry = self.branches.entry(branch.clone()).or_insert(BranchAccum {
                commits: 0,
                last_commit: ts,
            });
            entry.commits += 1;
            entry.last_commit = entry.last_commit.max(ts);
        }

        true
    }

    pub fn finish(self) -> InsightsResult {
        let config = self.config;
        let span_days = summary::span_days(self.first, self.last);
        let activity = summary::activity_rates(self.total_commits, span_days);
        let active = summary::active_contributors(&self.contributors, self.last, config.active_window_days);
        let total_contributors = self.contributors.len() as u64;

        let mut ranked = contributors::rank(self.contributors, self.total_commits);
        let contribution = contributors::contribution_pattern(
            &ranked,
            self.total_commits,
            config.concentration_top,
            config.concentrated_threshold,
            config.core_contributor_share,
        );
        if let Some(n) = config.top_n {
            ranked.truncate(n);
        }

        let languages = language::distribution(self.language_lines);
        let trend = trend::build_trend(&self.buckets, config.period);

        let branches: Vec<BranchStats> = self
            .branches
            .into_iter()
            .map(|(name, acc)| BranchStats {
                name,
                commits: acc.commits,
                last_commit: acc.last_commit,
            })
            .collect();

        tracing::debug!(
            commits = self.total_commits,
            contributors = total_contributors,
            periods = trend.points.len(),
            "aggregation finished"
        );

        InsightsResult {
            summary: Summary {
                total_commits: self.total_commits,
                total_contributors,
                active_contributors: active,
                total_insertions: self.insertions,
                total_deletions: self.deletions,
                files_touched: self.files.len() as u64,
                total_branches: branches.len() as u64,
                first_commit: self.first,
                last_commit: self.last,
                span_days,
                primary_language: languages.first().map(|l| l.language.clone()),
            },
            activity,
            contributors: ranked,
            contribution,
            languages,
            trend,
            branches,
        }
    }
}
