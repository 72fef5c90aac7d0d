use crate::error::{InsightsError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub const SCHEMA_VERSION: u32 = 1;

/// Identity used when a commit carries neither an email nor a name.
pub const UNKNOWN_IDENTITY: &str = "(unknown)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorIdentity {
    pub name: String,
    pub email: String,
}

impl AuthorIdentity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Grouping key: lowercased email, or the trimmed name when the email is empty.
    pub fn key(&self) -> String {
        let email = self.email.trim();
        if !email.is_empty() {
            return email.to_lowercase();
        }
        let name = self.name.trim();
        if name.is_empty() {
            UNKNOWN_IDENTITY.to_string()
        } else {
            name.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub insertions: u32,
    pub deletions: u32,
}

impl FileChange {
    pub fn new(path: impl Into<String>, insertions: u32, deletions: u32) -> Self {
        Self {
            path: path.into(),
            insertions,
            deletions,
        }
    }

    pub fn lines_changed(&self) -> u64 {
        self.insertions as u64 + self.deletions as u64
    }
}

/// One commit as yielded by a [`crate::git::CommitSource`]. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub id: String,
    pub author: AuthorIdentity,
    pub timestamp: DateTime<FixedOffset>,
    pub files: Vec<FileChange>,
    #[serde(default)]
    pub branches: BTreeSet<String>,
    #[serde(default)]
    pub parent_count: u32,
}

impl CommitRecord {
    pub fn utc_timestamp(&self) -> DateTime<Utc> {
        self.timestamp.with_timezone(&Utc)
    }

    pub fn insertions(&self) -> u64 {
        self.files.iter().map(|f| f.insertions as u64).sum()
    }

    pub fn deletions(&self) -> u64 {
        self.files.iter().map(|f| f.deletions as u64).sum()
    }

    pub fn is_merge(&self) -> bool {
        self.parent_count > 1
    }
}

/// Half-open interval `[since, until)` over UTC instants. A missing bound is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(since: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> Result<Self> {
        let range = Self { since, until };
        range.validate()?;
        Ok(range)
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(since), Some(until)) = (self.since, self.until) {
            if since > until {
                return Err(InsightsError::config(format!(
                    "invalid date range: since ({since}) is after until ({until})"
                )));
            }
        }
        Ok(())
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if timestamp < &since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if timestamp >= &until {
                return false;
            }
        }
        true
    }
}

/// Calendar bucket width for trend series. Weeks start on Monday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Period::Day),
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            other => Err(InsightsError::config(format!(
                "invalid period '{other}': expected day, week or month"
            ))),
        }
    }
}

impl TryFrom<String> for Period {
    type Error = InsightsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_commits: u64,
    pub total_contributors: u64,
    pub active_contributors: u64,
    pub total_insertions: u64,
    pub total_deletions: u64,
    pub files_touched: u64,
    pub total_branches: u64,
    pub first_commit: Option<DateTime<Utc>>,
    pub last_commit: Option<DateTime<Utc>>,
    pub span_days: u64,
    pub primary_language: Option<String>,
}

/// Average commit rates over the filtered span.
///
/// `weekly` and `monthly` are the daily average scaled by 7 and 30.44. They are
/// derived approximations, not counts resampled into calendar weeks or months,
/// so they will differ from the trend series when bucketed by week or month.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityRates {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributorStats {
    pub identity: String,
    pub name: String,
    pub email: String,
    pub commits: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub lines_changed: u64,
    pub files_touched: u64,
    pub commit_share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    Concentrated,
    Distributed,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionPattern {
    pub concentration: f64,
    pub distribution: Distribution,
    pub core_contributors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub language: String,
    pub lines: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period_start: NaiveDate,
    pub label: String,
    pub commits: u64,
    pub lines_changed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
    Fluctuating,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub period: Period,
    pub points: Vec<TrendPoint>,
    pub direction: TrendDirection,
    pub average_per_period: f64,
    pub stability: f64,
    pub peak_periods: Vec<String>,
    /// Mean commit count of the peak periods over the overall mean; 0 without peaks.
    pub peak_intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchStats {
    pub name: String,
    pub commits: u64,
    pub last_commit: DateTime<Utc>,
}

/// Output of one aggregation run. Field names are part of the JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsResult {
    pub summary: Summary,
    pub activity: ActivityRates,
    pub contributors: Vec<ContributorStats>,
    pub contribution: ContributionPattern,
    pub languages: Vec<LanguageShare>,
    pub trend: Trend,
    pub branches: Vec<BranchStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    LowDiversity,
    DecliningActivity,
    LowCommitFrequency,
    SmallContributorBase,
    LargeFiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub description: String,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsReport {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub insights: InsightsResult,
    /// Files at HEAD. Absent when the records did not come from a repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<CodeSnapshot>,
    pub recommendations: Vec<Recommendation>,
}

/// One file of the HEAD tree. Binary blobs count zero lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSize {
    pub path: String,
    pub lines: u64,
    pub bytes: u64,
}

/// File counts per line-count band: under 100, 100 to 499, 500 and up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeDistribution {
    pub small: u64,
    pub medium: u64,
    pub large: u64,
}

/// Size profile of the tree checked out at HEAD, independent of the date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSnapshot {
    pub total_files: u64,
    pub total_lines: u64,
    pub average_lines: f64,
    pub size_distribution: SizeDistribution,
    pub languages: Vec<LanguageShare>,
    /// Every file, largest first.
    pub files: Vec<FileSize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub entries: Vec<CommitRecord>,
}
