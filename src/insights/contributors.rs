use crate::model::{ContributionPattern, ContributorStats, Distribution};
use crate::util::ratio;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

pub(crate) struct ContributorAccum {
    pub name: String,
    pub email: String,
    pub commits: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub files: HashSet<String>,
    pub last_commit: DateTime<Utc>,
}

impl ContributorAccum {
    pub fn new(name: &str, email: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            commits: 0,
            insertions: 0,
            deletions: 0,
            files: HashSet::new(),
            last_commit: timestamp,
        }
    }
}

/// Sorts by commit count descending; equal counts fall back to identity ascending.
pub(crate) fn rank(
    contributors: HashMap<String, ContributorAccum>,
    total_commits: u64,
) -> Vec<ContributorStats> {
    let mut ranked: Vec<ContributorStats> = contributors
        .into_iter()
        .map(|(identity, acc)| ContributorStats {
            identity,
            name: acc.name,
            email: acc.email,
            commits: acc.commits,
            insertions: acc.insertions,
            deletions: acc.deletions,
            lines_changed: acc.insertions + acc.deletions,
            files_touched: acc.files.len() as u64,
            commit_share: ratio(acc.commits, total_commits),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.commits
            .cmp(&a.commits)
            .then_with(|| a.identity.cmp(&b.identity))
    });
    ranked
}

/// Expects `ranked` in [`rank`] order and untruncated.
pub(crate) fn contribution_pattern(
    ranked: &[ContributorStats],
    total_commits: u64,
    concentration_top: usize,
    concentrated_threshold: f64,
    core_share: f64,
) -> ContributionPattern {
    if total_commits == 0 || ranked.is_empty() {
        return ContributionPattern {
            concentration: 0.0,
            distribution: Distribution::InsufficientData,
            core_contributors: Vec::new(),
        };
    }

    let top_commits: u64 = ranked.iter().take(concentration_top).map(|c| c.commits).sum();
    let concentration = ratio(top_commits, total_commits);
    let distribution = if concentration > concentrated_threshold {
        Distribution::Concentrated
    } else {
        Distribution::Distributed
    };

    let core_floor = total_commits as f64 * core_share;
    let core_contributors = ranked
        .iter()
        .filter(|c| c.commits as f64 > core_floor)
        .map(|c| c.identity.clone())
        .collect();

    ContributionPattern {
        concentration,
        distribution,
        core_contributors,
    }
}
