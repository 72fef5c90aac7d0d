use super::trend::mean;
use crate::config::RecommendationThresholds;
use crate::model::{CodeSnapshot, InsightsResult, Priority, Recommendation, RecommendationKind};

/// Trend points needed before the first and last thirds are compared.
const MIN_DECLINE_POINTS: usize = 3;

/// Evaluates the rule set over an aggregation result. Pure; output is ordered by priority.
pub fn recommend(result: &InsightsResult, thresholds: &RecommendationThresholds) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let summary = &result.summary;

    if summary.total_contributors > 0 {
        let active_ratio = summary.active_contributors as f64 / summary.total_contributors as f64;
        if active_ratio < thresholds.min_active_ratio {
            out.push(Recommendation {
                kind: RecommendationKind::LowDiversity,
                priority: Priority::Medium,
                description: format!(
                    "Only {} of {} contributors are still active",
                    summary.active_contributors, summary.total_contributors
                ),
                rationale: "Work concentrated in a few recent hands raises bus-factor risk".to_string(),
            });
        }

        if summary.total_contributors < thresholds.min_contributors {
            out.push(Recommendation {
                kind: RecommendationKind::SmallContributorBase,
                priority: Priority::Medium,
                description: "Consider expanding the contributor base".to_string(),
                rationale: "More contributors bring review capacity and broader knowledge".to_string(),
            });
        }
    }

    if summary.total_commits > 0 && result.activity.daily < thresholds.min_daily_commits {
        out.push(Recommendation {
            kind: RecommendationKind::LowCommitFrequency,
            priority: Priority::High,
            description: format!(
                "Commit frequency is low ({:.2} per day)",
                result.activity.daily
            ),
            rationale: "Smaller, regular commits are easier to review and reduce merge conflicts".to_string(),
        });
    }

    if let Some((first, last)) = thirds(result) {
        if last < first * (1.0 - thresholds.decline_margin) {
            out.push(Recommendation {
                kind: RecommendationKind::DecliningActivity,
                priority: Priority::High,
                description: format!(
                    "Activity is declining ({first:.1} to {last:.1} commits per {})",
                    result.trend.period
                ),
                rationale: "A sustained drop in commits can signal stalled development".to_string(),
            });
        }
    }

    out.sort_by_key(|r| r.priority);
    out
}

/// Flags files at HEAD above `large_file_lines`.
pub fn recommend_code(code: &CodeSnapshot, thresholds: &RecommendationThresholds) -> Option<Recommendation> {
    let large = code
        .files
        .iter()
        .filter(|f| f.lines > thresholds.large_file_lines)
        .count();
    if large == 0 {
        return None;
    }
    Some(Recommendation {
        kind: RecommendationKind::LargeFiles,
        priority: Priority::Medium,
        description: format!("Consider refactoring {large} large files"),
        rationale: format!(
            "Files over {} lines are harder to understand and review",
            thresholds.large_file_lines
        ),
    })
}

/// Mean commit count of the first and last third of the trend series.
fn thirds(result: &InsightsResult) -> Option<(f64, f64)> {
    let counts: Vec<f64> = result.trend.points.iter().map(|p| p.commits as f64).collect();
    if counts.len() < MIN_DECLINE_POINTS {
        return None;
    }
    let third = counts.len() / 3;
    let first = mean(&counts[..third]);
    let last = mean(&counts[counts.len() - third..]);
    Some((first, last))
}
