use crate::error::Result;
use crate::model::{CodeSnapshot, InsightsReport, Priority, TrendDirection};
use console::style;
use std::fmt::Write;

const TOP_CONTRIBUTORS: usize = 10;
const RULE_WIDTH: usize = 60;
const LARGEST_FILES: usize = 5;

pub(super) fn render(report: &InsightsReport) -> Result<String> {
    let mut out = String::new();
    write_report(&mut out, report)?;
    Ok(out)
}

fn heading(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", style(title).bold())?;
    writeln!(out, "{}", "─".repeat(RULE_WIDTH))
}

fn write_report(out: &mut String, report: &InsightsReport) -> std::fmt::Result {
    let insights = &report.insights;
    let summary = &insights.summary;

    writeln!(out, "{}", style("Repository Insights").bold().underlined())?;
    writeln!(out, "Repository: {}", report.repository_path)?;
    match (report.since, report.until) {
        (Some(since), Some(until)) => writeln!(out, "Range: {} to {}", since.format("%Y-%m-%d"), until.format("%Y-%m-%d"))?,
        (Some(since), None) => writeln!(out, "Range: since {}", since.format("%Y-%m-%d"))?,
        (None, Some(until)) => writeln!(out, "Range: until {}", until.format("%Y-%m-%d"))?,
        (None, None) => {}
    }

    heading(out, "Summary")?;
    writeln!(out, "Total commits:        {}", style(summary.total_commits).cyan())?;
    writeln!(out, "Total contributors:   {}", style(summary.total_contributors).cyan())?;
    writeln!(out, "Active contributors:  {}", style(summary.active_contributors).cyan())?;
    writeln!(out, "Lines added:          {}", style(summary.total_insertions).green())?;
    writeln!(out, "Lines deleted:        {}", style(summary.total_deletions).red())?;
    writeln!(out, "Files touched:        {}", summary.files_touched)?;
    writeln!(out, "Branches:             {}", summary.total_branches)?;
    writeln!(
        out,
        "Primary language:     {}",
        summary.primary_language.as_deref().unwrap_or("unknown")
    )?;
    if let (Some(first), Some(last)) = (summary.first_commit, summary.last_commit) {
        writeln!(
            out,
            "Active span:          {} to {} ({} days)",
            style(first.format("%Y-%m-%d")).dim(),
            style(last.format("%Y-%m-%d")).dim(),
            summary.span_days
        )?;
    }

    heading(out, "Commit Activity")?;
    writeln!(out, "Daily average:    {:.2}", insights.activity.daily)?;
    writeln!(out, "Weekly average:   {:.2}", insights.activity.weekly)?;
    writeln!(out, "Monthly average:  {:.2}", insights.activity.monthly)?;

    heading(out, "Top Contributors")?;
    if insights.contributors.is_empty() {
        writeln!(out, "No contributors in range")?;
    } else {
        writeln!(
            out,
            "{:<36} {:>8} {:>10} {:>7}",
            style("Contributor").bold(),
            style("Commits").bold(),
            style("Lines").bold(),
            style("Share").bold()
        )?;
        for c in insights.contributors.iter().take(TOP_CONTRIBUTORS) {
            writeln!(
                out,
                "{:<36} {:>8} {:>10} {:>6.1}%",
                truncate(&c.identity, 36),
                c.commits,
                c.lines_changed,
                c.commit_share * 100.0
            )?;
        }
        if insights.contributors.len() > TOP_CONTRIBUTORS {
            writeln!(out, "... and {} more", insights.contributors.len() - TOP_CONTRIBUTORS)?;
        }
        writeln!(
            out,
            "Concentration: {:.1}% ({:?})",
            insights.contribution.concentration * 100.0,
            insights.contribution.distribution
        )?;
    }

    heading(out, "Languages")?;
    if insights.languages.is_empty() {
        writeln!(out, "No changed lines in range")?;
    }
    for lang in &insights.languages {
        writeln!(out, "{:<24} {:>5.1}%  {:>10} lines", lang.language, lang.percentage, lang.lines)?;
    }

    heading(out, &format!("Trend (per {})", insights.trend.period))?;
    let max = insights.trend.points.iter().map(|p| p.commits).max().unwrap_or(0);
    for point in &insights.trend.points {
        let width = if max == 0 { 0 } else { (point.commits * 30).div_ceil(max) as usize };
        writeln!(
            out,
            "{:<10} {:>5} {}",
            point.label,
            point.commits,
            style("█".repeat(width)).green()
        )?;
    }
    if insights.trend.direction != TrendDirection::InsufficientData {
        writeln!(
            out,
            "Direction: {:?}, stability {:.2}, {:.1} commits per {}",
            insights.trend.direction,
            insights.trend.stability,
            insights.trend.average_per_period,
            insights.trend.period
        )?;
    }

    if !insights.branches.is_empty() {
        heading(out, "Branches")?;
        for branch in &insights.branches {
            writeln!(
                out,
                "{:<30} {:>6} commits  last {}",
                truncate(&branch.name, 30),
                branch.commits,
                branch.last_commit.format("%Y-%m-%d")
            )?;
        }
    }

    if let Some(code) = &report.code {
        write_code(out, code)?;
    }

    heading(out, "Recommendations")?;
    if report.recommendations.is_empty() {
        writeln!(out, "No recommendations")?;
    }
    for rec in &report.recommendations {
        let tag = format!("[{}]", rec.priority.as_str().to_uppercase());
        let tag = match rec.priority {
            Priority::High => style(tag).red(),
            Priority::Medium => style(tag).yellow(),
        };
        writeln!(out, "{tag} {}", rec.description)?;
        writeln!(out, "  {}", style(&rec.rationale).dim())?;
    }

    Ok(())
}

fn write_code(out: &mut String, code: &CodeSnapshot) -> std::fmt::Result {
    heading(out, "Code at HEAD")?;
    writeln!(out, "Files:          {}", code.total_files)?;
    writeln!(out, "Lines:          {}", code.total_lines)?;
    writeln!(out, "Average lines:  {:.1}", code.average_lines)?;
    let sizes = &code.size_distribution;
    writeln!(
        out,
        "Size bands:     {} small, {} medium, {} large",
        sizes.small, sizes.medium, sizes.large
    )?;
    for file in code.files.iter().take(LARGEST_FILES).filter(|f| f.lines > 0) {
        writeln!(out, "  {:<46} {:>8} lines", truncate(&file.path, 46), file.lines)?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures;

    #[test]
    fn text_lists_sections_and_contributors() {
        console::set_colors_enabled(false);
        let out = render(&fixtures::report()).unwrap();
        assert!(out.contains("Total commits:        3"));
        assert!(out.contains("alice@x.com"));
        assert!(out.contains("Trend (per month)"));
        assert!(out.contains("2024-02"));
        assert!(out.contains("Recommendations"));
        assert!(!out.contains("Code at HEAD"));
    }

    #[test]
    fn text_includes_code_snapshot() {
        console::set_colors_enabled(false);
        let out = render(&fixtures::report_with_code()).unwrap();
        assert!(out.contains("Code at HEAD"));
        assert!(out.contains("Size bands:     1 small, 0 medium, 1 large"));
        assert!(out.contains("src/engine.rs"));
        assert!(out.contains("Consider refactoring 1 large files"));
    }

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }
}
