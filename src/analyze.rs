use crate::cli::AnalyzeArgs;
use crate::config::InsightsConfig;
use crate::error::Result;
use crate::git::{CommitSource, GitRepo};
use crate::insights::code::summarize;
use crate::insights::{aggregate, recommend, recommend_code, LanguageTable};
use crate::model::{DateRange, ExportOutput, InsightsReport, SCHEMA_VERSION};
use crate::report::{render, OutputFormat};
use anyhow::Context;
use chrono::Utc;
use std::path::Path;

pub fn exec(config_path: Option<&Path>, args: AnalyzeArgs) -> anyhow::Result<()> {
    let config = load_config(config_path, &args).context("Failed to load configuration")?;

    let report = match &args.input {
        Some(input) => {
            let text = std::fs::read_to_string(input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let export: ExportOutput =
                serde_json::from_str(&text).context("Failed to parse exported commit records")?;
            let range = crate::util::resolve_dates(args.common.since.as_deref(), args.common.until.as_deref())
                .context("Failed to resolve date range")?;
            build_report(export.entries.as_slice(), &range, &config, export.repository_path)?
        }
        None => {
            let repo = GitRepo::open(&args.common.repo)
                .context("Failed to open git repository")?
                .include_merges(!args.common.no_merges)
                .with_progress(console::Term::stderr().is_term());
            let range = repo
                .resolve_range(args.common.since.as_deref(), args.common.until.as_deref())
                .context("Failed to resolve date range")?;
            let path = repo.path().to_string_lossy().to_string();
            build_report(&repo, &range, &config, path)?
        }
    };

    if args.out.is_some() && args.output == OutputFormat::Text {
        console::set_colors_enabled(false);
    }
    let rendered = render(&report, args.output).context("Failed to render report")?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, rendered).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Config file first, then command-line overrides.
fn load_config(config_path: Option<&Path>, args: &AnalyzeArgs) -> Result<InsightsConfig> {
    let mut config = match config_path {
        Some(path) => InsightsConfig::from_file(path)?,
        None => InsightsConfig::load_default(&args.common.repo)?,
    };
    if let Some(period) = &args.period {
        config.period = period.parse()?;
    }
    if let Some(top) = args.top {
        config.top_n = Some(top);
    }
    if let Some(window) = args.active_window {
        config.active_window_days = window;
    }
    config.validate()?;
    Ok(config)
}

/// Source, aggregate and recommend for one run.
pub fn build_report<S: CommitSource + ?Sized>(
    source: &S,
    range: &DateRange,
    config: &InsightsConfig,
    repository_path: String,
) -> Result<InsightsReport> {
    let commits = source.list_commits(range)?;
    tracing::debug!(commits = commits.len(), "aggregating");

    let insights = aggregate(&commits, range, config)?;
    let mut recommendations = recommend(&insights, &config.recommendations);

    let code = source
        .head_files()?
        .map(|files| summarize(files, &LanguageTable::new(&config.languages)));
    if let Some(code) = &code {
        recommendations.extend(recommend_code(code, &config.recommendations));
        recommendations.sort_by_key(|r| r.priority);
    }

    Ok(InsightsReport {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path,
        since: range.since,
        until: range.until,
        insights,
        code,
        recommendations,
    })
}
