use crate::cli::CommonArgs;
use crate::git::GitRepo;
use crate::model::{CommitRecord, DateRange, ExportOutput, SCHEMA_VERSION};
use anyhow::Context;
use chrono::Utc;
use console::style;
use std::collections::HashSet;

pub fn exec(common: CommonArgs, json: bool, ndjson: bool) -> anyhow::Result<()> {
    let repo = GitRepo::open(&common.repo)
        .context("Failed to open git repository")?
        .include_merges(!common.no_merges)
        .with_progress(console::Term::stderr().is_term());

    let range = repo
        .resolve_range(common.since.as_deref(), common.until.as_deref())
        .context("Failed to resolve date range")?;

    let records = repo.collect_commits(&range).context("Failed to collect commits")?;

    if json {
        let output = export_output(records, &repo, &range);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if ndjson {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
    } else {
        print_summary(&records);
    }

    Ok(())
}

fn export_output(entries: Vec<CommitRecord>, repo: &GitRepo, range: &DateRange) -> ExportOutput {
    ExportOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path: repo.path().to_string_lossy().to_string(),
        since: range.since,
        until: range.until,
        entries,
    }
}

fn print_summary(records: &[CommitRecord]) {
    println!("{}", style("Export Summary").bold());
    println!("{}", "─".repeat(50));

    let total_files: usize = records.iter().map(|r| r.files.len()).sum();
    let insertions: u64 = records.iter().map(CommitRecord::insertions).sum();
    let deletions: u64 = records.iter().map(CommitRecord::deletions).sum();
    let merges = records.iter().filter(|r| r.is_merge()).count();
    let authors: HashSet<String> = records.iter().map(|r| r.author.key()).collect();

    println!("Total commits: {}", style(records.len()).cyan());
    println!("Merge commits: {}", style(merges).cyan());
    println!("Total files changed: {}", style(total_files).cyan());
    println!("Total lines added: {}", style(insertions).green());
    println!("Total lines deleted: {}", style(deletions).red());
    println!("Unique authors: {}", style(authors.len()).yellow());

    if let (Some(first), Some(last)) = (records.first(), records.last()) {
        println!(
            "Date range: {} to {}",
            style(first.utc_timestamp().format("%Y-%m-%d")).dim(),
            style(last.utc_timestamp().format("%Y-%m-%d")).dim()
        );
    }

    println!("\nUse --json or --ndjson flags to export the raw data.");
}
