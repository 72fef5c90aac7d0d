use crate::report::OutputFormat;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gitinsights")]
#[command(about = "Development-activity insights for a local git repository")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a TOML config file (default: <repo>/.gitinsights.toml)")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct CommonArgs {
    #[arg(default_value = ".", help = "Path to git repository")]
    pub repo: PathBuf,

    #[arg(long, help = "Include commits from this date or revision (YYYY-MM-DD, RFC3339, '2weeks ago')")]
    pub since: Option<String>,

    #[arg(long, help = "Exclude commits from this date or revision onwards")]
    pub until: Option<String>,

    #[arg(long, help = "Skip merge commits")]
    pub no_merges: bool,
}

#[derive(Args, Clone, Debug)]
pub struct AnalyzeArgs {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text, help = "Report format")]
    pub output: OutputFormat,

    #[arg(long, help = "Trend bucket: day, week or month")]
    pub period: Option<String>,

    #[arg(long, help = "Only list the top N contributors")]
    pub top: Option<usize>,

    #[arg(long, help = "Days before the latest commit that count as active")]
    pub active_window: Option<i64>,

    #[arg(long, help = "Write the report to this file instead of stdout")]
    pub out: Option<PathBuf>,

    #[arg(long, help = "Analyze records from an `export --json` file instead of the repository")]
    pub input: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate commit history into an insights report
    Analyze(AnalyzeArgs),
    /// Dump the commit records the analysis is built from
    Export {
        #[clap(flatten)]
        common: CommonArgs,

        #[arg(long, help = "Output as JSON")]
        json: bool,

        #[arg(long, help = "Output as NDJSON")]
        ndjson: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Analyze(args) => crate::analyze::exec(self.config.as_deref(), args),
            Commands::Export { common, json, ndjson } => crate::export::exec(common, json, ndjson),
        }
    }
}
