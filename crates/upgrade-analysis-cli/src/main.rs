//! Upgrade Analysis CLI
//!
//! The `upgrade-analysis` command compares a pre-upgrade snapshot with a
//! post-upgrade one and writes per-module migration notes.
//!
//! ## Commands
//!
//! - `analyze`: run an analysis and print its status and aggregated log
//! - `check-apriori`: validate `apriori.json` at an upgrade path

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use upgrade_analysis_core::{
    load_local, load_remote, run_analysis, AnalysisOutcome, AnalysisRequest, AprioriMap,
    StaticModuleRegistry,
};

#[derive(Parser)]
#[command(name = "upgrade-analysis")]
#[command(version = upgrade_analysis_core::VERSION)]
#[command(about = "Compare data-model snapshots across a module upgrade", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile the remote snapshot against the local one
    Analyze {
        /// Directory holding apriori.json and the core modules
        #[arg(long, env = "UPGRADE_PATH")]
        upgrade_path: Option<PathBuf>,

        /// Do not load apriori.json; no renames or merges are known
        #[arg(long)]
        without_apriori: bool,

        /// Only build the aggregated log; write no notes files
        #[arg(long)]
        no_write_files: bool,

        /// Declared version of the remote system (e.g. 13.0)
        #[arg(long, env = "REMOTE_VERSION")]
        remote_version: String,

        /// Remote snapshot document ({"stores": {...}})
        #[arg(long)]
        remote: PathBuf,

        /// Local snapshot document ({"records": [...]})
        #[arg(long)]
        local: PathBuf,

        /// Installed modules document ({"modules": [...]})
        #[arg(long)]
        modules: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Validate apriori.json and print its mapping counts
    CheckApriori {
        /// Directory holding apriori.json
        #[arg(long, env = "UPGRADE_PATH")]
        upgrade_path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// What `analyze --format json` prints.
#[derive(Debug, Serialize)]
struct AnalyzeOutput<'a> {
    status: String,
    log: &'a str,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    upgrade_analysis_core::telemetry::init_tracing(cli.json, level);

    match cli.command {
        Commands::Analyze {
            upgrade_path,
            without_apriori,
            no_write_files,
            remote_version,
            remote,
            local,
            modules,
            format,
        } => {
            let request = AnalysisRequest {
                upgrade_path,
                without_apriori,
                write_files: !no_write_files,
                remote_version,
            };
            let outcome = cmd_analyze(request, &remote, &local, &modules).await?;
            println!("{}", render_outcome(&outcome, format)?);
            Ok(())
        }
        Commands::CheckApriori { upgrade_path } => {
            println!("{}", cmd_check_apriori(&upgrade_path)?);
            Ok(())
        }
    }
}

async fn cmd_analyze(
    request: AnalysisRequest,
    remote: &Path,
    local: &Path,
    modules: &Path,
) -> Result<AnalysisOutcome> {
    let connection = load_remote(remote)
        .with_context(|| format!("Failed to load remote snapshot {}", remote.display()))?;
    let local_store = load_local(local)
        .with_context(|| format!("Failed to load local snapshot {}", local.display()))?;
    let registry = StaticModuleRegistry::from_json_file(modules)
        .with_context(|| format!("Failed to load installed modules {}", modules.display()))?;

    let outcome = run_analysis(request, &connection, &local_store, &registry)
        .await
        .context("Analysis failed")?;
    info!(analysis_id = %outcome.analysis_id, status = %outcome.status, "analysis complete");
    Ok(outcome)
}

fn render_outcome(outcome: &AnalysisOutcome, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format!("status: {}\n\n{}", outcome.status, outcome.log)),
        OutputFormat::Json => serde_json::to_string_pretty(&AnalyzeOutput {
            status: outcome.status.to_string(),
            log: &outcome.log,
        })
        .context("Failed to serialize analysis outcome"),
    }
}

fn cmd_check_apriori(upgrade_path: &Path) -> Result<String> {
    let map = AprioriMap::load(upgrade_path).context("Invalid apriori file")?;
    Ok(format!(
        "renamed_modules: {}\nmerged_modules: {}\nrenamed_models: {}\nmerged_models: {}",
        map.renamed_modules().len(),
        map.merged_modules().len(),
        map.renamed_models().len(),
        map.merged_models().len(),
    ))
}
