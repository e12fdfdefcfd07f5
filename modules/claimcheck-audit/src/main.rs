use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use claimcheck_audit::report::{default_report_path, write_markdown, write_report};
use claimcheck_audit::{AuditResult, Auditor, IssueLevel};
use claimcheck_common::{AuditConfig, ScanMode, ScoreWeights, StratifyBy};

#[derive(Parser)]
#[command(
    name = "claimcheck-audit",
    about = "Content quality audit for a fact-check report corpus"
)]
struct Cli {
    /// Directory holding one document per metadata record
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Metadata listing (JSON array or JavaScript data module)
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Path to config TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// sample | full
    #[arg(long)]
    mode: Option<ScanMode>,

    #[arg(long)]
    sample_size: Option<usize>,

    /// verdict | category
    #[arg(long)]
    stratify_by: Option<StratifyBy>,

    /// Sampling seed, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// source,methodology,technical,consistency (must sum to 1.0)
    #[arg(long)]
    weights: Option<ScoreWeights>,

    /// Report path (default: $DATA_DIR/audit-reports/audit-<date>-<mode>.json)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write a Markdown summary next to the report
    #[arg(long)]
    markdown: bool,

    /// Documents scanned concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Print the JSON Schema of the report and exit
    #[arg(long)]
    print_schema: bool,
}

impl Cli {
    /// Flags override the config file, which overrides defaults.
    fn apply(&self, config: &mut AuditConfig) {
        if let Some(corpus) = &self.corpus {
            config.documents_dir = corpus.clone();
        }
        if let Some(metadata) = &self.metadata {
            config.metadata_path = metadata.clone();
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(sample_size) = self.sample_size {
            config.sample_size = sample_size;
        }
        if let Some(stratify_by) = self.stratify_by {
            config.stratify_by = stratify_by;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(weights) = self.weights {
            config.weights = weights;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_schema {
        let schema = schemars::schema_for!(AuditResult);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("claimcheck=info"));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    // Load config
    let mut config = match &cli.config {
        Some(path) => {
            info!(config = %path.display(), "Loading config");
            AuditConfig::load(path)?
        }
        None => AuditConfig::default(),
    };
    cli.apply(&mut config);

    info!(
        corpus = %config.documents_dir.display(),
        metadata = %config.metadata_path.display(),
        mode = %config.mode,
        "Claimcheck audit starting"
    );

    let auditor = Auditor::new(config)?;
    let result = auditor.run().await?;

    let path = cli
        .output
        .clone()
        .unwrap_or_else(|| default_report_path(result.mode));
    let written = write_report(&result, &path)?;
    if cli.markdown {
        write_markdown(&result, &written)?;
    }

    let warnings = result
        .issues
        .iter()
        .filter(|i| i.level == IssueLevel::Warning)
        .count();
    info!(
        concerns = result.total_concerns,
        warnings,
        "Audit complete. {} | {}",
        result.corpus,
        result.scores
    );
    Ok(())
}
