//! `agelit` - gene literature search over an offline corpus.
//!
//! Usage:
//!   agelit search <GENE> --corpus <FILE> [--top-n N] [--cancel-after-ms MS]
//!   agelit batch <GENES_FILE> --corpus <FILE> --output <FILE> [--force]
//!
//! Papers come from a JSON corpus file; screening and extraction replay any
//! model responses recorded in it and fall back to term matching otherwise.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use agelit_core::app::{App, AppBuilder};
use agelit_core::config::AppConfig;
use agelit_core::domain::{Finding, SearchParams, TaskStatus, TaskView};
use agelit_core::impls::{InMemoryCorpus, ReplayExtractor, ReplayScorer};

/// How long to keep polling a cancelled task for its partial result.
const CANCEL_GRACE: Duration = Duration::from_secs(2);

/// Gene literature search.
#[derive(Parser, Debug)]
#[command(name = "agelit", about = "Search literature for aging-related gene modifications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search one gene and print the ranked findings.
    Search {
        /// Gene symbol, e.g. NFE2L2.
        gene: String,

        /// NCBI gene id, copied into every finding.
        #[arg(long)]
        gene_id: Option<u64>,

        #[command(flatten)]
        tuning: SearchArgs,

        /// Add reprogramming and rejuvenation terms to the query.
        #[arg(long)]
        extra_terms: bool,

        /// Extra query term; repeatable.
        #[arg(long = "term")]
        terms: Vec<String>,

        /// Request cancellation this many milliseconds after starting.
        #[arg(long)]
        cancel_after_ms: Option<u64>,

        /// Write the final task as JSON here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Search every gene in a list, appending to a JSON results file.
    Batch {
        /// One gene per line: SYMBOL[,true|false]; the flag enables extra terms.
        genes: PathBuf,

        /// Results file; genes already in it are skipped.
        #[arg(long)]
        output: PathBuf,

        /// Search genes even if the results file already has them.
        #[arg(long)]
        force: bool,

        #[command(flatten)]
        tuning: SearchArgs,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Paper corpus (JSON array of paper records).
    #[arg(long)]
    corpus: PathBuf,

    /// Configuration file (JSON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Status poll interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Cap on papers requested from the corpus (1-1000).
    #[arg(long)]
    max_results: Option<usize>,

    /// Number of ranked papers to extract and return (1-100).
    #[arg(long)]
    top_n: Option<usize>,
}

impl SearchArgs {
    fn apply(&self, mut params: SearchParams) -> SearchParams {
        if let Some(max) = self.max_results {
            params = params.with_max_results(max);
        }
        if let Some(top_n) = self.top_n {
            params = params.with_top_n(top_n);
        }
        params
    }
}

/// One gene's entry in a batch results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BatchRecord {
    gene_symbol: String,
    status: TaskStatus,
    #[serde(default)]
    findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            gene,
            gene_id,
            tuning,
            extra_terms,
            terms,
            cancel_after_ms,
            output,
            common,
        } => {
            let app = build_app(&common)?;
            let reaper = app.spawn_reaper();

            let mut params = tuning
                .apply(app.service().params(gene))
                .with_extra_terms(extra_terms);
            if let Some(gene_id) = gene_id {
                params = params.with_gene_id(gene_id);
            }
            for term in terms {
                params = params.with_custom_term(term);
            }

            let view = run_search(
                &app,
                params,
                cancel_after_ms.map(Duration::from_millis),
                Duration::from_millis(common.poll_ms),
            )
            .await?;
            reaper.shutdown_and_join().await;

            let json = serde_json::to_string_pretty(&view)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("wrote {}", path.display());
                }
                None => println!("{json}"),
            }

            if view.status == TaskStatus::Failed {
                bail!(
                    "search failed: {}",
                    view.error.unwrap_or_else(|| "unknown error".into())
                );
            }
        }

        Commands::Batch {
            genes,
            output,
            force,
            tuning,
            common,
        } => {
            let app = build_app(&common)?;
            let reaper = app.spawn_reaper();
            let poll = Duration::from_millis(common.poll_ms);

            let list = read_gene_list(&genes)?;
            let mut records = read_batch_records(&output)?;
            info!("{} genes listed, {} already in {}", list.len(), records.len(), output.display());

            for (symbol, extra_terms) in list {
                let done = records
                    .iter()
                    .any(|r| r.gene_symbol.eq_ignore_ascii_case(&symbol));
                if done && !force {
                    info!(gene = %symbol, "skipping, already in results");
                    continue;
                }

                let params = tuning
                    .apply(app.service().params(symbol.clone()))
                    .with_extra_terms(extra_terms);
                let record = match run_search(&app, params, None, poll).await {
                    Ok(view) => BatchRecord {
                        gene_symbol: symbol.clone(),
                        status: view.status,
                        findings: view.result.unwrap_or_default(),
                        error: view.error,
                    },
                    Err(err) => {
                        warn!(gene = %symbol, error = %err, "search rejected");
                        BatchRecord {
                            gene_symbol: symbol.clone(),
                            status: TaskStatus::Failed,
                            findings: Vec::new(),
                            error: Some(err.to_string()),
                        }
                    }
                };

                records.retain(|r| !r.gene_symbol.eq_ignore_ascii_case(&symbol));
                records.push(record);
                // written per gene; a rerun skips what is already there
                write_batch_records(&output, &records)?;
            }

            let counts = app.service().counts().await;
            info!(
                completed = counts.completed,
                failed = counts.failed,
                cancelled = counts.cancelled,
                "batch finished"
            );
            reaper.shutdown_and_join().await;
        }
    }

    Ok(())
}

fn build_app(common: &CommonArgs) -> Result<App> {
    let config = match &common.config {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };

    info!("Loading corpus from {}", common.corpus.display());
    let corpus = InMemoryCorpus::from_json_file(&common.corpus)?;
    let scorer = ReplayScorer::from_corpus(&corpus);
    let extractor = ReplayExtractor::from_corpus(&corpus);
    info!(
        papers = corpus.len(),
        recorded = scorer.recorded_count(),
        "corpus loaded"
    );

    let app = AppBuilder::new()
        .literature(corpus)
        .scorer(scorer)
        .extractor(extractor)
        .config(config)
        .build()?;
    Ok(app)
}

/// Start a search and poll it to a terminal status.
async fn run_search(
    app: &App,
    params: SearchParams,
    cancel_after: Option<Duration>,
    poll: Duration,
) -> Result<TaskView> {
    let gene = params.gene_symbol.clone();
    let started = app.service().start(params).await?;
    let task_id = started.task_id.to_string();
    info!(%gene, %task_id, "search submitted");

    let mut cancel_at = cancel_after.map(|d| Instant::now() + d);
    let mut grace_until: Option<Instant> = None;
    let mut last_seen = None;

    loop {
        let view = app.service().status(&task_id).await?;

        if let Some(progress) = &view.progress {
            let key = (progress.step_number, progress.items_processed);
            if last_seen != Some(key) {
                last_seen = Some(key);
                match (progress.items_processed, progress.items_total) {
                    (Some(done), Some(total)) => info!(
                        "[{}/{}] {} ({done}/{total})",
                        progress.step_number, progress.total_steps, progress.current_step
                    ),
                    _ => info!(
                        "[{}/{}] {}",
                        progress.step_number, progress.total_steps, progress.message
                    ),
                }
            }
        }

        if view.status.is_terminal() {
            // a cancelled worker attaches its partial result at its next checkpoint
            if view.status == TaskStatus::Cancelled && view.result.is_none() {
                let deadline = *grace_until.get_or_insert_with(|| Instant::now() + CANCEL_GRACE);
                if Instant::now() < deadline {
                    sleep(poll).await;
                    continue;
                }
            }
            info!(%task_id, status = %view.status, "search finished");
            return Ok(view);
        }

        if let Some(at) = cancel_at
            && Instant::now() >= at
        {
            let ack = app.service().cancel(&task_id).await?;
            info!(%task_id, status = %ack.status, "cancellation requested");
            cancel_at = None;
        }

        sleep(poll).await;
    }
}

/// Parse `SYMBOL[,true|false]` lines; blank lines and `#` comments are skipped.
fn read_gene_list(path: &Path) -> Result<Vec<(String, bool)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read gene list {}", path.display()))?;
    parse_gene_list(&text)
}

fn parse_gene_list(text: &str) -> Result<Vec<(String, bool)>> {
    let mut genes = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (symbol, flag) = match line.split_once(',') {
            Some((symbol, flag)) => (symbol.trim(), Some(flag.trim())),
            None => (line, None),
        };
        let extra_terms = match flag.map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("false") => false,
            Some("true") => true,
            Some(other) => bail!("line {}: expected true or false, got {other:?}", lineno + 1),
        };
        genes.push((symbol.to_string(), extra_terms));
    }
    Ok(genes)
}

fn read_batch_records(path: &Path) -> Result<Vec<BatchRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn write_batch_records(path: &Path, records: &[BatchRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
