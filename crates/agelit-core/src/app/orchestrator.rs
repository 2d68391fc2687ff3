//! SearchOrchestrator - the seven-stage literature search pipeline.
//!
//! ```text
//! BuildQuery -> Search -> FetchMetadata -> Screen -> RankAndSelect -> ExtractFindings -> Done
//! ```
//!
//! The cancellation token is read before every stage and before every item
//! in Screen and ExtractFindings. Per-item collaborator failures are
//! absorbed into that item's record; failures in the whole-list stages end
//! the run with a [`SearchError`].
//!
//! Each per-item collaborator call runs on its own tokio task, so a scorer
//! or extractor that panics degrades only the paper it was working on.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cancel::CancellationToken;
use super::progress::ProgressReporter;
use crate::config::PipelineConfig;
use crate::domain::{
    Associations, Finding, PaperMetadata, ProgressSnapshot, RelevanceVerdict, SearchError,
    SearchParams, SearchQuery,
};
use crate::ports::{AssociationExtractor, Clock, LiteratureSearch, RelevanceScorer};

pub const TOTAL_STEPS: u32 = 7;

/// Reasoning recorded for a paper whose scorer call panicked.
pub const SCORER_PANICKED: &str = "Screening error: scorer panicked";

/// Pipeline stages, numbered as reported in progress snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    BuildQuery = 1,
    Search = 2,
    FetchMetadata = 3,
    Screen = 4,
    RankAndSelect = 5,
    ExtractFindings = 6,
    Done = 7,
}

impl Stage {
    pub fn number(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::BuildQuery => "Building query",
            Stage::Search => "Searching literature",
            Stage::FetchMetadata => "Fetching metadata",
            Stage::Screen => "Screening papers",
            Stage::RankAndSelect => "Ranking results",
            Stage::ExtractFindings => "Extracting associations",
            Stage::Done => "Done",
        }
    }

    fn snapshot(self) -> ProgressSnapshot {
        ProgressSnapshot::new(self.label(), self.number(), TOTAL_STEPS)
    }
}

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Ranked top-N findings; possibly partial when `cancelled`.
    pub findings: Vec<Finding>,
    pub cancelled: bool,
    /// Papers that went through screening.
    pub screened: usize,
    /// Screened papers flagged relevant.
    pub relevant: usize,
}

impl SearchOutcome {
    fn empty(cancelled: bool) -> Self {
        Self {
            findings: Vec::new(),
            cancelled,
            screened: 0,
            relevant: 0,
        }
    }
}

// Screened paper plus the metadata extraction still needs.
struct Screened {
    paper: PaperMetadata,
    finding: Finding,
}

pub struct SearchOrchestrator {
    literature: Arc<dyn LiteratureSearch>,
    scorer: Arc<dyn RelevanceScorer>,
    extractor: Arc<dyn AssociationExtractor>,
    clock: Arc<dyn Clock>,
    pipeline: PipelineConfig,
}

impl SearchOrchestrator {
    pub fn new(
        literature: Arc<dyn LiteratureSearch>,
        scorer: Arc<dyn RelevanceScorer>,
        extractor: Arc<dyn AssociationExtractor>,
        clock: Arc<dyn Clock>,
        pipeline: PipelineConfig,
    ) -> Self {
        Self {
            literature,
            scorer,
            extractor,
            clock,
            pipeline,
        }
    }

    /// Run the pipeline for one search.
    pub async fn run(
        &self,
        params: &SearchParams,
        token: &CancellationToken,
        reporter: &ProgressReporter,
    ) -> Result<SearchOutcome, SearchError> {
        let task_id = reporter.task_id();

        // 1. BuildQuery
        if token.is_cancelled() {
            return Ok(self.halt(reporter, Stage::BuildQuery).await);
        }
        reporter
            .update(
                Stage::BuildQuery
                    .snapshot()
                    .with_message(format!("Building search query for {}", params.gene_symbol)),
            )
            .await;
        let query = SearchQuery::build(params, self.pipeline.filters())?;
        debug!(%task_id, expression = %query.expression, "query built");

        // 2. Search
        if token.is_cancelled() {
            return Ok(self.halt(reporter, Stage::Search).await);
        }
        reporter
            .update(
                Stage::Search
                    .snapshot()
                    .with_message(format!("Searching (max {} results)", params.max_results)),
            )
            .await;
        let ids = self
            .literature
            .search(&query, params.max_results)
            .await
            .map_err(SearchError::Search)?;
        info!(%task_id, gene = %query.gene_symbol, found = ids.len(), "literature search done");

        if ids.is_empty() {
            reporter
                .update(Stage::Done.snapshot().with_message("No papers found"))
                .await;
            return Ok(SearchOutcome::empty(false));
        }

        // 3. FetchMetadata
        if token.is_cancelled() {
            return Ok(self.halt(reporter, Stage::FetchMetadata).await);
        }
        let papers = self.fetch_all(&ids, reporter).await?;
        info!(%task_id, fetched = papers.len(), "metadata fetched");

        // 4. Screen
        if token.is_cancelled() {
            return Ok(self.halt(reporter, Stage::Screen).await);
        }
        let screened = self
            .screen(&query.gene_symbol, params.gene_id, papers, token, reporter)
            .await;
        let screened_count = screened.len();

        // 5. RankAndSelect, also after screening stopped early
        reporter
            .update(
                Stage::RankAndSelect
                    .snapshot()
                    .with_message("Filtering and ranking papers"),
            )
            .await;
        let (mut top, relevant) = rank_and_select(screened, params.top_n);
        info!(
            %task_id,
            screened = screened_count,
            relevant,
            selected = top.len(),
            "papers ranked"
        );

        // 6. ExtractFindings
        if !token.is_cancelled() && !top.is_empty() {
            self.extract(&mut top, token, reporter).await;
        }

        // 7. Done
        let cancelled = token.is_cancelled();
        let findings: Vec<Finding> = top.into_iter().map(|s| s.finding).collect();
        let label = if cancelled {
            "Search cancelled"
        } else {
            "Search completed"
        };
        reporter
            .update(
                ProgressSnapshot::new(label, Stage::Done.number(), TOTAL_STEPS)
                    .with_message(format!("Found {} top papers", findings.len())),
            )
            .await;
        info!(%task_id, findings = findings.len(), cancelled, "search finished");

        Ok(SearchOutcome {
            findings,
            cancelled,
            screened: screened_count,
            relevant,
        })
    }

    async fn halt(&self, reporter: &ProgressReporter, before: Stage) -> SearchOutcome {
        info!(task_id = %reporter.task_id(), stage = ?before, "search cancelled before stage");
        reporter
            .update(Stage::Done.snapshot().with_message("Search cancelled"))
            .await;
        SearchOutcome::empty(true)
    }

    async fn fetch_all(
        &self,
        ids: &[String],
        reporter: &ProgressReporter,
    ) -> Result<Vec<PaperMetadata>, SearchError> {
        let total = ids.len();
        let mut papers = Vec::with_capacity(total);
        let mut requested = 0;
        for batch in ids.chunks(self.pipeline.fetch_batch_size.max(1)) {
            reporter
                .update(
                    Stage::FetchMetadata
                        .snapshot()
                        .with_items(requested, total)
                        .with_message(format!("Fetching metadata for {total} papers")),
                )
                .await;
            let fetched = self
                .literature
                .fetch(batch)
                .await
                .map_err(SearchError::Fetch)?;
            papers.extend(fetched);
            requested += batch.len();
        }
        Ok(papers)
    }

    async fn screen(
        &self,
        gene_symbol: &str,
        gene_id: Option<u64>,
        papers: Vec<PaperMetadata>,
        token: &CancellationToken,
        reporter: &ProgressReporter,
    ) -> Vec<Screened> {
        let task_id = reporter.task_id();
        let total = papers.len();
        let today = self.clock.today();
        reporter
            .update(
                Stage::Screen
                    .snapshot()
                    .with_items(0, total)
                    .with_message("Starting paper screening"),
            )
            .await;

        let mut screened = Vec::with_capacity(total);
        for (idx, paper) in papers.into_iter().enumerate() {
            if token.is_cancelled() {
                info!(%task_id, screened = idx, total, "screening stopped by cancellation");
                break;
            }

            let verdict = self.score(&paper).await;
            debug!(
                %task_id,
                paper = %paper.id,
                score = verdict.score,
                relevant = verdict.relevant,
                "paper screened"
            );
            let finding = Finding::new(gene_symbol, gene_id, &paper, verdict, today);
            screened.push(Screened { paper, finding });

            reporter
                .update(
                    Stage::Screen
                        .snapshot()
                        .with_items(idx + 1, total)
                        .with_message(format!("Screened paper {}/{total}", idx + 1)),
                )
                .await;
        }
        screened
    }

    async fn score(&self, paper: &PaperMetadata) -> RelevanceVerdict {
        if paper.title.trim().is_empty() {
            return RelevanceVerdict::degraded("Missing title");
        }
        let scorer = Arc::clone(&self.scorer);
        let owned = paper.clone();
        match tokio::spawn(async move { scorer.score(&owned).await }).await {
            Ok(Ok(raw)) => RelevanceVerdict::from_raw(raw, self.pipeline.relevance_threshold),
            Ok(Err(err)) => {
                warn!(paper = %paper.id, error = %err, "relevance scoring failed; recording as not relevant");
                RelevanceVerdict::degraded(format!("Screening error: {err}"))
            }
            Err(join_err) => {
                warn!(paper = %paper.id, error = %join_err, "relevance scorer panicked; recording as not relevant");
                RelevanceVerdict::degraded(SCORER_PANICKED)
            }
        }
    }

    async fn extract(
        &self,
        top: &mut [Screened],
        token: &CancellationToken,
        reporter: &ProgressReporter,
    ) {
        let task_id = reporter.task_id();
        let total = top.len();
        reporter
            .update(
                Stage::ExtractFindings
                    .snapshot()
                    .with_items(0, total)
                    .with_message(format!("Extracting associations for top {total} papers")),
            )
            .await;

        for (idx, item) in top.iter_mut().enumerate() {
            if token.is_cancelled() {
                info!(%task_id, extracted = idx, total, "extraction stopped by cancellation");
                break;
            }

            let extractor = Arc::clone(&self.extractor);
            let paper = item.paper.clone();
            let associations =
                match tokio::spawn(async move { extractor.extract(&paper).await }).await {
                    Ok(Ok(raw)) => Associations::from_raw(raw),
                    Ok(Err(err)) => {
                        warn!(paper = %item.paper.id, error = %err, "association extraction failed");
                        Associations::not_specified()
                    }
                    Err(join_err) => {
                        warn!(paper = %item.paper.id, error = %join_err, "association extractor panicked");
                        Associations::not_specified()
                    }
                };
            item.finding.annotate(associations);

            reporter
                .update(
                    Stage::ExtractFindings
                        .snapshot()
                        .with_items(idx + 1, total)
                        .with_message(format!("Extracted associations for paper {}/{total}", idx + 1)),
                )
                .await;
        }
    }
}

/// Keep relevant findings, best score first, at most `top_n`.
///
/// Returns the selection and how many were relevant before truncation.
/// `sort_by` is stable, so equal scores keep discovery order.
fn rank_and_select(screened: Vec<Screened>, top_n: usize) -> (Vec<Screened>, usize) {
    let mut relevant: Vec<Screened> = screened
        .into_iter()
        .filter(|s| s.finding.relevant)
        .collect();
    let relevant_count = relevant.len();
    relevant.sort_by(|a, b| b.finding.score.total_cmp(&a.finding.score));
    relevant.truncate(top_n);
    (relevant, relevant_count)
}
