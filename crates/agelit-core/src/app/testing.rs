//! Scripted collaborators and wiring shared by the app-layer tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use super::orchestrator::SearchOrchestrator;
use super::registry::TaskRegistry;
use super::runner::SearchRunner;
use crate::config::PipelineConfig;
use crate::domain::{
    CollaboratorError, PaperMetadata, RawAssociations, RawVerdict, SearchQuery, TaskId, TaskView,
};
use crate::ports::{
    AssociationExtractor, Clock, LiteratureSearch, RelevanceScorer, SystemClock, UlidGenerator,
};

pub fn paper(id: &str) -> PaperMetadata {
    PaperMetadata::new(id, format!("Paper {id}"))
        .with_abstract(format!("Abstract of paper {id}."))
        .with_year(2020)
        .with_venue("Aging Cell")
}

/// Literature source over a fixed list; `search` returns every id in order.
#[derive(Default)]
pub struct ScriptedLiterature {
    papers: Vec<PaperMetadata>,
    search_error: Option<CollaboratorError>,
    fetch_error: Option<CollaboratorError>,
    search_calls: Arc<AtomicUsize>,
    fetch_calls: Arc<Mutex<Vec<usize>>>,
}

impl ScriptedLiterature {
    pub fn with_papers(papers: impl IntoIterator<Item = PaperMetadata>) -> Self {
        Self {
            papers: papers.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn failing_search(mut self, err: CollaboratorError) -> Self {
        self.search_error = Some(err);
        self
    }

    pub fn failing_fetch(mut self, err: CollaboratorError) -> Self {
        self.fetch_error = Some(err);
        self
    }

    pub fn search_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.search_calls)
    }

    /// Batch sizes of every fetch call.
    pub fn fetch_calls(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.fetch_calls)
    }
}

#[async_trait]
impl LiteratureSearch for ScriptedLiterature {
    async fn search(
        &self,
        _query: &SearchQuery,
        max_results: usize,
    ) -> Result<Vec<String>, CollaboratorError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.search_error {
            return Err(err.clone());
        }
        Ok(self
            .papers
            .iter()
            .take(max_results)
            .map(|p| p.id.clone())
            .collect())
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<PaperMetadata>, CollaboratorError> {
        self.fetch_calls.lock().unwrap().push(ids.len());
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.papers.iter().find(|p| &p.id == id).cloned())
            .collect())
    }
}

/// Literature source whose search panics.
pub struct PanickingLiterature;

#[async_trait]
impl LiteratureSearch for PanickingLiterature {
    async fn search(
        &self,
        _query: &SearchQuery,
        _max_results: usize,
    ) -> Result<Vec<String>, CollaboratorError> {
        panic!("literature source blew up");
    }

    async fn fetch(&self, _ids: &[String]) -> Result<Vec<PaperMetadata>, CollaboratorError> {
        Ok(Vec::new())
    }
}

/// Rendezvous between a test and a collaborator call in flight.
#[derive(Clone, Default)]
pub struct Gate {
    reached: Arc<Notify>,
    released: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn wait_reached(&self) {
        self.reached.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }

    async fn pass(&self) {
        self.reached.notify_one();
        self.released.notified().await;
    }
}

enum Script {
    Fixed(f64),
    ById(HashMap<String, f64>),
    Sequence(Vec<Result<RawVerdict, CollaboratorError>>),
}

pub struct ScriptedScorer {
    script: Script,
    calls: Arc<AtomicUsize>,
    gate: Option<(usize, Gate)>,
}

impl ScriptedScorer {
    fn from_script(script: Script) -> Self {
        Self {
            script,
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    /// Every paper relevant with the same score.
    pub fn fixed(score: f64) -> Self {
        Self::from_script(Script::Fixed(score))
    }

    /// Every listed paper relevant with its own score.
    pub fn by_id<'a>(scores: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        Self::from_script(Script::ById(
            scores.into_iter().map(|(id, s)| (id.to_string(), s)).collect(),
        ))
    }

    /// Responses handed out in call order.
    pub fn sequence(responses: Vec<Result<RawVerdict, CollaboratorError>>) -> Self {
        Self::from_script(Script::Sequence(responses))
    }

    /// Block the `nth` call (1-based) on `gate`.
    pub fn gated_at(mut self, nth: usize, gate: Gate) -> Self {
        self.gate = Some((nth, gate));
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

fn relevant(score: f64) -> RawVerdict {
    RawVerdict {
        relevant: Some(true),
        score: Some(score),
        reasoning: Some(format!("scripted {score}")),
    }
}

#[async_trait]
impl RelevanceScorer for ScriptedScorer {
    async fn score(&self, paper: &PaperMetadata) -> Result<RawVerdict, CollaboratorError> {
        let nth = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((gated, gate)) = &self.gate
            && *gated == nth
        {
            gate.pass().await;
        }
        match &self.script {
            Script::Fixed(score) => Ok(relevant(*score)),
            Script::ById(scores) => scores
                .get(&paper.id)
                .map(|s| relevant(*s))
                .ok_or_else(|| CollaboratorError::Malformed(format!("no score for {}", paper.id))),
            Script::Sequence(responses) => responses[(nth - 1) % responses.len()].clone(),
        }
    }
}

pub struct PanickingScorer;

#[async_trait]
impl RelevanceScorer for PanickingScorer {
    async fn score(&self, _paper: &PaperMetadata) -> Result<RawVerdict, CollaboratorError> {
        panic!("scorer blew up");
    }
}

pub struct StaticExtractor;

#[async_trait]
impl AssociationExtractor for StaticExtractor {
    async fn extract(&self, paper: &PaperMetadata) -> Result<RawAssociations, CollaboratorError> {
        Ok(RawAssociations {
            modification_effects: Some(format!("effects in {}", paper.id)),
            longevity_association: Some("extends lifespan".into()),
        })
    }
}

/// Extractor that remembers which papers it was asked about.
#[derive(Default)]
pub struct RecordingExtractor {
    seen: Arc<Mutex<Vec<String>>>,
    gate: Option<(usize, Gate)>,
}

impl RecordingExtractor {
    pub fn seen(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.seen)
    }

    /// Block the `nth` call (1-based) on `gate`, after it has been recorded.
    pub fn gated_at(mut self, nth: usize, gate: Gate) -> Self {
        self.gate = Some((nth, gate));
        self
    }
}

#[async_trait]
impl AssociationExtractor for RecordingExtractor {
    async fn extract(&self, paper: &PaperMetadata) -> Result<RawAssociations, CollaboratorError> {
        let nth = {
            let mut seen = self.seen.lock().unwrap();
            seen.push(paper.id.clone());
            seen.len()
        };
        if let Some((gated, gate)) = &self.gate
            && *gated == nth
        {
            gate.pass().await;
        }
        StaticExtractor.extract(paper).await
    }
}

pub struct PanickingExtractor;

#[async_trait]
impl AssociationExtractor for PanickingExtractor {
    async fn extract(&self, _paper: &PaperMetadata) -> Result<RawAssociations, CollaboratorError> {
        panic!("extractor blew up");
    }
}

pub struct FailingExtractor;

#[async_trait]
impl AssociationExtractor for FailingExtractor {
    async fn extract(&self, _paper: &PaperMetadata) -> Result<RawAssociations, CollaboratorError> {
        Err(CollaboratorError::Transport("connection reset".into()))
    }
}

pub struct Harness {
    pub registry: TaskRegistry,
    pub orchestrator: Arc<SearchOrchestrator>,
    pub runner: SearchRunner,
    literature: Arc<dyn LiteratureSearch>,
    scorer: Arc<dyn RelevanceScorer>,
    extractor: Arc<dyn AssociationExtractor>,
    clock: Arc<dyn Clock>,
}

impl Harness {
    pub fn set_fetch_batch_size(&mut self, size: usize) {
        let pipeline = PipelineConfig {
            fetch_batch_size: size,
            ..PipelineConfig::default()
        };
        self.orchestrator = Arc::new(SearchOrchestrator::new(
            Arc::clone(&self.literature),
            Arc::clone(&self.scorer),
            Arc::clone(&self.extractor),
            Arc::clone(&self.clock),
            pipeline,
        ));
        self.runner = SearchRunner::new(self.registry.clone(), Arc::clone(&self.orchestrator));
    }
}

pub fn harness(
    literature: impl LiteratureSearch + 'static,
    scorer: impl RelevanceScorer + 'static,
    extractor: impl AssociationExtractor + 'static,
) -> Harness {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let registry = TaskRegistry::new(
        Arc::clone(&clock),
        Arc::new(UlidGenerator::new(SystemClock)),
        chrono::Duration::hours(1),
    );
    let literature: Arc<dyn LiteratureSearch> = Arc::new(literature);
    let scorer: Arc<dyn RelevanceScorer> = Arc::new(scorer);
    let extractor: Arc<dyn AssociationExtractor> = Arc::new(extractor);
    let orchestrator = Arc::new(SearchOrchestrator::new(
        Arc::clone(&literature),
        Arc::clone(&scorer),
        Arc::clone(&extractor),
        Arc::clone(&clock),
        PipelineConfig::default(),
    ));
    let runner = SearchRunner::new(registry.clone(), Arc::clone(&orchestrator));
    Harness {
        registry,
        orchestrator,
        runner,
        literature,
        scorer,
        extractor,
        clock,
    }
}

/// Poll until `done` holds, panicking after five seconds.
pub async fn wait_until(
    registry: &TaskRegistry,
    task_id: TaskId,
    done: impl Fn(&TaskView) -> bool,
) -> TaskView {
    let poll = async {
        loop {
            if let Some(view) = registry.get_task(task_id).await
                && done(&view)
            {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), poll)
        .await
        .expect("task did not reach the expected state in time")
}

pub async fn wait_for_terminal(registry: &TaskRegistry, task_id: TaskId) -> TaskView {
    wait_until(registry, task_id, |v| v.status.is_terminal()).await
}
