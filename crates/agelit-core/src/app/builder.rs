//! AppBuilder - wiring of collaborators, config and infrastructure.
//!
//! # Validation
//! - All three collaborators must be supplied
//! - The config must pass [`AppConfig::validate`]
//! - Clock and id generator fall back to the system defaults

use std::sync::Arc;

use super::orchestrator::SearchOrchestrator;
use super::reaper_loop::{ReaperHandle, ReaperLoop};
use super::registry::TaskRegistry;
use super::runner::SearchRunner;
use super::service::SearchService;
use crate::config::{AppConfig, ConfigError};
use crate::ports::{
    AssociationExtractor, Clock, IdGenerator, LiteratureSearch, RelevanceScorer, SystemClock,
    UlidGenerator,
};

/// # Example
/// ```ignore
/// let app = AppBuilder::new()
///     .literature(corpus)
///     .scorer(LexicalScorer::default())
///     .extractor(LexicalExtractor)
///     .config(config)
///     .build()?;
/// let reaper = app.spawn_reaper();
/// ```
pub struct AppBuilder {
    literature: Option<Arc<dyn LiteratureSearch>>,
    scorer: Option<Arc<dyn RelevanceScorer>>,
    extractor: Option<Arc<dyn AssociationExtractor>>,
    config: AppConfig,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing collaborator: {0}. Supply it before calling build().")]
    MissingCollaborator(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            literature: None,
            scorer: None,
            extractor: None,
            config: AppConfig::default(),
            clock: None,
            ids: None,
        }
    }

    pub fn literature(mut self, literature: impl LiteratureSearch + 'static) -> Self {
        self.literature = Some(Arc::new(literature));
        self
    }

    pub fn scorer(mut self, scorer: impl RelevanceScorer + 'static) -> Self {
        self.scorer = Some(Arc::new(scorer));
        self
    }

    pub fn extractor(mut self, extractor: impl AssociationExtractor + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Defaults to a [`UlidGenerator`] on the builder's clock.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        let literature = self
            .literature
            .ok_or(BuildError::MissingCollaborator("literature search"))?;
        let scorer = self
            .scorer
            .ok_or(BuildError::MissingCollaborator("relevance scorer"))?;
        let extractor = self
            .extractor
            .ok_or(BuildError::MissingCollaborator("association extractor"))?;
        self.config.validate()?;

        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };
        let ids: Arc<dyn IdGenerator> = match self.ids {
            Some(ids) => ids,
            None => Arc::new(UlidGenerator::new(Arc::clone(&clock))),
        };

        let registry = TaskRegistry::new(
            Arc::clone(&clock),
            ids,
            self.config.registry.retention(),
        );
        let orchestrator = Arc::new(SearchOrchestrator::new(
            literature,
            scorer,
            extractor,
            clock,
            self.config.pipeline.clone(),
        ));
        let runner = SearchRunner::new(registry.clone(), orchestrator);
        let service = SearchService::new(runner, self.config.search.clone());

        Ok(App {
            config: self.config,
            registry,
            service,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A wired application.
pub struct App {
    config: AppConfig,
    registry: TaskRegistry,
    service: SearchService,
}

impl App {
    pub fn service(&self) -> &SearchService {
        &self.service
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Start the reaper on the configured interval. Needs a tokio runtime.
    pub fn spawn_reaper(&self) -> ReaperHandle {
        ReaperLoop::spawn(self.registry.clone(), self.config.registry.reap_interval())
    }
}
