//! Replay of recorded model responses.
//!
//! Corpus entries may carry the raw text a generative model returned for
//! them. These collaborators parse that text exactly like a live response
//! would be parsed, so a malformed recording surfaces as a malformed
//! response. Papers without a recording fall back to the lexical versions.

use std::collections::HashMap;

use async_trait::async_trait;

use super::corpus::InMemoryCorpus;
use super::lexical::{LexicalExtractor, LexicalScorer};
use crate::domain::verdict::parse_model_json;
use crate::domain::{CollaboratorError, PaperMetadata, RawAssociations, RawVerdict};
use crate::ports::{AssociationExtractor, RelevanceScorer};

pub struct ReplayScorer {
    recorded: HashMap<String, String>,
    fallback: LexicalScorer,
}

impl ReplayScorer {
    pub fn from_corpus(corpus: &InMemoryCorpus) -> Self {
        let recorded = corpus
            .entries()
            .iter()
            .filter_map(|e| Some((e.paper.id.clone(), e.recorded_screening.clone()?)))
            .collect();
        Self {
            recorded,
            fallback: LexicalScorer,
        }
    }

    pub fn recorded_count(&self) -> usize {
        self.recorded.len()
    }
}

#[async_trait]
impl RelevanceScorer for ReplayScorer {
    async fn score(&self, paper: &PaperMetadata) -> Result<RawVerdict, CollaboratorError> {
        match self.recorded.get(&paper.id) {
            Some(raw) => parse_model_json(raw),
            None => self.fallback.score(paper).await,
        }
    }
}

pub struct ReplayExtractor {
    recorded: HashMap<String, String>,
    fallback: LexicalExtractor,
}

impl ReplayExtractor {
    pub fn from_corpus(corpus: &InMemoryCorpus) -> Self {
        let recorded = corpus
            .entries()
            .iter()
            .filter_map(|e| Some((e.paper.id.clone(), e.recorded_associations.clone()?)))
            .collect();
        Self {
            recorded,
            fallback: LexicalExtractor,
        }
    }
}

#[async_trait]
impl AssociationExtractor for ReplayExtractor {
    async fn extract(&self, paper: &PaperMetadata) -> Result<RawAssociations, CollaboratorError> {
        match self.recorded.get(&paper.id) {
            Some(raw) => parse_model_json(raw),
            None => self.fallback.extract(paper).await,
        }
    }
}
