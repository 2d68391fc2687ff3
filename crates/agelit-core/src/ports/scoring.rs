//! Scoring ports - relevance screening and structured extraction.
//!
//! Both return raw, optional-field results. The orchestrator normalises them
//! and turns an `Err` into a degraded record for that one paper.
//!
//! # Implementations
//! - **LexicalScorer** / **LexicalExtractor**: term matching
//! - **ReplayScorer** / **ReplayExtractor**: recorded model responses

use async_trait::async_trait;

use crate::domain::{CollaboratorError, PaperMetadata, RawAssociations, RawVerdict};

/// Judges whether a paper links a sequence change to an aging phenotype.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    async fn score(&self, paper: &PaperMetadata) -> Result<RawVerdict, CollaboratorError>;
}

/// Summarises modification effects and longevity association of a paper.
#[async_trait]
pub trait AssociationExtractor: Send + Sync {
    async fn extract(&self, paper: &PaperMetadata) -> Result<RawAssociations, CollaboratorError>;
}
