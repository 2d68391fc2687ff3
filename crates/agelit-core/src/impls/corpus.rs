//! InMemoryCorpus - a literature source backed by a JSON file of papers.
//!
//! The file is an array of paper records. Each record may also name the
//! genes it covers and carry raw model responses recorded from an earlier
//! online run, which the replay collaborators serve back.
//!
//! ```json
//! [{"id": "31415", "title": "...", "abstract": "...", "year": "2019 Mar",
//!   "venue": "Aging Cell", "keywords": ["Longevity"], "genes": ["NFE2L2"],
//!   "recorded_screening": "{\"relevant\": true, \"score\": 0.8, ...}"}]
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{CollaboratorError, PaperMetadata, SearchQuery};
use crate::ports::LiteratureSearch;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("cannot read corpus {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse corpus: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate paper id in corpus: {0}")]
    DuplicateId(String),
}

/// One paper in the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    #[serde(flatten)]
    pub paper: PaperMetadata,

    /// Gene symbols the paper is indexed under, in addition to text matches.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genes: Vec<String>,

    /// Raw relevance-screening response text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_screening: Option<String>,

    /// Raw association-extraction response text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_associations: Option<String>,
}

impl CorpusEntry {
    pub fn new(paper: PaperMetadata) -> Self {
        Self {
            paper,
            genes: Vec::new(),
            recorded_screening: None,
            recorded_associations: None,
        }
    }

    pub fn with_gene(mut self, symbol: impl Into<String>) -> Self {
        self.genes.push(symbol.into());
        self
    }

    pub fn with_recorded_screening(mut self, raw: impl Into<String>) -> Self {
        self.recorded_screening = Some(raw.into());
        self
    }

    pub fn with_recorded_associations(mut self, raw: impl Into<String>) -> Self {
        self.recorded_associations = Some(raw.into());
        self
    }

    /// Tagged with `symbol`, or mentions it as a whole word in title,
    /// abstract or keywords. Case-insensitive.
    fn mentions(&self, symbol: &str) -> bool {
        if self.genes.iter().any(|g| g.eq_ignore_ascii_case(symbol)) {
            return true;
        }
        let paper = &self.paper;
        contains_word(&paper.title, symbol)
            || contains_word(&paper.abstract_text, symbol)
            || paper.keywords.iter().any(|k| contains_word(k, symbol))
    }
}

fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .any(|token| token.eq_ignore_ascii_case(word))
}

/// Literature source over a fixed set of papers, in file order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCorpus {
    entries: Vec<CorpusEntry>,
    by_id: HashMap<String, usize>,
}

impl InMemoryCorpus {
    pub fn from_entries(entries: Vec<CorpusEntry>) -> Result<Self, CorpusError> {
        let mut by_id = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if by_id.insert(entry.paper.id.clone(), idx).is_some() {
                return Err(CorpusError::DuplicateId(entry.paper.id.clone()));
            }
        }
        Ok(Self { entries, by_id })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CorpusError> {
        Self::from_entries(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CorpusEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&CorpusEntry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }
}

#[async_trait]
impl LiteratureSearch for InMemoryCorpus {
    async fn search(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<Vec<String>, CollaboratorError> {
        let ids: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.mentions(&query.gene_symbol))
            .take(max_results)
            .map(|entry| entry.paper.id.clone())
            .collect();
        debug!(gene = %query.gene_symbol, hits = ids.len(), "corpus search");
        Ok(ids)
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<PaperMetadata>, CollaboratorError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.get(id))
            .map(|entry| entry.paper.clone())
            .collect())
    }
}
