//! Findings: screened papers as returned to clients.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::paper::PaperMetadata;
use super::verdict::{Associations, RelevanceVerdict};

/// One ranked search result.
///
/// The two extracted fields are only present on papers that made the top-N
/// and were reached by the extraction stage before any cancellation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub gene_symbol: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_id: Option<u64>,

    pub paper_id: String,
    pub title: String,
    pub year: Option<i32>,
    pub venue: String,

    /// Relevance score in `[0, 1]`.
    pub score: f64,
    pub relevant: bool,
    pub reasoning: String,

    /// Date the search was performed.
    pub retrieved_on: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_effects: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longevity_association: Option<String>,
}

impl Finding {
    pub fn new(
        gene_symbol: &str,
        gene_id: Option<u64>,
        paper: &PaperMetadata,
        verdict: RelevanceVerdict,
        retrieved_on: NaiveDate,
    ) -> Self {
        Self {
            gene_symbol: gene_symbol.to_string(),
            gene_id,
            paper_id: paper.id.clone(),
            title: paper.title.clone(),
            year: paper.year,
            venue: paper.venue.clone(),
            score: verdict.score,
            relevant: verdict.relevant,
            reasoning: verdict.reasoning,
            retrieved_on,
            url: paper.url(),
            modification_effects: None,
            longevity_association: None,
        }
    }

    pub fn annotate(&mut self, associations: Associations) {
        self.modification_effects = Some(associations.modification_effects);
        self.longevity_association = Some(associations.longevity_association);
    }

    pub fn is_annotated(&self) -> bool {
        self.modification_effects.is_some() && self.longevity_association.is_some()
    }
}
