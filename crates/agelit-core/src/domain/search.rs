//! Search request parameters.

use serde::{Deserialize, Serialize};

use super::errors::SearchError;

pub const DEFAULT_MAX_RESULTS: usize = 200;
pub const DEFAULT_TOP_N: usize = 20;
pub const MAX_RESULTS_LIMIT: usize = 1000;
pub const TOP_N_LIMIT: usize = 100;

/// Parameters of one gene literature search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Gene symbol, e.g. `NFE2L2`.
    pub gene_symbol: String,

    /// NCBI (Entrez) gene id, carried through to every finding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_id: Option<u64>,

    /// Cap on identifiers requested from the literature source.
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// How many ranked, relevant papers receive extraction and are returned.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Add cellular-reprogramming and rejuvenation terms to the query.
    #[serde(default, alias = "include_reprogramming")]
    pub include_extra_terms: bool,

    /// Extra terms, OR-ed together and AND-ed onto the query.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_terms: Vec<String>,
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

impl SearchParams {
    pub fn new(gene_symbol: impl Into<String>) -> Self {
        Self {
            gene_symbol: gene_symbol.into(),
            gene_id: None,
            max_results: DEFAULT_MAX_RESULTS,
            top_n: DEFAULT_TOP_N,
            include_extra_terms: false,
            custom_terms: Vec::new(),
        }
    }

    pub fn with_gene_id(mut self, gene_id: u64) -> Self {
        self.gene_id = Some(gene_id);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_extra_terms(mut self, include: bool) -> Self {
        self.include_extra_terms = include;
        self
    }

    pub fn with_custom_term(mut self, term: impl Into<String>) -> Self {
        self.custom_terms.push(term.into());
        self
    }

    /// Range checks applied before a task is created.
    ///
    /// The gene symbol itself is checked later, when the query is built.
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.max_results) {
            return Err(SearchError::InvalidParams(format!(
                "max_results must be within 1..={MAX_RESULTS_LIMIT}, got {}",
                self.max_results
            )));
        }
        if !(1..=TOP_N_LIMIT).contains(&self.top_n) {
            return Err(SearchError::InvalidParams(format!(
                "top_n must be within 1..={TOP_N_LIMIT}, got {}",
                self.top_n
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn minimal_request_gets_defaults() {
        let p: SearchParams = serde_json::from_str(r#"{"gene_symbol": "SIRT6"}"#).unwrap();
        assert_eq!(p.max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(p.top_n, DEFAULT_TOP_N);
        assert!(!p.include_extra_terms);
        assert!(p.custom_terms.is_empty());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn legacy_flag_name_is_accepted() {
        let p: SearchParams =
            serde_json::from_str(r#"{"gene_symbol": "MYC", "include_reprogramming": true}"#)
                .unwrap();
        assert!(p.include_extra_terms);
    }

    #[rstest]
    #[case::zero_results(0, 20)]
    #[case::too_many_results(1001, 20)]
    #[case::zero_top_n(200, 0)]
    #[case::too_large_top_n(200, 101)]
    fn out_of_range_is_rejected(#[case] max_results: usize, #[case] top_n: usize) {
        let p = SearchParams::new("APOE")
            .with_max_results(max_results)
            .with_top_n(top_n);
        assert!(matches!(p.validate(), Err(SearchError::InvalidParams(_))));
    }

    #[rstest]
    #[case(1, 1)]
    #[case(1000, 100)]
    fn bounds_are_inclusive(#[case] max_results: usize, #[case] top_n: usize) {
        let p = SearchParams::new("APOE")
            .with_max_results(max_results)
            .with_top_n(top_n);
        assert!(p.validate().is_ok());
    }
}
