//! Literature query construction.
//!
//! A query links the gene to two term groups: an aging phenotype and a
//! sequence-level modification. The result is deterministic in its inputs.

use serde::{Deserialize, Serialize};

use super::errors::SearchError;
use super::search::SearchParams;

const PHENOTYPE_TERMS: &[&str] = &[
    "aging",
    "ageing",
    "longevity",
    "lifespan",
    "\"life span\"",
    "senescence",
    "centenarian*",
    "\"healthy aging\"",
];

const EXTRA_PHENOTYPE_TERMS: &[&str] = &[
    "reprogramming",
    "rejuvenation",
    "\"Yamanaka factors\"",
    "\"partial reprogramming\"",
];

const MODIFICATION_TERMS: &[&str] = &[
    "mutation",
    "variant",
    "polymorphism",
    "substitution",
    "\"post-translational modification\"",
    "phosphorylation",
    "acetylation",
    "deletion",
    "domain",
];

/// Filters appended after the domain expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilters {
    pub exclude_reviews: bool,
    pub free_full_text_only: bool,
}

impl Default for QueryFilters {
    fn default() -> Self {
        Self {
            exclude_reviews: true,
            free_full_text_only: true,
        }
    }
}

/// A built search expression plus the gene it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub gene_symbol: String,
    pub expression: String,
}

impl SearchQuery {
    pub fn build(params: &SearchParams, filters: QueryFilters) -> Result<Self, SearchError> {
        let symbol = params.gene_symbol.trim();
        if !is_valid_symbol(symbol) {
            return Err(SearchError::InvalidGene(params.gene_symbol.clone()));
        }

        let mut phenotype: Vec<&str> = PHENOTYPE_TERMS.to_vec();
        if params.include_extra_terms {
            phenotype.extend_from_slice(EXTRA_PHENOTYPE_TERMS);
        }

        let mut expression = format!(
            "(\"{symbol}\"[Title/Abstract] OR \"{symbol}\"[Gene Name]) AND ({}) AND ({})",
            phenotype.join(" OR "),
            MODIFICATION_TERMS.join(" OR "),
        );

        let custom: Vec<String> = params
            .custom_terms
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(quote_if_phrase)
            .collect();
        if !custom.is_empty() {
            expression.push_str(&format!(" AND ({})", custom.join(" OR ")));
        }

        if filters.exclude_reviews {
            expression.push_str(" NOT Review[Publication Type]");
        }
        if filters.free_full_text_only {
            expression.push_str(" AND free full text[Filter]");
        }

        Ok(Self {
            gene_symbol: symbol.to_string(),
            expression,
        })
    }
}

fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/'))
}

fn quote_if_phrase(term: &str) -> String {
    if term.contains(char::is_whitespace) && !term.starts_with('"') {
        format!("\"{term}\"")
    } else {
        term.to_string()
    }
}
