//! Collaborator results: raw (as received) and normalised (as used).
//!
//! Scorers and extractors may be backed by a generative model whose output is
//! loosely structured. Their results arrive as `Raw*` structs with every field
//! optional and are normalised exactly once, here, before the pipeline sees
//! them.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::errors::CollaboratorError;

pub const NO_REASONING: &str = "No reasoning provided";
pub const NOT_SPECIFIED: &str = "Not specified";

/// Relevance judgement as returned by a scorer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVerdict {
    #[serde(default)]
    pub relevant: Option<bool>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Normalised relevance judgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceVerdict {
    pub relevant: bool,
    /// Always within `[0, 1]`.
    pub score: f64,
    pub reasoning: String,
}

impl RelevanceVerdict {
    /// Normalise a raw verdict.
    ///
    /// The score is clamped into `[0, 1]` (NaN and missing become `0.0`); a
    /// missing flag is derived from `score >= threshold`.
    pub fn from_raw(raw: RawVerdict, threshold: f64) -> Self {
        let score = match raw.score {
            Some(s) if s.is_nan() => 0.0,
            Some(s) => s.clamp(0.0, 1.0),
            None => 0.0,
        };
        let relevant = raw.relevant.unwrap_or(score >= threshold);
        let reasoning = raw
            .reasoning
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| NO_REASONING.to_string());
        Self {
            relevant,
            score,
            reasoning,
        }
    }

    /// Verdict recorded when the scorer could not produce one.
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self {
            relevant: false,
            score: 0.0,
            reasoning: reason.into(),
        }
    }
}

/// Structured findings as returned by an extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAssociations {
    #[serde(default)]
    pub modification_effects: Option<String>,
    #[serde(default)]
    pub longevity_association: Option<String>,
}

/// Normalised structured findings of one paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Associations {
    pub modification_effects: String,
    pub longevity_association: String,
}

impl Associations {
    pub fn from_raw(raw: RawAssociations) -> Self {
        fn or_unspecified(field: Option<String>) -> String {
            field
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| NOT_SPECIFIED.to_string())
        }
        Self {
            modification_effects: or_unspecified(raw.modification_effects),
            longevity_association: or_unspecified(raw.longevity_association),
        }
    }

    pub fn not_specified() -> Self {
        Self::from_raw(RawAssociations::default())
    }
}

/// Parse a JSON object out of generative-model text.
///
/// Tolerates surrounding prose and Markdown code fences by taking the span
/// from the first `{` to the last `}`.
pub fn parse_model_json<T: DeserializeOwned>(text: &str) -> Result<T, CollaboratorError> {
    let start = text.find('{');
    let end = text.rfind('}');
    let body = match (start, end) {
        (Some(s), Some(e)) if s < e => &text[s..=e],
        _ => {
            return Err(CollaboratorError::Malformed(format!(
                "no JSON object in response: {}",
                preview(text)
            )));
        }
    };
    serde_json::from_str(body).map_err(|e| {
        CollaboratorError::Malformed(format!("{e}. Raw: {}", preview(text)))
    })
}

fn preview(text: &str) -> String {
    text.chars().take(200).collect()
}
