//! Deterministic term-matching collaborators.
//!
//! Used offline and as the fallback when no recorded model response exists.
//! A paper is relevant when it mentions both a sequence modification and an
//! aging phenotype; experimental-system terms only nudge the score.

use async_trait::async_trait;

use crate::domain::{CollaboratorError, PaperMetadata, RawAssociations, RawVerdict};
use crate::ports::{AssociationExtractor, RelevanceScorer};

const MODIFICATION_TERMS: &[&str] = &[
    "mutation",
    "mutant",
    "variant",
    "polymorphism",
    "snp",
    "substitution",
    "deletion",
    "knockout",
    "truncat",
    "phosphorylation",
    "acetylation",
    "post-translational",
];

const LONGEVITY_TERMS: &[&str] = &[
    "aging",
    "ageing",
    "longevity",
    "lifespan",
    "life span",
    "healthspan",
    "senescence",
    "centenarian",
    "age-related",
    "rejuvenation",
];

const EXPERIMENTAL_TERMS: &[&str] = &[
    "mice",
    "mouse",
    "elegans",
    "drosophila",
    "yeast",
    "cohort",
    "transgenic",
    "in vivo",
];

const MODIFICATION_WEIGHT: f64 = 0.45;
const LONGEVITY_WEIGHT: f64 = 0.45;
const EXPERIMENTAL_WEIGHT: f64 = 0.10;

fn matched<'a>(text: &str, terms: &[&'a str]) -> Vec<&'a str> {
    terms.iter().copied().filter(|t| text.contains(t)).collect()
}

fn searchable_text(paper: &PaperMetadata) -> String {
    let mut text = format!("{} {}", paper.title, paper.abstract_text);
    for keyword in &paper.keywords {
        text.push(' ');
        text.push_str(keyword);
    }
    text.to_lowercase()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

#[async_trait]
impl RelevanceScorer for LexicalScorer {
    async fn score(&self, paper: &PaperMetadata) -> Result<RawVerdict, CollaboratorError> {
        let text = searchable_text(paper);
        let modification = matched(&text, MODIFICATION_TERMS);
        let longevity = matched(&text, LONGEVITY_TERMS);
        let experimental = matched(&text, EXPERIMENTAL_TERMS);

        let mut score = 0.0;
        if !modification.is_empty() {
            score += MODIFICATION_WEIGHT;
        }
        if !longevity.is_empty() {
            score += LONGEVITY_WEIGHT;
        }
        if !experimental.is_empty() {
            score += EXPERIMENTAL_WEIGHT;
        }

        let reasoning = if modification.is_empty() && longevity.is_empty() {
            "No modification or aging terms found".to_string()
        } else {
            format!(
                "Modification terms: [{}]; aging terms: [{}]; experimental terms: [{}]",
                modification.join(", "),
                longevity.join(", "),
                experimental.join(", ")
            )
        };

        Ok(RawVerdict {
            relevant: Some(!modification.is_empty() && !longevity.is_empty()),
            score: Some(score),
            reasoning: Some(reasoning),
        })
    }
}

/// Picks the first abstract sentence mentioning each kind of term.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalExtractor;

fn first_sentence_with(sentences: &[&str], terms: &[&str]) -> Option<String> {
    sentences
        .iter()
        .find(|s| {
            let lower = s.to_lowercase();
            terms.iter().any(|t| lower.contains(t))
        })
        .map(|s| s.trim().to_string())
}

#[async_trait]
impl AssociationExtractor for LexicalExtractor {
    async fn extract(&self, paper: &PaperMetadata) -> Result<RawAssociations, CollaboratorError> {
        let sentences: Vec<&str> = paper
            .abstract_text
            .split_inclusive(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .collect();
        Ok(RawAssociations {
            modification_effects: first_sentence_with(&sentences, MODIFICATION_TERMS),
            longevity_association: first_sentence_with(&sentences, LONGEVITY_TERMS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Associations, RelevanceVerdict};
    use rstest::rstest;

    fn paper(title: &str, abstract_text: &str) -> PaperMetadata {
        PaperMetadata::new("1", title).with_abstract(abstract_text)
    }

    #[rstest]
    #[case::both_and_model(
        "A FOXO3 variant extends lifespan",
        "Transgenic mice were studied.",
        1.0,
        true
    )]
    #[case::both("SNP in SIRT6", "Linked to longevity in humans.", 0.9, true)]
    #[case::aging_only("Aging of the liver", "A review of hepatic changes.", 0.45, false)]
    #[case::nothing("Cell culture protocol", "Buffers and reagents.", 0.0, false)]
    #[tokio::test]
    async fn scores_by_term_category(
        #[case] title: &str,
        #[case] abstract_text: &str,
        #[case] score: f64,
        #[case] relevant: bool,
    ) {
        let raw = LexicalScorer.score(&paper(title, abstract_text)).await.unwrap();
        let verdict = RelevanceVerdict::from_raw(raw, 0.5);
        assert!((verdict.score - score).abs() < 1e-9);
        assert_eq!(verdict.relevant, relevant);
    }

    #[tokio::test]
    async fn keywords_count_and_reasoning_lists_terms() {
        let p = PaperMetadata::new("1", "Study").with_keywords(["Mutation", "Aging"]);
        let raw = LexicalScorer.score(&p).await.unwrap();
        let reasoning = raw.reasoning.unwrap();
        assert!(reasoning.contains("mutation"));
        assert!(reasoning.contains("aging"));
    }

    #[tokio::test]
    async fn extracts_first_matching_sentences() {
        let p = paper(
            "t",
            "We sequenced 300 people. The R211 substitution impairs DNA binding! \
             Carriers show extended lifespan. Aging is complex.",
        );
        let raw = LexicalExtractor.extract(&p).await.unwrap();
        let a = Associations::from_raw(raw);
        assert_eq!(a.modification_effects, "The R211 substitution impairs DNA binding!");
        assert_eq!(a.longevity_association, "Carriers show extended lifespan.");
    }

    #[tokio::test]
    async fn empty_abstract_is_not_specified() {
        let raw = LexicalExtractor.extract(&paper("t", "")).await.unwrap();
        assert_eq!(Associations::from_raw(raw), Associations::not_specified());
    }
}
