//! Paper metadata as returned by the metadata-fetch collaborator.

use serde::{Deserialize, Deserializer, Serialize};

/// Metadata of one paper.
///
/// Missing abstract, venue or keywords deserialize to empty defaults rather
/// than errors; a missing or unparseable year becomes `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperMetadata {
    /// Source identifier (a PubMed id for PubMed-backed sources).
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, rename = "abstract")]
    pub abstract_text: String,

    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<i32>,

    #[serde(default)]
    pub venue: String,

    /// MeSH headings or author keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl PaperMetadata {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            abstract_text: String::new(),
            year: None,
            venue: String::new(),
            keywords: Vec::new(),
        }
    }

    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_text = text.into();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = venue.into();
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Canonical PubMed link, only for numeric ids.
    pub fn url(&self) -> Option<String> {
        let numeric = !self.id.is_empty() && self.id.bytes().all(|b| b.is_ascii_digit());
        numeric.then(|| format!("https://pubmed.ncbi.nlm.nih.gov/{}/", self.id))
    }
}

/// Extract the year from a publication date such as `"2019 Mar 5"`.
pub fn parse_year(date: &str) -> Option<i32> {
    let head = date.split_whitespace().next()?;
    let digits = head.get(..4)?;
    digits.parse().ok()
}

fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YearRepr {
        Number(i32),
        Text(String),
    }

    let repr = Option::<YearRepr>::deserialize(deserializer)?;
    Ok(match repr {
        Some(YearRepr::Number(n)) => Some(n),
        Some(YearRepr::Text(s)) => parse_year(&s),
        None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2019 Mar 5", Some(2019))]
    #[case("2021", Some(2021))]
    #[case("2003-07", Some(2003))]
    #[case("", None)]
    #[case("Spring", None)]
    fn year_from_publication_date(#[case] date: &str, #[case] expected: Option<i32>) {
        assert_eq!(parse_year(date), expected);
    }

    #[test]
    fn sparse_record_gets_defaults() {
        let paper: PaperMetadata =
            serde_json::from_str(r#"{"id": "123", "title": "T", "year": "2011 Jan"}"#).unwrap();
        assert_eq!(paper.year, Some(2011));
        assert!(paper.abstract_text.is_empty());
        assert!(paper.keywords.is_empty());
        assert!(paper.venue.is_empty());
    }

    #[test]
    fn numeric_year_and_abstract_field_name() {
        let paper: PaperMetadata = serde_json::from_str(
            r#"{"id": "9", "title": "T", "abstract": "A", "year": 1999, "keywords": ["Aging"]}"#,
        )
        .unwrap();
        assert_eq!(paper.year, Some(1999));
        assert_eq!(paper.abstract_text, "A");
        assert_eq!(paper.keywords, vec!["Aging".to_string()]);
    }

    #[test]
    fn url_only_for_numeric_ids() {
        assert_eq!(
            PaperMetadata::new("31415", "x").url().as_deref(),
            Some("https://pubmed.ncbi.nlm.nih.gov/31415/")
        );
        assert_eq!(PaperMetadata::new("doi:10.1/x", "x").url(), None);
        assert_eq!(PaperMetadata::new("", "x").url(), None);
    }
}
