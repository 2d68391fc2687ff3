//! Impls - in-process implementations of the ports.
//!
//! # Implementations
//! - **InMemoryCorpus**: literature source over a JSON file of papers
//! - **LexicalScorer** / **LexicalExtractor**: deterministic term matching
//! - **ReplayScorer** / **ReplayExtractor**: recorded model responses, lexical fallback
//!
//! Network-backed collaborators (PubMed E-utilities, a hosted model) plug in
//! through the same traits from outside this crate.

pub mod corpus;
pub mod lexical;
pub mod replay;

pub use self::corpus::{CorpusEntry, CorpusError, InMemoryCorpus};
pub use self::lexical::{LexicalExtractor, LexicalScorer};
pub use self::replay::{ReplayExtractor, ReplayScorer};
