//! Ports - abstraction layer.
//!
//! Every external dependency of the search core sits behind one of these
//! traits: the literature source, the two model-backed collaborators, time
//! and id generation. `impls` has in-process implementations; tests use
//! scripted ones.

pub mod clock;
pub mod id_generator;
pub mod literature;
pub mod scoring;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::literature::LiteratureSearch;
pub use self::scoring::{AssociationExtractor, RelevanceScorer};
