//! N-gram-based natural language detection library.
//!
//! This crate identifies the language of short, noisy texts including:
//! - Script and diagnostic character rules that settle or narrow the candidates
//! - Character n-gram models (orders 1 to 5) loaded lazily per language
//! - In-memory and disk-backed model caches
//! - Smoothed log-probability scoring and ranked confidence values
//!
//! Most callers only need [`LanguageDetector`], [`DetectorConfig`] and
//! [`Language`].

/// Writing systems and the classification of characters into them.
pub mod alphabet;

/// The closed set of supported languages.
pub mod language;

/// Static tables of unique and shared diagnostic characters.
pub mod rules;

/// Input normalization and word splitting.
pub mod text;

/// Candidate sets and the rule-based language filter.
pub mod filter;

/// Error type shared by every component.
pub mod error;

/// N-gram models, model sources, caches and lazy lookups.
pub mod model;

/// The detection engine and its configuration.
pub mod detector;

/// I/O utilities (file loading, path helpers, atomic writes).
///
/// Not exposed
pub(crate) mod io;

pub use alphabet::Alphabet;
pub use detector::confidence::ConfidenceValues;
pub use detector::config::{CachePolicy, DetectorConfig};
pub use detector::language_detector::LanguageDetector;
pub use error::DetectionError;
pub use filter::CandidateSet;
pub use language::Language;
pub use model::ngram::{Ngram, NgramOrder};
pub use model::source::{DirectorySource, MemorySource, ModelSource};
