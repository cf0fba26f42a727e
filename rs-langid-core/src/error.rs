//! Error type shared by every detection component.

use thiserror::Error;

use crate::language::Language;
use crate::model::ngram::NgramOrder;

/// Unified error returned by configuration, model loading and detection.
///
/// Degenerate input (no letters) and unseen n-grams are *not* errors: they
/// yield "unknown" or are absorbed by smoothing.
#[derive(Debug, Error)]
pub enum DetectionError {
	#[error("Unsupported language: {0}")]
	UnsupportedLanguage(String),

	#[error("Invalid configuration: {0}")]
	InvalidConfig(String),

	#[error("Invalid n-gram '{0}': length must be between 1 and 5 characters")]
	InvalidNgram(String),

	#[error("No language model available for {language:?}: {reason}")]
	ModelUnavailable { language: Language, reason: String },

	#[error("Malformed {order:?} model for {language:?}: {reason}")]
	MalformedModel {
		language: Language,
		order: NgramOrder,
		reason: String,
	},

	#[error("Model cache error: {0}")]
	Cache(String),

	#[error("Lock poisoned: {0}")]
	LockPoisoned(&'static str),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error("Serialization error: {0}")]
	Postcard(#[from] postcard::Error),
}
