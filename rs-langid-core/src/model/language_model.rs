use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::DetectionError;
use crate::language::Language;
use crate::model::ngram::NgramOrder;

/// Relative frequencies of the n-grams of one order in one language.
///
/// # Responsibilities
/// - Parse and validate trained frequency tables
/// - Answer frequency lookups for a single n-gram
///
/// # Invariants
/// - Every key holds exactly `order.value()` characters
/// - Every frequency lies in `(0, 1]`
/// - A missing key means "never observed", not a zero frequency
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LanguageModel {
	language: Language,
	order: NgramOrder,
	frequencies: HashMap<String, f64>,
}

/// On-disk layout of a trained model file.
///
/// ```json
/// { "language": "ENGLISH", "ngrams": { "3/100": "a e", "1/100": "z" } }
/// ```
#[derive(Deserialize)]
struct JsonModel {
	language: Language,
	ngrams: HashMap<String, String>,
}

impl LanguageModel {
	/// Creates a model without any observed n-gram.
	pub fn empty(language: Language, order: NgramOrder) -> Self {
		Self { language, order, frequencies: HashMap::new() }
	}

	/// Builds a model from `(ngram, frequency)` pairs.
	///
	/// # Errors
	/// Returns `MalformedModel` if an n-gram has the wrong length or a
	/// frequency is outside `(0, 1]`.
	pub fn from_frequencies<I, S>(language: Language, order: NgramOrder, entries: I) -> Result<Self, DetectionError>
	where
		I: IntoIterator<Item = (S, f64)>,
		S: Into<String>,
	{
		let mut model = Self::empty(language, order);
		for (ngram, frequency) in entries {
			model.insert(ngram.into(), frequency)?;
		}
		Ok(model)
	}

	/// Parses a trained model file.
	///
	/// Keys of `ngrams` are fractions `numerator/denominator`, values list
	/// every n-gram with that frequency separated by spaces.
	///
	/// # Errors
	/// - `Json` if the document cannot be parsed.
	/// - `MalformedModel` if the file belongs to another language, a fraction
	///   is invalid, or an entry breaks the model invariants.
	pub fn from_json(language: Language, order: NgramOrder, json: &str) -> Result<Self, DetectionError> {
		let document: JsonModel = serde_json::from_str(json)?;
		if document.language != language {
			return Err(malformed(language, order, format!("file belongs to {}", document.language)));
		}

		let mut model = Self::empty(language, order);
		for (fraction, ngrams) in &document.ngrams {
			let frequency = parse_fraction(fraction)
				.ok_or_else(|| malformed(language, order, format!("invalid fraction '{}'", fraction)))?;
			for ngram in ngrams.split_whitespace() {
				model.insert(ngram.to_owned(), frequency)?;
			}
		}
		Ok(model)
	}

	pub(crate) fn insert(&mut self, ngram: String, frequency: f64) -> Result<(), DetectionError> {
		if ngram.chars().count() != self.order.value() {
			return Err(malformed(self.language, self.order, format!("n-gram '{}' has the wrong length", ngram)));
		}
		if !(frequency > 0.0 && frequency <= 1.0) {
			return Err(malformed(
				self.language,
				self.order,
				format!("frequency {} of '{}' is outside (0, 1]", frequency, ngram),
			));
		}
		self.frequencies.insert(ngram, frequency);
		Ok(())
	}

	/// Returns the relative frequency of `ngram`, or `None` if it was never observed.
	pub fn relative_frequency(&self, ngram: &str) -> Option<f64> {
		self.frequencies.get(ngram).copied()
	}

	pub fn language(&self) -> Language {
		self.language
	}

	pub fn order(&self) -> NgramOrder {
		self.order
	}

	/// Content hash of the model: equal models have equal fingerprints.
	pub fn fingerprint(&self) -> String {
		let mut entries: Vec<(&String, &f64)> = self.frequencies.iter().collect();
		entries.sort_by(|a, b| a.0.cmp(b.0));

		let mut hasher = Sha256::new();
		hasher.update(self.language.iso_code().as_bytes());
		hasher.update([self.order.value() as u8]);
		for (ngram, frequency) in entries {
			hasher.update(ngram.as_bytes());
			hasher.update([0u8]);
			hasher.update(frequency.to_bits().to_le_bytes());
		}
		format!("model:{:x}", hasher.finalize())
	}

	/// Number of observed n-grams.
	pub fn len(&self) -> usize {
		self.frequencies.len()
	}

	pub fn is_empty(&self) -> bool {
		self.frequencies.is_empty()
	}
}

fn malformed(language: Language, order: NgramOrder, reason: String) -> DetectionError {
	DetectionError::MalformedModel { language, order, reason }
}

fn parse_fraction(fraction: &str) -> Option<f64> {
	let (numerator, denominator) = fraction.split_once('/')?;
	let numerator: f64 = numerator.trim().parse().ok()?;
	let denominator: f64 = denominator.trim().parse().ok()?;
	if denominator == 0.0 {
		return None;
	}
	Some(numerator / denominator)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_fraction_tables() {
		let json = r#"{"language":"ENGLISH","ngrams":{"1/100":"a b","3/10":"c"}}"#;
		let model = LanguageModel::from_json(Language::English, NgramOrder::Unigram, json).unwrap();
		assert_eq!(model.len(), 3);
		assert_eq!(model.relative_frequency("a"), Some(0.01));
		assert_eq!(model.relative_frequency("c"), Some(0.3));
		assert_eq!(model.relative_frequency("z"), None);
	}

	#[test]
	fn rejects_foreign_files() {
		let json = r#"{"language":"GERMAN","ngrams":{}}"#;
		let error = LanguageModel::from_json(Language::English, NgramOrder::Unigram, json).unwrap_err();
		assert!(matches!(error, DetectionError::MalformedModel { .. }));
	}

	#[test]
	fn rejects_broken_entries() {
		for json in [
			r#"{"language":"ENGLISH","ngrams":{"1/0":"a"}}"#,
			r#"{"language":"ENGLISH","ngrams":{"x/3":"a"}}"#,
			r#"{"language":"ENGLISH","ngrams":{"3/2":"a"}}"#,
			r#"{"language":"ENGLISH","ngrams":{"1/2":"ab"}}"#,
		] {
			assert!(LanguageModel::from_json(Language::English, NgramOrder::Unigram, json).is_err(), "{}", json);
		}
		assert!(matches!(
			LanguageModel::from_json(Language::English, NgramOrder::Unigram, "not json"),
			Err(DetectionError::Json(_))
		));
	}

	#[test]
	fn validates_frequencies() {
		assert!(LanguageModel::from_frequencies(Language::German, NgramOrder::Bigram, [("al", 0.0)]).is_err());
		assert!(LanguageModel::from_frequencies(Language::German, NgramOrder::Bigram, [("al", f64::NAN)]).is_err());
		let model = LanguageModel::from_frequencies(Language::German, NgramOrder::Bigram, [("al", 1.0)]).unwrap();
		assert_eq!(model.relative_frequency("al"), Some(1.0));
	}

	#[test]
	fn survives_binary_encoding() {
		let model = LanguageModel::from_frequencies(Language::German, NgramOrder::Trigram, [("alt", 0.5), ("ßen", 0.25)]).unwrap();
		let bytes = postcard::to_stdvec(&model).unwrap();
		let decoded: LanguageModel = postcard::from_bytes(&bytes).unwrap();
		assert_eq!(decoded, model);
	}

	#[test]
	fn fingerprints_depend_on_contents_only() {
		let forward = LanguageModel::from_frequencies(Language::German, NgramOrder::Bigram, [("al", 0.5), ("lt", 0.25)]).unwrap();
		let backward = LanguageModel::from_frequencies(Language::German, NgramOrder::Bigram, [("lt", 0.25), ("al", 0.5)]).unwrap();
		let changed = LanguageModel::from_frequencies(Language::German, NgramOrder::Bigram, [("al", 0.5), ("lt", 0.2)]).unwrap();

		assert_eq!(forward.fingerprint(), backward.fingerprint());
		assert_ne!(forward.fingerprint(), changed.fingerprint());
		assert_ne!(
			LanguageModel::empty(Language::German, NgramOrder::Bigram).fingerprint(),
			LanguageModel::empty(Language::English, NgramOrder::Bigram).fingerprint()
		);
	}
}
