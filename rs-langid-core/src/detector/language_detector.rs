use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;

use crate::detector::confidence::ConfidenceValues;
use crate::detector::config::{CachePolicy, DetectorConfig};
use crate::error::DetectionError;
use crate::filter::{CandidateSet, LanguageFilter};
use crate::language::Language;
use crate::model::cache::{DiskCache, InMemoryCache, ModelCache};
use crate::model::language_model::LanguageModel;
use crate::model::ngram::{extract_ngrams, Ngram, NgramOrder};
use crate::model::provider::ModelProvider;
use crate::model::source::{DirectorySource, ModelSource};
use crate::text::{clean_up_input_text, letter_count, split_text_into_words};

/// Batches shorter than this are detected on the calling thread.
const PARALLEL_BATCH_THRESHOLD: usize = 32;

/// High-level language detector.
///
/// # Responsibilities
/// - Narrow the candidate languages with rules
/// - Score the remaining candidates with smoothed n-gram log-probabilities
/// - Turn scores into ranked confidence values and a best guess
///
/// Every detection builds its own [`CandidateSet`], so a detector can be
/// shared between threads. Models are the only shared state and are loaded
/// once per language and order.
pub struct LanguageDetector {
	config: DetectorConfig,
	filter: LanguageFilter,
	provider: ModelProvider,
}

impl LanguageDetector {
	/// Creates a detector over `source`.
	///
	/// # Errors
	/// - `ModelUnavailable` if `source` lacks a configured language.
	/// - `Cache` if the disk cache directory cannot be used.
	/// - Any load error when `preload_models` is set.
	pub fn new(config: DetectorConfig, source: Arc<dyn ModelSource>) -> Result<Self, DetectionError> {
		if let Some(missing) = config.languages().iter().find(|language| !source.is_available(**language)) {
			return Err(DetectionError::ModelUnavailable {
				language: *missing,
				reason: "the model source has no data for it".to_owned(),
			});
		}

		let cache: Box<dyn ModelCache> = match config.cache_policy() {
			CachePolicy::InMemory => Box::new(InMemoryCache::new()),
			CachePolicy::Disk { dir, max_resident_models } => Box::new(DiskCache::new(dir, *max_resident_models)?),
		};

		let detector = Self {
			filter: LanguageFilter::new(config.languages()),
			provider: ModelProvider::new(source, cache),
			config,
		};

		if detector.config.preload_models {
			let languages: Vec<Language> = detector.config.languages().iter().copied().collect();
			detector.provider.preload(&languages)?;
		}

		log::info!("Language detector ready for {} languages", detector.config.languages().len());
		Ok(detector)
	}

	/// Creates a detector reading trained models from a directory.
	///
	/// # Errors
	/// Returns an error if `path` is not a directory, plus those of [`LanguageDetector::new`].
	pub fn from_directory<P: AsRef<Path>>(path: P, config: DetectorConfig) -> Result<Self, DetectionError> {
		let source = DirectorySource::new(path)?;
		Self::new(config, Arc::new(source))
	}

	pub fn config(&self) -> &DetectorConfig {
		&self.config
	}

	/// The rule-based filter built for the configured languages.
	pub fn language_filter(&self) -> &LanguageFilter {
		&self.filter
	}

	/// Number of models currently held in memory.
	pub fn resident_models(&self) -> usize {
		self.provider.resident_models()
	}

	/// Detects the language of `text`.
	///
	/// # Returns
	/// - `Ok(Some(language))` for the most likely language.
	/// - `Ok(None)` if the text has no letters, no language is configured, or
	///   the two best candidates are no further apart than the minimum
	///   relative distance.
	pub fn detect_language_of(&self, text: &str) -> Result<Option<Language>, DetectionError> {
		let values = self.compute_language_confidence_values(text)?;
		let mut ranked = values.iter();

		let Some((most_likely, highest)) = ranked.next() else {
			return Ok(None);
		};
		if let Some((_, second)) = ranked.next() {
			if highest - second <= self.config.minimum_relative_distance() {
				return Ok(None);
			}
		}
		Ok(Some(most_likely))
	}

	/// Detects the language of every text, keeping input order.
	///
	/// # Behavior
	/// - Small batches run on the calling thread.
	/// - Larger batches are split into one chunk per CPU, detected on scoped
	///   threads and reassembled through an MPSC channel.
	///
	/// # Errors
	/// Returns the first model loading error; degenerate texts are not errors.
	pub fn detect_languages_of<S>(&self, texts: &[S]) -> Result<Vec<Option<Language>>, DetectionError>
	where
		S: AsRef<str> + Sync,
	{
		if texts.len() < PARALLEL_BATCH_THRESHOLD {
			return texts.iter().map(|text| self.detect_language_of(text.as_ref())).collect();
		}

		let chunk_size = texts.len().div_ceil(num_cpus::get().max(1));
		let (tx, rx) = mpsc::channel();

		thread::scope(|scope| {
			for (index, chunk) in texts.chunks(chunk_size).enumerate() {
				let tx = tx.clone();
				scope.spawn(move || {
					let detected: Result<Vec<Option<Language>>, DetectionError> =
						chunk.iter().map(|text| self.detect_language_of(text.as_ref())).collect();
					tx.send((index, detected)).ok();
				});
			}
		});
		drop(tx);

		let mut chunks: Vec<(usize, Result<Vec<Option<Language>>, DetectionError>)> = rx.iter().collect();
		chunks.sort_by_key(|(index, _)| *index);

		let mut languages = Vec::with_capacity(texts.len());
		for (_, detected) in chunks {
			languages.extend(detected?);
		}
		Ok(languages)
	}

	/// Computes ranked confidence values for every candidate language.
	///
	/// # Behavior
	/// - Texts without letters yield no values.
	/// - A language settled by rules, or the only candidate left by the
	///   filter, gets a confidence of 1.0 without any model lookup.
	/// - Texts shorter than the minimum text length yield no values.
	/// - Otherwise the distinct 1- to 5-grams of every word are scored per
	///   candidate, each n-gram backing off through its prefixes down to the
	///   smoothing floor, and the sums are normalized with softmax.
	/// - The values collapse onto the best language when fewer than two
	///   languages have non-negligible confidence or the best one exceeds
	///   the high confidence threshold.
	pub fn compute_language_confidence_values(&self, text: &str) -> Result<ConfidenceValues, DetectionError> {
		let cleaned = clean_up_input_text(text);
		if cleaned.is_empty() || self.config.languages().is_empty() {
			return Ok(ConfidenceValues::empty());
		}
		let words = split_text_into_words(&cleaned);

		if let Some(language) = self.filter.detect_language_with_rules(&words) {
			log::debug!("Rules settled {:?} as {}", text, language);
			return Ok(ConfidenceValues::certain(language));
		}

		let mut candidates = self.filter.candidates();
		self.filter.filter_languages_by_rules(&words, &mut candidates);
		let eligible: Vec<Language> = candidates.eligible().collect();
		match eligible.as_slice() {
			[] => return Ok(ConfidenceValues::empty()),
			[language] => return Ok(ConfidenceValues::certain(*language)),
			_ => {}
		}

		if letter_count(&cleaned) < self.config.minimum_text_length() {
			return Ok(ConfidenceValues::empty());
		}

		let ngrams: Vec<HashSet<Ngram>> = NgramOrder::ALL.iter().map(|order| extract_ngrams(&words, *order)).collect();
		let mut models: HashMap<(Language, NgramOrder), Arc<LanguageModel>> = HashMap::new();

		let mut scores = Vec::with_capacity(eligible.len());
		for language in eligible {
			let mut score = 0.0;
			for ngram in ngrams.iter().flatten() {
				score += self.log_probability(language, ngram, &mut models)?;
			}
			log::trace!("Raw score of {} for {:?}: {}", language, text, score);
			scores.push((language, score));
		}

		let values = ConfidenceValues::from_log_scores(scores);
		let Some((most_likely, highest)) = values.first() else {
			return Ok(values);
		};
		let competitors = values.iter().filter(|(_, value)| *value > self.config.negligible_confidence()).count();
		if competitors < 2 || highest > self.config.high_confidence_threshold() {
			return Ok(ConfidenceValues::certain(most_likely));
		}
		Ok(values)
	}

	/// Rule-only detection of already cleaned words.
	pub fn detect_language_with_rules(&self, words: &[String]) -> Option<Language> {
		self.filter.detect_language_with_rules(words)
	}

	/// Applies the rule filter to a fresh candidate set.
	pub fn filter_languages_by_rules(&self, words: &[String]) -> CandidateSet {
		let mut candidates = self.reset_language_filter();
		self.filter.filter_languages_by_rules(words, &mut candidates);
		candidates
	}

	/// Returns a candidate set in which every configured language is eligible.
	pub fn reset_language_filter(&self) -> CandidateSet {
		self.filter.candidates()
	}

	/// Relative frequency of `ngram` in the model of `language`.
	///
	/// # Errors
	/// Returns an error if the model cannot be loaded.
	pub fn look_up_ngram_probability(&self, language: Language, ngram: &Ngram) -> Result<Option<f64>, DetectionError> {
		self.provider.relative_frequency(language, ngram)
	}

	/// Log-probability of `ngram` in `language` after backoff.
	///
	/// The first of the n-gram and its prefixes found in a model wins; if
	/// none is found the smoothing floor is used.
	fn log_probability(
		&self,
		language: Language,
		ngram: &Ngram,
		models: &mut HashMap<(Language, NgramOrder), Arc<LanguageModel>>,
	) -> Result<f64, DetectionError> {
		for prefix in ngram.lower_order_ngrams() {
			let Some(order) = NgramOrder::from_len(prefix.chars().count()) else {
				continue;
			};
			let model = match models.get(&(language, order)) {
				Some(model) => model.clone(),
				None => {
					let model = self.provider.model(language, order)?;
					models.insert((language, order), model.clone());
					model
				}
			};
			if let Some(frequency) = model.relative_frequency(prefix) {
				return Ok(frequency.ln());
			}
		}
		Ok(self.config.smoothing_floor().ln())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::source::MemorySource;

	fn detector(languages: &[Language], source: MemorySource) -> LanguageDetector {
		LanguageDetector::new(DetectorConfig::for_languages(languages.iter().copied()), Arc::new(source)).unwrap()
	}

	fn source() -> MemorySource {
		MemorySource::new()
			.with_frequency(Language::English, "a", 0.02)
			.unwrap()
			.with_frequency(Language::English, "th", 0.05)
			.unwrap()
			.with_frequency(Language::French, "a", 0.01)
			.unwrap()
	}

	#[test]
	fn refuses_languages_without_models() {
		let result = LanguageDetector::new(
			DetectorConfig::for_languages([Language::English, Language::German]),
			Arc::new(source()),
		);
		assert!(matches!(result, Err(DetectionError::ModelUnavailable { language: Language::German, .. })));
	}

	#[test]
	fn backoff_falls_through_to_prefixes_and_floor() {
		let detector = detector(&[Language::English, Language::French], source());
		let mut models = HashMap::new();

		let ath = Ngram::new("ath").unwrap();
		let score = detector.log_probability(Language::English, &ath, &mut models).unwrap();
		assert_eq!(score, 0.02f64.ln());

		let zz = Ngram::new("zz").unwrap();
		let score = detector.log_probability(Language::French, &zz, &mut models).unwrap();
		assert_eq!(score, DetectorConfig::default().smoothing_floor().ln());
	}

	#[test]
	fn short_texts_are_unknown_below_the_minimum_length() {
		let mut config = DetectorConfig::for_languages([Language::English, Language::French]);
		config.set_minimum_text_length(5).unwrap();
		let detector = LanguageDetector::new(config, Arc::new(source())).unwrap();
		assert!(detector.compute_language_confidence_values("ath").unwrap().is_empty());
		assert_eq!(detector.detect_language_of("ath").unwrap(), None);
	}

	#[test]
	fn no_configured_language_means_unknown() {
		let detector = detector(&[], MemorySource::new());
		assert_eq!(detector.detect_language_of("hello").unwrap(), None);
		assert!(detector.compute_language_confidence_values("hello").unwrap().is_empty());
	}
}
