use std::sync::{mpsc, Arc};
use std::thread;

use crate::error::DetectionError;
use crate::language::Language;
use crate::model::cache::ModelCache;
use crate::model::language_model::LanguageModel;
use crate::model::ngram::{Ngram, NgramOrder};
use crate::model::source::ModelSource;

/// Lazily loaded n-gram models for every language and order.
///
/// # Responsibilities
/// - Fetch models from the [`ModelSource`] on first use
/// - Keep them in the configured [`ModelCache`]
/// - Answer relative frequency lookups
pub struct ModelProvider {
	source: Arc<dyn ModelSource>,
	cache: Box<dyn ModelCache>,
}

impl ModelProvider {
	pub fn new(source: Arc<dyn ModelSource>, cache: Box<dyn ModelCache>) -> Self {
		Self { source, cache }
	}

	/// Returns `true` if the source holds data for `language`.
	pub fn is_available(&self, language: Language) -> bool {
		self.source.is_available(language)
	}

	/// Returns the model of `language` and `order`, loading it on first use.
	///
	/// # Errors
	/// Whatever the source reports; nothing is cached when loading fails.
	pub fn model(&self, language: Language, order: NgramOrder) -> Result<Arc<LanguageModel>, DetectionError> {
		self.cache.get_or_load((language, order), self.source.as_ref())
	}

	/// Relative frequency of `ngram` in `language`, `None` if never observed.
	pub fn relative_frequency(&self, language: Language, ngram: &Ngram) -> Result<Option<f64>, DetectionError> {
		Ok(self.model(language, ngram.order())?.relative_frequency(ngram.value()))
	}

	/// Number of models currently held in memory.
	pub fn resident_models(&self) -> usize {
		self.cache.resident_models()
	}

	/// Loads every order of every given language ahead of time.
	///
	/// # Behavior
	/// - Splits the `(language, order)` pairs into one chunk per CPU.
	/// - Loads each chunk on its own scoped thread.
	/// - Collects results over an MPSC channel.
	///
	/// # Errors
	/// Returns the first load error encountered; models loaded by other
	/// threads stay cached.
	pub fn preload(&self, languages: &[Language]) -> Result<(), DetectionError> {
		let keys: Vec<(Language, NgramOrder)> = languages
			.iter()
			.flat_map(|language| NgramOrder::ALL.iter().map(move |order| (*language, *order)))
			.collect();
		if keys.is_empty() {
			return Ok(());
		}

		let chunks = num_cpus::get().max(1);
		let chunk_size = keys.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		thread::scope(|scope| {
			for chunk in keys.chunks(chunk_size) {
				let tx = tx.clone();
				scope.spawn(move || {
					for (language, order) in chunk {
						if tx.send(self.model(*language, *order).map(|_| ())).is_err() {
							break;
						}
					}
				});
			}
		});
		drop(tx);

		let result = rx.iter().collect::<Result<Vec<()>, DetectionError>>().map(|_| ());
		log::info!("Preloaded {} models for {} languages", self.resident_models(), languages.len());
		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::cache::InMemoryCache;
	use crate::model::source::MemorySource;

	fn provider() -> ModelProvider {
		let source = MemorySource::new()
			.with_frequency(Language::English, "a", 0.01)
			.unwrap()
			.with_frequency(Language::German, "alter", 0.3)
			.unwrap();
		ModelProvider::new(Arc::new(source), Box::new(InMemoryCache::new()))
	}

	#[test]
	fn looks_up_frequencies_by_ngram_order() {
		let provider = provider();
		let a = Ngram::new("a").unwrap();
		let alter = Ngram::new("alter").unwrap();

		assert_eq!(provider.relative_frequency(Language::English, &a).unwrap(), Some(0.01));
		assert_eq!(provider.relative_frequency(Language::German, &alter).unwrap(), Some(0.3));
		assert_eq!(provider.relative_frequency(Language::German, &a).unwrap(), None);
		assert!(provider.relative_frequency(Language::French, &a).is_err());
	}

	#[test]
	fn preloads_every_order() {
		let provider = provider();
		provider.preload(&[Language::English, Language::German]).unwrap();
		assert_eq!(provider.resident_models(), 10);
	}

	#[test]
	fn preload_reports_unavailable_languages() {
		let provider = provider();
		assert!(matches!(
			provider.preload(&[Language::English, Language::French]),
			Err(DetectionError::ModelUnavailable { language: Language::French, .. })
		));
	}
}
