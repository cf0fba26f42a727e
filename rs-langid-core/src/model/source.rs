use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::DetectionError;
use crate::io;
use crate::language::Language;
use crate::model::language_model::LanguageModel;
use crate::model::ngram::NgramOrder;

/// Where trained n-gram tables come from.
///
/// Implementations are shared across detection threads, hence `Send + Sync`.
/// Test doubles implement this trait directly.
pub trait ModelSource: Send + Sync {
	/// Builds the model of one language and order.
	///
	/// # Errors
	/// - `ModelUnavailable` if the source has nothing for `language`.
	/// - `MalformedModel`, `Io` or `Json` if the stored data cannot be read.
	fn load(&self, language: Language, order: NgramOrder) -> Result<LanguageModel, DetectionError>;

	/// Returns `true` if the source holds data for `language`.
	fn is_available(&self, language: Language) -> bool;

	/// Identifies the data `load` would build the model from.
	///
	/// Equal fingerprints mean equal models. The default hashes the loaded
	/// model.
	///
	/// # Errors
	/// The same as [`ModelSource::load`].
	fn fingerprint(&self, language: Language, order: NgramOrder) -> Result<String, DetectionError> {
		Ok(self.load(language, order)?.fingerprint())
	}
}

/// Trained models stored as JSON files, one directory per language:
///
/// ```text
/// <root>/de/unigrams.json
/// <root>/de/bigrams.json
/// ...
/// <root>/de/fivegrams.json
/// ```
///
/// A language directory without a file for some order yields an empty
/// model of that order.
#[derive(Clone, Debug)]
pub struct DirectorySource {
	root: PathBuf,
}

impl DirectorySource {
	/// Opens a model directory.
	///
	/// # Parameters
	/// - `root`: directory holding one subdirectory per ISO 639-1 code.
	///   Both `"folder"` and `"folder/"` are accepted.
	///
	/// # Errors
	/// Returns an `Io` error if `root` is not a directory.
	pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, DetectionError> {
		let root = io::normalize_folder(root);
		if !root.is_dir() {
			return Err(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Expected a directory, got: {}", root.display()),
			)
			.into());
		}
		Ok(Self { root })
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Path of the model file of `language` and `order`.
	///
	/// # Errors
	/// Returns `ModelUnavailable` if the root has no directory for `language`.
	fn model_path(&self, language: Language, order: NgramOrder) -> Result<PathBuf, DetectionError> {
		if !self.is_available(language) {
			return Err(DetectionError::ModelUnavailable {
				language,
				reason: format!("no directory '{}' under {}", language.iso_code(), self.root.display()),
			});
		}
		Ok(io::model_path(&self.root, language, order))
	}

	/// Languages that have a directory under the root.
	///
	/// Directories whose name is not a supported ISO code are ignored.
	pub fn available_languages(&self) -> Result<Vec<Language>, DetectionError> {
		let mut languages: Vec<Language> = io::list_dirs(&self.root)?
			.iter()
			.filter_map(|name| name.parse::<Language>().ok())
			.filter(|language| self.is_available(*language))
			.collect();
		languages.sort();
		languages.dedup();
		Ok(languages)
	}
}

impl ModelSource for DirectorySource {
	fn load(&self, language: Language, order: NgramOrder) -> Result<LanguageModel, DetectionError> {
		let path = self.model_path(language, order)?;
		if !path.is_file() {
			return Ok(LanguageModel::empty(language, order));
		}
		LanguageModel::from_json(language, order, &io::read_file(&path)?)
	}

	fn is_available(&self, language: Language) -> bool {
		self.root.join(language.iso_code()).is_dir()
	}

	/// Hashes the raw model file without parsing it.
	fn fingerprint(&self, language: Language, order: NgramOrder) -> Result<String, DetectionError> {
		let path = self.model_path(language, order)?;
		if !path.is_file() {
			return Ok(format!("missing:{}", order.file_name()));
		}
		let mut hasher = Sha256::new();
		hasher.update(io::read_file(&path)?.as_bytes());
		Ok(format!("json:{:x}", hasher.finalize()))
	}
}

/// In-process models, for embedding small tables and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
	models: HashMap<(Language, NgramOrder), LanguageModel>,
}

impl MemorySource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds (or replaces) a whole model.
	pub fn with_model(mut self, model: LanguageModel) -> Self {
		self.models.insert((model.language(), model.order()), model);
		self
	}

	/// Records the frequency of one n-gram; its length selects the order.
	///
	/// # Errors
	/// - `InvalidNgram` if `ngram` is empty or longer than five characters.
	/// - `MalformedModel` if `frequency` is outside `(0, 1]`.
	pub fn with_frequency(mut self, language: Language, ngram: &str, frequency: f64) -> Result<Self, DetectionError> {
		let order = NgramOrder::from_len(ngram.chars().count())
			.ok_or_else(|| DetectionError::InvalidNgram(ngram.to_owned()))?;
		self.models
			.entry((language, order))
			.or_insert_with(|| LanguageModel::empty(language, order))
			.insert(ngram.to_owned(), frequency)?;
		Ok(self)
	}
}

impl ModelSource for MemorySource {
	fn load(&self, language: Language, order: NgramOrder) -> Result<LanguageModel, DetectionError> {
		if let Some(model) = self.models.get(&(language, order)) {
			return Ok(model.clone());
		}
		if self.is_available(language) {
			return Ok(LanguageModel::empty(language, order));
		}
		Err(DetectionError::ModelUnavailable { language, reason: "not held in memory".to_owned() })
	}

	fn is_available(&self, language: Language) -> bool {
		self.models.keys().any(|(held, _)| *held == language)
	}

	fn fingerprint(&self, language: Language, order: NgramOrder) -> Result<String, DetectionError> {
		match self.models.get(&(language, order)) {
			Some(model) => Ok(model.fingerprint()),
			None => Ok(self.load(language, order)?.fingerprint()),
		}
	}
}
