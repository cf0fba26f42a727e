use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;

use crate::error::DetectionError;
use crate::language::Language;

/// Log-probability floor for n-grams no model has observed.
pub const DEFAULT_SMOOTHING_FLOOR: f64 = 1e-10;
pub const DEFAULT_MINIMUM_TEXT_LENGTH: usize = 1;
pub const DEFAULT_MINIMUM_RELATIVE_DISTANCE: f64 = 0.0;
pub const DEFAULT_HIGH_CONFIDENCE_THRESHOLD: f64 = 0.999;
pub const DEFAULT_NEGLIGIBLE_CONFIDENCE: f64 = 1e-9;
pub const DEFAULT_MAX_RESIDENT_MODELS: usize = 64;
pub const DEFAULT_MODELS_DIRECTORY: &str = "./data";

/// How loaded models are kept.
#[derive(Clone, Debug, PartialEq)]
pub enum CachePolicy {
	/// Every loaded model stays in memory.
	InMemory,
	/// Models are serialized to `dir`; at most `max_resident_models` stay in memory.
	Disk { dir: PathBuf, max_resident_models: usize },
}

/// Settings of a [`LanguageDetector`](crate::LanguageDetector).
///
/// # Responsibilities
/// - Hold the configured language set and the detection thresholds
/// - Reject out-of-range values at the time they are set
/// - Read overrides from `LANGID_*` environment variables
///
/// # Invariants
/// - Every field holds a value inside its documented range
#[derive(Clone, Debug, PartialEq)]
pub struct DetectorConfig {
	/// Languages the detector chooses from.
	languages: BTreeSet<Language>,

	/// Texts with fewer letters are reported as unknown.
	minimum_text_length: usize,

	/// Smallest gap between the two best confidences that still yields an answer.
	minimum_relative_distance: f64,

	/// A top confidence above this collapses the distribution onto that language.
	high_confidence_threshold: f64,

	/// Confidences at or below this do not count as competitors.
	negligible_confidence: f64,

	/// Probability assumed for n-grams no model has observed.
	smoothing_floor: f64,

	/// How loaded models are kept.
	cache_policy: CachePolicy,

	/// Whether every model is loaded when the detector is built.
	pub preload_models: bool,
}

impl Default for DetectorConfig {
	fn default() -> Self {
		Self {
			languages: Language::ALL.into_iter().collect(),
			minimum_text_length: DEFAULT_MINIMUM_TEXT_LENGTH,
			minimum_relative_distance: DEFAULT_MINIMUM_RELATIVE_DISTANCE,
			high_confidence_threshold: DEFAULT_HIGH_CONFIDENCE_THRESHOLD,
			negligible_confidence: DEFAULT_NEGLIGIBLE_CONFIDENCE,
			smoothing_floor: DEFAULT_SMOOTHING_FLOOR,
			cache_policy: CachePolicy::InMemory,
			preload_models: false,
		}
	}
}

impl DetectorConfig {
	/// Default settings restricted to `languages`.
	pub fn for_languages<I: IntoIterator<Item = Language>>(languages: I) -> Self {
		Self { languages: languages.into_iter().collect(), ..Self::default() }
	}

	/// Default settings with overrides from the process environment.
	///
	/// # Errors
	/// See [`DetectorConfig::from_vars`].
	pub fn from_env() -> Result<Self, DetectionError> {
		Self::from_vars(|name| env::var(name).ok())
	}

	/// Default settings with overrides from `lookup`.
	///
	/// | variable | setting |
	/// |---|---|
	/// | `LANGID_LANGUAGES` | comma separated ISO codes or names |
	/// | `LANGID_MIN_TEXT_LENGTH` | minimum text length |
	/// | `LANGID_MIN_RELATIVE_DISTANCE` | minimum relative distance |
	/// | `LANGID_HIGH_CONFIDENCE` | high confidence threshold |
	/// | `LANGID_CACHE_DIR` | switches to the disk cache in this directory |
	/// | `LANGID_MAX_RESIDENT_MODELS` | resident models of the disk cache |
	/// | `LANGID_PRELOAD` | `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off` |
	///
	/// # Errors
	/// - `UnsupportedLanguage` for an unknown language code.
	/// - `InvalidConfig` for unparsable or out-of-range values.
	pub fn from_vars<F>(lookup: F) -> Result<Self, DetectionError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Self::default();

		if let Some(value) = lookup("LANGID_LANGUAGES") {
			let languages = value
				.split(',')
				.map(str::trim)
				.filter(|code| !code.is_empty())
				.map(str::parse::<Language>)
				.collect::<Result<Vec<Language>, DetectionError>>()?;
			config.set_languages(languages);
		}
		if let Some(value) = lookup("LANGID_MIN_TEXT_LENGTH") {
			config.set_minimum_text_length(parse_var("LANGID_MIN_TEXT_LENGTH", &value)?)?;
		}
		if let Some(value) = lookup("LANGID_MIN_RELATIVE_DISTANCE") {
			config.set_minimum_relative_distance(parse_var("LANGID_MIN_RELATIVE_DISTANCE", &value)?)?;
		}
		if let Some(value) = lookup("LANGID_HIGH_CONFIDENCE") {
			config.set_high_confidence_threshold(parse_var("LANGID_HIGH_CONFIDENCE", &value)?)?;
		}

		let max_resident = lookup("LANGID_MAX_RESIDENT_MODELS")
			.map(|value| parse_var::<usize>("LANGID_MAX_RESIDENT_MODELS", &value))
			.transpose()?;
		match lookup("LANGID_CACHE_DIR") {
			Some(dir) => config.set_cache_policy(CachePolicy::Disk {
				dir: PathBuf::from(dir),
				max_resident_models: max_resident.unwrap_or(DEFAULT_MAX_RESIDENT_MODELS),
			})?,
			None if max_resident.is_some() => {
				log::warn!("LANGID_MAX_RESIDENT_MODELS is ignored without LANGID_CACHE_DIR");
			}
			None => {}
		}

		if let Some(value) = lookup("LANGID_PRELOAD") {
			config.preload_models = parse_flag("LANGID_PRELOAD", &value)?;
		}

		Ok(config)
	}

	pub fn languages(&self) -> &BTreeSet<Language> {
		&self.languages
	}

	pub fn minimum_text_length(&self) -> usize {
		self.minimum_text_length
	}

	pub fn minimum_relative_distance(&self) -> f64 {
		self.minimum_relative_distance
	}

	pub fn high_confidence_threshold(&self) -> f64 {
		self.high_confidence_threshold
	}

	pub fn negligible_confidence(&self) -> f64 {
		self.negligible_confidence
	}

	pub fn smoothing_floor(&self) -> f64 {
		self.smoothing_floor
	}

	pub fn cache_policy(&self) -> &CachePolicy {
		&self.cache_policy
	}

	/// Replaces the configured language set. Any subset, even an empty one, is valid.
	pub fn set_languages<I: IntoIterator<Item = Language>>(&mut self, languages: I) {
		self.languages = languages.into_iter().collect();
	}

	/// Sets the minimum number of letters a text needs for statistical detection.
	///
	/// # Errors
	/// Returns an error if `length` is zero.
	pub fn set_minimum_text_length(&mut self, length: usize) -> Result<(), DetectionError> {
		if length < 1 {
			return Err(invalid("minimum text length must be at least 1"));
		}
		self.minimum_text_length = length;
		Ok(())
	}

	/// Sets the minimum gap between the two best confidences (0.0..=0.99).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_minimum_relative_distance(&mut self, distance: f64) -> Result<(), DetectionError> {
		if !(0.0..=0.99).contains(&distance) {
			return Err(invalid("minimum relative distance must be between 0.0 and 0.99"));
		}
		self.minimum_relative_distance = distance;
		Ok(())
	}

	/// Sets the high confidence threshold (0.0 exclusive to 1.0).
	///
	/// `1.0` disables collapsing since no confidence can exceed it.
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_high_confidence_threshold(&mut self, threshold: f64) -> Result<(), DetectionError> {
		if !(threshold > 0.0 && threshold <= 1.0) {
			return Err(invalid("high confidence threshold must be greater than 0.0 and at most 1.0"));
		}
		self.high_confidence_threshold = threshold;
		Ok(())
	}

	/// Sets the negligible confidence level (0.0 to 0.5 exclusive).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_negligible_confidence(&mut self, confidence: f64) -> Result<(), DetectionError> {
		if !(0.0..0.5).contains(&confidence) {
			return Err(invalid("negligible confidence must be at least 0.0 and below 0.5"));
		}
		self.negligible_confidence = confidence;
		Ok(())
	}

	/// Sets the probability assumed for unseen n-grams (0.0 and 1.0 exclusive).
	///
	/// # Errors
	/// Returns an error if the value is outside the valid range.
	pub fn set_smoothing_floor(&mut self, floor: f64) -> Result<(), DetectionError> {
		if !(floor > 0.0 && floor < 1.0) {
			return Err(invalid("smoothing floor must be between 0.0 and 1.0 exclusive"));
		}
		self.smoothing_floor = floor;
		Ok(())
	}

	/// Sets how loaded models are kept.
	///
	/// # Errors
	/// Returns an error if a disk cache would keep no model resident.
	pub fn set_cache_policy(&mut self, policy: CachePolicy) -> Result<(), DetectionError> {
		if let CachePolicy::Disk { max_resident_models: 0, .. } = policy {
			return Err(invalid("disk cache must keep at least one model resident"));
		}
		self.cache_policy = policy;
		Ok(())
	}
}

/// Directory of trained models used by the binaries: `LANGID_MODELS` or `./data`.
pub fn models_directory<F: Fn(&str) -> Option<String>>(lookup: F) -> PathBuf {
	lookup("LANGID_MODELS").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_MODELS_DIRECTORY))
}

fn invalid(message: &str) -> DetectionError {
	DetectionError::InvalidConfig(message.to_owned())
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, DetectionError> {
	value
		.trim()
		.parse()
		.map_err(|_| DetectionError::InvalidConfig(format!("{} has an invalid value '{}'", name, value)))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, DetectionError> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		_ => Err(DetectionError::InvalidConfig(format!("{} has an invalid value '{}'", name, value))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn defaults_cover_every_language() {
		let config = DetectorConfig::default();
		assert_eq!(config.languages().len(), 75);
		assert_eq!(config.minimum_text_length(), 1);
		assert_eq!(config.smoothing_floor(), DEFAULT_SMOOTHING_FLOOR);
		assert_eq!(config.cache_policy(), &CachePolicy::InMemory);
		assert!(!config.preload_models);
	}

	#[test]
	fn setters_reject_out_of_range_values() {
		let mut config = DetectorConfig::default();
		assert!(config.set_minimum_text_length(0).is_err());
		assert!(config.set_minimum_relative_distance(-0.1).is_err());
		assert!(config.set_minimum_relative_distance(1.0).is_err());
		assert!(config.set_high_confidence_threshold(0.0).is_err());
		assert!(config.set_high_confidence_threshold(1.5).is_err());
		assert!(config.set_negligible_confidence(0.5).is_err());
		assert!(config.set_smoothing_floor(0.0).is_err());
		assert!(config.set_smoothing_floor(f64::NAN).is_err());
		assert!(config
			.set_cache_policy(CachePolicy::Disk { dir: PathBuf::from("cache"), max_resident_models: 0 })
			.is_err());
		assert_eq!(config, DetectorConfig::default());

		config.set_minimum_relative_distance(0.25).unwrap();
		config.set_high_confidence_threshold(1.0).unwrap();
		assert_eq!(config.minimum_relative_distance(), 0.25);
		assert_eq!(config.high_confidence_threshold(), 1.0);
	}

	#[test]
	fn reads_overrides_from_variables() {
		let config = DetectorConfig::from_vars(vars(&[
			("LANGID_LANGUAGES", "en, de,French"),
			("LANGID_MIN_TEXT_LENGTH", "3"),
			("LANGID_MIN_RELATIVE_DISTANCE", "0.1"),
			("LANGID_CACHE_DIR", "/tmp/langid"),
			("LANGID_MAX_RESIDENT_MODELS", "8"),
			("LANGID_PRELOAD", "yes"),
		]))
		.unwrap();

		let languages: Vec<Language> = config.languages().iter().copied().collect();
		assert_eq!(languages, vec![Language::English, Language::French, Language::German]);
		assert_eq!(config.minimum_text_length(), 3);
		assert_eq!(config.minimum_relative_distance(), 0.1);
		assert_eq!(
			config.cache_policy(),
			&CachePolicy::Disk { dir: PathBuf::from("/tmp/langid"), max_resident_models: 8 }
		);
		assert!(config.preload_models);
	}

	#[test]
	fn rejects_bad_variables() {
		assert!(matches!(
			DetectorConfig::from_vars(vars(&[("LANGID_LANGUAGES", "en,xx")])),
			Err(DetectionError::UnsupportedLanguage(_))
		));
		assert!(DetectorConfig::from_vars(vars(&[("LANGID_MIN_TEXT_LENGTH", "many")])).is_err());
		assert!(DetectorConfig::from_vars(vars(&[("LANGID_HIGH_CONFIDENCE", "2")])).is_err());
		assert!(DetectorConfig::from_vars(vars(&[("LANGID_PRELOAD", "maybe")])).is_err());
	}

	#[test]
	fn models_directory_defaults_to_data() {
		assert_eq!(models_directory(vars(&[])), PathBuf::from("./data"));
		assert_eq!(models_directory(vars(&[("LANGID_MODELS", "/srv/models")])), PathBuf::from("/srv/models"));
	}
}
