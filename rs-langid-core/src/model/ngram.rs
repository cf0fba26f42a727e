use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DetectionError;

/// Order of an n-gram model, from unigrams to fivegrams.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NgramOrder {
	Unigram = 1,
	Bigram = 2,
	Trigram = 3,
	Quadrigram = 4,
	Fivegram = 5,
}

impl NgramOrder {
	/// Every order, lowest first.
	pub const ALL: [NgramOrder; 5] = [
		NgramOrder::Unigram,
		NgramOrder::Bigram,
		NgramOrder::Trigram,
		NgramOrder::Quadrigram,
		NgramOrder::Fivegram,
	];

	/// Number of characters in n-grams of this order.
	pub fn value(&self) -> usize {
		*self as usize
	}

	/// Returns the order of n-grams with `len` characters.
	pub fn from_len(len: usize) -> Option<Self> {
		Self::ALL.get(len.checked_sub(1)?).copied()
	}

	/// Name of the model file holding this order, e.g. `trigrams.json`.
	pub fn file_name(&self) -> &'static str {
		match self {
			NgramOrder::Unigram => "unigrams.json",
			NgramOrder::Bigram => "bigrams.json",
			NgramOrder::Trigram => "trigrams.json",
			NgramOrder::Quadrigram => "quadrigrams.json",
			NgramOrder::Fivegram => "fivegrams.json",
		}
	}
}

/// A run of one to five characters taken from a single word.
///
/// # Invariants
/// - `value` holds between 1 and 5 characters
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ngram {
	value: String,
}

impl Ngram {
	/// Creates an n-gram.
	///
	/// # Errors
	/// Returns `InvalidNgram` if `value` is empty or longer than five characters.
	pub fn new(value: &str) -> Result<Self, DetectionError> {
		match value.chars().count() {
			1..=5 => Ok(Self { value: value.to_owned() }),
			_ => Err(DetectionError::InvalidNgram(value.to_owned())),
		}
	}

	/// The characters of this n-gram.
	pub fn value(&self) -> &str {
		&self.value
	}

	/// Order matching the character count.
	pub fn order(&self) -> NgramOrder {
		// Length is checked on construction
		NgramOrder::from_len(self.value.chars().count()).unwrap_or(NgramOrder::Unigram)
	}

	/// Backoff chain: this n-gram followed by each shorter prefix.
	///
	/// `"alter"` yields `"alter"`, `"alte"`, `"alt"`, `"al"`, `"a"`.
	pub fn lower_order_ngrams(&self) -> impl Iterator<Item = &str> {
		let ends: Vec<usize> = self
			.value
			.char_indices()
			.map(|(index, c)| index + c.len_utf8())
			.collect();
		ends.into_iter().rev().map(move |end| &self.value[..end])
	}
}

impl fmt::Display for Ngram {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.value)
	}
}

/// Distinct n-grams of one order found in `words`.
///
/// Words shorter than the order contribute nothing.
pub fn extract_ngrams(words: &[String], order: NgramOrder) -> HashSet<Ngram> {
	let n = order.value();
	let mut ngrams = HashSet::new();

	for word in words {
		let chars: Vec<char> = word.chars().collect();
		if chars.len() < n {
			continue;
		}
		for window in chars.windows(n) {
			ngrams.insert(Ngram { value: window.iter().collect() });
		}
	}

	ngrams
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_bad_lengths() {
		assert!(Ngram::new("").is_err());
		assert!(Ngram::new("abcdef").is_err());
		assert!(matches!(Ngram::new("äöüßé").map(|ngram| ngram.order()), Ok(NgramOrder::Fivegram)));
	}

	#[test]
	fn backs_off_through_prefixes() {
		let ngram = Ngram::new("alter").unwrap();
		let chain: Vec<&str> = ngram.lower_order_ngrams().collect();
		assert_eq!(chain, vec!["alter", "alte", "alt", "al", "a"]);

		let ngram = Ngram::new("дом").unwrap();
		assert_eq!(ngram.lower_order_ngrams().collect::<Vec<_>>(), vec!["дом", "до", "д"]);
	}

	#[test]
	fn extracts_distinct_ngrams_per_word() {
		let words = vec!["alter".to_owned(), "al".to_owned()];
		let bigrams = extract_ngrams(&words, NgramOrder::Bigram);
		assert_eq!(bigrams.len(), 4);
		assert!(bigrams.contains(&Ngram::new("al").unwrap()));

		let fivegrams = extract_ngrams(&words, NgramOrder::Fivegram);
		assert_eq!(fivegrams.len(), 1);
		assert!(extract_ngrams(&[], NgramOrder::Unigram).is_empty());
	}

	#[test]
	fn orders_map_to_lengths_and_files() {
		assert_eq!(NgramOrder::from_len(3), Some(NgramOrder::Trigram));
		assert_eq!(NgramOrder::from_len(0), None);
		assert_eq!(NgramOrder::from_len(6), None);
		assert_eq!(NgramOrder::Quadrigram.file_name(), "quadrigrams.json");
	}
}
