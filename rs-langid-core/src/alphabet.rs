use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::language::Language;

/// Writing systems distinguished by the rule-based filter.
///
/// A character maps to at most one alphabet. Punctuation, digits and
/// symbols map to none and carry no weight during detection.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Alphabet {
	Arabic,
	Armenian,
	Bengali,
	Cyrillic,
	Devanagari,
	Georgian,
	Greek,
	Gujarati,
	Gurmukhi,
	Han,
	Hangul,
	Hebrew,
	Hiragana,
	Katakana,
	Latin,
	Tamil,
	Telugu,
	Thai,
}

/// Sorted, non-overlapping Unicode ranges `(first, last, alphabet)`.
///
/// # Invariants
/// - Ranges are sorted by `first` and never overlap (checked in tests).
/// - Only letters reach the lookup; [`is_letter`] filters everything else,
///   so ranges may cover whole blocks including their punctuation.
const RANGES: &[(u32, u32, Alphabet)] = &[
	(0x0041, 0x024F, Alphabet::Latin),
	(0x0250, 0x02AF, Alphabet::Latin),
	(0x0370, 0x03FF, Alphabet::Greek),
	(0x0400, 0x052F, Alphabet::Cyrillic),
	(0x0530, 0x058F, Alphabet::Armenian),
	(0x0590, 0x05FF, Alphabet::Hebrew),
	(0x0600, 0x06FF, Alphabet::Arabic),
	(0x0750, 0x077F, Alphabet::Arabic),
	(0x08A0, 0x08FF, Alphabet::Arabic),
	(0x0900, 0x097F, Alphabet::Devanagari),
	(0x0980, 0x09FF, Alphabet::Bengali),
	(0x0A00, 0x0A7F, Alphabet::Gurmukhi),
	(0x0A80, 0x0AFF, Alphabet::Gujarati),
	(0x0B80, 0x0BFF, Alphabet::Tamil),
	(0x0C00, 0x0C7F, Alphabet::Telugu),
	(0x0E00, 0x0E7F, Alphabet::Thai),
	(0x10A0, 0x10FF, Alphabet::Georgian),
	(0x1100, 0x11FF, Alphabet::Hangul),
	(0x1C80, 0x1C8F, Alphabet::Cyrillic),
	(0x1C90, 0x1CBF, Alphabet::Georgian),
	(0x1D00, 0x1DBF, Alphabet::Latin),
	(0x1E00, 0x1EFF, Alphabet::Latin),
	(0x1F00, 0x1FFF, Alphabet::Greek),
	(0x2C60, 0x2C7F, Alphabet::Latin),
	(0x2D00, 0x2D2F, Alphabet::Georgian),
	(0x2DE0, 0x2DFF, Alphabet::Cyrillic),
	(0x2E80, 0x2FDF, Alphabet::Han),
	(0x3005, 0x3007, Alphabet::Han),
	(0x3021, 0x3029, Alphabet::Han),
	(0x3038, 0x303B, Alphabet::Han),
	(0x3041, 0x309F, Alphabet::Hiragana),
	(0x30A0, 0x30FF, Alphabet::Katakana),
	(0x3131, 0x318F, Alphabet::Hangul),
	(0x31F0, 0x31FF, Alphabet::Katakana),
	(0x3400, 0x4DBF, Alphabet::Han),
	(0x4E00, 0x9FFF, Alphabet::Han),
	(0xA640, 0xA69F, Alphabet::Cyrillic),
	(0xA720, 0xA7FF, Alphabet::Latin),
	(0xA960, 0xA97F, Alphabet::Hangul),
	(0xAB30, 0xAB6F, Alphabet::Latin),
	(0xAC00, 0xD7FF, Alphabet::Hangul),
	(0xF900, 0xFAFF, Alphabet::Han),
	(0xFB00, 0xFB06, Alphabet::Latin),
	(0xFB13, 0xFB17, Alphabet::Armenian),
	(0xFB1D, 0xFB4F, Alphabet::Hebrew),
	(0xFB50, 0xFDFF, Alphabet::Arabic),
	(0xFE70, 0xFEFF, Alphabet::Arabic),
	(0xFF21, 0xFF5A, Alphabet::Latin),
	(0xFF66, 0xFF9F, Alphabet::Katakana),
	(0xFFA0, 0xFFDC, Alphabet::Hangul),
	(0x20000, 0x2FA1F, Alphabet::Han),
];

impl Alphabet {
	/// Every alphabet, in declaration order.
	pub const ALL: [Alphabet; 18] = [
		Alphabet::Arabic,
		Alphabet::Armenian,
		Alphabet::Bengali,
		Alphabet::Cyrillic,
		Alphabet::Devanagari,
		Alphabet::Georgian,
		Alphabet::Greek,
		Alphabet::Gujarati,
		Alphabet::Gurmukhi,
		Alphabet::Han,
		Alphabet::Hangul,
		Alphabet::Hebrew,
		Alphabet::Hiragana,
		Alphabet::Katakana,
		Alphabet::Latin,
		Alphabet::Tamil,
		Alphabet::Telugu,
		Alphabet::Thai,
	];

	/// Returns the alphabet of `c`, or `None` for anything that is not a letter.
	///
	/// ASCII is answered directly; every other code point is resolved with a
	/// binary search over [`RANGES`].
	pub fn of(c: char) -> Option<Alphabet> {
		if c.is_ascii() {
			return if c.is_ascii_alphabetic() { Some(Alphabet::Latin) } else { None };
		}
		if !is_letter(c) {
			return None;
		}

		let code = c as u32;
		let index = RANGES
			.binary_search_by(|&(first, last, _)| {
				if code < first {
					std::cmp::Ordering::Greater
				} else if code > last {
					std::cmp::Ordering::Less
				} else {
					std::cmp::Ordering::Equal
				}
			})
			.ok()?;
		Some(RANGES[index].2)
	}

	/// Returns `true` if `c` belongs to this alphabet.
	pub fn matches(&self, c: char) -> bool {
		Alphabet::of(c) == Some(*self)
	}

	/// Returns `true` if `word` is non-empty and every character belongs to this alphabet.
	pub fn matches_word(&self, word: &str) -> bool {
		!word.is_empty() && word.chars().all(|c| self.matches(c))
	}

	/// Returns the languages among `languages` that are written in this alphabet.
	pub fn supporting_languages<'a, I>(&self, languages: I) -> BTreeSet<Language>
	where
		I: IntoIterator<Item = &'a Language>,
	{
		languages
			.into_iter()
			.filter(|language| language.alphabets().contains(self))
			.copied()
			.collect()
	}
}

impl fmt::Display for Alphabet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

/// Returns `true` if `c` carries letter value for detection.
///
/// Alphabetic characters qualify, and so do the dependent vowel signs,
/// viramas and tone marks of the Brahmic, Hebrew, Arabic and Thai blocks,
/// which Unicode does not always flag as alphabetic but which are part of
/// written words. Digits never qualify.
pub fn is_letter(c: char) -> bool {
	if c.is_numeric() {
		return false;
	}
	c.is_alphabetic()
		|| matches!(
			c,
			'\u{0483}'..='\u{0487}'
				| '\u{0591}'..='\u{05BD}'
				| '\u{05BF}'
				| '\u{05C1}'..='\u{05C2}'
				| '\u{05C4}'..='\u{05C5}'
				| '\u{05C7}'
				| '\u{0610}'..='\u{061A}'
				| '\u{064B}'..='\u{065F}'
				| '\u{0670}'
				| '\u{06D6}'..='\u{06DC}'
				| '\u{06DF}'..='\u{06E8}'
				| '\u{06EA}'..='\u{06ED}'
				| '\u{0900}'..='\u{0963}'
				| '\u{0980}'..='\u{09E3}'
				| '\u{0A00}'..='\u{0A63}'
				| '\u{0A80}'..='\u{0AE3}'
				| '\u{0B80}'..='\u{0BD7}'
				| '\u{0C00}'..='\u{0C63}'
				| '\u{0E31}'..='\u{0E3A}'
				| '\u{0E47}'..='\u{0E4E}'
		)
}
