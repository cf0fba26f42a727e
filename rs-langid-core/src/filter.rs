use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::alphabet::Alphabet;
use crate::language::Language;
use crate::rules;

/// The languages still eligible while one text is being detected.
///
/// A `CandidateSet` is created fresh for every call and handed from the
/// filter to the scorer. Nothing about it is shared between calls.
///
/// # Invariants
/// - `excluded` is always a subset of `languages`
/// - Exclusion is monotonic: only [`CandidateSet::reset`] makes a language
///   eligible again
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateSet {
	/// Languages the detector was configured with.
	languages: BTreeSet<Language>,

	/// Languages ruled out for the current text.
	excluded: BTreeSet<Language>,
}

impl CandidateSet {
	/// Creates a set in which every given language is eligible.
	pub fn new<I: IntoIterator<Item = Language>>(languages: I) -> Self {
		Self { languages: languages.into_iter().collect(), excluded: BTreeSet::new() }
	}

	/// Returns `true` if `language` was ruled out.
	///
	/// Languages that were never configured count as excluded.
	pub fn is_excluded(&self, language: Language) -> bool {
		!self.languages.contains(&language) || self.excluded.contains(&language)
	}

	/// Returns `true` if `language` is still a candidate.
	pub fn is_eligible(&self, language: Language) -> bool {
		!self.is_excluded(language)
	}

	/// Rules out `language`. Unknown languages are ignored.
	pub fn exclude(&mut self, language: Language) {
		if self.languages.contains(&language) {
			self.excluded.insert(language);
		}
	}

	/// Rules out every eligible language for which `keep` returns `false`.
	pub fn retain<F: Fn(Language) -> bool>(&mut self, keep: F) {
		let dropped: Vec<Language> = self.eligible().filter(|&language| !keep(language)).collect();
		for language in dropped {
			self.exclude(language);
		}
	}

	/// Makes every configured language eligible again.
	pub fn reset(&mut self) {
		self.excluded.clear();
	}

	/// Eligible languages, in the stable language ordering.
	pub fn eligible(&self) -> impl Iterator<Item = Language> + '_ {
		self.languages.difference(&self.excluded).copied()
	}

	/// Eligible languages collected into a set.
	pub fn eligible_languages(&self) -> BTreeSet<Language> {
		self.eligible().collect()
	}

	/// Languages the set was created with, eligible or not.
	pub fn configured(&self) -> &BTreeSet<Language> {
		&self.languages
	}

	/// Number of eligible languages.
	pub fn len(&self) -> usize {
		self.languages.len() - self.excluded.len()
	}

	/// Returns `true` if no language is eligible.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Rule-based stage of detection.
///
/// Holds the configured languages and the alphabets that only one of them
/// writes in. Both are fixed at construction, which keeps every method a
/// pure function of its input.
#[derive(Clone, Debug)]
pub struct LanguageFilter {
	languages: BTreeSet<Language>,
	one_language_alphabets: BTreeMap<Alphabet, Language>,
}

impl LanguageFilter {
	/// Builds the filter for a configured language set.
	///
	/// An alphabet is a one-language alphabet when exactly one configured
	/// language supports it: with every language configured, Hangul maps to
	/// Korean and Greek to Greek, while Han (Chinese and Japanese) does not.
	pub fn new(languages: &BTreeSet<Language>) -> Self {
		let one_language_alphabets = Alphabet::ALL
			.iter()
			.filter_map(|alphabet| {
				let supporting = alphabet.supporting_languages(languages);
				match supporting.len() {
					1 => supporting.into_iter().next().map(|language| (*alphabet, language)),
					_ => None,
				}
			})
			.collect();

		Self { languages: languages.clone(), one_language_alphabets }
	}

	/// Returns a fresh candidate set with every configured language eligible.
	pub fn candidates(&self) -> CandidateSet {
		CandidateSet::new(self.languages.iter().copied())
	}

	/// Tries to settle the language from characters alone.
	///
	/// # Parameters
	/// - `words`: cleaned, lowercase words.
	///
	/// # Returns
	/// - `Some(language)` when the characters point at a single configured language.
	/// - `None` when rules are not conclusive and statistics must decide.
	///
	/// # Behavior
	/// - Each character of a word counts for the language of its one-language
	///   alphabet, for Chinese (Han), Japanese (kana) or for the language it is
	///   unique to.
	/// - A word votes for a language when it is the only one counted or
	///   strictly beats the runner-up. Chinese together with Japanese votes
	///   Japanese. Anything else votes unknown.
	/// - Unknown votes are dropped when they are fewer than half the words.
	/// - The word votes are then decided the same way as the character counts.
	pub fn detect_language_with_rules(&self, words: &[String]) -> Option<Language> {
		let mut total_counts: HashMap<Option<Language>, usize> = HashMap::new();

		for word in words {
			let mut word_counts: HashMap<Option<Language>, usize> = HashMap::new();
			for c in word.chars() {
				if let Some(language) = self.language_of_character(c) {
					*word_counts.entry(Some(language)).or_insert(0) += 1;
				}
			}
			*total_counts.entry(self.decide(word_counts)).or_insert(0) += 1;
		}

		let unknown_count = total_counts.get(&None).copied().unwrap_or(0);
		if (unknown_count as f64) < 0.5 * words.len() as f64 {
			total_counts.remove(&None);
		}

		self.decide(total_counts)
	}

	/// Narrows `candidates` using the alphabets and diagnostic characters of `words`.
	///
	/// # Behavior
	/// - Alphabets no eligible candidate writes in are ignored. Candidates that
	///   write in none of the remaining alphabets are excluded.
	/// - For each word, the language sets of its diagnostic characters are
	///   intersected. Candidates found in no word's intersection are excluded,
	///   unless that would leave no candidate at all.
	///
	/// # Notes
	/// - Only ever excludes; applying it twice to the same words changes nothing.
	pub fn filter_languages_by_rules(&self, words: &[String], candidates: &mut CandidateSet) {
		let eligible = candidates.eligible_languages();

		let present_alphabets: BTreeSet<Alphabet> = words
			.iter()
			.flat_map(|word| word.chars())
			.filter_map(Alphabet::of)
			.filter(|alphabet| !alphabet.supporting_languages(&eligible).is_empty())
			.collect();

		if !present_alphabets.is_empty() {
			candidates.retain(|language| {
				language.alphabets().iter().any(|alphabet| present_alphabets.contains(alphabet))
			});
		}

		let mut indicated: BTreeSet<Language> = BTreeSet::new();
		for word in words {
			if let Some(languages) = Self::diagnostic_languages_of(word) {
				indicated.extend(languages);
			}
		}

		let narrowed: BTreeSet<Language> =
			candidates.eligible().filter(|language| indicated.contains(language)).collect();
		if !narrowed.is_empty() {
			candidates.retain(|language| narrowed.contains(&language));
		}

		log::debug!(
			"Rule filter kept {} of {} languages",
			candidates.len(),
			candidates.configured().len()
		);
	}

	/// Language a single character counts for during rule detection.
	fn language_of_character(&self, c: char) -> Option<Language> {
		let alphabet = Alphabet::of(c)?;
		if let Some(language) = self.one_language_alphabets.get(&alphabet) {
			return Some(*language);
		}
		match alphabet {
			Alphabet::Han => Some(Language::Chinese),
			_ if rules::is_japanese_character(c) => Some(Language::Japanese),
			_ => rules::unique_language_of(c).filter(|language| self.languages.contains(language)),
		}
	}

	/// Picks a single configured winner out of counts, `None` keys being unknown.
	fn decide(&self, counts: HashMap<Option<Language>, usize>) -> Option<Language> {
		let chinese = Some(Language::Chinese);
		let japanese = Some(Language::Japanese);
		if counts.len() == 2 && counts.contains_key(&chinese) && counts.contains_key(&japanese) {
			return japanese.filter(|language| self.languages.contains(language));
		}

		let mut ranked: Vec<(Option<Language>, usize)> = counts.into_iter().collect();
		ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

		let winner = match ranked.as_slice() {
			[] => None,
			[(language, _)] => *language,
			[(first, top), (_, second), ..] if top > second => *first,
			_ => None,
		};
		winner.filter(|language| self.languages.contains(language))
	}

	/// Intersection of the language sets of every diagnostic character in `word`.
	///
	/// Returns `None` when the word has no diagnostic character.
	fn diagnostic_languages_of(word: &str) -> Option<BTreeSet<Language>> {
		word.chars()
			.map(rules::languages_with_character)
			.filter(|languages| !languages.is_empty())
			.map(|languages| languages.into_iter().collect::<BTreeSet<Language>>())
			.reduce(|common, next| common.intersection(&next).copied().collect())
	}
}
