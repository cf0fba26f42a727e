use crate::alphabet::{is_letter, Alphabet};

/// Normalizes raw input before detection.
///
/// - Letters are lowercased and kept.
/// - Apostrophes inside a word are dropped (`don't` → `dont`).
/// - Every other non-letter (digits, punctuation, symbols, whitespace)
///   becomes a single separating space.
/// - Leading and trailing separators are removed.
///
/// The result is empty when `text` contains no letters at all.
pub fn clean_up_input_text(text: &str) -> String {
	let mut cleaned = String::with_capacity(text.len());
	let mut pending_space = false;
	let mut chars = text.chars().peekable();

	while let Some(c) = chars.next() {
		if is_letter(c) {
			if pending_space && !cleaned.is_empty() {
				cleaned.push(' ');
			}
			pending_space = false;
			cleaned.extend(c.to_lowercase().filter(|&lower| is_letter(lower)));
		} else if is_apostrophe(c)
			&& cleaned.chars().last().is_some_and(is_letter)
			&& !pending_space
			&& chars.peek().copied().is_some_and(is_letter)
		{
			continue;
		} else {
			pending_space = true;
		}
	}

	cleaned
}

/// Splits cleaned text into words.
///
/// Han logograms carry meaning on their own and are not separated by
/// spaces in writing, so each one becomes a word of its own.
pub fn split_text_into_words(cleaned: &str) -> Vec<String> {
	let mut words = Vec::new();

	for token in cleaned.split_whitespace() {
		let mut current = String::new();
		for c in token.chars() {
			if Alphabet::Han.matches(c) {
				if !current.is_empty() {
					words.push(std::mem::take(&mut current));
				}
				words.push(c.to_string());
			} else {
				current.push(c);
			}
		}
		if !current.is_empty() {
			words.push(current);
		}
	}

	words
}

/// Number of letters in cleaned text.
pub fn letter_count(cleaned: &str) -> usize {
	cleaned.chars().filter(|c| !c.is_whitespace()).count()
}

fn is_apostrophe(c: char) -> bool {
	matches!(c, '\'' | '’' | 'ʼ')
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn texts_without_letters_clean_up_to_nothing() {
		for text in ["", " \n  \t;", "3<856%)§", "12:45 -- 99%"] {
			assert_eq!(clean_up_input_text(text), "", "{:?}", text);
		}
	}

	#[test]
	fn lowercases_and_separates_on_non_letters() {
		assert_eq!(clean_up_input_text("  Hello, World!! 42times "), "hello world times");
		assert_eq!(clean_up_input_text("ÜBER-Groß"), "über groß");
	}

	#[test]
	fn joins_apostrophes_inside_words_only() {
		assert_eq!(clean_up_input_text("don't"), "dont");
		assert_eq!(clean_up_input_text("l’homme"), "lhomme");
		assert_eq!(clean_up_input_text("'quoted' text"), "quoted text");
	}

	#[test]
	fn splits_words_and_isolates_logograms() {
		assert_eq!(split_text_into_words("hello world"), vec!["hello", "world"]);
		assert_eq!(split_text_into_words("東京です"), vec!["東", "京", "です"]);
		assert!(split_text_into_words("").is_empty());
	}

	#[test]
	fn counts_letters_only() {
		assert_eq!(letter_count("ab cd"), 4);
	}
}
