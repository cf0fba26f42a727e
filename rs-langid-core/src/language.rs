use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;
use crate::error::DetectionError;

/// The closed set of supported languages.
///
/// Variants are declared in alphabetical order; the derived `Ord` is the
/// stable tie-break order used when ranking confidence values.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Language {
	Afrikaans,
	Albanian,
	Arabic,
	Armenian,
	Azerbaijani,
	Basque,
	Belarusian,
	Bengali,
	Bokmal,
	Bosnian,
	Bulgarian,
	Catalan,
	Chinese,
	Croatian,
	Czech,
	Danish,
	Dutch,
	English,
	Esperanto,
	Estonian,
	Finnish,
	French,
	Ganda,
	Georgian,
	German,
	Greek,
	Gujarati,
	Hebrew,
	Hindi,
	Hungarian,
	Icelandic,
	Indonesian,
	Irish,
	Italian,
	Japanese,
	Kazakh,
	Korean,
	Latin,
	Latvian,
	Lithuanian,
	Macedonian,
	Malay,
	Maori,
	Marathi,
	Mongolian,
	Nynorsk,
	Persian,
	Polish,
	Portuguese,
	Punjabi,
	Romanian,
	Russian,
	Serbian,
	Shona,
	Slovak,
	Slovene,
	Somali,
	Sotho,
	Spanish,
	Swahili,
	Swedish,
	Tagalog,
	Tamil,
	Telugu,
	Thai,
	Tsonga,
	Tswana,
	Turkish,
	Ukrainian,
	Urdu,
	Vietnamese,
	Welsh,
	Xhosa,
	Yoruba,
	Zulu,
}

use Language::*;

impl Language {
	/// Every supported language, in the stable ordering.
	pub const ALL: [Language; 75] = [
		Afrikaans, Albanian, Arabic, Armenian, Azerbaijani, Basque, Belarusian, Bengali, Bokmal,
		Bosnian, Bulgarian, Catalan, Chinese, Croatian, Czech, Danish, Dutch, English, Esperanto,
		Estonian, Finnish, French, Ganda, Georgian, German, Greek, Gujarati, Hebrew, Hindi,
		Hungarian, Icelandic, Indonesian, Irish, Italian, Japanese, Kazakh, Korean, Latin, Latvian,
		Lithuanian, Macedonian, Malay, Maori, Marathi, Mongolian, Nynorsk, Persian, Polish,
		Portuguese, Punjabi, Romanian, Russian, Serbian, Shona, Slovak, Slovene, Somali, Sotho,
		Spanish, Swahili, Swedish, Tagalog, Tamil, Telugu, Thai, Tsonga, Tswana, Turkish,
		Ukrainian, Urdu, Vietnamese, Welsh, Xhosa, Yoruba, Zulu,
	];

	/// Returns all supported languages except the given ones.
	pub fn all_except(excluded: &[Language]) -> Vec<Language> {
		Self::ALL.iter().filter(|language| !excluded.contains(language)).copied().collect()
	}

	/// ISO 639-1 code, also used as the model directory name.
	pub fn iso_code(&self) -> &'static str {
		match self {
			Afrikaans => "af",
			Albanian => "sq",
			Arabic => "ar",
			Armenian => "hy",
			Azerbaijani => "az",
			Basque => "eu",
			Belarusian => "be",
			Bengali => "bn",
			Bokmal => "nb",
			Bosnian => "bs",
			Bulgarian => "bg",
			Catalan => "ca",
			Chinese => "zh",
			Croatian => "hr",
			Czech => "cs",
			Danish => "da",
			Dutch => "nl",
			English => "en",
			Esperanto => "eo",
			Estonian => "et",
			Finnish => "fi",
			French => "fr",
			Ganda => "lg",
			Georgian => "ka",
			German => "de",
			Greek => "el",
			Gujarati => "gu",
			Hebrew => "he",
			Hindi => "hi",
			Hungarian => "hu",
			Icelandic => "is",
			Indonesian => "id",
			Irish => "ga",
			Italian => "it",
			Japanese => "ja",
			Kazakh => "kk",
			Korean => "ko",
			Latin => "la",
			Latvian => "lv",
			Lithuanian => "lt",
			Macedonian => "mk",
			Malay => "ms",
			Maori => "mi",
			Marathi => "mr",
			Mongolian => "mn",
			Nynorsk => "nn",
			Persian => "fa",
			Polish => "pl",
			Portuguese => "pt",
			Punjabi => "pa",
			Romanian => "ro",
			Russian => "ru",
			Serbian => "sr",
			Shona => "sn",
			Slovak => "sk",
			Slovene => "sl",
			Somali => "so",
			Sotho => "st",
			Spanish => "es",
			Swahili => "sw",
			Swedish => "sv",
			Tagalog => "tl",
			Tamil => "ta",
			Telugu => "te",
			Thai => "th",
			Tsonga => "ts",
			Tswana => "tn",
			Turkish => "tr",
			Ukrainian => "uk",
			Urdu => "ur",
			Vietnamese => "vi",
			Welsh => "cy",
			Xhosa => "xh",
			Yoruba => "yo",
			Zulu => "zu",
		}
	}

	/// Alphabets this language is written in.
	pub fn alphabets(&self) -> &'static [Alphabet] {
		match self {
			Arabic | Persian | Urdu => &[Alphabet::Arabic],
			Armenian => &[Alphabet::Armenian],
			Bengali => &[Alphabet::Bengali],
			Belarusian | Bulgarian | Kazakh | Macedonian | Mongolian | Russian | Serbian
			| Ukrainian => &[Alphabet::Cyrillic],
			Chinese => &[Alphabet::Han],
			Georgian => &[Alphabet::Georgian],
			Greek => &[Alphabet::Greek],
			Gujarati => &[Alphabet::Gujarati],
			Hebrew => &[Alphabet::Hebrew],
			Hindi | Marathi => &[Alphabet::Devanagari],
			Japanese => &[Alphabet::Hiragana, Alphabet::Katakana, Alphabet::Han],
			Korean => &[Alphabet::Hangul],
			Punjabi => &[Alphabet::Gurmukhi],
			Tamil => &[Alphabet::Tamil],
			Telugu => &[Alphabet::Telugu],
			Thai => &[Alphabet::Thai],
			_ => &[Alphabet::Latin],
		}
	}
}

impl fmt::Display for Language {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

/// Parses either an ISO 639-1 code (`"de"`) or a name (`"german"`, `"GERMAN"`).
impl FromStr for Language {
	type Err = DetectionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let needle = s.trim();
		Language::ALL
			.iter()
			.find(|language| {
				language.iso_code().eq_ignore_ascii_case(needle)
					|| language.to_string().eq_ignore_ascii_case(needle)
			})
			.copied()
			.ok_or_else(|| DetectionError::UnsupportedLanguage(needle.to_owned()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn all_is_sorted_and_unique() {
		assert!(Language::ALL.windows(2).all(|pair| pair[0] < pair[1]));
	}

	#[test]
	fn iso_codes_are_unique() {
		let codes: HashSet<&str> = Language::ALL.iter().map(Language::iso_code).collect();
		assert_eq!(codes.len(), Language::ALL.len());
	}

	#[test]
	fn parses_codes_and_names() {
		assert_eq!("de".parse::<Language>().unwrap(), German);
		assert_eq!("German".parse::<Language>().unwrap(), German);
		assert_eq!(" PORTUGUESE ".parse::<Language>().unwrap(), Portuguese);
	}

	#[test]
	fn rejects_unsupported_languages() {
		let error = "klingon".parse::<Language>().unwrap_err();
		assert!(matches!(error, DetectionError::UnsupportedLanguage(ref name) if name == "klingon"));
	}

	#[test]
	fn all_except_removes_given_languages() {
		let languages = Language::all_except(&[Bosnian, Serbian]);
		assert_eq!(languages.len(), 73);
		assert!(!languages.contains(&Bosnian));
	}
}
