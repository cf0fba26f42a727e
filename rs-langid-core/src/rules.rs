//! Static linguistic facts used by the rule-based filter.
//!
//! Two kinds of diagnostic characters exist:
//! - characters **unique** to one language (`ß` is German only),
//! - characters **shared** by a small group of languages (`ć` appears in
//!   Bosnian, Croatian and Polish only).
//!
//! Tables hold both upper and lower case forms even though detection only
//! sees lowercase text, so they can be read as alphabets.

use crate::alphabet::Alphabet;
use crate::language::Language::{self, *};

/// Characters shared by a closed group of languages.
const SHARED_CHARACTERS: &[(&str, &[Language])] = &[
	("Ãã", &[Portuguese, Vietnamese]),
	("ĄąĘę", &[Lithuanian, Polish]),
	("Żż", &[Polish, Romanian]),
	("Îî", &[French, Romanian]),
	("Ññ", &[Basque, Spanish]),
	("ŇňŤť", &[Czech, Slovak]),
	("Ăă", &[Romanian, Vietnamese]),
	("İıĞğ", &[Azerbaijani, Turkish]),
	("ЈјЉљЊњ", &[Macedonian, Serbian]),
	("ẸẹỌọ", &[Vietnamese, Yoruba]),
	("ÐðÞþ", &[Icelandic, Turkish]),
	("Ûû", &[French, Hungarian]),
	("Ōō", &[Maori, Yoruba]),
	("ӨөҮү", &[Kazakh, Mongolian]),
	("پچژگیک", &[Persian, Urdu]),
	("ĀāĒēĪī", &[Latvian, Maori, Yoruba]),
	("Şş", &[Azerbaijani, Romanian, Turkish]),
	("Ďď", &[Czech, Romanian, Slovak]),
	("Ćć", &[Bosnian, Croatian, Polish]),
	("Đđ", &[Bosnian, Croatian, Vietnamese]),
	("Іі", &[Belarusian, Kazakh, Ukrainian]),
	("Ìì", &[Italian, Vietnamese, Yoruba]),
	("Øø", &[Bokmal, Danish, Nynorsk]),
	("Ūū", &[Latvian, Lithuanian, Maori, Yoruba]),
	("Ëë", &[Afrikaans, Albanian, Dutch, French]),
	("ÈèÙù", &[Catalan, French, Italian, Vietnamese, Yoruba]),
	("Êê", &[Afrikaans, French, Portuguese, Vietnamese]),
	("Õõ", &[Estonian, Hungarian, Portuguese, Vietnamese]),
	("Ôô", &[French, Portuguese, Slovak, Vietnamese]),
	("ЁёЫыЭэ", &[Belarusian, Kazakh, Mongolian, Russian]),
	("ЩщЪъ", &[Bulgarian, Kazakh, Mongolian, Russian]),
	("Òò", &[Catalan, Italian, Vietnamese, Yoruba]),
	("Ææ", &[Bokmal, Danish, Icelandic, Nynorsk]),
	("Åå", &[Bokmal, Danish, Nynorsk, Swedish]),
	("Ýý", &[Czech, Icelandic, Slovak, Turkish, Vietnamese]),
	("Ää", &[Estonian, Finnish, German, Slovak, Swedish]),
	("Àà", &[Catalan, French, Italian, Portuguese, Vietnamese]),
	("Ââ", &[French, Portuguese, Romanian, Turkish, Vietnamese]),
	("Üü", &[Azerbaijani, Catalan, Estonian, German, Hungarian, Spanish, Turkish]),
	("ČčŠšŽž", &[Bosnian, Czech, Croatian, Latvian, Lithuanian, Slovak, Slovene]),
	("Çç", &[Albanian, Azerbaijani, Basque, Catalan, French, Latvian, Portuguese, Turkish]),
	("Öö", &[Azerbaijani, Estonian, Finnish, German, Hungarian, Icelandic, Swedish, Turkish]),
	(
		"Óó",
		&[Catalan, Hungarian, Icelandic, Irish, Polish, Portuguese, Slovak, Spanish, Vietnamese, Yoruba],
	),
	(
		"ÁáÍíÚú",
		&[Catalan, Czech, Icelandic, Irish, Hungarian, Portuguese, Slovak, Spanish, Vietnamese, Yoruba],
	),
	(
		"Éé",
		&[
			Catalan, Czech, French, Hungarian, Icelandic, Irish, Italian, Portuguese, Slovak, Spanish,
			Vietnamese, Yoruba,
		],
	),
];

/// Characters that occur in exactly one supported language.
pub fn unique_characters(language: Language) -> Option<&'static str> {
	match language {
		Azerbaijani => Some("Əə"),
		Catalan => Some("Ïï"),
		Czech => Some("ĚěŘřŮů"),
		Esperanto => Some("ĈĉĜĝĤĥĴĵŜŝŬŭ"),
		German => Some("ß"),
		Hungarian => Some("ŐőŰű"),
		Kazakh => Some("ӘәҒғҚқҢңҰұ"),
		Latvian => Some("ĢģĶķĻļŅņ"),
		Lithuanian => Some("ĖėĮįŲų"),
		Macedonian => Some("ЃѓЅѕЌќЏџ"),
		Marathi => Some("ळ"),
		Polish => Some("ŁłŃńŚśŹź"),
		Romanian => Some("ŢţȚț"),
		Serbian => Some("ЂђЋћ"),
		Slovak => Some("ĹĺĽľŔŕ"),
		Ukrainian => Some("ҐґЄєЇї"),
		Urdu => Some("ٹڈڑںھےۓ"),
		Vietnamese => Some(
			"ẠạẢảẤấẦầẨẩẪẫẬậẮắẰằẲẳẴẵẶặẺẻẼẽẾếỀềỂểỄễỆệỈỉỊịỎỏỐốỒồỔổỖỗỘộỚớỜờỞởỠỡỢợỤụỦủỨứỪừỬửỮữỰựỲỳỴỵỶỷỸỹƠơƯưĨĩŨũ",
		),
		Yoruba => Some("Ṣṣ"),
		_ => None,
	}
}

/// Returns the single language `c` is unique to, if any.
pub fn unique_language_of(c: char) -> Option<Language> {
	Language::ALL
		.iter()
		.find(|&&language| unique_characters(language).is_some_and(|chars| chars.contains(c)))
		.copied()
}

/// Returns every language that has `c` as a diagnostic character.
///
/// Unique characters yield a single language, shared characters their whole
/// group, and ordinary characters (`a`, `ж`, `ع`) nothing.
pub fn languages_with_character(c: char) -> Vec<Language> {
	if let Some(language) = unique_language_of(c) {
		return vec![language];
	}
	SHARED_CHARACTERS
		.iter()
		.find(|(characters, _)| characters.contains(c))
		.map(|(_, languages)| languages.to_vec())
		.unwrap_or_default()
}

/// Returns `true` for kana, which only Japanese uses among supported languages.
pub fn is_japanese_character(c: char) -> bool {
	matches!(Alphabet::of(c), Some(Alphabet::Hiragana | Alphabet::Katakana))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn diagnostic_characters_belong_to_one_entry() {
		let mut owners: HashMap<char, usize> = HashMap::new();
		for (characters, _) in SHARED_CHARACTERS {
			for c in characters.chars() {
				*owners.entry(c).or_insert(0) += 1;
			}
		}
		for language in Language::ALL {
			for c in unique_characters(language).unwrap_or_default().chars() {
				*owners.entry(c).or_insert(0) += 1;
			}
		}
		let duplicated: Vec<char> = owners.into_iter().filter(|&(_, n)| n > 1).map(|(c, _)| c).collect();
		assert!(duplicated.is_empty(), "characters listed twice: {:?}", duplicated);
	}

	#[test]
	fn shared_groups_have_at_least_two_languages() {
		for (characters, languages) in SHARED_CHARACTERS {
			assert!(languages.len() >= 2, "{} has a single language", characters);
		}
	}

	#[test]
	fn diagnostic_characters_are_written_in_the_language_alphabet() {
		for (characters, languages) in SHARED_CHARACTERS {
			for c in characters.chars() {
				let alphabet = Alphabet::of(c).expect("diagnostic characters are letters");
				assert!(languages.iter().all(|language| language.alphabets().contains(&alphabet)));
			}
		}
		for language in Language::ALL {
			for c in unique_characters(language).unwrap_or_default().chars() {
				let alphabet = Alphabet::of(c).expect("unique characters are letters");
				assert!(language.alphabets().contains(&alphabet), "{:?} of {}", c, language);
			}
		}
	}

	#[test]
	fn looks_up_character_groups() {
		assert_eq!(languages_with_character('ß'), vec![German]);
		assert_eq!(languages_with_character('ć'), vec![Bosnian, Croatian, Polish]);
		assert!(languages_with_character('a').is_empty());
		assert_eq!(unique_language_of('ő'), Some(Hungarian));
		assert_eq!(unique_language_of('é'), None);
	}

	#[test]
	fn kana_is_japanese() {
		assert!(is_japanese_character('の'));
		assert!(is_japanese_character('カ'));
		assert!(!is_japanese_character('語'));
	}
}
