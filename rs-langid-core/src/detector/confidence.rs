use serde::Serialize;

use crate::language::Language;

/// Ranked confidence values of one text.
///
/// # Invariants
/// - Values are non-negative and sum to 1 unless the list is empty
/// - Sorted by descending value, ties broken by the language ordering
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct ConfidenceValues {
	values: Vec<(Language, f64)>,
}

impl ConfidenceValues {
	/// No language could be determined.
	pub fn empty() -> Self {
		Self::default()
	}

	/// All confidence on a single language.
	pub fn certain(language: Language) -> Self {
		Self { values: vec![(language, 1.0)] }
	}

	/// Turns summed log-probabilities into a distribution using softmax.
	///
	/// Scores are shifted by their maximum before exponentiation so large
	/// negative sums do not underflow to zero all at once.
	pub fn from_log_scores(scores: Vec<(Language, f64)>) -> Self {
		let max = scores.iter().map(|(_, score)| *score).fold(f64::NEG_INFINITY, f64::max);
		if !max.is_finite() {
			return Self::empty();
		}

		let exponentials: Vec<(Language, f64)> =
			scores.into_iter().map(|(language, score)| (language, (score - max).exp())).collect();
		let sum: f64 = exponentials.iter().map(|(_, value)| value).sum();

		let mut values: Vec<(Language, f64)> =
			exponentials.into_iter().map(|(language, value)| (language, value / sum)).collect();
		values.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
		Self { values }
	}

	/// Iterates over `(language, confidence)` pairs, most likely first.
	pub fn iter(&self) -> impl Iterator<Item = (Language, f64)> + '_ {
		self.values.iter().copied()
	}

	/// The most likely language and its confidence.
	pub fn first(&self) -> Option<(Language, f64)> {
		self.values.first().copied()
	}

	/// Confidence of `language`, `None` if it is not listed.
	pub fn get(&self, language: Language) -> Option<f64> {
		self.values.iter().find(|(listed, _)| *listed == language).map(|(_, value)| *value)
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn into_vec(self) -> Vec<(Language, f64)> {
		self.values
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::Rng;

	#[test]
	fn softmax_ranks_and_normalizes() {
		let values = ConfidenceValues::from_log_scores(vec![
			(Language::English, -12.0),
			(Language::German, -10.0),
			(Language::French, -12.0),
		]);

		let ranked: Vec<Language> = values.iter().map(|(language, _)| language).collect();
		assert_eq!(ranked, vec![Language::German, Language::English, Language::French]);
		assert_eq!(values.get(Language::English), values.get(Language::French));
		assert!((values.iter().map(|(_, value)| value).sum::<f64>() - 1.0).abs() < 1e-12);
	}

	#[test]
	fn random_scores_always_sum_to_one() {
		let mut rng = rand::rng();
		for _ in 0..100 {
			let scores: Vec<(Language, f64)> = Language::ALL
				.iter()
				.take(rng.random_range(1..=20))
				.map(|language| (*language, rng.random_range(-5000.0..0.0)))
				.collect();
			let values = ConfidenceValues::from_log_scores(scores);
			let sum: f64 = values.iter().map(|(_, value)| value).sum();
			assert!((sum - 1.0).abs() < 1e-9);
			assert!(values.iter().all(|(_, value)| value >= 0.0));
		}
	}

	#[test]
	fn no_scores_give_no_values() {
		assert!(ConfidenceValues::from_log_scores(Vec::new()).is_empty());
		assert_eq!(ConfidenceValues::certain(Language::Korean).first(), Some((Language::Korean, 1.0)));
	}
}
