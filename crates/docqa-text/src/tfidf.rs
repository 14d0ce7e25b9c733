use std::collections::HashMap;
use std::fmt;

use tantivy::tokenizer::TextAnalyzer;

use crate::tantivy_utils::{analyze, build_analyzer};

/// L2-normalised term weights, sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
	entries: Vec<(u32, f32)>,
}

impl SparseVector {
	fn from_counts(counts: HashMap<u32, u32>, idf: &[f32]) -> Self {
		#[allow(clippy::cast_precision_loss)]
		let mut entries: Vec<(u32, f32)> = counts
			.into_iter()
			.map(|(term, tf)| (term, tf as f32 * idf[term as usize]))
			.collect();
		entries.sort_by_key(|(term, _)| *term);
		let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
		if norm > 0.0 { for (_, w) in &mut entries { *w /= norm; } }
		Self { entries }
	}

	pub fn is_empty(&self) -> bool { self.entries.is_empty() }

	pub fn nnz(&self) -> usize { self.entries.len() }

	/// Cosine similarity; both sides are unit length (or empty).
	pub fn dot(&self, other: &SparseVector) -> f32 {
		let (mut i, mut j, mut acc) = (0usize, 0usize, 0f32);
		while i < self.entries.len() && j < other.entries.len() {
			let (a, wa) = self.entries[i];
			let (b, wb) = other.entries[j];
			match a.cmp(&b) {
				std::cmp::Ordering::Less => i += 1,
				std::cmp::Ordering::Greater => j += 1,
				std::cmp::Ordering::Equal => { acc += wa * wb; i += 1; j += 1; }
			}
		}
		acc
	}
}

/// TF-IDF model fitted over one chunk collection.
///
/// Weights are raw term counts times smoothed idf `ln((1 + n) / (1 + df)) + 1`,
/// rows L2-normalised. Terms unseen at fit time are ignored by `transform`.
#[derive(Clone)]
pub struct TfidfVectorizer {
	analyzer: TextAnalyzer,
	vocabulary: HashMap<String, u32>,
	idf: Vec<f32>,
}

impl fmt::Debug for TfidfVectorizer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TfidfVectorizer").field("vocabulary", &self.vocabulary.len()).finish_non_exhaustive()
	}
}

impl TfidfVectorizer {
	/// Fit vocabulary and idf over `docs` and return their weight rows.
	///
	/// Fails when no document contributes a single term.
	pub fn fit_transform<S: AsRef<str>>(docs: &[S]) -> anyhow::Result<(Self, Vec<SparseVector>)> {
		let mut analyzer = build_analyzer();
		let mut vocabulary: HashMap<String, u32> = HashMap::new();
		let mut doc_freq: Vec<u32> = Vec::new();
		let mut doc_counts: Vec<HashMap<u32, u32>> = Vec::with_capacity(docs.len());
		for doc in docs {
			let mut counts: HashMap<u32, u32> = HashMap::new();
			for term in analyze(&mut analyzer, doc.as_ref()) {
				let next_id = u32::try_from(vocabulary.len())?;
				let id = *vocabulary.entry(term).or_insert(next_id);
				if id == next_id { doc_freq.push(0); }
				*counts.entry(id).or_insert(0) += 1;
			}
			for id in counts.keys() { doc_freq[*id as usize] += 1; }
			doc_counts.push(counts);
		}
		if vocabulary.is_empty() {
			anyhow::bail!("empty vocabulary: the document contains only stop words or punctuation");
		}
		#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
		let idf: Vec<f32> = {
			let n = docs.len() as f64;
			doc_freq.iter().map(|&df| (((1.0 + n) / (1.0 + f64::from(df))).ln() + 1.0) as f32).collect()
		};
		let rows = doc_counts.into_iter().map(|counts| SparseVector::from_counts(counts, &idf)).collect();
		Ok((Self { analyzer, vocabulary, idf }, rows))
	}

	/// Project `text` into the fitted term space.
	pub fn transform(&self, text: &str) -> SparseVector {
		let mut analyzer = self.analyzer.clone();
		let mut counts: HashMap<u32, u32> = HashMap::new();
		for term in analyze(&mut analyzer, text) {
			if let Some(id) = self.vocabulary.get(&term) { *counts.entry(*id).or_insert(0) += 1; }
		}
		SparseVector::from_counts(counts, &self.idf)
	}

	pub fn vocabulary_len(&self) -> usize { self.vocabulary.len() }

	pub fn idf(&self, term: &str) -> Option<f32> {
		self.vocabulary.get(term).map(|id| self.idf[*id as usize])
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rare_terms_weigh_more() {
		let (model, rows) = TfidfVectorizer::fit_transform(&["river bank water", "river boat", "river fish"]).expect("fit");
		assert_eq!(rows.len(), 3);
		assert!(model.idf("bank").unwrap() > model.idf("river").unwrap());
		assert!((model.idf("river").unwrap() - 1.0).abs() < 1e-6);
	}

	#[test]
	fn rows_are_unit_length() {
		let (_, rows) = TfidfVectorizer::fit_transform(&["alpha beta beta", "gamma"]).expect("fit");
		for row in &rows {
			assert!((row.dot(row) - 1.0).abs() < 1e-5);
		}
	}

	#[test]
	fn unknown_query_terms_are_ignored() {
		let (model, rows) = TfidfVectorizer::fit_transform(&["alpha beta", "gamma delta"]).expect("fit");
		let q = model.transform("zeta omega");
		assert!(q.is_empty());
		assert_eq!(q.dot(&rows[0]), 0.0);
		let q = model.transform("gamma zeta");
		assert_eq!(q.nnz(), 1);
		assert!(q.dot(&rows[1]) > 0.0);
	}

	#[test]
	fn stop_word_only_corpus_fails() {
		assert!(TfidfVectorizer::fit_transform(&["the and of", "is it"]).is_err());
	}
}
