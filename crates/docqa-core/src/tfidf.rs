//! TF-IDF vector space over normalized sentences.
//!
//! # Weighting
//!
//! ```text
//! idf(t)    = ln((1 + n) / (1 + df(t))) + 1
//! w(t, s)   = count(t, s) × idf(t)
//! row(s)    = w(·, s) / ‖w(·, s)‖₂
//! ```
//!
//! `n` is the number of sentences and `df(t)` the number of sentences
//! containing term `t`. The vocabulary is fixed at fit time; query terms
//! outside it are ignored. Term ids follow lexicographic order, so two fits
//! over the same corpus are identical.

use std::collections::{BTreeSet, HashMap};

/// A sparse term-weight vector, entries sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    fn from_counts(counts: HashMap<usize, f64>) -> Self {
        let mut entries: Vec<(usize, f64)> = counts.into_iter().collect();
        entries.sort_by_key(|(term, _)| *term);
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > f64::EPSILON {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
        self
    }
}

/// Cosine similarity between two sparse vectors.
///
/// Returns `0.0` when either vector is empty or has zero norm.
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < f64::EPSILON {
        return 0.0;
    }

    let (mut i, mut j, mut dot) = (0usize, 0usize, 0.0f64);
    while i < a.entries.len() && j < b.entries.len() {
        let (ta, wa) = a.entries[i];
        let (tb, wb) = b.entries[j];
        match ta.cmp(&tb) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                dot += wa * wb;
                i += 1;
                j += 1;
            }
        }
    }

    dot / denom
}

/// A fitted TF-IDF model plus the vectorized rows of its corpus.
#[derive(Debug, Clone, Default)]
pub struct TfidfIndex {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
}

impl TfidfIndex {
    /// Fit the vocabulary and IDF weights on `docs` and vectorize each one.
    pub fn fit(docs: &[Vec<String>]) -> Self {
        let terms: BTreeSet<&str> = docs.iter().flatten().map(String::as_str).collect();
        let vocabulary: HashMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(id, term)| (term.to_string(), id))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        for doc in docs {
            let unique: BTreeSet<usize> = doc
                .iter()
                .filter_map(|t| vocabulary.get(t))
                .copied()
                .collect();
            for id in unique {
                df[id] += 1;
            }
        }

        let n = docs.len() as f64;
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            rows: Vec::new(),
        };
        index.rows = docs.iter().map(|doc| index.transform(doc)).collect();
        index
    }

    /// Vectorize a token sequence into this index's space.
    pub fn transform(&self, tokens: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for token in tokens {
            if let Some(&id) = self.vocabulary.get(token) {
                *counts.entry(id).or_insert(0.0) += 1.0;
            }
        }
        for (id, w) in counts.iter_mut() {
            *w *= self.idf[*id];
        }
        SparseVector::from_counts(counts).l2_normalized()
    }

    /// Cosine similarity of `query` against every fitted row, in row order.
    pub fn similarities(&self, query: &SparseVector) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| cosine_similarity(query, row))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&id| self.idf[id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    fn corpus() -> Vec<Vec<String>> {
        vec![toks("cat sat mat"), toks("dog bark loud"), toks("cat dog pet")]
    }

    #[test]
    fn test_fit_vocabulary() {
        let index = TfidfIndex::fit(&corpus());
        assert_eq!(index.len(), 3);
        assert_eq!(index.vocabulary_len(), 7);
    }

    #[test]
    fn test_common_terms_have_lower_idf() {
        let index = TfidfIndex::fit(&corpus());
        let cat = index.idf("cat").unwrap();
        let mat = index.idf("mat").unwrap();
        assert!(cat < mat);
        // cat appears in two of three rows, mat in one
        assert!((cat - ((4.0f64 / 3.0).ln() + 1.0)).abs() < 1e-12);
        assert!((mat - ((4.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let index = TfidfIndex::fit(&corpus());
        for sim in index.similarities(&index.transform(&toks("cat sat mat"))) {
            assert!(sim <= 1.0 + 1e-9);
        }
        let v = index.transform(&toks("dog bark"));
        assert!((v.norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_match() {
        let index = TfidfIndex::fit(&corpus());
        let sims = index.similarities(&index.transform(&toks("loud bark dog")));
        assert!(sims[1] > sims[2]);
        assert!(sims[2] > sims[0]);
        assert_eq!(sims[0], 0.0);
    }

    #[test]
    fn test_out_of_vocabulary_query() {
        let index = TfidfIndex::fit(&corpus());
        let q = index.transform(&toks("zebra"));
        assert!(q.is_empty());
        assert!(index.similarities(&q).iter().all(|s| *s == 0.0));
    }

    #[test]
    fn test_empty_corpus() {
        let index = TfidfIndex::fit(&[]);
        assert!(index.is_empty());
        assert!(index.similarities(&index.transform(&toks("cat"))).is_empty());
    }

    #[test]
    fn test_cosine_identical_and_disjoint() {
        let index = TfidfIndex::fit(&corpus());
        let a = index.transform(&toks("cat dog"));
        let b = index.transform(&toks("mat"));
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&a, &b), 0.0);
        assert_eq!(cosine_similarity(&SparseVector::default(), &a), 0.0);
    }
}
