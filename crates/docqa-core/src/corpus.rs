//! The sentence corpus of the loaded document and its lifecycle.
//!
//! A [`Corpus`] is built once per document load: every sentence is
//! normalized up front, and the TF-IDF model is fitted on first use and then
//! reused for every question. Loading a new document replaces the whole
//! [`DocumentState`]; nothing is updated incrementally.

use std::sync::OnceLock;

use crate::error::CoreError;
use crate::models::{Document, Sentence};
use crate::normalize::Normalizer;
use crate::tfidf::TfidfIndex;

/// A document plus per-sentence normalized stems.
#[derive(Debug)]
pub struct Corpus {
    document: Document,
    normalized: Vec<Vec<String>>,
    tfidf: OnceLock<TfidfIndex>,
}

impl Corpus {
    pub fn new(document: Document, normalizer: &Normalizer) -> Self {
        let normalized = document
            .sentences
            .iter()
            .map(|s| normalizer.normalize(&s.text))
            .collect();
        Self {
            document,
            normalized,
            tfidf: OnceLock::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.document.sentences
    }

    /// Normalized stems of sentence `index`.
    pub fn stems(&self, index: usize) -> &[String] {
        self.normalized.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.document.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.sentences.is_empty()
    }

    /// The TF-IDF model over this corpus, fitted on first call.
    pub fn tfidf(&self) -> &TfidfIndex {
        self.tfidf.get_or_init(|| {
            let index = TfidfIndex::fit(&self.normalized);
            tracing::debug!(
                sentences = index.len(),
                vocabulary = index.vocabulary_len(),
                "fitted tf-idf model"
            );
            index
        })
    }
}

/// Whether a document is available to answer questions against.
#[derive(Debug, Default)]
pub enum DocumentState {
    #[default]
    Unloaded,
    Loaded(Corpus),
}

impl DocumentState {
    /// The loaded corpus, or [`CoreError::NoDocument`].
    pub fn corpus(&self) -> Result<&Corpus, CoreError> {
        match self {
            DocumentState::Loaded(corpus) => Ok(corpus),
            DocumentState::Unloaded => Err(CoreError::NoDocument),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, DocumentState::Loaded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::segment::RuleSegmenter;

    fn corpus(text: &str) -> Corpus {
        let normalizer = Normalizer::new(Language::English);
        Corpus::new(
            Document::new("test", text, &RuleSegmenter::new()),
            &normalizer,
        )
    }

    #[test]
    fn test_stems_per_sentence() {
        let c = corpus("The cat sat on the mat. Dogs bark loudly.");
        assert_eq!(c.len(), 2);
        assert_eq!(c.stems(0), ["cat", "sat", "mat"]);
        assert_eq!(c.stems(1), ["dog", "bark", "loud"]);
        assert!(c.stems(7).is_empty());
    }

    #[test]
    fn test_tfidf_fitted_once() {
        let c = corpus("The cat sat on the mat. Dogs bark loudly.");
        let first = c.tfidf() as *const TfidfIndex;
        let second = c.tfidf() as *const TfidfIndex;
        assert_eq!(first, second);
        assert_eq!(c.tfidf().len(), 2);
    }

    #[test]
    fn test_unloaded_state_is_error() {
        let state = DocumentState::default();
        assert!(!state.is_loaded());
        assert!(matches!(state.corpus(), Err(CoreError::NoDocument)));
    }

    #[test]
    fn test_loaded_state() {
        let state = DocumentState::Loaded(corpus("Hello there."));
        assert!(state.is_loaded());
        assert_eq!(state.corpus().unwrap().len(), 1);
    }
}
