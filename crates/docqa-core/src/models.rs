//! Core data types: documents, sentences, queries, and ranked candidates.

use std::collections::BTreeSet;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::entities::EntityHinter;
use crate::normalize::Normalizer;
use crate::segment::SentenceSegmenter;

/// A loaded document: immutable raw text plus its ordered sentences.
#[derive(Debug, Clone)]
pub struct Document {
    /// Where the text came from (path or caller-chosen name).
    pub source: String,
    /// Full text as loaded.
    pub text: String,
    /// Sentences in document order. Index `i` has `sentences[i].index == i`.
    pub sentences: Vec<Sentence>,
    /// SHA-256 hex digest of `text`.
    pub fingerprint: String,
}

impl Document {
    /// Segment `text` into sentences and build the document.
    pub fn new(
        source: impl Into<String>,
        text: impl Into<String>,
        segmenter: &dyn SentenceSegmenter,
    ) -> Self {
        let text = text.into();
        let sentences = segmenter
            .segment(&text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Sentence { index, text })
            .collect();

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let fingerprint = format!("{:x}", hasher.finalize());

        Self {
            source: source.into(),
            text,
            sentences,
            fingerprint,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

/// The atomic unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    /// Position in [`Document::sentences`].
    pub index: usize,
    pub text: String,
}

/// Deduplicated query keywords: stems plus entity phrases.
///
/// Backed by a `BTreeSet` so iteration order (and therefore scoring
/// tie-breaks) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if keyword.trim().is_empty() {
            return false;
        }
        self.0.insert(keyword)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = KeywordSet::new();
        for k in iter {
            set.insert(k);
        }
        set
    }
}

/// A question plus everything derived from it for ranking.
#[derive(Debug, Clone)]
pub struct Query {
    pub raw: String,
    /// Normalized stems in question order (input to vectorization).
    pub stems: Vec<String>,
    /// Entity phrases with original casing.
    pub entities: BTreeSet<String>,
    /// `stems ∪ entities`.
    pub keywords: KeywordSet,
}

impl Query {
    pub fn new(raw: impl Into<String>, normalizer: &Normalizer, hinter: &EntityHinter) -> Self {
        let raw = raw.into();
        let stems = normalizer.normalize(&raw);
        let entities = if raw.trim().is_empty() {
            BTreeSet::new()
        } else {
            hinter.extract_entities(&raw)
        };
        let keywords = stems
            .iter()
            .cloned()
            .chain(entities.iter().cloned())
            .collect();

        Self {
            raw,
            stems,
            entities,
            keywords,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// A sentence selected by a ranker, with its relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate<'a> {
    pub sentence: &'a Sentence,
    /// Relevance score, always `>= 0.0`.
    pub score: f64,
}

impl<'a> Candidate<'a> {
    pub fn text(&self) -> &'a str {
        &self.sentence.text
    }

    pub fn index(&self) -> usize {
        self.sentence.index
    }
}
