//! Relevance ranking of corpus sentences against a query.
//!
//! Two strategies sit behind the one [`Ranker`] trait:
//!
//! | Strategy | Selects | Order |
//! |---|---|---|
//! | [`LexicalOverlap`] | every sentence sharing a keyword | document order |
//! | [`TfidfCosine`] | top-K by cosine similarity, score > 0 | score desc, then document order |
//!
//! The two orderings differ on purpose and the budgeter consumes whichever
//! order it is given. Both return nothing for an empty keyword set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;
use crate::error::CoreError;
use crate::models::{Candidate, Query};

/// Default number of candidates kept by [`TfidfCosine`].
pub const DEFAULT_TOP_K: usize = 3;

/// Scores corpus sentences against a query.
pub trait Ranker: Send + Sync {
    /// Short name used in logs and JSON output.
    fn name(&self) -> &'static str;

    fn rank<'c>(&self, corpus: &'c Corpus, query: &Query) -> Vec<Candidate<'c>>;
}

/// Keyword overlap between the query and each sentence.
///
/// A sentence qualifies when its stems intersect the query stems or an
/// entity phrase occurs case-insensitively in its raw text. Stems are only
/// compared whole, so `cat` never matches inside "Education". The score is
/// the number of keywords matched either way.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalOverlap;

impl Ranker for LexicalOverlap {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn rank<'c>(&self, corpus: &'c Corpus, query: &Query) -> Vec<Candidate<'c>> {
        if query.keywords.is_empty() {
            return Vec::new();
        }

        // (keyword, lowercased phrase if the keyword is an entity)
        let keywords: Vec<(&str, Option<String>)> = query
            .keywords
            .iter()
            .map(|k| {
                let phrase = query.entities.contains(k).then(|| k.to_lowercase());
                (k, phrase)
            })
            .collect();

        let mut out = Vec::new();
        for sentence in corpus.sentences() {
            let stems = corpus.stems(sentence.index);
            let lowered = sentence.text.to_lowercase();
            let matched = keywords
                .iter()
                .filter(|(k, phrase)| {
                    stems.iter().any(|s| s == k)
                        || phrase.as_deref().is_some_and(|p| lowered.contains(p))
                })
                .count();
            if matched > 0 {
                out.push(Candidate {
                    sentence,
                    score: matched as f64,
                });
            }
        }

        tracing::debug!(
            keywords = keywords.len(),
            candidates = out.len(),
            "lexical ranking"
        );
        out
    }
}

/// Cosine similarity in the corpus TF-IDF space, top-K.
#[derive(Debug, Clone, Copy)]
pub struct TfidfCosine {
    pub top_k: usize,
}

impl TfidfCosine {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }
}

impl Default for TfidfCosine {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl Ranker for TfidfCosine {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn rank<'c>(&self, corpus: &'c Corpus, query: &Query) -> Vec<Candidate<'c>> {
        if query.keywords.is_empty() || corpus.is_empty() {
            return Vec::new();
        }

        let index = corpus.tfidf();
        let query_vec = index.transform(&query.stems);
        if query_vec.is_empty() {
            tracing::debug!("query has no in-vocabulary terms");
            return Vec::new();
        }

        let mut scored: Vec<Candidate<'c>> = index
            .similarities(&query_vec)
            .into_iter()
            .zip(corpus.sentences())
            .filter(|(score, _)| *score > 0.0)
            .map(|(score, sentence)| Candidate { sentence, score })
            .collect();

        // sort_by is stable, so equal scores keep document order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.top_k);

        tracing::debug!(
            top_k = self.top_k,
            candidates = scored.len(),
            "tf-idf ranking"
        );
        scored
    }
}

/// Which ranker a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Lexical,
    Tfidf,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Lexical => "lexical",
            Strategy::Tfidf => "tfidf",
        }
    }

    /// Build the ranker for this strategy. `top_k` only affects `Tfidf`.
    pub fn ranker(&self, top_k: usize) -> Box<dyn Ranker> {
        match self {
            Strategy::Lexical => Box::new(LexicalOverlap),
            Strategy::Tfidf => Box::new(TfidfCosine::new(top_k)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lexical" => Ok(Strategy::Lexical),
            "tfidf" | "tf-idf" | "vector" => Ok(Strategy::Tfidf),
            other => Err(CoreError::UnknownStrategy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entities::EntityHinter;
    use crate::language::{Language, LanguageResources};
    use crate::models::Document;
    use crate::normalize::Normalizer;
    use crate::segment::RuleSegmenter;

    const PETS: &str = "The cat sat on the mat. Dogs bark loudly. Cats and dogs are pets.";

    struct Fixture {
        normalizer: Normalizer,
        hinter: EntityHinter,
    }

    impl Fixture {
        fn new() -> Self {
            let res = Arc::new(LanguageResources::new(Language::English));
            Self {
                normalizer: Normalizer::with_resources(res.clone()),
                hinter: EntityHinter::heuristic(res),
            }
        }

        fn corpus(&self, text: &str) -> Corpus {
            Corpus::new(
                Document::new("test", text, &RuleSegmenter::new()),
                &self.normalizer,
            )
        }

        fn query(&self, q: &str) -> Query {
            Query::new(q, &self.normalizer, &self.hinter)
        }
    }

    fn indices(candidates: &[Candidate<'_>]) -> Vec<usize> {
        candidates.iter().map(|c| c.index()).collect()
    }

    #[test]
    fn test_lexical_document_order() {
        let fx = Fixture::new();
        let corpus = fx.corpus(PETS);
        let out = LexicalOverlap.rank(&corpus, &fx.query("Where are cats?"));
        assert_eq!(indices(&out), vec![0, 2]);
        assert!(out.iter().all(|c| c.score >= 1.0));
    }

    #[test]
    fn test_lexical_entity_substring_match() {
        let fx = Fixture::new();
        let corpus = fx.corpus("The office is in New York. Rent is high.");
        let q = fx.query("Tell me about New York");
        assert!(q.keywords.contains("New York"));
        let out = LexicalOverlap.rank(&corpus, &q);
        assert_eq!(indices(&out), vec![0]);
        // stems new, york and the phrase "New York"
        assert_eq!(out[0].score, 3.0);
    }

    #[test]
    fn test_lexical_stems_do_not_match_inside_words() {
        let fx = Fixture::new();
        let corpus = fx.corpus("Education budgets rose. The cat sat.");
        let out = LexicalOverlap.rank(&corpus, &fx.query("cats"));
        assert_eq!(indices(&out), vec![1]);
        assert_eq!(out[0].score, 1.0);
    }

    #[test]
    fn test_tfidf_top_one() {
        let fx = Fixture::new();
        let corpus = fx.corpus(PETS);
        let out = TfidfCosine::new(1).rank(&corpus, &fx.query("loud barking dog"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].text(), "Dogs bark loudly.");
    }

    #[test]
    fn test_tfidf_scores_descending_and_positive() {
        let fx = Fixture::new();
        let corpus = fx.corpus(PETS);
        let out = TfidfCosine::default().rank(&corpus, &fx.query("loud barking dog"));
        assert_eq!(indices(&out), vec![1, 2]);
        assert!(out[0].score > out[1].score);
        assert!(out.iter().all(|c| c.score > 0.0));
    }

    #[test]
    fn test_tfidf_ties_keep_document_order() {
        let fx = Fixture::new();
        let corpus = fx.corpus("Apples are red. Pears are green. Apples are red.");
        let out = TfidfCosine::new(3).rank(&corpus, &fx.query("apples"));
        assert_eq!(indices(&out), vec![0, 2]);
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let fx = Fixture::new();
        let corpus = fx.corpus(PETS);
        for strategy in [Strategy::Lexical, Strategy::Tfidf] {
            let ranker = strategy.ranker(3);
            assert!(ranker.rank(&corpus, &fx.query("")).is_empty());
            assert!(ranker.rank(&corpus, &fx.query("   ")).is_empty());
            // stopwords only
            assert!(ranker.rank(&corpus, &fx.query("where are the")).is_empty());
        }
    }

    #[test]
    fn test_empty_corpus_yields_nothing() {
        let fx = Fixture::new();
        let corpus = fx.corpus("");
        assert!(LexicalOverlap.rank(&corpus, &fx.query("cats")).is_empty());
        assert!(TfidfCosine::default().rank(&corpus, &fx.query("cats")).is_empty());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("lexical".parse::<Strategy>().unwrap(), Strategy::Lexical);
        assert_eq!("TFIDF".parse::<Strategy>().unwrap(), Strategy::Tfidf);
        assert!(matches!(
            "bm25".parse::<Strategy>(),
            Err(CoreError::UnknownStrategy(_))
        ));
        assert_eq!(Strategy::Tfidf.ranker(2).name(), "tfidf");
        assert_eq!(Strategy::default().to_string(), "lexical");
    }
}
