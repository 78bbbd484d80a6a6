//! Entity hints: proper-noun phrases pulled from the raw question.
//!
//! Stemming flattens names ("New York" → `new`, `york`), so the ranker also
//! receives the original-cased phrases produced here for raw substring
//! matching. Tagging is delegated to an [`EntityTagger`]; any tagger failure
//! degrades to an empty set.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;

use crate::language::LanguageResources;
use crate::normalize::tokenize;

/// Part-of-speech tags the hinter groups into phrases.
const PROPER_NOUN_TAGS: &[&str] = &["NNP", "NNPS"];

/// Part-of-speech tagger boundary.
///
/// Returns one `(token, tag)` pair per input token, in order. Tags follow
/// the Penn Treebank convention; only `NNP`/`NNPS` are significant here.
pub trait EntityTagger: Send + Sync {
    fn tag(&self, tokens: &[&str]) -> Result<Vec<(String, String)>>;
}

/// Heuristic tagger based on capitalization.
///
/// Capitalized alphabetic tokens are tagged `NNP`, except a sentence-initial
/// token whose lowercase form is a stopword ("Where", "The"). Numbers are
/// `CD`, punctuation is `.`, everything else `NN`.
#[derive(Debug, Clone)]
pub struct CapitalizationTagger {
    resources: Arc<LanguageResources>,
}

impl CapitalizationTagger {
    pub fn new(resources: Arc<LanguageResources>) -> Self {
        Self { resources }
    }
}

impl EntityTagger for CapitalizationTagger {
    fn tag(&self, tokens: &[&str]) -> Result<Vec<(String, String)>> {
        let mut sentence_start = true;
        let mut tagged = Vec::with_capacity(tokens.len());

        for token in tokens {
            let first = token.chars().next();
            let tag = match first {
                Some(c) if c.is_alphabetic() => {
                    let capitalized = c.is_uppercase() && token.chars().all(char::is_alphanumeric);
                    let lowered = token.to_lowercase();
                    if capitalized && !(sentence_start && self.resources.is_stopword(&lowered)) {
                        "NNP"
                    } else {
                        "NN"
                    }
                }
                Some(c) if c.is_numeric() => "CD",
                _ => ".",
            };
            sentence_start = matches!(*token, "." | "!" | "?" | "¿" | "¡");
            tagged.push((token.to_string(), tag.to_string()));
        }

        Ok(tagged)
    }
}

/// Extracts entity phrases from raw question text.
#[derive(Clone)]
pub struct EntityHinter {
    tagger: Arc<dyn EntityTagger>,
}

impl EntityHinter {
    pub fn new(tagger: Arc<dyn EntityTagger>) -> Self {
        Self { tagger }
    }

    /// Hinter backed by the built-in [`CapitalizationTagger`].
    pub fn heuristic(resources: Arc<LanguageResources>) -> Self {
        Self::new(Arc::new(CapitalizationTagger::new(resources)))
    }

    /// Group contiguous proper-noun tokens into space-joined phrases.
    ///
    /// Original casing is kept and phrases are not stemmed. Returns an empty
    /// set when there are no entities or the tagger fails.
    pub fn extract_entities(&self, raw_text: &str) -> BTreeSet<String> {
        let tokens = tokenize(raw_text);
        if tokens.is_empty() {
            return BTreeSet::new();
        }

        let tagged = match self.tagger.tag(&tokens) {
            Ok(tagged) => tagged,
            Err(e) => {
                tracing::warn!(
                    "entity tagging failed, continuing without entities: {:#}",
                    e
                );
                return BTreeSet::new();
            }
        };

        let mut entities = BTreeSet::new();
        let mut current: Vec<String> = Vec::new();
        for (token, tag) in tagged {
            if PROPER_NOUN_TAGS.contains(&tag.as_str()) {
                current.push(token);
            } else if !current.is_empty() {
                entities.insert(current.join(" "));
                current.clear();
            }
        }
        if !current.is_empty() {
            entities.insert(current.join(" "));
        }

        tracing::debug!(count = entities.len(), "extracted entity hints");
        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    fn hinter() -> EntityHinter {
        EntityHinter::heuristic(Arc::new(LanguageResources::new(Language::English)))
    }

    struct FailingTagger;

    impl EntityTagger for FailingTagger {
        fn tag(&self, _tokens: &[&str]) -> Result<Vec<(String, String)>> {
            anyhow::bail!("tagger model not available")
        }
    }

    #[test]
    fn test_multiword_entities() {
        let entities = hinter().extract_entities("What did Barack Obama say about New York?");
        assert!(entities.contains("Barack Obama"));
        assert!(entities.contains("New York"));
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_sentence_initial_stopword_is_not_entity() {
        let entities = hinter().extract_entities("Where are cats?");
        assert!(entities.is_empty());
    }

    #[test]
    fn test_sentence_initial_name_is_entity() {
        let entities = hinter().extract_entities("Madrid is the capital. Where is Lisbon?");
        assert!(entities.contains("Madrid"));
        assert!(entities.contains("Lisbon"));
    }

    #[test]
    fn test_empty_input() {
        assert!(hinter().extract_entities("").is_empty());
        assert!(hinter().extract_entities("   ").is_empty());
    }

    #[test]
    fn test_tagger_failure_degrades_to_empty() {
        let h = EntityHinter::new(Arc::new(FailingTagger));
        assert!(h.extract_entities("Tell me about Acme Corporation").is_empty());
    }

    #[test]
    fn test_tags_numbers_and_punctuation() {
        let resources = Arc::new(LanguageResources::new(Language::English));
        let tagger = CapitalizationTagger::new(resources);
        let tagged = tagger.tag(&["In", "2020", ",", "Acme", "grew"]).unwrap();
        let tags: Vec<&str> = tagged.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(tags, vec!["NN", "CD", ".", "NNP", "NN"]);
    }
}
