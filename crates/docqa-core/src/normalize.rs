//! Text normalization: tokenize, filter, stem, drop stopwords.
//!
//! The same [`Normalizer`] is applied to the question and to every corpus
//! sentence, so both sides of a comparison land in one stem vocabulary.
//!
//! # Steps
//!
//! 1. Lowercase the input.
//! 2. Split into word units and punctuation runs ([`tokenize`]).
//! 3. Drop tokens that are not purely alphanumeric.
//! 4. Stem each surviving token with the language's Snowball stemmer.
//! 5. Drop tokens whose surface form or stem is a stopword.
//!
//! # Example
//!
//! ```rust
//! use docqa_core::language::Language;
//! use docqa_core::normalize::Normalizer;
//!
//! let n = Normalizer::new(Language::English);
//! assert_eq!(n.normalize("Where are the cats running?"), vec!["cat", "run"]);
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::language::{Language, LanguageResources};

/// Stemming normalizer bound to one language's resources.
#[derive(Debug, Clone)]
pub struct Normalizer {
    resources: Arc<LanguageResources>,
}

impl Normalizer {
    pub fn new(language: Language) -> Self {
        Self::with_resources(Arc::new(LanguageResources::new(language)))
    }

    pub fn with_resources(resources: Arc<LanguageResources>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &Arc<LanguageResources> {
        &self.resources
    }

    pub fn language(&self) -> Language {
        self.resources.language()
    }

    /// Normalize `text` into an ordered sequence of stems.
    ///
    /// Never fails; empty or punctuation-only input yields an empty vector.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        tokenize(&lowered)
            .into_iter()
            .filter(|token| is_alphanumeric(token))
            .filter_map(|token| {
                if self.resources.is_stopword(token) {
                    return None;
                }
                let stem = self.resources.stem(token);
                if stem.is_empty() || self.resources.is_stopword(&stem) {
                    None
                } else {
                    Some(stem)
                }
            })
            .collect()
    }

    /// Normalize and collect into a deduplicated, ordered set.
    pub fn normalize_to_set(&self, text: &str) -> BTreeSet<String> {
        self.normalize(text).into_iter().collect()
    }
}

/// Join normalized stems back into a single space-separated string.
pub fn normalize_to_text(tokens: &[String]) -> String {
    tokens.join(" ")
}

/// Split text into word units and punctuation runs.
///
/// A word unit is a maximal run of alphanumeric characters or `_`;
/// every other non-whitespace run becomes its own token. Whitespace is
/// discarded.
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<(usize, bool)> = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some((s, _)) = start.take() {
                tokens.push(&text[s..i]);
            }
            continue;
        }
        let word = is_word_char(c);
        match start {
            Some((s, was_word)) if was_word != word => {
                tokens.push(&text[s..i]);
                start = Some((i, word));
            }
            Some(_) => {}
            None => start = Some((i, word)),
        }
    }
    if let Some((s, _)) = start {
        tokens.push(&text[s..]);
    }

    tokens
}

/// Replace non-ASCII characters with spaces and collapse runs of whitespace.
pub fn clean_non_ascii(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| if c.is_ascii() { c } else { ' ' })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_alphanumeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphanumeric)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn english() -> Normalizer {
        Normalizer::new(Language::English)
    }

    #[test]
    fn test_empty_input() {
        assert!(english().normalize("").is_empty());
        assert!(english().normalize("   \n\t ").is_empty());
        assert!(english().normalize("?!...").is_empty());
    }

    #[test]
    fn test_stems_and_stopwords() {
        let n = english();
        assert_eq!(n.normalize("Where are cats?"), vec!["cat"]);
        assert_eq!(n.normalize("Dogs bark loudly."), vec!["dog", "bark", "loud"]);
        assert_eq!(n.normalize("loud barking dog"), vec!["loud", "bark", "dog"]);
    }

    #[test]
    fn test_morphological_variants_match() {
        let n = english();
        assert_eq!(n.normalize("runs"), n.normalize("running"));
    }

    #[test]
    fn test_no_stopwords_or_punctuation_in_output() {
        let n = english();
        let out = n.normalize("The quick, brown fox -- it jumps over the lazy dog's back!");
        let res = n.resources();
        for token in &out {
            assert!(!res.is_stopword(token), "stopword leaked: {}", token);
            assert!(token.chars().all(char::is_alphanumeric), "bad token: {}", token);
        }
        assert!(out.contains(&"fox".to_string()));
    }

    #[test]
    fn test_idempotent() {
        let words = [
            "agreed", "universities", "cease", "decisiveness", "defensible", "cats",
            "running", "quickly", "gardens", "happiness", "relational", "conditional",
            "generalization", "operational", "hopefulness", "electricity", "adjustable",
            "irritant", "replacement", "adoption", "activate", "effective", "controlling",
            "probate", "rolling", "hopping", "fizzed", "sized", "troubled", "filing",
            "conflated", "happy", "sky", "generously", "meetings", "organizations",
            "approved", "paused", "hiring", "arguing", "communities", "Dr. Smith's reports",
        ];
        let n = english();
        for word in words {
            let first = n.normalize(word);
            let second = n.normalize(&normalize_to_text(&first));
            assert_eq!(first, second, "not idempotent for {:?}", word);
        }

        let sentence = "The universities agreed to cease defensible operations quickly.";
        let first = n.normalize(sentence);
        assert_eq!(n.normalize(&normalize_to_text(&first)), first);
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(tokenize("cats?"), vec!["cats", "?"]);
        assert_eq!(tokenize("don't stop"), vec!["don", "'", "t", "stop"]);
        assert_eq!(tokenize("a_b c"), vec!["a_b", "c"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_underscore_tokens_dropped() {
        assert!(english().normalize("snake_case").is_empty());
    }

    #[test]
    fn test_unicode_words_survive() {
        let n = Normalizer::new(Language::Spanish);
        let out = n.normalize("¿Dónde están los gatos?");
        assert_eq!(out, vec!["gat"]);
    }

    #[test]
    fn test_normalize_to_set_dedups() {
        let set = english().normalize_to_set("cat cats CAT");
        assert_eq!(set.len(), 1);
        assert!(set.contains("cat"));
    }

    #[test]
    fn test_clean_non_ascii() {
        assert_eq!(clean_non_ascii("café  au\n lait"), "caf au lait");
        assert_eq!(clean_non_ascii(""), "");
    }
}
