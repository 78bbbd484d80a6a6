//! Translation boundary and chunked translation helpers.
//!
//! Translation services cap request size, so long text goes through
//! [`translate_chunked`]. A chunk that fails to translate keeps its
//! original text; translation never fails the pipeline.

use anyhow::Result;

use crate::chunk::{chunk, needs_translation};

/// An external text translation service.
pub trait Translator: Send + Sync {
    fn name(&self) -> &str;

    /// Translate `text` into `target` (an ISO 639-1 code such as `"en"`).
    fn translate(&self, text: &str, target: &str) -> Result<String>;
}

/// Translate `text`, returning it unchanged if the translator fails.
pub fn translate_or_keep(translator: &dyn Translator, text: &str, target: &str) -> String {
    match translator.translate(text, target) {
        Ok(translated) => translated,
        Err(e) => {
            tracing::warn!(
                translator = translator.name(),
                target,
                "translation failed, keeping original text: {:#}",
                e
            );
            text.to_string()
        }
    }
}

/// Translate `text` chunk by chunk and concatenate the results.
pub fn translate_chunked(
    translator: &dyn Translator,
    text: &str,
    target: &str,
    chunk_size: usize,
) -> String {
    chunk(text, chunk_size)
        .into_iter()
        .map(|piece| translate_or_keep(translator, piece, target))
        .collect()
}

/// Route non-ASCII chunks through the translator into `target`.
///
/// ASCII-only chunks pass through untouched. The result has one entry per
/// input chunk, in order.
pub fn translate_non_ascii_chunks(
    translator: &dyn Translator,
    chunks: &[&str],
    target: &str,
) -> Vec<String> {
    chunks
        .iter()
        .map(|piece| {
            if needs_translation(piece) {
                translate_or_keep(translator, piece, target)
            } else {
                piece.to_string()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Upper-cases its input and records every call.
    #[derive(Default)]
    struct Shouting {
        seen: Mutex<Vec<String>>,
    }

    impl Translator for Shouting {
        fn name(&self) -> &str {
            "shouting"
        }

        fn translate(&self, text: &str, _target: &str) -> Result<String> {
            self.seen.lock().unwrap().push(text.to_string());
            Ok(text.to_uppercase())
        }
    }

    /// Fails on any chunk containing `x`.
    struct Picky;

    impl Translator for Picky {
        fn name(&self) -> &str {
            "picky"
        }

        fn translate(&self, text: &str, _target: &str) -> Result<String> {
            if text.contains('x') {
                anyhow::bail!("service unavailable");
            }
            Ok(text.to_uppercase())
        }
    }

    #[test]
    fn test_translate_chunked_concatenates() {
        let t = Shouting::default();
        let out = translate_chunked(&t, "abcdefgh", "en", 3);
        assert_eq!(out, "ABCDEFGH");
        assert_eq!(*t.seen.lock().unwrap(), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_failing_chunk_keeps_original() {
        let out = translate_chunked(&Picky, "abcxyzdef", "en", 3);
        assert_eq!(out, "ABCxyzDEF");
    }

    #[test]
    fn test_only_non_ascii_chunks_translated() {
        let t = Shouting::default();
        let out = translate_non_ascii_chunks(&t, &["plain", "señal", "text"], "en");
        assert_eq!(out, vec!["plain", "SEÑAL", "text"]);
        assert_eq!(t.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(translate_chunked(&Shouting::default(), "", "en", 10), "");
    }
}
