//! Sentence segmentation.
//!
//! [`SentenceSegmenter`] is the pluggable boundary; [`RuleSegmenter`] is the
//! built-in rule-based implementation used for every document regardless of
//! its source format.
//!
//! Boundaries are placed after `.`, `!` or `?` (plus any trailing closing
//! quotes or brackets) when followed by whitespace, except:
//!
//! - after a known abbreviation (`Dr.`, `e.g.`, `etc.`) or a single-letter
//!   initial (`J. K. Rowling`);
//! - when the next word starts with a lowercase letter.
//!
//! A blank line is always a boundary, so headings and list items without
//! terminal punctuation do not merge into the following sentence.

use std::collections::HashSet;

/// Splits raw document text into an ordered sequence of sentences.
pub trait SentenceSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Abbreviation-aware, punctuation-driven segmenter.
#[derive(Debug, Clone)]
pub struct RuleSegmenter {
    abbreviations: HashSet<&'static str>,
}

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "sra", "jr", "st", "vs", "etc", "e.g", "i.e", "inc",
    "ltd", "co", "corp", "fig", "vol", "pp", "approx", "dept", "est", "u.s", "u.k", "jan", "feb",
    "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "no", "núm", "art",
];

const TERMINATORS: &[char] = &['.', '!', '?'];
const CLOSERS: &[char] = &['"', '\'', '\u{201d}', '\u{2019}', ')', ']', '}', '\u{bb}'];

impl RuleSegmenter {
    pub fn new() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
        }
    }

    fn is_abbreviation(&self, word: &str) -> bool {
        let word = word.trim_start_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() {
            return false;
        }
        let mut chars = word.chars();
        if let (Some(first), None) = (chars.next(), chars.next()) {
            if first.is_alphabetic() {
                return true;
            }
        }
        self.abbreviations.contains(word.to_lowercase().as_str())
    }
}

impl Default for RuleSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceSegmenter for RuleSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let byte_at = |idx: usize| chars.get(idx).map(|(b, _)| *b).unwrap_or(text.len());

        let mut sentences = Vec::new();
        let mut start = 0usize;
        let mut i = 0usize;

        while i < chars.len() {
            let (pos, c) = chars[i];

            if c == '\n' {
                if let Some(next) = blank_line_end(&chars, i) {
                    push_sentence(&mut sentences, &text[start..pos]);
                    start = byte_at(next);
                    i = next;
                    continue;
                }
            }

            if !TERMINATORS.contains(&c) {
                i += 1;
                continue;
            }

            let mut j = i + 1;
            while j < chars.len()
                && (TERMINATORS.contains(&chars[j].1) || CLOSERS.contains(&chars[j].1))
            {
                j += 1;
            }
            if j >= chars.len() {
                break;
            }
            if !chars[j].1.is_whitespace() {
                i = j;
                continue;
            }

            if c == '.' {
                let word_start = text[start..pos]
                    .rfind(char::is_whitespace)
                    .map(|w| start + w + 1)
                    .unwrap_or(start);
                if self.is_abbreviation(&text[word_start..pos]) {
                    i = j;
                    continue;
                }
            }

            let next_word = chars[j..].iter().find(|(_, ch)| !ch.is_whitespace());
            if let Some((_, ch)) = next_word {
                if ch.is_lowercase() {
                    i = j;
                    continue;
                }
            }

            let end = byte_at(j);
            push_sentence(&mut sentences, &text[start..end]);
            start = end;
            i = j;
        }

        if start < text.len() {
            push_sentence(&mut sentences, &text[start..]);
        }

        sentences
    }
}

/// If a blank line starts at `chars[i]` (a newline), return the index of
/// the first non-whitespace character after it.
fn blank_line_end(chars: &[(usize, char)], i: usize) -> Option<usize> {
    let mut j = i + 1;
    let mut saw_second_newline = false;
    while j < chars.len() && chars[j].1.is_whitespace() {
        if chars[j].1 == '\n' {
            saw_second_newline = true;
        }
        j += 1;
    }
    saw_second_newline.then_some(j)
}

fn push_sentence(out: &mut Vec<String>, span: &str) {
    let trimmed = span.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
