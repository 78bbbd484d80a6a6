//! Length-bounded context assembly.
//!
//! Candidates are appended whole, in the order the ranker produced them,
//! each followed by [`SEPARATOR`]. Accumulation stops at the first
//! candidate that would push the total past the budget; later candidates
//! are dropped even if they would fit.

use serde::Serialize;

use crate::models::Candidate;

/// Appended after every included sentence.
pub const SEPARATOR: &str = "\n\n";

/// Default character budget for assembled context.
pub const DEFAULT_MAX_OUTPUT_LENGTH: usize = 1000;

/// The context handed to the generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssembledContext {
    pub text: String,
    /// Characters used, separators included. Equals `text.chars().count()`.
    pub used: usize,
    /// Indices of the included sentences, in inclusion order.
    pub included: Vec<usize>,
    /// Number of candidates left out by the budget.
    pub dropped: usize,
}

impl AssembledContext {
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }
}

/// Accumulate `candidates` under `max_output_length` characters.
pub fn assemble(candidates: &[Candidate<'_>], max_output_length: usize) -> AssembledContext {
    let sep_len = SEPARATOR.chars().count();
    let mut ctx = AssembledContext::default();

    for (pos, candidate) in candidates.iter().enumerate() {
        let unit = candidate.text();
        let unit_len = unit.chars().count();
        if ctx.used + unit_len + sep_len > max_output_length {
            ctx.dropped = candidates.len() - pos;
            break;
        }
        ctx.text.push_str(unit);
        ctx.text.push_str(SEPARATOR);
        ctx.used += unit_len + sep_len;
        ctx.included.push(candidate.index());
    }

    tracing::debug!(
        included = ctx.included.len(),
        dropped = ctx.dropped,
        used = ctx.used,
        max = max_output_length,
        "assembled context"
    );
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentence;

    fn sentences(texts: &[&str]) -> Vec<Sentence> {
        texts
            .iter()
            .enumerate()
            .map(|(index, t)| Sentence {
                index,
                text: t.to_string(),
            })
            .collect()
    }

    fn candidates(sentences: &[Sentence]) -> Vec<Candidate<'_>> {
        sentences
            .iter()
            .map(|sentence| Candidate {
                sentence,
                score: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_first_candidate_over_budget() {
        let s = sentences(&["fifteen chars!!"]);
        assert_eq!(s[0].text.chars().count(), 15);
        let ctx = assemble(&candidates(&s), 10);
        assert!(ctx.text.is_empty());
        assert!(ctx.is_empty());
        assert_eq!(ctx.dropped, 1);
    }

    #[test]
    fn test_exact_fit_is_included() {
        let s = sentences(&["12345678"]);
        let ctx = assemble(&candidates(&s), 10);
        assert_eq!(ctx.text, "12345678\n\n");
        assert_eq!(ctx.used, 10);
    }

    #[test]
    fn test_stops_at_first_overflow() {
        let s = sentences(&["aaaa", "bbbbbbbbbbbb", "cc"]);
        // 6 + 14 > 12, so "cc" is dropped too even though it would fit
        let ctx = assemble(&candidates(&s), 12);
        assert_eq!(ctx.text, "aaaa\n\n");
        assert_eq!(ctx.included, vec![0]);
        assert_eq!(ctx.dropped, 2);
    }

    #[test]
    fn test_never_exceeds_budget() {
        let s = sentences(&["one two", "three four five", "six", "seven eight nine ten"]);
        for max in 0..60 {
            let ctx = assemble(&candidates(&s), max);
            assert!(ctx.text.chars().count() <= max);
            assert_eq!(ctx.text.chars().count(), ctx.used);
            assert_eq!(ctx.included.len() + ctx.dropped, s.len());
        }
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let s = sentences(&["ñandú"]);
        let ctx = assemble(&candidates(&s), 7);
        assert_eq!(ctx.included, vec![0]);
    }

    #[test]
    fn test_keeps_ranker_order() {
        let s = sentences(&["first", "second", "third"]);
        let c = candidates(&s);
        let reordered = vec![c[2], c[0]];
        let ctx = assemble(&reordered, 1000);
        assert_eq!(ctx.included, vec![2, 0]);
        assert_eq!(ctx.text, "third\n\nfirst\n\n");
    }
}
