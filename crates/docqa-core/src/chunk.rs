//! Fixed-size character chunker for prompt text.
//!
//! Splits a string into consecutive windows of `chunk_size` characters with
//! no overlap. The last window may be shorter. Windows always end on a UTF-8
//! char boundary, so concatenating the chunks reproduces the input exactly.
//!
//! # Example
//!
//! ```rust
//! use docqa_core::chunk::chunk;
//!
//! let chunks = chunk("abcdefg", 3);
//! assert_eq!(chunks, vec!["abc", "def", "g"]);
//! assert_eq!(chunks.concat(), "abcdefg");
//! ```

/// Default prompt chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 5000;

/// Split `text` into windows of `chunk_size` characters.
///
/// A `chunk_size` of 0 is treated as 1. Empty input yields no chunks.
pub fn chunk(text: &str, chunk_size: usize) -> Vec<&str> {
    let size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let split_at = byte_offset_of_char(remaining, size);
        let (head, tail) = remaining.split_at(split_at);
        chunks.push(head);
        remaining = tail;
    }

    chunks
}

/// Byte offset of the `n`-th character of `s`, or `s.len()` if it has
/// fewer than `n` characters.
fn byte_offset_of_char(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// Whether `chunk` contains any non-ASCII character.
pub fn needs_translation(chunk: &str) -> bool {
    !chunk.is_ascii()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert!(chunk("", 10).is_empty());
    }

    #[test]
    fn test_single_chunk() {
        assert_eq!(chunk("Hello, world!", 5000), vec!["Hello, world!"]);
    }

    #[test]
    fn test_exact_multiple() {
        assert_eq!(chunk("abcdef", 3), vec!["abc", "def"]);
    }

    #[test]
    fn test_zero_size_is_one() {
        assert_eq!(chunk("abc", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_multibyte_utf8_chars() {
        let text = "┌──┐ señor ñandú 東京";
        let chunks = chunk(text, 3);
        assert_eq!(chunks.concat(), text);
        for c in &chunks[..chunks.len() - 1] {
            assert_eq!(c.chars().count(), 3);
        }
        assert!(chunks.last().unwrap().chars().count() <= 3);
    }

    #[test]
    fn test_lossless_for_many_sizes() {
        let text = "Paragraph one.\n\nPárrafo dos, con acentos.\n\nThird.";
        for size in 1..=text.chars().count() + 1 {
            let chunks = chunk(text, size);
            assert_eq!(chunks.concat(), text, "size {}", size);
            for c in &chunks[..chunks.len() - 1] {
                assert_eq!(c.chars().count(), size);
            }
        }
    }

    #[test]
    fn test_needs_translation() {
        assert!(!needs_translation("plain ascii text"));
        assert!(needs_translation("¿Dónde?"));
    }
}
