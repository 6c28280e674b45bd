//! Splitting long response text into Discord-sized messages.

use crate::error::{BotError, Result};

/// Split `content` into chunks of at most `chunk_size` characters.
///
/// Chunks are contiguous and in order, so concatenating them reproduces
/// `content` exactly. Splitting counts Unicode scalar values rather than
/// bytes, matching how Discord counts its message limit. A `chunk_size` of
/// zero is rejected.
pub fn chunk_content(content: &str, chunk_size: usize) -> Result<Vec<String>> {
    if chunk_size == 0 {
        return Err(BotError::InvalidChunkSize);
    }

    let chars: Vec<char> = content.chars().collect();
    Ok(chars
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_string_splits_into_uneven_tail() -> Result<()> {
        let chunks = chunk_content("hello world", 5)?;
        assert_eq!(chunks, vec!["hello", " worl", "d"]);
        Ok(())
    }

    #[test]
    fn exact_multiple_has_no_tail() -> Result<()> {
        let chunks = chunk_content("abcdefghij", 5)?;
        assert_eq!(chunks, vec!["abcde", "fghij"]);
        Ok(())
    }

    #[test]
    fn empty_input_yields_no_chunks() -> Result<()> {
        assert!(chunk_content("", 5)?.is_empty());
        Ok(())
    }

    #[test]
    fn content_shorter_than_chunk_size_is_one_chunk() -> Result<()> {
        assert_eq!(chunk_content("abc", 10)?, vec!["abc"]);
        Ok(())
    }

    #[test]
    fn concatenation_is_lossless() -> Result<()> {
        let content = "The quick brown fox jumps over the lazy dog";
        for chunk_size in 1..=content.len() + 1 {
            let chunks = chunk_content(content, chunk_size)?;
            assert_eq!(chunks.concat(), content);
        }
        Ok(())
    }

    #[test]
    fn all_chunks_but_last_are_full() -> Result<()> {
        let content = "a".repeat(4500);
        let chunks = chunk_content(&content, 2000)?;
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 2000);
        assert_eq!(chunks[1].chars().count(), 2000);
        assert_eq!(chunks[2].chars().count(), 500);
        Ok(())
    }

    #[test]
    fn multibyte_characters_are_never_split() -> Result<()> {
        let content = "héllo wörld 你好";
        let chunks = chunk_content(content, 3)?;
        assert_eq!(chunks.concat(), content);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 3);
        }
        Ok(())
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            chunk_content("abc", 0),
            Err(BotError::InvalidChunkSize)
        ));
    }
}
