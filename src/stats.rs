//! Word, character and line counts of the source text.

/// Counts shown next to the preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub words: usize,
    pub characters: usize,
    pub lines: usize,
}

impl DocumentStats {
    /// Computes counts for the raw source.
    ///
    /// Words are whitespace separated tokens, characters are Unicode scalar
    /// values and lines are newline separated segments, so an empty source
    /// still has one line.
    pub fn from_source(source: &str) -> Self {
        Self {
            words: source.split_whitespace().count(),
            characters: source.chars().count(),
            lines: source.split('\n').count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source() {
        // Arrange & Act
        let stats = DocumentStats::from_source("");

        // Assert
        assert_eq!(
            stats,
            DocumentStats {
                words: 0,
                characters: 0,
                lines: 1
            }
        );
    }

    #[test]
    fn test_counts_words_characters_lines() {
        // Arrange
        let source = "# Title\n\nHello  wörld\n";

        // Act
        let stats = DocumentStats::from_source(source);

        // Assert
        assert_eq!(stats.words, 4);
        assert_eq!(stats.characters, 22);
        assert_eq!(stats.lines, 4);
    }

    #[test]
    fn test_blank_source_has_no_words() {
        assert_eq!(DocumentStats::from_source(" \n\t ").words, 0);
    }
}
