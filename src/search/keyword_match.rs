//! Matches found within a line, before conversion to page coordinates.

use crate::layout::Line;

/// How a match was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// Case-insensitive substring match
    Exact,
    /// Whole word within the edit-distance threshold
    Fuzzy,
    /// UN-number pattern
    Pattern,
}

/// A keyword occurrence within one line's joined text.
///
/// Offsets and lengths count characters of [`Line::text`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordMatch<'a> {
    /// Line the match was found in
    pub line: &'a Line,
    /// Position of the line in document order (page, then top to bottom)
    pub line_index: usize,
    /// Character offset of the match in the line text
    pub start_offset: usize,
    /// Match length in characters
    pub length: usize,
    /// Confidence in `[0, 1]`
    pub confidence: f32,
    /// How the match was found
    pub kind: MatchKind,
    /// Label reported with the highlight
    pub keyword: String,
}

impl<'a> KeywordMatch<'a> {
    /// Page of the matched line.
    pub fn page(&self) -> usize {
        self.line.page
    }

    /// Identity of the matched character span: (line, offset, length).
    pub fn span(&self) -> (usize, usize, usize) {
        (self.line_index, self.start_offset, self.length)
    }
}

/// Lowercase text one character at a time.
///
/// Only the first scalar of each lowercase mapping is kept, so the result
/// has exactly as many characters as the input and offsets carry over.
pub fn lowercase_chars(text: &str) -> Vec<char> {
    text.chars()
        .map(|ch| ch.to_lowercase().next().unwrap_or(ch))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_preserves_length() {
        // 'İ' lowercases to two scalars in full Unicode mapping
        let text = "İSTANBUL UN1203";
        assert_eq!(lowercase_chars(text).len(), text.chars().count());
        assert_eq!(lowercase_chars("UN1203").iter().collect::<String>(), "un1203");
    }
}
