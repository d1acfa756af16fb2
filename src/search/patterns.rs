//! UN-number pattern classes.
//!
//! UN numbers are four-digit identifiers of dangerous goods. Documents
//! write them in several notations ("UN1203", "UN 1203", "U.N. 1203",
//! "UN-1203", "UN No. 1203") and sometimes as a bare number. Pattern
//! matches are not scored; they always carry confidence 1.0.

use crate::layout::Line;
use crate::search::keyword_match::{KeywordMatch, MatchKind};
use regex::{Regex, RegexBuilder};

/// A registered UN-number notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnNumberPattern {
    /// `UN1203`
    Compact,
    /// `UN 1203` (any internal whitespace, including none)
    Spaced,
    /// `1203` on its own
    Bare,
    /// `U.N. 1203`
    Dotted,
    /// `UN-1203`
    Hyphenated,
    /// `UN No. 1203`
    Labeled,
}

impl UnNumberPattern {
    /// All patterns in registration order.
    pub const ALL: [UnNumberPattern; 6] = [
        UnNumberPattern::Compact,
        UnNumberPattern::Spaced,
        UnNumberPattern::Bare,
        UnNumberPattern::Dotted,
        UnNumberPattern::Hyphenated,
        UnNumberPattern::Labeled,
    ];

    /// Regular expression source of the pattern.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnNumberPattern::Compact => r"\bUN\d{4}\b",
            UnNumberPattern::Spaced => r"\bUN\s*\d{4}\b",
            UnNumberPattern::Bare => r"\b\d{4}\b",
            UnNumberPattern::Dotted => r"\bU\.N\.\s*\d{4}\b",
            UnNumberPattern::Hyphenated => r"\bUN-\d{4}\b",
            UnNumberPattern::Labeled => r"\bUN\s*No\.?\s*\d{4}\b",
        }
    }

    /// Compiled, case-insensitive regex.
    pub fn regex(&self) -> &'static Regex {
        lazy_static::lazy_static! {
            static ref COMPILED: Vec<Regex> = UnNumberPattern::ALL
                .iter()
                .map(|p| {
                    RegexBuilder::new(p.as_str())
                        .case_insensitive(true)
                        .build()
                        .unwrap()
                })
                .collect();
        }
        &COMPILED[*self as usize]
    }

    /// Find every occurrence of the pattern in the given lines.
    ///
    /// Offsets are character offsets into [`Line::text`]. The keyword of
    /// each match is the matched document text.
    pub fn find<'a>(&self, lines: &'a [Line]) -> Vec<KeywordMatch<'a>> {
        let regex = self.regex();
        let mut matches = Vec::new();
        for (line_index, line) in lines.iter().enumerate() {
            let text = line.text();
            for m in regex.find_iter(&text) {
                matches.push(KeywordMatch {
                    line,
                    line_index,
                    start_offset: text[..m.start()].chars().count(),
                    length: m.as_str().chars().count(),
                    confidence: 1.0,
                    kind: MatchKind::Pattern,
                    keyword: m.as_str().to_string(),
                });
            }
        }
        matches
    }
}

/// Extract the four-digit UN number from any recognized notation.
///
/// # Examples
///
/// ```
/// use pdf_spotlight::search::un_number_of;
///
/// assert_eq!(un_number_of("UN 1203"), Some("1203".to_string()));
/// assert_eq!(un_number_of("u.n. 1942"), Some("1942".to_string()));
/// assert_eq!(un_number_of("Gasoline"), None);
/// ```
pub fn un_number_of(text: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref DIGITS: Regex = Regex::new(r"\d{4}").unwrap();
    }

    UnNumberPattern::ALL
        .iter()
        .find_map(|p| p.regex().find(text))
        .and_then(|m| DIGITS.find(m.as_str()))
        .map(|d| d.as_str().to_string())
}
