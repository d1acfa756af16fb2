//! Exact, case-insensitive keyword localization.

use crate::layout::Line;
use crate::search::keyword_match::{lowercase_chars, KeywordMatch, MatchKind};
use indexmap::IndexMap;

/// Find every case-insensitive occurrence of each keyword in each line.
///
/// Scanning resumes one character after each hit, so overlapping
/// occurrences are all reported: `"aa"` in `"aaa"` matches at 0 and 1.
/// The result is keyed by keyword in input order; keywords without any
/// occurrence, empty keywords and repeated keywords get no entry of their
/// own. Matches within a bucket are in (line, offset) order.
///
/// # Examples
///
/// ```
/// use pdf_spotlight::extractors::TextPosition;
/// use pdf_spotlight::layout::Line;
/// use pdf_spotlight::search::find_exact;
///
/// let line = Line {
///     page: 1,
///     anchor_y: 0.0,
///     positions: vec![TextPosition::new("aaa", 1, 0.0, 0.0, 30.0, 10.0)],
/// };
/// let lines = [line];
/// let matches = find_exact(&lines, &["aa"]);
/// let offsets: Vec<usize> = matches["aa"].iter().map(|m| m.start_offset).collect();
/// assert_eq!(offsets, vec![0, 1]);
/// ```
pub fn find_exact<'a, K>(lines: &'a [Line], keywords: &[K]) -> IndexMap<String, Vec<KeywordMatch<'a>>>
where
    K: AsRef<str> + Sync,
{
    let texts: Vec<Vec<char>> = lines.iter().map(|line| lowercase_chars(&line.text())).collect();

    let buckets = map_keywords(keywords, |keyword| {
        let needle = lowercase_chars(keyword);
        if keyword.trim().is_empty() {
            return Vec::new();
        }

        let mut matches = Vec::new();
        for (line_index, (line, text)) in lines.iter().zip(&texts).enumerate() {
            for offset in occurrences(text, &needle) {
                matches.push(KeywordMatch {
                    line,
                    line_index,
                    start_offset: offset,
                    length: needle.len(),
                    confidence: 1.0,
                    kind: MatchKind::Exact,
                    keyword: keyword.to_string(),
                });
            }
        }
        matches
    });

    let mut result: IndexMap<String, Vec<KeywordMatch<'a>>> = IndexMap::new();
    for (keyword, matches) in buckets {
        if !matches.is_empty() && !result.contains_key(&keyword) {
            result.insert(keyword, matches);
        }
    }

    log::debug!(
        "Exact search: {} of {} keywords found, {} matches",
        result.len(),
        keywords.len(),
        result.values().map(Vec::len).sum::<usize>()
    );
    result
}

/// Start offsets of `needle` in `haystack`, advancing by one after each hit.
fn occurrences(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    (0..=haystack.len() - needle.len())
        .filter(|&i| haystack[i..i + needle.len()] == *needle)
        .collect()
}

/// Run `f` once per keyword, keeping input order.
#[cfg(feature = "parallel")]
pub(crate) fn map_keywords<K, T, F>(keywords: &[K], f: F) -> Vec<(String, T)>
where
    K: AsRef<str> + Sync,
    T: Send,
    F: Fn(&str) -> T + Sync,
{
    use rayon::prelude::*;

    keywords
        .par_iter()
        .map(|k| (k.as_ref().to_string(), f(k.as_ref())))
        .collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_keywords<K, T, F>(keywords: &[K], f: F) -> Vec<(String, T)>
where
    K: AsRef<str> + Sync,
    T: Send,
    F: Fn(&str) -> T + Sync,
{
    keywords
        .iter()
        .map(|k| (k.as_ref().to_string(), f(k.as_ref())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::TextPosition;

    fn line(page: usize, words: &[&str]) -> Line {
        let mut x = 0.0;
        let positions = words
            .iter()
            .map(|w| {
                let pos = TextPosition::new(*w, page, x, 100.0, 6.0 * w.len() as f32, 12.0);
                x += pos.width + 4.0;
                pos
            })
            .collect();
        Line {
            page,
            anchor_y: 100.0,
            positions,
        }
    }

    #[test]
    fn test_case_insensitive_single_match() {
        let lines = vec![line(1, &["UN1203", "Gasoline"])];
        let matches = find_exact(&lines, &["un1203"]);
        let found = &matches["un1203"];
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].start_offset, 0);
        assert_eq!(found[0].length, 6);
        assert_eq!(found[0].confidence, 1.0);
        assert_eq!(found[0].kind, MatchKind::Exact);
    }

    #[test]
    fn test_overlapping_matches() {
        let lines = vec![line(1, &["aaa"])];
        let matches = find_exact(&lines, &["aa"]);
        let offsets: Vec<usize> = matches["aa"].iter().map(|m| m.start_offset).collect();
        assert_eq!(offsets, vec![0, 1]);
    }

    #[test]
    fn test_match_across_runs() {
        let lines = vec![line(1, &["Ammonium", "Nitrate"])];
        let matches = find_exact(&lines, &["ammonium nitrate"]);
        assert_eq!(matches["ammonium nitrate"][0].length, 16);
    }

    #[test]
    fn test_missing_and_empty_keywords_are_omitted() {
        let lines = vec![line(1, &["Class", "3"])];
        let matches = find_exact(&lines, &["Nitrate", "", "  ", "class"]);
        assert_eq!(matches.keys().collect::<Vec<_>>(), vec!["class"]);
    }

    #[test]
    fn test_keyword_order_and_line_order() {
        let lines = vec![line(1, &["Gasoline", "UN1203"]), line(2, &["UN1203"])];
        let matches = find_exact(&lines, &["UN1203", "Gasoline"]);
        assert_eq!(matches.keys().collect::<Vec<_>>(), vec!["UN1203", "Gasoline"]);
        let pages: Vec<usize> = matches["UN1203"].iter().map(|m| m.page()).collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[test]
    fn test_offsets_count_characters() {
        let lines = vec![line(1, &["Überführung", "UN1203"])];
        let matches = find_exact(&lines, &["UN1203"]);
        assert_eq!(matches["UN1203"][0].start_offset, 12);
    }
}
