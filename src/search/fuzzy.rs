//! Approximate keyword matching.
//!
//! Keywords are expanded into normalized variants and compared against each
//! whitespace-separated word of a line by normalized Levenshtein
//! similarity. UN-number patterns are matched by regex alongside.

use crate::layout::Line;
use crate::search::exact::map_keywords;
use crate::search::keyword_match::{lowercase_chars, KeywordMatch, MatchKind};
use crate::search::patterns::UnNumberPattern;
use crate::search::text_search::SearchOptions;
use indexmap::{IndexMap, IndexSet};

/// Normalized forms of a keyword, deduplicated, in this order: lowercase,
/// punctuation stripped, whitespace collapsed.
///
/// # Examples
///
/// ```
/// use pdf_spotlight::search::expand_keyword;
///
/// assert_eq!(expand_keyword("U.N.  Number"), vec!["u.n.  number", "un  number", "u.n. number"]);
/// assert_eq!(expand_keyword("Nitrate"), vec!["nitrate"]);
/// ```
pub fn expand_keyword(keyword: &str) -> Vec<String> {
    let lower: String = lowercase_chars(keyword).into_iter().collect();
    let stripped: String = lower
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");

    let variants: IndexSet<String> = [lower, stripped, collapsed]
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .collect();
    variants.into_iter().collect()
}

/// Expand every keyword, keyed by the original keyword in input order.
///
/// Empty keywords and repeated keywords are dropped. Variants are deduplicated
/// per keyword only, so `"Nitrate!"` and `"Nitrate"` both keep `"nitrate"` and
/// both get credited for a fuzzy hit on it.
pub fn expand_keywords<K: AsRef<str>>(keywords: &[K]) -> IndexMap<String, Vec<String>> {
    let mut expanded: IndexMap<String, Vec<String>> = IndexMap::new();
    for keyword in keywords {
        let keyword = keyword.as_ref();
        if expanded.contains_key(keyword) {
            continue;
        }
        let variants = expand_keyword(keyword);
        if !variants.is_empty() {
            expanded.insert(keyword.to_string(), variants);
        }
    }
    expanded
}

/// Levenshtein edit distance over characters (unit costs).
///
/// # Examples
///
/// ```
/// use pdf_spotlight::search::levenshtein;
///
/// assert_eq!(levenshtein("nitrat", "nitrate"), 1);
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    levenshtein_chars(&a, &b)
}

fn levenshtein_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // two rows of the (len(b)+1) x (len(a)+1) table
    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr = vec![0; a.len() + 1];
    for (i, cb) in b.iter().enumerate() {
        curr[0] = i + 1;
        for (j, ca) in a.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[a.len()]
}

/// Normalized similarity `(max_len - distance) / max_len`, in `[0, 1]`.
///
/// Two empty strings are identical (1.0).
pub fn similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    similarity_chars(&a, &b)
}

fn similarity_chars(a: &[char], b: &[char]) -> f32 {
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    (max_len - levenshtein_chars(a, b)) as f32 / max_len as f32
}

/// A word of a line: character offset and lowercased characters.
struct Word {
    offset: usize,
    chars: Vec<char>,
}

fn split_words(text: &[char]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut current: Option<Word> = None;
    for (i, &ch) in text.iter().enumerate() {
        if ch.is_whitespace() {
            words.extend(current.take());
        } else {
            current
                .get_or_insert_with(|| Word {
                    offset: i,
                    chars: Vec::new(),
                })
                .chars
                .push(ch);
        }
    }
    words.extend(current);
    words
}

/// Fuzzy and pattern matching.
///
/// With `fuzzy_match` on, each word of each line is scored against every
/// variant of a keyword that is at least `min_fuzzy_keyword_len` characters
/// long; the best variant decides, and the word is a match if it reaches
/// `confidence_threshold`. The bucket is keyed by the original keyword.
///
/// With `un_number_pattern` on, one bucket per [`UnNumberPattern`] follows,
/// keyed by the pattern source, confidence 1.0.
///
/// Empty buckets are omitted.
pub fn find_fuzzy<'a, K>(
    lines: &'a [Line],
    keywords: &[K],
    options: &SearchOptions,
) -> IndexMap<String, Vec<KeywordMatch<'a>>>
where
    K: AsRef<str> + Sync,
{
    let mut result: IndexMap<String, Vec<KeywordMatch<'a>>> = IndexMap::new();

    if options.fuzzy_match {
        let expanded = expand_keywords(keywords);
        let words: Vec<Vec<Word>> = lines
            .iter()
            .map(|line| split_words(&lowercase_chars(&line.text())))
            .collect();
        let originals: Vec<&String> = expanded.keys().collect();

        let buckets = map_keywords(&originals, |keyword| {
            let variants: Vec<Vec<char>> = expanded
                .get(keyword)
                .into_iter()
                .flatten()
                .map(|v| v.chars().collect::<Vec<char>>())
                .filter(|v| v.len() >= options.min_fuzzy_keyword_len)
                .collect();
            if variants.is_empty() {
                return Vec::new();
            }

            let mut matches = Vec::new();
            for (line_index, (line, line_words)) in lines.iter().zip(&words).enumerate() {
                for word in line_words {
                    let best = variants
                        .iter()
                        .map(|v| similarity_chars(&word.chars, v))
                        .fold(0.0f32, f32::max);
                    if best >= options.confidence_threshold {
                        matches.push(KeywordMatch {
                            line,
                            line_index,
                            start_offset: word.offset,
                            length: word.chars.len(),
                            confidence: best,
                            kind: MatchKind::Fuzzy,
                            keyword: keyword.to_string(),
                        });
                    }
                }
            }
            matches
        });

        for (keyword, matches) in buckets {
            if !matches.is_empty() {
                result.insert(keyword, matches);
            }
        }
    }

    if options.un_number_pattern {
        for pattern in UnNumberPattern::ALL {
            let matches = pattern.find(lines);
            if !matches.is_empty() {
                result.insert(pattern.as_str().to_string(), matches);
            }
        }
    }

    log::debug!(
        "Fuzzy search: {} buckets, {} matches",
        result.len(),
        result.values().map(Vec::len).sum::<usize>()
    );
    result
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: edit distance is symmetric and bounded by the longer input
        #[test]
        fn levenshtein_symmetric_and_bounded(a in "[a-c]{0,8}", b in "[a-c]{0,8}") {
            let d = levenshtein(&a, &b);
            prop_assert_eq!(d, levenshtein(&b, &a));
            prop_assert!(d <= a.chars().count().max(b.chars().count()));
            prop_assert!(d >= a.chars().count().abs_diff(b.chars().count()));
        }

        /// Property: similarity stays within [0, 1] and is 1 only for equal strings
        #[test]
        fn similarity_in_unit_interval(a in "[a-z]{0,8}", b in "[a-z]{0,8}") {
            let s = similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
            prop_assert_eq!(s == 1.0, a == b);
        }
    }
}
