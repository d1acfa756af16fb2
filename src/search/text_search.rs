//! Search orchestration.
//!
//! Runs the pipeline (extract, group into lines, match, build highlights)
//! and merges the match buckets into one deterministically ordered list.

use crate::config::ExtractionConfig;
use crate::error::{Error, Result};
use crate::extractors::extract_pages;
use crate::layout::{group_by_line, Line};
use crate::reader::{LopdfSource, PageSource};
use crate::search::exact::find_exact;
use crate::search::fuzzy::find_fuzzy;
use crate::search::highlight::{to_highlight_area, HighlightArea};
use crate::search::keyword_match::KeywordMatch;
use crate::search::patterns::UnNumberPattern;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Default minimum similarity for a fuzzy match.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// Keywords shorter than this are never fuzzy matched.
pub const MIN_FUZZY_KEYWORD_LEN: usize = 4;

/// Options for text search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Add approximate whole-word matches
    pub fuzzy_match: bool,
    /// Add UN-number pattern matches
    pub un_number_pattern: bool,
    /// Minimum similarity in `[0, 1]` for a fuzzy match
    pub confidence_threshold: f32,
    /// Minimum keyword length (characters) for fuzzy matching
    pub min_fuzzy_keyword_len: usize,
    /// Maximum number of results (0 = unlimited)
    pub max_results: usize,
    /// Page range to search, 1-indexed and inclusive (None = all pages)
    pub page_range: Option<(usize, usize)>,
    /// Extraction and line grouping settings
    pub extraction: ExtractionConfig,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fuzzy_match: true,
            un_number_pattern: true,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            min_fuzzy_keyword_len: MIN_FUZZY_KEYWORD_LEN,
            max_results: 0,
            page_range: None,
            extraction: ExtractionConfig::default(),
        }
    }
}

impl SearchOptions {
    /// Create new default search options (fuzzy and UN-number matching on).
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact matching only.
    pub fn exact_only() -> Self {
        Self {
            fuzzy_match: false,
            un_number_pattern: false,
            ..Default::default()
        }
    }

    /// Enable or disable fuzzy matching.
    pub fn with_fuzzy_match(mut self, value: bool) -> Self {
        self.fuzzy_match = value;
        self
    }

    /// Enable or disable UN-number patterns.
    pub fn with_un_number_pattern(mut self, value: bool) -> Self {
        self.un_number_pattern = value;
        self
    }

    /// Set the fuzzy confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the minimum keyword length for fuzzy matching.
    pub fn with_min_fuzzy_keyword_len(mut self, len: usize) -> Self {
        self.min_fuzzy_keyword_len = len;
        self
    }

    /// Limit the number of results.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = max;
        self
    }

    /// Search only within a page range (1-indexed, inclusive).
    pub fn with_page_range(mut self, start: usize, end: usize) -> Self {
        self.page_range = Some((start, end));
        self
    }

    /// Set the extraction configuration.
    pub fn with_extraction(mut self, config: ExtractionConfig) -> Self {
        self.extraction = config;
        self
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(Error::InvalidOptions(format!(
                "confidence threshold {} is outside [0, 1]",
                self.confidence_threshold
            )));
        }
        if let Some((start, end)) = self.page_range {
            if start == 0 || start > end {
                return Err(Error::InvalidOptions(format!(
                    "page range {}..={} is empty or not 1-indexed",
                    start, end
                )));
            }
        }
        let tolerance = self.extraction.line_tolerance;
        if tolerance.is_nan() || tolerance <= 0.0 {
            return Err(Error::InvalidOptions(format!(
                "line tolerance {} must be positive",
                tolerance
            )));
        }
        Ok(())
    }
}

/// Highlights plus the pages skipped under the lenient page policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOutcome {
    /// Highlights in result order
    pub highlights: Vec<HighlightArea>,
    /// Pages that failed to parse and were skipped
    pub failed_pages: Vec<usize>,
}

/// Keyword search over the text of a document.
///
/// Stateless: every call is a pure function of the document, the keywords
/// and the options.
pub struct TextSearcher;

impl TextSearcher {
    /// Exact, case-insensitive search.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_spotlight::reader::{MemorySource, RawPage, RawTextRun};
    /// use pdf_spotlight::search::TextSearcher;
    ///
    /// let source = MemorySource::new().with_page(
    ///     RawPage::new(612.0, 792.0).with_run(RawTextRun::new("UN1203 Gasoline", 72.0, 700.0, 150.0, 12.0)),
    /// );
    /// let highlights = TextSearcher::search_exact(&source, &["un1203"]).unwrap();
    /// assert_eq!(highlights.len(), 1);
    /// assert_eq!(highlights[0].x, 72.0);
    /// assert_eq!(highlights[0].width, 60.0);
    /// ```
    pub fn search_exact<S, K>(source: &S, keywords: &[K]) -> Result<Vec<HighlightArea>>
    where
        S: PageSource + ?Sized,
        K: AsRef<str> + Sync,
    {
        Self::search(source, keywords, &SearchOptions::exact_only()).map(|o| o.highlights)
    }

    /// Exact search combined with fuzzy and UN-number matching, per `options`.
    pub fn search_enhanced<S, K>(
        source: &S,
        keywords: &[K],
        options: &SearchOptions,
    ) -> Result<Vec<HighlightArea>>
    where
        S: PageSource + ?Sized,
        K: AsRef<str> + Sync,
    {
        Self::search(source, keywords, options).map(|o| o.highlights)
    }

    /// Enhanced search over PDF bytes, read with [`LopdfSource`].
    pub fn search_pdf_bytes<K>(
        bytes: &[u8],
        keywords: &[K],
        options: &SearchOptions,
    ) -> Result<Vec<HighlightArea>>
    where
        K: AsRef<str> + Sync,
    {
        let source = LopdfSource::from_bytes(bytes)?;
        Self::search_enhanced(&source, keywords, options)
    }

    /// Full search, also reporting pages skipped under the lenient policy.
    pub fn search<S, K>(source: &S, keywords: &[K], options: &SearchOptions) -> Result<SearchOutcome>
    where
        S: PageSource + ?Sized,
        K: AsRef<str> + Sync,
    {
        options.validate()?;

        let pages = match options.page_range {
            Some((start, end)) => start..=end,
            None => 1..=source.page_count()?,
        };
        let extraction = extract_pages(source, pages, &options.extraction)?;
        let lines: Vec<Line> = group_by_line(&extraction.positions, options.extraction.line_tolerance)
            .into_values()
            .flatten()
            .collect();

        let highlights = Self::search_lines(&lines, keywords, options);
        log::debug!(
            "Search for {} keywords: {} highlights on {} lines",
            keywords.len(),
            highlights.len(),
            lines.len()
        );

        Ok(SearchOutcome {
            highlights,
            failed_pages: extraction.failed_pages,
        })
    }

    /// Match already grouped lines (in document order) and build highlights.
    ///
    /// Results are ordered by keyword input order, then page, line and
    /// offset; UN-number pattern matches come last. Matches whose range
    /// cannot be mapped onto the runs are dropped.
    pub fn search_lines<K>(lines: &[Line], keywords: &[K], options: &SearchOptions) -> Vec<HighlightArea>
    where
        K: AsRef<str> + Sync,
    {
        let exact = find_exact(lines, keywords);
        let extra = if options.fuzzy_match || options.un_number_pattern {
            find_fuzzy(lines, keywords, options)
        } else {
            IndexMap::new()
        };

        let matches = merge_buckets(keywords, exact, extra);
        let mut highlights: Vec<HighlightArea> = matches.iter().filter_map(to_highlight_area).collect();

        if options.max_results > 0 {
            highlights.truncate(options.max_results);
        }
        for (ordinal, area) in highlights.iter_mut().enumerate() {
            area.id = format!("hl-{}-{}", area.page, ordinal);
        }
        highlights
    }
}

/// Flatten match buckets into result order, dropping duplicate spans.
///
/// Within a keyword bucket, exact matches come before fuzzy matches at the
/// same position and a fuzzy match on an already matched span is dropped.
/// A pattern match is dropped when any kept match covers the same span.
fn merge_buckets<'a, K: AsRef<str>>(
    keywords: &[K],
    mut exact: IndexMap<String, Vec<KeywordMatch<'a>>>,
    mut extra: IndexMap<String, Vec<KeywordMatch<'a>>>,
) -> Vec<KeywordMatch<'a>> {
    let mut merged = Vec::new();
    let mut all_spans: HashSet<(usize, usize, usize)> = HashSet::new();
    let mut seen_keywords: HashSet<&str> = HashSet::new();

    for keyword in keywords {
        let keyword = keyword.as_ref();
        if !seen_keywords.insert(keyword) {
            continue;
        }

        let mut bucket = exact.shift_remove(keyword).unwrap_or_default();
        bucket.extend(extra.shift_remove(keyword).unwrap_or_default());
        bucket.sort_by_key(|m| (m.line_index, m.start_offset));

        let mut bucket_spans = HashSet::new();
        for m in bucket {
            if bucket_spans.insert(m.span()) {
                all_spans.insert(m.span());
                merged.push(m);
            }
        }
    }

    for pattern in UnNumberPattern::ALL {
        for m in extra.shift_remove(pattern.as_str()).unwrap_or_default() {
            if all_spans.insert(m.span()) {
                merged.push(m);
            }
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::TextPosition;
    use crate::search::highlight::HighlightColor;

    fn line_of(words: &[&str]) -> Line {
        let mut x = 10.0;
        let positions = words
            .iter()
            .map(|w| {
                let pos = TextPosition::new(*w, 1, x, 50.0, 5.0 * w.chars().count() as f32, 10.0);
                x += pos.width + 5.0;
                pos
            })
            .collect();
        Line {
            page: 1,
            anchor_y: 50.0,
            positions,
        }
    }

    #[test]
    fn test_search_options_default() {
        let opts = SearchOptions::default();
        assert!(opts.fuzzy_match);
        assert!(opts.un_number_pattern);
        assert_eq!(opts.confidence_threshold, 0.6);
        assert_eq!(opts.min_fuzzy_keyword_len, 4);
        assert_eq!(opts.max_results, 0);
        assert!(opts.page_range.is_none());
    }

    #[test]
    fn test_search_options_builder() {
        let opts = SearchOptions::new()
            .with_fuzzy_match(false)
            .with_un_number_pattern(false)
            .with_confidence_threshold(0.75)
            .with_min_fuzzy_keyword_len(5)
            .with_max_results(10)
            .with_page_range(2, 5)
            .with_extraction(ExtractionConfig::lenient());

        assert!(!opts.fuzzy_match);
        assert!(!opts.un_number_pattern);
        assert_eq!(opts.confidence_threshold, 0.75);
        assert_eq!(opts.min_fuzzy_keyword_len, 5);
        assert_eq!(opts.max_results, 10);
        assert_eq!(opts.page_range, Some((2, 5)));
        assert_eq!(opts.extraction, ExtractionConfig::lenient());
    }

    #[test]
    fn test_validate_rejects_bad_options() {
        assert!(SearchOptions::new().validate().is_ok());
        assert!(SearchOptions::new().with_confidence_threshold(1.5).validate().is_err());
        assert!(SearchOptions::new().with_confidence_threshold(f32::NAN).validate().is_err());
        assert!(SearchOptions::new().with_page_range(0, 3).validate().is_err());
        assert!(SearchOptions::new().with_page_range(4, 3).validate().is_err());
        let flat = SearchOptions::new().with_extraction(ExtractionConfig::new().with_line_tolerance(0.0));
        assert!(matches!(flat.validate(), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_exact_match_wins_over_identical_fuzzy_span() {
        let lines = vec![line_of(&["Ammonium", "Nitrate"])];
        let opts = SearchOptions::new().with_un_number_pattern(false);
        let highlights = TextSearcher::search_lines(&lines, &["Nitrate"], &opts);
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].keyword, "Nitrate");
        assert_eq!(highlights[0].color, HighlightColor::Yellow);
    }

    #[test]
    fn test_pattern_duplicates_are_dropped() {
        let lines = vec![line_of(&["UN1942"])];
        let highlights = TextSearcher::search_lines(&lines, &["UN1942"], &SearchOptions::new());
        // exact wins; Compact and Spaced patterns cover the same span
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].keyword, "UN1942");
    }

    #[test]
    fn test_keyword_order_then_patterns() {
        let lines = vec![line_of(&["Gasoline", "UN", "1203", "Nitrate"])];
        let highlights = TextSearcher::search_lines(
            &lines,
            &["Nitrate", "Gasoline"],
            &SearchOptions::new().with_fuzzy_match(false),
        );
        let keywords: Vec<&str> = highlights.iter().map(|h| h.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["Nitrate", "Gasoline", "UN 1203", "1203"]);
    }

    #[test]
    fn test_ids_and_max_results() {
        let lines = vec![line_of(&["aaaa"])];
        let opts = SearchOptions::exact_only();
        let all = TextSearcher::search_lines(&lines, &["aa"], &opts);
        let ids: Vec<&str> = all.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["hl-1-0", "hl-1-1", "hl-1-2"]);

        let limited = TextSearcher::search_lines(&lines, &["aa"], &opts.with_max_results(2));
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[1].x, all[1].x);
    }

    #[test]
    fn test_repeated_keywords_are_reported_once() {
        let lines = vec![line_of(&["Class", "3"])];
        let highlights = TextSearcher::search_lines(&lines, &["class", "class"], &SearchOptions::exact_only());
        assert_eq!(highlights.len(), 1);
    }
}
