//! Text position extraction.
//!
//! Flattens every page of a [`PageSource`] into one sequence of
//! [`TextPosition`] records in top-down page coordinates. Within a page the
//! parser's emission order is kept; pages follow in ascending order.

use crate::config::{ExtractionConfig, PageFailurePolicy};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::reader::{PageSource, RawPage};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// One text run with page-relative, top-down coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPosition {
    /// Run text
    pub text: String,
    /// 1-indexed page number
    pub page: usize,
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Run width
    pub width: f32,
    /// Run height
    pub height: f32,
}

impl TextPosition {
    /// Create a new text position.
    pub fn new(text: impl Into<String>, page: usize, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            page,
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding box of the run.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Length of the run text in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Result of an extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Positions of every page that was read, in page order
    pub positions: Vec<TextPosition>,
    /// Pages that failed and were skipped (always empty under fail-fast)
    pub failed_pages: Vec<usize>,
}

/// Extract every page with the default (fail-fast) configuration.
///
/// # Examples
///
/// ```
/// use pdf_spotlight::extractors::extract;
/// use pdf_spotlight::reader::{MemorySource, RawPage, RawTextRun};
///
/// let source = MemorySource::new()
///     .with_page(RawPage::new(612.0, 792.0).with_run(RawTextRun::new("UN1942", 72.0, 700.0, 36.0, 12.0)));
/// let positions = extract(&source).unwrap();
/// assert_eq!(positions.len(), 1);
/// assert_eq!(positions[0].y, 80.0);
/// ```
pub fn extract<S: PageSource + ?Sized>(source: &S) -> Result<Vec<TextPosition>> {
    extract_with_config(source, &ExtractionConfig::default()).map(|e| e.positions)
}

/// Extract every page.
pub fn extract_with_config<S: PageSource + ?Sized>(
    source: &S,
    config: &ExtractionConfig,
) -> Result<Extraction> {
    let count = source.page_count()?;
    extract_pages(source, 1..=count, config)
}

/// Extract a range of pages (1-indexed, inclusive), clamped to the document.
///
/// Pages are read in parallel when the `parallel` feature is on. Under
/// [`PageFailurePolicy::FailFast`] the error of the lowest failing page is
/// returned, whatever order the pages finished in.
pub fn extract_pages<S: PageSource + ?Sized>(
    source: &S,
    pages: RangeInclusive<usize>,
    config: &ExtractionConfig,
) -> Result<Extraction> {
    let count = source.page_count()?;
    let first = (*pages.start()).max(1);
    let last = (*pages.end()).min(count);
    let numbers: Vec<usize> = (first..=last).collect();

    log::debug!("Extracting pages {}..={} of {}", first, last, count);

    let mut extraction = Extraction::default();
    for (page_number, result) in read_pages(source, numbers) {
        match result {
            Ok(page) => extraction.positions.extend(page.to_positions(page_number)),
            Err(err @ Error::PageParseFailure { .. })
                if config.page_failure == PageFailurePolicy::SkipFailedPages =>
            {
                log::warn!("Skipping page {}: {}", page_number, err);
                extraction.failed_pages.push(page_number);
            },
            Err(err) => return Err(err),
        }
    }

    log::debug!(
        "Extracted {} text positions ({} pages failed)",
        extraction.positions.len(),
        extraction.failed_pages.len()
    );
    Ok(extraction)
}

/// Read pages, returning results in the order of `numbers`.
#[cfg(feature = "parallel")]
fn read_pages<S: PageSource + ?Sized>(source: &S, numbers: Vec<usize>) -> Vec<(usize, Result<RawPage>)> {
    use rayon::prelude::*;

    numbers
        .into_par_iter()
        .map(|n| (n, source.page(n)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn read_pages<S: PageSource + ?Sized>(source: &S, numbers: Vec<usize>) -> Vec<(usize, Result<RawPage>)> {
    numbers.into_iter().map(|n| (n, source.page(n))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{MemorySource, RawTextRun};

    fn page_with(text: &str) -> RawPage {
        RawPage::new(600.0, 800.0).with_run(RawTextRun::new(text, 10.0, 700.0, 50.0, 10.0))
    }

    #[test]
    fn test_extract_flattens_pages_in_order() {
        let source = MemorySource::from_pages(vec![page_with("one"), page_with("two"), page_with("three")]);
        let positions = extract(&source).unwrap();
        let pages: Vec<usize> = positions.iter().map(|p| p.page).collect();
        assert_eq!(pages, vec![1, 2, 3]);
        assert_eq!(positions[2].text, "three");
        assert_eq!(positions[0].y, 90.0);
    }

    #[test]
    fn test_fail_fast_reports_lowest_failed_page() {
        let source = MemorySource::new()
            .with_page(page_with("ok"))
            .with_failed_page("broken")
            .with_failed_page("also broken");
        let err = extract(&source).unwrap_err();
        assert_eq!(err.page(), Some(2));
    }

    #[test]
    fn test_lenient_policy_keeps_surviving_pages() {
        let source = MemorySource::new()
            .with_page(page_with("ok"))
            .with_failed_page("broken")
            .with_page(page_with("fine"));
        let extraction = extract_with_config(&source, &ExtractionConfig::lenient()).unwrap();
        assert_eq!(extraction.failed_pages, vec![2]);
        let texts: Vec<&str> = extraction.positions.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["ok", "fine"]);
    }

    #[test]
    fn test_extract_pages_clamps_range() {
        let source = MemorySource::from_pages(vec![page_with("one"), page_with("two")]);
        let extraction = extract_pages(&source, 2..=10, &ExtractionConfig::default()).unwrap();
        assert_eq!(extraction.positions.len(), 1);
        assert_eq!(extraction.positions[0].page, 2);

        let empty = extract_pages(&source, 0..=0, &ExtractionConfig::default()).unwrap();
        assert!(empty.positions.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let positions = extract(&MemorySource::new()).unwrap();
        assert!(positions.is_empty());
    }

    #[test]
    fn test_char_len_counts_scalars() {
        let pos = TextPosition::new("Überführung", 1, 0.0, 0.0, 11.0, 10.0);
        assert_eq!(pos.char_len(), 11);
        assert_eq!(pos.rect().right(), 11.0);
    }
}
