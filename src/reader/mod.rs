//! Page text reading.
//!
//! A [`PageSource`] hands out pages as ordered lists of text runs in native
//! PDF coordinates (origin bottom-left, y growing upwards). Everything
//! downstream works in top-down page coordinates; [`RawPage::to_positions`]
//! is the single place where that flip happens.
//!
//! Two sources are provided:
//! - [`LopdfSource`] reads PDF bytes through `lopdf` and interprets the
//!   text operators of each page content stream.
//! - [`MemorySource`] holds already-parsed pages, for callers that run
//!   their own parser and for tests.

pub mod lopdf_source;
pub mod memory;

pub use lopdf_source::LopdfSource;
pub use memory::MemorySource;

use crate::error::Result;
use crate::extractors::TextPosition;

/// A single text run as reported by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTextRun {
    /// Decoded text of the run
    pub text: String,
    /// Native x of the run origin
    pub x: f32,
    /// Native (bottom-up) y of the run baseline
    pub y: f32,
    /// Advance width of the run
    pub width: f32,
    /// Run height (effective font size)
    pub height: f32,
}

impl RawTextRun {
    /// Create a new run.
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
        }
    }
}

/// One parsed page: its size and its runs in emission order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawPage {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Text runs in the order the parser emitted them
    pub runs: Vec<RawTextRun>,
}

impl RawPage {
    /// Create an empty page of the given size.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            runs: Vec::new(),
        }
    }

    /// Append a run (builder style).
    pub fn with_run(mut self, run: RawTextRun) -> Self {
        self.runs.push(run);
        self
    }

    /// Convert the runs to top-down positions.
    ///
    /// `y_top = page_height - native_y - run_height`. Emission order is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_spotlight::reader::{RawPage, RawTextRun};
    ///
    /// let page = RawPage::new(612.0, 792.0)
    ///     .with_run(RawTextRun::new("UN1203", 72.0, 700.0, 36.0, 12.0));
    /// let positions = page.to_positions(1);
    /// assert_eq!(positions[0].y, 80.0);
    /// assert_eq!(positions[0].page, 1);
    /// ```
    pub fn to_positions(&self, page_number: usize) -> Vec<TextPosition> {
        self.runs
            .iter()
            .map(|run| TextPosition {
                text: run.text.clone(),
                page: page_number,
                x: run.x,
                y: self.height - run.y - run.height,
                width: run.width,
                height: run.height,
            })
            .collect()
    }
}

/// The parser collaborator: a document that can be read page by page.
///
/// Page numbers are 1-indexed. Implementations must be safe to call from
/// several threads at once; pages are read in parallel.
pub trait PageSource: Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> Result<usize>;

    /// Read one page.
    ///
    /// A page that cannot be read yields [`crate::Error::PageParseFailure`].
    fn page(&self, page_number: usize) -> Result<RawPage>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn page_count(&self) -> Result<usize> {
        (**self).page_count()
    }

    fn page(&self, page_number: usize) -> Result<RawPage> {
        (**self).page(page_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_positions_flips_y() {
        let page = RawPage::new(600.0, 800.0)
            .with_run(RawTextRun::new("a", 10.0, 700.0, 5.0, 10.0))
            .with_run(RawTextRun::new("b", 20.0, 0.0, 5.0, 10.0));
        let positions = page.to_positions(3);
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0].y, 90.0);
        assert_eq!(positions[1].y, 790.0);
        assert!(positions.iter().all(|p| p.page == 3));
    }

    #[test]
    fn test_to_positions_keeps_emission_order_and_size() {
        let page = RawPage::new(600.0, 800.0)
            .with_run(RawTextRun::new("second", 300.0, 500.0, 40.0, 12.0))
            .with_run(RawTextRun::new("first", 10.0, 500.0, 30.0, 12.0));
        let positions = page.to_positions(1);
        assert_eq!(positions[0].text, "second");
        assert_eq!(positions[0].width, 40.0);
        assert_eq!(positions[0].height, 12.0);
        assert_eq!(positions[1].text, "first");
    }
}
