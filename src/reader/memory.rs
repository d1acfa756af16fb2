//! In-memory page source.

use crate::error::{Error, Result};
use crate::reader::{PageSource, RawPage};

/// A document whose pages were parsed elsewhere.
///
/// Pages may also be recorded as failures, standing in for a page the
/// upstream parser could not read.
///
/// # Examples
///
/// ```
/// use pdf_spotlight::reader::{MemorySource, PageSource, RawPage, RawTextRun};
///
/// let source = MemorySource::new()
///     .with_page(RawPage::new(612.0, 792.0).with_run(RawTextRun::new("UN1942", 72.0, 700.0, 36.0, 12.0)))
///     .with_failed_page("bad xref");
/// assert_eq!(source.page_count().unwrap(), 2);
/// assert!(source.page(2).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: Vec<std::result::Result<RawPage, String>>,
}

impl MemorySource {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a document from parsed pages.
    pub fn from_pages(pages: impl IntoIterator<Item = RawPage>) -> Self {
        Self {
            pages: pages.into_iter().map(Ok).collect(),
        }
    }

    /// Append a page.
    pub fn push_page(&mut self, page: RawPage) {
        self.pages.push(Ok(page));
    }

    /// Append a page that fails to parse with `reason`.
    pub fn push_failed_page(&mut self, reason: impl Into<String>) {
        self.pages.push(Err(reason.into()));
    }

    /// Append a page (builder style).
    pub fn with_page(mut self, page: RawPage) -> Self {
        self.push_page(page);
        self
    }

    /// Append a failing page (builder style).
    pub fn with_failed_page(mut self, reason: impl Into<String>) -> Self {
        self.push_failed_page(reason);
        self
    }
}

impl PageSource for MemorySource {
    fn page_count(&self) -> Result<usize> {
        Ok(self.pages.len())
    }

    fn page(&self, page_number: usize) -> Result<RawPage> {
        let slot = page_number
            .checked_sub(1)
            .and_then(|i| self.pages.get(i))
            .ok_or_else(|| Error::PageParseFailure {
                page: page_number,
                reason: format!("page out of range (document has {})", self.pages.len()),
            })?;

        slot.clone().map_err(|reason| Error::PageParseFailure {
            page: page_number,
            reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::RawTextRun;

    #[test]
    fn test_pages_are_one_indexed() {
        let source = MemorySource::from_pages(vec![
            RawPage::new(100.0, 100.0).with_run(RawTextRun::new("one", 0.0, 0.0, 1.0, 1.0)),
            RawPage::new(100.0, 100.0).with_run(RawTextRun::new("two", 0.0, 0.0, 1.0, 1.0)),
        ]);
        assert_eq!(source.page(1).unwrap().runs[0].text, "one");
        assert_eq!(source.page(2).unwrap().runs[0].text, "two");
    }

    #[test]
    fn test_out_of_range_page() {
        let source = MemorySource::new().with_page(RawPage::new(1.0, 1.0));
        assert!(matches!(source.page(0), Err(Error::PageParseFailure { page: 0, .. })));
        assert!(matches!(source.page(2), Err(Error::PageParseFailure { page: 2, .. })));
    }

    #[test]
    fn test_failed_page_reports_reason() {
        let mut source = MemorySource::new();
        source.push_page(RawPage::new(1.0, 1.0));
        source.push_failed_page("corrupt stream");
        match source.page(2) {
            Err(Error::PageParseFailure { page, reason }) => {
                assert_eq!(page, 2);
                assert_eq!(reason, "corrupt stream");
            },
            other => panic!("expected page failure, got {:?}", other),
        }
    }
}
