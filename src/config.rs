//! Configuration for the extraction and line-grouping stages.

use crate::layout::LINE_EPSILON;

/// What to do when a single page cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageFailurePolicy {
    /// Abort the whole extraction with the lowest failing page number.
    #[default]
    FailFast,
    /// Keep the text of every page that parsed and report the failed pages.
    SkipFailedPages,
}

/// Extraction configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Maximum vertical distance (in page units) between a run and its line anchor.
    pub line_tolerance: f32,

    /// Page failure handling.
    pub page_failure: PageFailurePolicy,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            line_tolerance: LINE_EPSILON,
            page_failure: PageFailurePolicy::FailFast,
        }
    }

    /// Lenient configuration: failed pages are skipped instead of aborting.
    pub fn lenient() -> Self {
        Self {
            page_failure: PageFailurePolicy::SkipFailedPages,
            ..Self::new()
        }
    }

    /// Set the line tolerance.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance;
        self
    }

    /// Set the page failure policy.
    pub fn with_page_failure(mut self, policy: PageFailurePolicy) -> Self {
        self.page_failure = policy;
        self
    }
}
