// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Spotlight
//!
//! Keyword localization for PDF documents: find where keywords, their
//! near-misses and UN numbers appear on each page, and get back rectangles
//! ready to draw as highlight overlays.
//!
//! ## Pipeline
//!
//! - **Reading**: a [`reader::PageSource`] yields each page's text runs in
//!   native PDF coordinates. [`reader::LopdfSource`] reads PDF bytes,
//!   [`reader::MemorySource`] holds pages parsed elsewhere.
//! - **Extraction**: [`extractors::extract`] flattens pages into
//!   [`extractors::TextPosition`]s in top-down page coordinates.
//! - **Line grouping**: [`layout::group_by_line`] clusters positions into
//!   visual lines.
//! - **Matching**: exact (case-insensitive, overlapping), fuzzy
//!   (normalized Levenshtein similarity) and UN-number patterns.
//! - **Highlights**: each match becomes a [`search::HighlightArea`].
//!
//! Pages are read and grouped in parallel with `rayon` (feature
//! `parallel`, on by default); results are identical either way.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_spotlight::reader::LopdfSource;
//! use pdf_spotlight::search::{SearchOptions, TextSearcher};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = LopdfSource::from_path("manifest.pdf")?;
//!
//! // Exact matches only
//! let exact = TextSearcher::search_exact(&source, &["UN1942", "Nitrate"])?;
//!
//! // Exact + fuzzy + UN-number patterns
//! let options = SearchOptions::new().with_confidence_threshold(0.7);
//! let enhanced = TextSearcher::search_enhanced(&source, &["Nitrate"], &options)?;
//!
//! println!("{}", serde_json::to_string_pretty(&enhanced)?);
//! # let _ = exact;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry and content-stream state
pub mod content;
pub mod geometry;

// Font metrics and text decoding
pub mod fonts;

// Parser collaborator
pub mod reader;

// Pipeline stages
pub mod extractors;
pub mod layout;
pub mod search;

pub use config::{ExtractionConfig, PageFailurePolicy};
pub use error::{Error, ExtractionError, Result};
pub use extractors::TextPosition;
pub use layout::Line;
pub use search::{HighlightArea, HighlightColor, SearchOptions, TextSearcher};

/// Utility functions
pub mod utils {
    use std::cmp::Ordering;

    /// Safely compare two floating point numbers, handling NaN cases.
    ///
    /// NaN values are treated as greater than all other values, so sorting
    /// never panics and NaN coordinates end up last.
    ///
    /// # Examples
    ///
    /// ```
    /// # use std::cmp::Ordering;
    /// # use pdf_spotlight::utils::safe_float_cmp;
    /// assert_eq!(safe_float_cmp(1.0, 2.0), Ordering::Less);
    /// assert_eq!(safe_float_cmp(2.0, 1.0), Ordering::Greater);
    /// assert_eq!(safe_float_cmp(1.0, 1.0), Ordering::Equal);
    ///
    /// // NaN handling
    /// assert_eq!(safe_float_cmp(f32::NAN, f32::NAN), Ordering::Equal);
    /// assert_eq!(safe_float_cmp(f32::NAN, 1.0), Ordering::Greater);
    /// assert_eq!(safe_float_cmp(1.0, f32::NAN), Ordering::Less);
    /// ```
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_safe_float_cmp_normal() {
            assert_eq!(safe_float_cmp(1.0, 2.0), Ordering::Less);
            assert_eq!(safe_float_cmp(2.0, 1.0), Ordering::Greater);
            assert_eq!(safe_float_cmp(1.5, 1.5), Ordering::Equal);
        }

        #[test]
        fn test_safe_float_cmp_nan() {
            assert_eq!(safe_float_cmp(f32::NAN, f32::NAN), Ordering::Equal);
            assert_eq!(safe_float_cmp(f32::NAN, 0.0), Ordering::Greater);
            assert_eq!(safe_float_cmp(0.0, f32::NAN), Ordering::Less);
        }

        #[test]
        fn test_safe_float_cmp_infinity() {
            assert_eq!(safe_float_cmp(f32::INFINITY, f32::INFINITY), Ordering::Equal);
            assert_eq!(safe_float_cmp(f32::INFINITY, 1.0), Ordering::Greater);
            assert_eq!(safe_float_cmp(f32::NEG_INFINITY, f32::INFINITY), Ordering::Less);
        }
    }
}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
