//! Keyword search with highlight positions.
//!
//! The pipeline stages, leaves first:
//! - [`find_exact`]: case-insensitive substring matches within each line
//! - [`find_fuzzy`]: Levenshtein-scored word matches and UN-number patterns
//! - [`to_highlight_area`]: maps a match back onto page coordinates
//! - [`TextSearcher`]: runs extraction, grouping and matching, then merges
//!
//! ## Example
//!
//! ```no_run
//! use pdf_spotlight::reader::LopdfSource;
//! use pdf_spotlight::search::{SearchOptions, TextSearcher};
//!
//! let source = LopdfSource::from_path("manifest.pdf")?;
//! let highlights = TextSearcher::search_enhanced(&source, &["UN1942", "Nitrate"], &SearchOptions::new())?;
//! for h in highlights {
//!     println!("{} on page {} at ({}, {})", h.keyword, h.page, h.x, h.y);
//! }
//! # Ok::<(), pdf_spotlight::Error>(())
//! ```

pub mod exact;
pub mod fuzzy;
pub mod highlight;
pub mod keyword_match;
pub mod patterns;
mod text_search;

pub use exact::find_exact;
pub use fuzzy::{expand_keyword, expand_keywords, find_fuzzy, levenshtein, similarity};
pub use highlight::{to_highlight_area, HighlightArea, HighlightColor};
pub use keyword_match::{KeywordMatch, MatchKind};
pub use patterns::{un_number_of, UnNumberPattern};
pub use text_search::{
    SearchOptions, SearchOutcome, TextSearcher, DEFAULT_CONFIDENCE_THRESHOLD, MIN_FUZZY_KEYWORD_LEN,
};
