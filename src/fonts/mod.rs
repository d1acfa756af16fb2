//! Font handling for text recovery.
//!
//! Only what the reader needs to turn shown strings into Unicode text with
//! a plausible advance width: ToUnicode CMaps, width tables and a fallback
//! single-byte encoding.

pub mod cmap;
pub mod encoding;
pub mod font_dict;

pub use cmap::{parse_tounicode_cmap, CMap};
pub use font_dict::FontMetrics;
