//! Text position extraction.

pub mod positions;

pub use positions::{extract, extract_pages, extract_with_config, Extraction, TextPosition};
