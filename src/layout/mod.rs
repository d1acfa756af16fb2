//! Line layout of extracted text.

pub mod lines;

pub use lines::{group_by_line, Line, LINE_EPSILON};
