//! Content stream support.
//!
//! The PDF reader walks page content streams and needs to know where each
//! text-showing operator puts its glyphs. [`graphics_state`] tracks the
//! matrices and text state parameters that decide that; [`tokens`] checks
//! that a stream was read to its end.

pub mod graphics_state;
pub mod tokens;

pub use graphics_state::{GraphicsStateStack, Matrix, TextState};
pub use tokens::count_operators;
