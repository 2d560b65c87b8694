//! Buffer module: Core data structures for the double-buffer rendering system.
//!
//! This module contains:
//! - [`Cell`]: One glyph and its color pair
//! - [`Attribute`]: Packed color/style value
//! - [`Buffer`]: A grid of cells representing the terminal screen
//! - [`diff`]: Diffing engine for generating minimal escape sequences

mod cell;
#[allow(clippy::module_inception)]
mod buffer;
pub mod diff;

pub use cell::{Attribute, Cell, Style};
pub use buffer::Buffer;
