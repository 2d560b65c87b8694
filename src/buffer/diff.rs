//! Diffing Engine: Generate minimal escape sequences from buffer changes.
//!
//! This module implements the core redraw logic:
//! 1. Compare the back (desired) and front (on screen) buffers
//! 2. Emit glyphs only for cells that changed
//! 3. Skip cursor movement when writing directly after the previous glyph
//! 4. Track the last attribute pair to avoid redundant SGR sequences
//!
//! All output is accumulated in a single buffer and flushed with one syscall.

use super::{Attribute, Buffer, Cell};
use crate::color::ColorMode;
use crate::terminal::OutputBuffer;

/// What the terminal is known to hold after the last emitted bytes.
///
/// `None` means unknown; the next glyph then forces a cursor move or an
/// attribute change respectively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffState {
    /// Where the terminal cursor sits after the last glyph.
    pub position: Option<(u16, u16)>,
    /// Last emitted (foreground, background) pair.
    pub attrs: Option<(Attribute, Attribute)>,
}

impl DiffState {
    /// Create a new diff state with unknown terminal state.
    pub const fn new() -> Self {
        Self {
            position: None,
            attrs: None,
        }
    }

    /// Forget everything (e.g., after a clear or a session restart).
    pub fn reset(&mut self) {
        self.position = None;
        self.attrs = None;
    }
}

/// Result of a diff operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Number of cells that were different.
    pub cells_changed: usize,
    /// Number of cursor move sequences emitted.
    pub cursor_moves: usize,
    /// Number of attribute change sequences emitted.
    pub color_changes: usize,
}

/// Reconcile `front` with `back`, writing escape sequences to `output`.
///
/// Both buffers must have the same dimensions. Control characters in
/// `back` are replaced with spaces in place. Changed cells are copied into
/// `front`; a wide glyph also marks the cell to its right as drawn with a
/// [`Cell::placeholder`]. A wide glyph that would start in the last column
/// is drawn as a space instead.
pub fn render_diff(
    back: &mut Buffer,
    front: &mut Buffer,
    output: &mut OutputBuffer,
    state: &mut DiffState,
    mode: ColorMode,
) -> DiffResult {
    debug_assert_eq!(back.size(), front.size());

    let mut result = DiffResult::default();
    let (width, height) = front.size();

    for y in 0..height {
        let line = (y as usize) * (width as usize);
        let mut x = 0;
        while x < width {
            let idx = line + x as usize;

            let desired = &mut back.cells_mut()[idx];
            if desired.ch < ' ' {
                desired.ch = ' ';
            }
            let desired = *desired;
            let w = desired.width();

            if desired == front.cells()[idx] {
                x += w;
                continue;
            }

            front.cells_mut()[idx] = desired;
            result.cells_changed += 1;

            if emit_attrs(output, state, desired.fg, desired.bg, mode) {
                result.color_changes += 1;
            }

            if w == 2 && x == width - 1 {
                emit_glyph(output, state, &mut result, x, y, ' ', 1);
            } else {
                emit_glyph(output, state, &mut result, x, y, desired.ch, w);
                if w == 2 {
                    front.cells_mut()[idx + 1] = Cell::placeholder(desired.fg, desired.bg);
                }
            }

            x += w;
        }
    }

    result
}

/// Emit an attribute change unless `(fg, bg)` is already current.
///
/// Returns whether anything was written.
pub fn emit_attrs(
    output: &mut OutputBuffer,
    state: &mut DiffState,
    fg: Attribute,
    bg: Attribute,
    mode: ColorMode,
) -> bool {
    if state.attrs == Some((fg, bg)) {
        return false;
    }
    output.set_attrs(fg, bg, mode);
    state.attrs = Some((fg, bg));
    true
}

/// Write a glyph at (x, y), moving the cursor only if it is elsewhere.
fn emit_glyph(
    output: &mut OutputBuffer,
    state: &mut DiffState,
    result: &mut DiffResult,
    x: u16,
    y: u16,
    ch: char,
    width: u16,
) {
    if state.position != Some((x, y)) {
        output.cursor_move(x, y);
        result.cursor_moves += 1;
    }
    output.put_char(ch);
    state.position = Some((x + width, y));
}
