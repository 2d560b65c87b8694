//! Renderer: the caller-owned half of a session.
//!
//! Holds both grids, the cursor, the last-written caches and the pending
//! output bytes. Nothing here performs I/O; the session writes
//! [`Renderer::pending_output`] to the terminal and then discards it.

use crate::buffer::diff::{emit_attrs, render_diff, DiffResult, DiffState};
use crate::buffer::{Attribute, Buffer, Cell};
use crate::color::{ColorMode, Rgb};
use crate::terminal::{Capabilities, OutputBuffer};

/// Front-grid fill for a screen whose content is unknown; it never equals
/// a cell the scan can produce, so the next flush draws every position.
const UNDRAWN: Cell = Cell::placeholder(Attribute::DEFAULT, Attribute::DEFAULT);

/// Double-buffered grid renderer.
pub struct Renderer {
    /// Desired state, written by the application.
    back: Buffer,
    /// What the last flush put on screen.
    front: Buffer,
    /// Cached cursor position and attribute pair.
    state: DiffState,
    /// Bytes waiting for the next terminal write.
    output: OutputBuffer,
    caps: Capabilities,
    /// Visible cursor position; `None` when hidden.
    cursor: Option<(u16, u16)>,
    color_mode: ColorMode,
    /// Attributes used by `clear`, resize and sync.
    fg: Attribute,
    bg: Attribute,
}

impl Renderer {
    /// Create a renderer for a `width` × `height` screen.
    pub fn new(width: u16, height: u16, caps: Capabilities, output_capacity: usize) -> Self {
        let mut renderer = Self {
            back: Buffer::new(width, height),
            front: Buffer::new(width, height),
            state: DiffState::new(),
            output: OutputBuffer::with_capacity(output_capacity),
            caps,
            cursor: None,
            color_mode: ColorMode::Normal,
            fg: Attribute::DEFAULT,
            bg: Attribute::DEFAULT,
        };
        renderer.reset(width, height);
        renderer
    }

    /// Return to the freshly opened state: cleared grids, hidden cursor,
    /// default colors and no cached terminal state.
    pub fn reset(&mut self, width: u16, height: u16) {
        self.fg = Attribute::DEFAULT;
        self.bg = Attribute::DEFAULT;
        self.back.reinit(width, height, Cell::EMPTY);
        self.front.reinit(width, height, UNDRAWN);
        self.state.reset();
        self.cursor = None;
        self.color_mode = ColorMode::Normal;
        self.output.clear();
    }

    /// Grid dimensions in (columns, rows).
    pub const fn size(&self) -> (u16, u16) {
        self.back.size()
    }

    /// The desired grid.
    pub const fn back(&self) -> &Buffer {
        &self.back
    }

    /// The desired grid, mutably.
    pub fn back_mut(&mut self) -> &mut Buffer {
        &mut self.back
    }

    /// The grid as last flushed.
    pub const fn front(&self) -> &Buffer {
        &self.front
    }

    /// Cached terminal state.
    pub const fn diff_state(&self) -> &DiffState {
        &self.state
    }

    /// Control sequences in use.
    pub const fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Visible cursor position.
    pub const fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    /// Current color depth.
    pub const fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Bytes produced since the last [`discard_output`](Self::discard_output).
    pub fn pending_output(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Drop pending bytes, normally after writing them.
    pub fn discard_output(&mut self) {
        self.output.clear();
    }

    /// Write a cell into the desired grid; out of range is ignored.
    pub fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        self.back.set_signed(x, y, cell);
    }

    /// Show the cursor at (x, y).
    pub fn set_cursor(&mut self, x: u16, y: u16) {
        if self.cursor.is_none() {
            self.output.write_str(&self.caps.show_cursor);
        }
        self.cursor = Some((x, y));
        self.output.cursor_move(x, y);
    }

    /// Hide the cursor.
    pub fn hide_cursor(&mut self) {
        if self.cursor.is_some() {
            self.output.write_str(&self.caps.hide_cursor);
        }
        self.cursor = None;
    }

    /// Enable or disable mouse reporting.
    pub fn set_mouse(&mut self, enabled: bool) {
        let sequence = if enabled {
            &self.caps.enter_mouse
        } else {
            &self.caps.exit_mouse
        };
        self.output.write_str(sequence);
    }

    /// Switch color depth; attributes are re-sent on the next change.
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        if self.color_mode != mode {
            self.state.attrs = None;
        }
        self.color_mode = mode;
    }

    /// Queue palette definitions for entries `0..palette.len()`.
    pub fn write_palette(&mut self, palette: &[Rgb]) {
        for (index, &color) in palette.iter().enumerate() {
            self.output.palette_entry(index, color);
        }
    }

    /// Store `fg`/`bg` as the clear colors and blank the desired grid.
    ///
    /// Returns whether `size` differed and the grids were reallocated; the
    /// pending output then holds a clear-screen.
    pub fn clear(&mut self, fg: Attribute, bg: Attribute, size: (u16, u16)) -> bool {
        self.fg = fg;
        self.bg = bg;
        let resized = self.reconcile_size(size);
        self.back.clear(Cell::blank(fg, bg));
        resized
    }

    /// Reallocate and clear both grids if the terminal size changed.
    pub fn reconcile_size(&mut self, (width, height): (u16, u16)) -> bool {
        if self.back.size() == (width, height) {
            return false;
        }
        let blank = Cell::blank(self.fg, self.bg);
        self.back.reinit(width, height, blank);
        self.front.reinit(width, height, blank);
        self.send_clear();
        log::debug!("grid resized to {width}x{height}");
        true
    }

    /// Queue a clear-screen in the clear colors and forget the cursor
    /// position.
    pub fn send_clear(&mut self) {
        emit_attrs(&mut self.output, &mut self.state, self.fg, self.bg, self.color_mode);
        self.output.write_str(&self.caps.clear_screen);
        if let Some((x, y)) = self.cursor {
            self.output.cursor_move(x, y);
        }
        self.state.position = None;
    }

    /// Diff the grids into pending output.
    ///
    /// `size` is the terminal's current size; the grids follow it first.
    /// A visible cursor is moved back into place even when no cell changed.
    pub fn render(&mut self, size: (u16, u16)) -> DiffResult {
        self.state.position = None;
        self.reconcile_size(size);

        let result = render_diff(
            &mut self.back,
            &mut self.front,
            &mut self.output,
            &mut self.state,
            self.color_mode,
        );

        if let Some((x, y)) = self.cursor {
            self.output.cursor_move(x, y);
        }
        result
    }

    /// Forget the screen, clear it and redraw everything that differs from
    /// a blank screen.
    pub fn sync(&mut self, size: (u16, u16)) -> DiffResult {
        self.front.clear(Cell::blank(self.fg, self.bg));
        self.send_clear();
        self.render(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PALETTE_256;

    fn renderer(width: u16, height: u16) -> Renderer {
        Renderer::new(width, height, Capabilities::xterm(), 1024)
    }

    fn cell(ch: char) -> Cell {
        Cell::new(ch, Attribute::DEFAULT, Attribute::DEFAULT)
    }

    /// Feed everything pending into a terminal emulator and discard it.
    fn present(renderer: &mut Renderer, parser: &mut vt100::Parser) {
        parser.process(renderer.pending_output());
        renderer.discard_output();
    }

    #[test]
    fn test_first_flush_touches_every_cell() {
        let mut r = renderer(8, 3);
        let result = r.render((8, 3));
        assert_eq!(result.cells_changed, 24);
        assert_eq!(r.front(), r.back());
    }

    #[test]
    fn test_second_flush_is_silent() {
        let mut r = renderer(8, 3);
        r.set_cell(2, 1, cell('q'));
        r.render((8, 3));
        r.discard_output();

        let result = r.render((8, 3));
        assert_eq!(result, DiffResult::default());
        assert!(r.pending_output().is_empty());
    }

    #[test]
    fn test_second_flush_with_visible_cursor_only_moves_it() {
        let mut r = renderer(8, 3);
        r.set_cursor(3, 2);
        r.render((8, 3));
        r.discard_output();

        let result = r.render((8, 3));
        assert_eq!(result, DiffResult::default());
        assert_eq!(r.pending_output(), b"\x1b[3;4H");
    }

    #[test]
    fn test_single_change_is_minimal() {
        let mut r = renderer(8, 3);
        r.render((8, 3));
        r.discard_output();

        r.set_cell(5, 2, Cell::new('Z', Attribute::GREEN, Attribute::DEFAULT));
        let result = r.render((8, 3));
        assert_eq!(result.cells_changed, 1);
        assert!(result.cursor_moves <= 1);
        assert!(result.color_changes <= 1);
        assert_eq!(
            String::from_utf8_lossy(r.pending_output()).matches('Z').count(),
            1
        );
    }

    #[test]
    fn test_out_of_bounds_set_cell_is_ignored() {
        let mut r = renderer(4, 2);
        r.set_cell(1, 1, cell('k'));
        let before = r.back().clone();

        r.set_cell(-1, 0, cell('x'));
        r.set_cell(4, 0, cell('x'));
        r.set_cell(0, 2, cell('x'));
        r.set_cell(0, i32::MIN, cell('x'));

        assert_eq!(r.back(), &before);
    }

    #[test]
    fn test_screen_matches_back_grid() {
        let mut r = renderer(10, 2);
        let mut parser = vt100::Parser::new(2, 10, 0);
        for (i, ch) in "hello".chars().enumerate() {
            r.set_cell(i as i32, 0, Cell::new(ch, Attribute::YELLOW, Attribute::BLUE));
        }
        r.set_cell(0, 1, cell('日'));
        r.set_cell(2, 1, cell('!'));
        r.render((10, 2));
        present(&mut r, &mut parser);

        let screen = parser.screen();
        assert_eq!(screen.contents_between(0, 0, 0, 5), "hello");
        assert_eq!(screen.cell(0, 0).unwrap().fgcolor(), vt100::Color::Idx(3));
        assert_eq!(screen.cell(0, 4).unwrap().bgcolor(), vt100::Color::Idx(4));
        assert_eq!(screen.cell(1, 0).unwrap().contents(), "日");
        assert_eq!(screen.cell(1, 2).unwrap().contents(), "!");
    }

    #[test]
    fn test_cursor_transitions() {
        let mut r = renderer(10, 5);
        r.hide_cursor();
        assert!(r.pending_output().is_empty());

        r.set_cursor(3, 4);
        let shown = String::from_utf8_lossy(r.pending_output()).into_owned();
        assert_eq!(shown, "\x1b[?25h\x1b[5;4H");
        r.discard_output();

        r.set_cursor(1, 1);
        assert_eq!(r.pending_output(), b"\x1b[2;2H");
        r.discard_output();

        r.hide_cursor();
        assert_eq!(r.pending_output(), b"\x1b[?25l");
        assert_eq!(r.cursor(), None);
    }

    #[test]
    fn test_render_places_visible_cursor_last() {
        let mut r = renderer(10, 5);
        r.set_cursor(7, 3);
        r.discard_output();
        r.set_cell(0, 0, cell('a'));
        r.render((10, 5));
        assert!(r.pending_output().ends_with(b"\x1b[4;8H"));

        let mut parser = vt100::Parser::new(5, 10, 0);
        present(&mut r, &mut parser);
        assert_eq!(parser.screen().cursor_position(), (3, 7));
    }

    #[test]
    fn test_resize_reallocates_and_clears() {
        let mut r = renderer(6, 2);
        r.set_cell(0, 0, cell('a'));
        r.render((6, 2));
        r.discard_output();

        let result = r.render((3, 4));
        assert_eq!(r.size(), (3, 4));
        assert_eq!(result.cells_changed, 0);
        assert!(r.back().cells().iter().all(|c| *c == Cell::EMPTY));
        let text = String::from_utf8_lossy(r.pending_output());
        assert!(text.contains("\x1b[2J"));
    }

    #[test]
    fn test_zero_size_grid() {
        let mut r = renderer(0, 0);
        r.set_cell(0, 0, cell('a'));
        assert_eq!(r.render((0, 0)), DiffResult::default());
        assert!(r.back().is_empty());
    }

    #[test]
    fn test_clear_uses_colors_and_reports_resize() {
        let mut r = renderer(4, 1);
        assert!(!r.clear(Attribute::WHITE, Attribute::RED, (4, 1)));
        assert!(r
            .back()
            .cells()
            .iter()
            .all(|c| *c == Cell::blank(Attribute::WHITE, Attribute::RED)));
        assert!(r.pending_output().is_empty());

        assert!(r.clear(Attribute::WHITE, Attribute::RED, (5, 1)));
        assert!(r.pending_output().ends_with(b"\x1b[1;1H\x1b[2J"));
    }

    #[test]
    fn test_sync_forces_redraw() {
        let mut r = renderer(4, 1);
        r.set_cell(1, 0, cell('s'));
        r.render((4, 1));
        r.discard_output();

        let result = r.sync((4, 1));
        assert_eq!(result.cells_changed, 1);
        let text = String::from_utf8_lossy(r.pending_output());
        let clear = text.find("\x1b[2J").unwrap();
        let glyph = text.find('s').unwrap();
        assert!(clear < glyph);
    }

    #[test]
    fn test_color_mode_change_invalidates_attrs() {
        let mut r = renderer(2, 1);
        r.render((2, 1));
        assert!(r.diff_state().attrs.is_some());

        r.set_color_mode(ColorMode::Color256);
        assert!(r.diff_state().attrs.is_none());
        assert_eq!(r.color_mode(), ColorMode::Color256);
    }

    #[test]
    fn test_palette_output() {
        let mut r = renderer(1, 1);
        r.write_palette(&PALETTE_256[..2]);
        assert_eq!(
            String::from_utf8_lossy(r.pending_output()),
            "\x1b]4;0;rgb:00/00/00\x1b\\\x1b]4;1;rgb:cd/00/00\x1b\\"
        );
    }

    #[test]
    fn test_mouse_toggle() {
        let mut r = renderer(1, 1);
        r.set_mouse(true);
        r.set_mouse(false);
        assert_eq!(
            r.pending_output(),
            b"\x1b[?1000h\x1b[?1006h\x1b[?1006l\x1b[?1000l"
        );
    }

    #[test]
    fn test_reset_invalidates_everything() {
        let mut r = renderer(4, 2);
        r.set_cursor(1, 1);
        r.set_color_mode(ColorMode::Color256);
        r.set_cell(0, 0, cell('x'));
        r.render((4, 2));

        r.reset(4, 2);
        assert_eq!(*r.diff_state(), DiffState::new());
        assert_eq!(r.cursor(), None);
        assert_eq!(r.color_mode(), ColorMode::Normal);
        assert!(r.pending_output().is_empty());
        assert_eq!(r.render((4, 2)).cells_changed, 8);
    }
}
