//! `OutputBuffer`: Single-syscall output buffer for escape sequences.

use crate::buffer::{Attribute, Style};
use crate::color::{ColorMode, Rgb};
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{
    Attribute as SgrAttribute, Color, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use std::io::Write;

/// Pre-allocated buffer for building escape sequences.
///
/// All output is accumulated here; the session hands the bytes to the
/// terminal in a single `write()` and then clears the buffer.
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Check if buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write a string, typically a capability.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.data.extend_from_slice(s.as_bytes());
    }

    /// Move cursor to (x, y), 0-indexed.
    #[inline]
    pub fn cursor_move(&mut self, x: u16, y: u16) {
        let _ = queue!(self.data, MoveTo(x, y));
    }

    /// Write a single glyph at the current cursor position.
    #[inline]
    pub fn put_char(&mut self, ch: char) {
        let mut utf8 = [0u8; 4];
        self.data.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    }

    /// Replace the terminal's attributes with the given pair.
    ///
    /// Always starts from a reset, so the sequence does not depend on what
    /// was set before. Bold and underline come from the foreground; reverse
    /// applies if either side carries it.
    pub fn set_attrs(&mut self, fg: Attribute, bg: Attribute, mode: ColorMode) {
        let _ = queue!(self.data, SetAttribute(SgrAttribute::Reset));

        if fg.style().contains(Style::BOLD) {
            let _ = queue!(self.data, SetAttribute(SgrAttribute::Bold));
        }
        if fg.style().contains(Style::UNDERLINE) {
            let _ = queue!(self.data, SetAttribute(SgrAttribute::Underlined));
        }
        if (fg.style() | bg.style()).contains(Style::REVERSE) {
            let _ = queue!(self.data, SetAttribute(SgrAttribute::Reverse));
        }

        if let Some(index) = fg.color() {
            match mode {
                ColorMode::Normal => self.sgr_16(30, 90, index),
                ColorMode::Color256 => {
                    let _ = queue!(self.data, SetForegroundColor(Color::AnsiValue(index)));
                }
            }
        }
        if let Some(index) = bg.color() {
            match mode {
                ColorMode::Normal => self.sgr_16(40, 100, index),
                ColorMode::Color256 => {
                    let _ = queue!(self.data, SetBackgroundColor(Color::AnsiValue(index)));
                }
            }
        }
    }

    /// Classic 16-color SGR: `base + i` for 0–7, `bright + i - 8` for 8–15.
    fn sgr_16(&mut self, base: u8, bright: u8, index: u8) {
        let index = index & 0x0F;
        let code = if index < 8 { base + index } else { bright + index - 8 };
        let _ = write!(self.data, "\x1b[{code}m");
    }

    /// Define one palette entry: `ESC ] 4 ; n ; rgb:rr/gg/bb ESC \`.
    pub fn palette_entry(&mut self, index: usize, color: Rgb) {
        let _ = write!(
            self.data,
            "\x1b]4;{index};rgb:{:02x}/{:02x}/{:02x}\x1b\\",
            color.r, color.g, color.b
        );
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}
