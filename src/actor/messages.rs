//! Message types for the event pipeline.
//!
//! [`Event`] is what the application receives; [`InputChunk`] is what the
//! reader thread hands across the rendezvous channel.

use crate::error::Error;
use std::io;
use std::sync::Arc;

/// Key codes for keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character, or the letter of a control chord.
    Char(char),
    /// Function key (F1-F12).
    F(u8),
    /// Backspace key.
    Backspace,
    /// Enter/Return key.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Tab key.
    Tab,
    /// Backtab (Shift+Tab).
    BackTab,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
    /// Escape key.
    Esc,
    /// Null (Ctrl+Space on most terminals).
    Null,
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    /// Shift key held.
    pub shift: bool,
    /// Control key held.
    pub control: bool,
    /// Alt/Option key held.
    pub alt: bool,
}

impl KeyModifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
    };

    /// Only Control.
    pub const CONTROL: Self = Self {
        shift: false,
        control: true,
        alt: false,
    };

    /// Only Alt.
    pub const ALT: Self = Self {
        shift: false,
        control: false,
        alt: true,
    };

    /// Check if any modifier is active.
    pub const fn any(&self) -> bool {
        self.shift || self.control || self.alt
    }
}

/// A decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    /// The key code.
    pub code: KeyCode,
    /// Modifiers held during keypress.
    pub modifiers: KeyModifiers,
}

impl KeyEvent {
    /// Create a key event.
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// A key event with no modifiers.
    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }
}

/// Mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,
    /// Middle mouse button.
    Middle,
    /// Right mouse button.
    Right,
    /// Any button released.
    Release,
    /// Wheel scrolled up.
    WheelUp,
    /// Wheel scrolled down.
    WheelDown,
}

/// Mouse event details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// X coordinate (column), 0-indexed.
    pub x: u16,
    /// Y coordinate (row), 0-indexed.
    pub y: u16,
    /// Button involved.
    pub button: MouseButton,
}

/// Events delivered by [`Session::poll_event`](crate::Session::poll_event).
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),

    /// Terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },

    /// Mouse button or wheel activity.
    Mouse(MouseEvent),

    /// Reading input failed, or the reader is gone.
    Error(Arc<Error>),

    /// A timed poll elapsed with nothing to report.
    None,
}

impl Event {
    pub(crate) fn error(error: Error) -> Self {
        Self::Error(Arc::new(error))
    }

    /// Check if this is a key event for the given code.
    pub fn is_key(&self, code: KeyCode) -> bool {
        matches!(self, Self::Key(key) if key.code == code)
    }
}

/// One read from the terminal, sent over the rendezvous channel.
///
/// The buffer travels back to the reader once its bytes are consumed, so
/// the two threads share a single allocation.
#[derive(Debug)]
pub struct InputChunk {
    /// Read buffer; only the first `n` bytes of a successful read are valid.
    pub buf: Vec<u8>,
    /// Bytes read, or the read error.
    pub result: io::Result<usize>,
}

impl InputChunk {
    /// The bytes this chunk carries; empty for an error.
    pub fn data(&self) -> &[u8] {
        match self.result {
            Ok(n) => &self.buf[..n.min(self.buf.len())],
            Err(_) => &[],
        }
    }
}
