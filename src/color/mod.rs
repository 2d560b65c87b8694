//! Color depth and input mode settings.
//!
//! 256-color output is only enabled when the terminal declares it through
//! `TERM`; everything else about color lives in the [`palette`].

pub mod palette;

use crate::error::{Error, Result};
use bitflags::bitflags;

pub use palette::{Rgb, PALETTE_256};

/// Number of colors the renderer addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    /// The 16 ANSI colors (SGR 30–37, 90–97).
    #[default]
    Normal,
    /// The full 256-entry indexed palette.
    Color256,
}

bitflags! {
    /// How escape bytes and mouse input are interpreted.
    ///
    /// [`InputMode::CURRENT`] (no bits) asks for the active mode without
    /// changing it.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct InputMode: u8 {
        /// An unmatched ESC is reported as the Escape key.
        const ESC = 0b0000_0001;
        /// An unmatched ESC sets the Alt modifier on the next key.
        const ALT = 0b0000_0010;
        /// Report mouse button events.
        const MOUSE = 0b0000_0100;
    }
}

impl InputMode {
    /// Query sentinel for `set_input_mode`.
    pub const CURRENT: Self = Self::empty();

    /// Fill in ESC when neither escape semantic was chosen.
    #[must_use]
    pub fn normalized(self) -> Self {
        if self.intersects(Self::ESC | Self::ALT) {
            self
        } else {
            self | Self::ESC
        }
    }
}

impl Default for InputMode {
    fn default() -> Self {
        Self::ESC
    }
}

/// Check that a terminal type name declares 256-color support.
///
/// `term` is the value of `TERM`, or `None` when it is unset.
pub fn check_256_color(term: Option<&str>) -> Result<()> {
    match term {
        None | Some("") => Err(Error::TermUnset),
        Some(name) if !name.contains("256") => Err(Error::No256Color(name.to_string())),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_256_color_requires_term() {
        assert!(matches!(check_256_color(None), Err(Error::TermUnset)));
        assert!(matches!(check_256_color(Some("")), Err(Error::TermUnset)));
    }

    #[test]
    fn test_256_color_requires_declaration() {
        let err = check_256_color(Some("xterm")).unwrap_err();
        assert!(matches!(err, Error::No256Color(ref t) if t == "xterm"));
        assert!(err.to_string().contains("256-color"));
    }

    #[test]
    fn test_256_color_accepted() {
        assert!(check_256_color(Some("xterm-256color")).is_ok());
        assert!(check_256_color(Some("screen-256color")).is_ok());
    }

    #[test]
    fn test_input_mode_normalized() {
        assert_eq!(InputMode::MOUSE.normalized(), InputMode::ESC | InputMode::MOUSE);
        assert_eq!(InputMode::ALT.normalized(), InputMode::ALT);
        assert_eq!(InputMode::default(), InputMode::ESC);
        assert!(InputMode::CURRENT.is_empty());
    }
}
