//! Cell: The atomic unit of terminal display.
//!
//! # Attribute Layout
//!
//! An [`Attribute`] packs a color and a style into 16 bits so that a whole
//! [`Cell`] stays small and comparisons stay cheap:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Attribute (u16)                             │
//! ├─────────────┬────────┬───────────┬───────────┤
//! │  unused     │reverse │ underline │ bold │col │
//! │  bits 12-15 │ bit 11 │  bit 10   │ bit 9│0-8 │
//! └─────────────┴────────┴───────────┴──────┴────┘
//! ```
//!
//! Color `0` is the terminal default; color `n` is palette index `n - 1`,
//! which lets all 256 palette entries fit in 9 bits.

use bitflags::bitflags;

/// Mask of the color bits inside an [`Attribute`].
const COLOR_MASK: u16 = 0x01FF;

bitflags! {
    /// Text style modifiers carried in the high bits of an [`Attribute`].
    ///
    /// # Example
    /// ```
    /// use cellgrid::{Attribute, Style};
    /// let attr = Attribute::RED.with_style(Style::BOLD | Style::UNDERLINE);
    /// assert!(attr.style().contains(Style::BOLD));
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Style: u16 {
        /// Bold text
        const BOLD = 0x0200;
        /// Underlined text
        const UNDERLINE = 0x0400;
        /// Reversed colors (fg/bg swapped)
        const REVERSE = 0x0800;
    }
}

impl std::fmt::Debug for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A packed color/style value used for a cell's foreground or background.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Attribute(u16);

impl Attribute {
    /// The terminal's default color, no style.
    pub const DEFAULT: Self = Self(0);
    /// Palette index 0.
    pub const BLACK: Self = Self::indexed(0);
    /// Palette index 1.
    pub const RED: Self = Self::indexed(1);
    /// Palette index 2.
    pub const GREEN: Self = Self::indexed(2);
    /// Palette index 3.
    pub const YELLOW: Self = Self::indexed(3);
    /// Palette index 4.
    pub const BLUE: Self = Self::indexed(4);
    /// Palette index 5.
    pub const MAGENTA: Self = Self::indexed(5);
    /// Palette index 6.
    pub const CYAN: Self = Self::indexed(6);
    /// Palette index 7.
    pub const WHITE: Self = Self::indexed(7);

    /// An attribute selecting the given palette index.
    #[inline]
    pub const fn indexed(index: u8) -> Self {
        Self(index as u16 + 1)
    }

    /// Rebuild an attribute from its packed representation.
    ///
    /// Unknown high bits are dropped.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & (COLOR_MASK | Style::all().bits()))
    }

    /// The packed representation.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// The palette index, or `None` for the terminal default color.
    #[inline]
    pub const fn color(self) -> Option<u8> {
        match self.0 & COLOR_MASK {
            0 => None,
            #[allow(clippy::cast_possible_truncation)]
            n => Some((n - 1) as u8),
        }
    }

    /// The style modifiers.
    #[inline]
    pub const fn style(self) -> Style {
        Style::from_bits_truncate(self.0 & !COLOR_MASK)
    }

    /// Add style modifiers (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_style(self, style: Style) -> Self {
        Self(self.0 | style.bits())
    }
}

impl std::ops::BitOr<Style> for Attribute {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Style) -> Self {
        self.with_style(rhs)
    }
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.color() {
            Some(index) => write!(f, "Attribute({index}")?,
            None => write!(f, "Attribute(default")?,
        }
        if !self.style().is_empty() {
            write!(f, " {:?}", self.style())?;
        }
        write!(f, ")")
    }
}

/// A single terminal cell: one glyph and its color pair.
///
/// Cells are compared by value; the renderer relies on this to skip
/// positions whose desired content already matches the screen.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
    /// The glyph to display.
    pub ch: char,
    /// Foreground attribute.
    pub fg: Attribute,
    /// Background attribute.
    pub bg: Attribute,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// A space with default attributes.
    pub const EMPTY: Self = Self::blank(Attribute::DEFAULT, Attribute::DEFAULT);

    /// Create a new cell.
    #[inline]
    pub const fn new(ch: char, fg: Attribute, bg: Attribute) -> Self {
        Self { ch, fg, bg }
    }

    /// A space with the given attributes, used when clearing a grid.
    #[inline]
    pub const fn blank(fg: Attribute, bg: Attribute) -> Self {
        Self::new(' ', fg, bg)
    }

    /// The right half of a wide glyph.
    ///
    /// Written into the front grid only, so the position reads as already
    /// drawn.
    #[inline]
    pub const fn placeholder(fg: Attribute, bg: Attribute) -> Self {
        Self::new('\0', fg, bg)
    }

    /// Whether this cell is a wide-glyph placeholder.
    #[inline]
    pub const fn is_placeholder(&self) -> bool {
        self.ch == '\0'
    }

    /// Number of columns the glyph occupies on screen (1 or 2).
    ///
    /// Zero-width and unknown glyphs count as one column so a scan always
    /// advances.
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u16 {
        unicode_width::UnicodeWidthChar::width(self.ch).unwrap_or(1).clamp(1, 2) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_is_small() {
        assert!(std::mem::size_of::<Cell>() <= 8);
    }

    #[test]
    fn test_attribute_default_has_no_color() {
        assert_eq!(Attribute::DEFAULT.color(), None);
        assert!(Attribute::DEFAULT.style().is_empty());
    }

    #[test]
    fn test_attribute_indexed_covers_full_palette() {
        assert_eq!(Attribute::indexed(0).color(), Some(0));
        assert_eq!(Attribute::indexed(255).color(), Some(255));
        assert_eq!(Attribute::RED.color(), Some(1));
        assert_eq!(Attribute::WHITE.color(), Some(7));
    }

    #[test]
    fn test_attribute_style_does_not_touch_color() {
        let attr = Attribute::indexed(200) | Style::BOLD | Style::REVERSE;
        assert_eq!(attr.color(), Some(200));
        assert_eq!(attr.style(), Style::BOLD | Style::REVERSE);
        assert!(!attr.style().contains(Style::UNDERLINE));
    }

    #[test]
    fn test_attribute_from_bits_roundtrips_known_bits() {
        let attr = Attribute::GREEN.with_style(Style::UNDERLINE);
        assert_eq!(Attribute::from_bits(attr.bits()), attr);
        assert_eq!(Attribute::from_bits(0xF000), Attribute::DEFAULT);
    }

    #[test]
    fn test_cell_equality() {
        let a = Cell::new('A', Attribute::RED, Attribute::DEFAULT);
        let b = Cell::new('A', Attribute::RED, Attribute::DEFAULT);
        let c = Cell::new('A', Attribute::GREEN, Attribute::DEFAULT);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cell_width() {
        assert_eq!(Cell::new('A', Attribute::DEFAULT, Attribute::DEFAULT).width(), 1);
        assert_eq!(Cell::new('日', Attribute::DEFAULT, Attribute::DEFAULT).width(), 2);
        // Combining marks still advance one column.
        assert_eq!(Cell::new('\u{0301}', Attribute::DEFAULT, Attribute::DEFAULT).width(), 1);
    }

    #[test]
    fn test_placeholder() {
        let cell = Cell::placeholder(Attribute::RED, Attribute::BLUE);
        assert!(cell.is_placeholder());
        assert!(!Cell::EMPTY.is_placeholder());
    }
}
