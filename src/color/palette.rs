//! The built-in 256-color palette.
//!
//! Entries 0–15 follow xterm's defaults with the blues raised in luma to
//! compensate for the eye's lower sensitivity to them. Entries 16–231 are
//! the usual 6×6×6 cube and 232–255 a 24-step gray ramp.

/// A 24-bit color used to define palette entries.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// The palette applied when switching to 256-color mode.
pub const PALETTE_256: [Rgb; 256] = build_palette();

/// Cube channel level: 0 stays 0, 1–5 map to `40 * v + 55`.
const fn cube_level(v: u8) -> u8 {
    if v == 0 {
        0
    } else {
        40 * v + 55
    }
}

const fn build_palette() -> [Rgb; 256] {
    let mut palette = [Rgb::new(0, 0, 0); 256];

    let (r, g, b) = (205, 205, 238);
    palette[1] = Rgb::new(r, 0, 0);
    palette[2] = Rgb::new(0, g, 0);
    palette[3] = Rgb::new(r, g, 0);
    palette[4] = Rgb::new(0, 0, b);
    palette[5] = Rgb::new(r, 0, b);
    palette[6] = Rgb::new(0, g, b);
    palette[7] = Rgb::new(r, g, b);

    let (r, g, b) = (255, 255, 255);
    palette[8] = Rgb::new(127, 127, 127);
    palette[9] = Rgb::new(r, 0, 0);
    palette[10] = Rgb::new(0, g, 0);
    palette[11] = Rgb::new(r, g, 0);
    palette[12] = Rgb::new(92, 92, b);
    palette[13] = Rgb::new(r, 0, b);
    palette[14] = Rgb::new(0, g, b);
    palette[15] = Rgb::new(r, g, b);

    let mut index = 16;
    let mut r = 0;
    while r < 6 {
        let mut g = 0;
        while g < 6 {
            let mut b = 0;
            while b < 6 {
                palette[index] = Rgb::new(cube_level(r), cube_level(g), cube_level(b));
                index += 1;
                b += 1;
            }
            g += 1;
        }
        r += 1;
    }

    while index < 256 {
        #[allow(clippy::cast_possible_truncation)]
        let level = (18 + 10 * (index - 232)) as u8;
        palette[index] = Rgb::new(level, level, level);
        index += 1;
    }

    palette
}
