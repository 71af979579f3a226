/// Colours shared by the chart renderers.
use std::fmt;

/// An opaque sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Self = Self(0xff, 0xff, 0xff);
    pub const TEXT: Self = Self(0x1e, 0x1e, 0x2e);
    pub const MUTED: Self = Self(0x6c, 0x70, 0x86);
    pub const GRID: Self = Self(0xcc, 0xcc, 0xd4);

    /// Darken by scaling towards black.
    pub fn darken(self, amount: f32) -> Self {
        let f = 1.0 - amount.clamp(0.0, 1.0);
        Self(
            (self.0 as f32 * f) as u8,
            (self.1 as f32 * f) as u8,
            (self.2 as f32 * f) as u8,
        )
    }
}

impl fmt::Display for Rgb {
    /// `#rrggbb`, as used in SVG attributes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Palette cycled through for treemap branches and bar series.
pub const PALETTE: &[Rgb] = &[
    Rgb(0x89, 0xb4, 0xfa), // blue
    Rgb(0xa6, 0xe3, 0xa1), // green
    Rgb(0xf9, 0xe2, 0xaf), // yellow
    Rgb(0xf3, 0x8b, 0xa8), // pink
    Rgb(0xfa, 0xb3, 0x87), // peach
    Rgb(0xcb, 0xa6, 0xf7), // mauve
    Rgb(0x94, 0xe2, 0xd5), // teal
    Rgb(0xf5, 0xc2, 0xe7), // flamingo
    Rgb(0x74, 0xc7, 0xec), // sapphire
    Rgb(0xb4, 0xbe, 0xfe), // lavender
];

/// Colour for the "other" bucket.
pub const OTHER_COLOR: Rgb = Rgb(0x9c, 0xa0, 0xb0);

/// Palette entry `i`, wrapping around.
#[inline]
pub fn palette(i: usize) -> Rgb {
    PALETTE[i % PALETTE.len()]
}
