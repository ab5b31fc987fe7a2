//! Palettes and spectrum-driven hue mapping.

use nannou::color::{hsla, srgba, Hsla, Srgba};
use std::fmt;

/// Hue offset added per displayed frame
pub const HUE_DRIFT_PER_FRAME: f32 = 0.2;

/// A fixed three-color palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub primary: [u8; 3],
    pub secondary: [u8; 3],
    pub tertiary: [u8; 3],
}

impl Palette {
    pub fn primary(&self, alpha: f32) -> Srgba<u8> {
        with_alpha(self.primary, alpha)
    }

    pub fn secondary(&self, alpha: f32) -> Srgba<u8> {
        with_alpha(self.secondary, alpha)
    }
}

fn with_alpha(rgb: [u8; 3], alpha: f32) -> Srgba<u8> {
    srgba(rgb[0], rgb[1], rgb[2], (alpha.clamp(0.0, 1.0) * 255.0) as u8)
}

/// The palette set, cycled in order.
pub const PALETTES: [Palette; 5] = [
    Palette {
        name: "Ocean",
        primary: [0x4a, 0x9e, 0xff],
        secondary: [0x63, 0x66, 0xf1],
        tertiary: [0x8b, 0x5c, 0xf6],
    },
    Palette {
        name: "Cyan",
        primary: [0x22, 0xd3, 0xee],
        secondary: [0x06, 0xb6, 0xd4],
        tertiary: [0x0e, 0xa5, 0xe9],
    },
    Palette {
        name: "Violet",
        primary: [0xa7, 0x8b, 0xfa],
        secondary: [0xc0, 0x84, 0xfc],
        tertiary: [0xe8, 0x79, 0xf9],
    },
    Palette {
        name: "Rose",
        primary: [0xf4, 0x72, 0xb6],
        secondary: [0xec, 0x48, 0x99],
        tertiary: [0xdb, 0x27, 0x77],
    },
    Palette {
        name: "Mono",
        primary: [0xff, 0xff, 0xff],
        secondary: [0xa1, 0xa1, 0xaa],
        tertiary: [0x71, 0x71, 0x7a],
    },
];

/// An HSL color as produced by [`HslColor::from_spectrum`].
///
/// `Display` renders the CSS form `hsl(h, s%, l%)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HslColor {
    /// Degrees in `[0, 360)`
    pub hue: f32,
    /// Percent
    pub saturation: f32,
    /// Percent
    pub lightness: f32,
}

impl HslColor {
    /// Map a spectrum sample (0-255) to a color.
    ///
    /// Hue sweeps the full wheel across the sample range and is shifted by
    /// `offset + color_offset`; louder samples are lighter.
    pub fn from_spectrum(value: f32, color_offset: f32, offset: f32) -> Self {
        let hue = (value / 255.0 * 360.0 + offset + color_offset).rem_euclid(360.0);
        Self {
            hue,
            saturation: 70.0,
            lightness: 45.0 + value / 8.0,
        }
    }

    /// Convert to a nannou color with the given alpha.
    pub fn to_hsla(self, alpha: f32) -> Hsla {
        hsla(
            self.hue / 360.0,
            self.saturation / 100.0,
            (self.lightness / 100.0).clamp(0.0, 1.0),
            alpha,
        )
    }
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Active palette plus the slowly drifting hue offset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColorState {
    palette_index: usize,
    offset: f32,
}

impl ColorState {
    pub fn palette(&self) -> &'static Palette {
        &PALETTES[self.palette_index]
    }

    pub fn palette_index(&self) -> usize {
        self.palette_index
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Switch to the next palette, wrapping after the last one.
    pub fn next_palette(&mut self) -> &'static Palette {
        self.palette_index = (self.palette_index + 1) % PALETTES.len();
        self.palette()
    }

    /// Advance the hue drift by one displayed frame.
    pub fn advance(&mut self) {
        // Only ever used modulo 360, so wrapping keeps f32 precision over long runs
        self.offset = (self.offset + HUE_DRIFT_PER_FRAME).rem_euclid(360.0);
    }
}
