//! Stroke and fill colors.

use core::fmt;
use core::str::FromStr;

/// An sRGB color with alpha.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Default polygon stroke (cyan).
    pub const CYAN: Color = Color::rgb(0x22, 0xd3, 0xee);

    /// Stroke colors handed out to new polygons in order.
    pub const PALETTE: [Color; 8] = [
        Color::rgb(0x22, 0xd3, 0xee),
        Color::rgb(0xf4, 0x72, 0xb6),
        Color::rgb(0xa3, 0xe6, 0x35),
        Color::rgb(0xfb, 0xbf, 0x24),
        Color::rgb(0x81, 0x8c, 0xf8),
        Color::rgb(0xf8, 0x71, 0x71),
        Color::rgb(0x34, 0xd3, 0x99),
        Color::rgb(0xe8, 0x79, 0xf9),
    ];

    /// Opaque color from components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Translucent fill derived from a stroke color (25% alpha).
    pub const fn fill_for(stroke: Color) -> Self {
        stroke.with_alpha(64)
    }

    /// Palette entry for the `n`-th polygon.
    pub const fn palette(n: usize) -> Self {
        Self::PALETTE[n % Self::PALETTE.len()]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::CYAN
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Error returned when a color string is not `#rgb`, `#rrggbb` or `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseColorError;

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("expected #rgb, #rrggbb or #rrggbbaa")
    }
}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').ok_or(ParseColorError)?;
        let digit = |c: u8| -> Result<u8, ParseColorError> {
            (c as char).to_digit(16).map(|d| d as u8).ok_or(ParseColorError)
        };
        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => {
                let r = digit(bytes[0])?;
                let g = digit(bytes[1])?;
                let b = digit(bytes[2])?;
                Ok(Color::rgb(r * 17, g * 17, b * 17))
            }
            6 | 8 => {
                let pair = |i: usize| -> Result<u8, ParseColorError> {
                    Ok(digit(bytes[i])? << 4 | digit(bytes[i + 1])?)
                };
                let a = if bytes.len() == 8 { pair(6)? } else { 255 };
                Ok(Color { r: pair(0)?, g: pair(2)?, b: pair(4)?, a })
            }
            _ => Err(ParseColorError),
        }
    }
}
