// src/color.rs

//! Defines the color types used by drawing calls (`NamedColor`, `Color`) and
//! their conversion to concrete RGB components.

use serde::{Deserialize, Serialize};

/// A small fixed palette of common colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    White,
    Grey,
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
}

impl NamedColor {
    /// Returns the sRGB components of this named color.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            NamedColor::Black => (0, 0, 0),
            NamedColor::White => (255, 255, 255),
            NamedColor::Grey => (127, 127, 127),
            NamedColor::Red => (205, 0, 0),
            NamedColor::Green => (0, 205, 0),
            NamedColor::Blue => (0, 0, 238),
            NamedColor::Yellow => (205, 205, 0),
            NamedColor::Magenta => (205, 0, 205),
            NamedColor::Cyan => (0, 205, 205),
        }
    }
}

/// A color passed to drawing calls: either a palette entry or an RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Named(NamedColor),
    /// An RGB true color, with each component from 0 to 255.
    Rgb(u8, u8, u8),
}

impl Color {
    pub const BLACK: Color = Color::Rgb(0, 0, 0);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);

    /// Resolves the color to concrete `(r, g, b)` components.
    pub fn to_rgb(self) -> (u8, u8, u8) {
        match self {
            Color::Named(named) => named.to_rgb(),
            Color::Rgb(r, g, b) => (r, g, b),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::Rgb(r, g, b)
    }
}

impl From<NamedColor> for Color {
    fn from(named: NamedColor) -> Self {
        Color::Named(named)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_colors_resolve_to_rgb() {
        assert_eq!(Color::Named(NamedColor::Black).to_rgb(), (0, 0, 0));
        assert_eq!(Color::from(NamedColor::Blue).to_rgb(), (0, 0, 238));
    }

    #[test]
    fn tuples_convert_to_rgb_colors() {
        let color: Color = (12, 34, 56).into();
        assert_eq!(color, Color::Rgb(12, 34, 56));
        assert_eq!(color.to_rgb(), (12, 34, 56));
        assert_eq!(Color::default(), Color::BLACK);
    }
}
