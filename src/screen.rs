// src/screen.rs

//! Contracts for the things an application draws: whole `Screen`s and the
//! `Widget`s placed on them.
//!
//! Both only see the `App` they are handed. Everything they do goes through
//! its standard-unit drawing calls and its input reports.

use crate::app::App;
use crate::backends::Driver;
use crate::color::Color;
use anyhow::Result;

/// A full-canvas view.
pub trait Screen<D: Driver> {
    /// A short identifier, used in logs and for switching between screens.
    fn name(&self) -> &str;

    /// Draws the screen's content for the current frame.
    fn draw(&mut self, app: &mut App<D>) -> Result<()>;

    /// Color `clear` fills the canvas with.
    fn background(&self) -> Color {
        Color::BLACK
    }

    /// Fills the whole standard-unit canvas with `background()`.
    fn clear(&self, app: &mut App<D>) -> Result<()> {
        let (width, height) = (app.standard_width(), app.standard_height());
        app.draw_rect(
            self.background(),
            0.0,
            0.0,
            f64::from(width),
            f64::from(height),
        )
    }
}

/// An axis-aligned rectangle in standard units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True for points strictly inside the rectangle. Points on an edge are
    /// outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x < x && x < self.x + self.width && self.y < y && y < self.y + self.height
    }
}

/// A rectangular element drawn on a screen.
pub trait Widget<D: Driver> {
    fn bounds(&self) -> Bounds;

    fn draw(&mut self, app: &mut App<D>) -> Result<()>;

    /// Hit test in standard units. Edges are excluded.
    fn contains_point(&self, x: f64, y: f64) -> bool {
        self.bounds().contains(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn edges_are_excluded() {
        let bounds = Bounds::new(10.0, 20.0, 30.0, 40.0);
        assert!(bounds.contains(11.0, 21.0));
        assert!(bounds.contains(39.9, 59.9));
        assert!(!bounds.contains(10.0, 30.0));
        assert!(!bounds.contains(40.0, 30.0));
        assert!(!bounds.contains(20.0, 20.0));
        assert!(!bounds.contains(20.0, 60.0));
    }

    #[test]
    fn empty_bounds_contain_nothing() {
        let bounds = Bounds::new(5.0, 5.0, 0.0, 0.0);
        assert!(!bounds.contains(5.0, 5.0));
        assert!(!Bounds::default().contains(0.0, 0.0));
    }
}
