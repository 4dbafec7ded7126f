// src/backends/mod.rs

//! Defines the `Driver` trait for window/render backends (X11, headless) and the
//! device-space types that cross the backend boundary: `BackendEvent`,
//! `DrawCommand`, `PixelRect` and `PixelPoint`.
//!
//! Everything on this side of the boundary is in device pixels. Conversion from
//! standard units happens in the `App` before a command reaches a driver.

use crate::assets::ImageHandle;
use crate::color::Color;
pub use crate::keys::KeySymbol;
use anyhow::Result;

pub mod headless;
pub mod x11;

pub use headless::HeadlessDriver;
pub use x11::XDriver;

/// Events originating from the backend (platform-specific window input).
/// These are drained once per frame by the `App`, which turns them into raw
/// channel samples.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// The user asked to close the window (e.g. the window manager's close button).
    CloseRequested,
    /// A keyboard key went down. Drivers report each physical press once;
    /// auto-repeat while the key is held is not a new press.
    Key { symbol: KeySymbol },
    /// A mouse button went down at a device-pixel position.
    MouseButtonPress { x: i32, y: i32 },
    /// The pointer moved to a device-pixel position.
    MouseMove { x: i32, y: i32 },
    /// The platform changed the window size. The shell's scale is fixed, so
    /// this is reported but never acted on.
    Resize { width_px: u32, height_px: u32 },
}

/// A point in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in device pixels, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

/// Device-space drawing commands.
///
/// A command changes the driver's off-screen frame buffer only; nothing is
/// visible until the next `Driver::present`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fills a rectangle with a solid color.
    FillRect { rect: PixelRect, color: Color },
    /// Stretches an image to fill a rectangle.
    DrawImage { image: ImageHandle, rect: PixelRect },
    /// Draws a run of text with its top-left corner at `origin`.
    DrawText {
        text: String,
        color: Color,
        origin: PixelPoint,
        size_px: u32,
        font: String,
    },
    /// Draws a straight line `width` pixels thick.
    DrawLine {
        color: Color,
        from: PixelPoint,
        to: PixelPoint,
        width: u32,
    },
}

/// Defines the interface for a window/render backend.
///
/// A `Driver` is responsible for:
/// 1.  Creating a window of a fixed pixel size and tearing it down again.
/// 2.  Translating native events into generic `BackendEvent`s.
/// 3.  Executing device-space `DrawCommand`s against an off-screen buffer and
///     presenting that buffer.
/// 4.  Pacing frames (`tick`) and measuring text.
///
/// Every method is synchronous. `tick` is the only one that may block.
pub trait Driver {
    /// Opens a window of `width_px` x `height_px` pixels titled `title`.
    fn open(width_px: u32, height_px: u32, title: &str) -> Result<Self>
    where
        Self: Sized;

    /// Drains every native event that arrived since the previous call.
    fn process_events(&mut self) -> Result<Vec<BackendEvent>>;

    /// Executes one drawing command against the off-screen frame buffer.
    fn draw(&mut self, command: DrawCommand) -> Result<()>;

    /// Makes everything drawn since the previous present visible.
    fn present(&mut self) -> Result<()>;

    /// Blocks until the frame budget for `target_fps` has elapsed since the
    /// previous tick.
    fn tick(&mut self, target_fps: u32);

    /// Returns the rendered `(width, height)` of `text` in pixels.
    fn measure_text(&mut self, text: &str, size_px: u32, font: &str) -> Result<(u32, u32)>;

    /// Returns the window size in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Sets the window title.
    fn set_title(&mut self, title: &str);

    /// Sets the window icon. Backends without icon support ignore it.
    #[allow(unused_variables)]
    fn set_icon(&mut self, icon: &ImageHandle) -> Result<()> {
        log::trace!("Driver::set_icon called but not implemented for this backend.");
        Ok(())
    }

    /// Releases platform resources. Must be idempotent.
    fn cleanup(&mut self) -> Result<()>;
}
