// src/backends/x11/mod.rs

//! X11 backend.
//!
//! `XDriver` coordinates the pieces in the submodules:
//! - `connection`: the connection to the X server.
//! - `window`: window creation, WM protocols, title and icon.
//! - `graphics`: the off-screen back buffer and Xft/Xlib drawing into it.
//! - `event`: translation of X events into `BackendEvent`s.

use crate::assets::ImageHandle;
use crate::backends::{BackendEvent, DrawCommand, Driver};
use crate::clock::FrameClock;
use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, trace, warn};

pub mod connection;
pub mod event;
pub mod graphics;
pub mod window;

use connection::Connection;
use event::HeldKeys;
use graphics::Graphics;
use window::Window;

/// Implements the `Driver` trait for the X11 windowing system.
pub struct XDriver {
    connection: Connection,
    window: Window,
    graphics: Graphics,
    held_keys: HeldKeys,
    clock: FrameClock,
}

impl XDriver {
    /// Connects to the X server, creates and maps a fixed-size window, and
    /// prepares its back buffer.
    pub fn new(width_px: u32, height_px: u32, title: &str) -> Result<Self> {
        info!("XDriver::new() - initializing X11 driver components.");
        if width_px == 0 || height_px == 0 {
            return Err(anyhow!(
                "Cannot open a {}x{} window",
                width_px,
                height_px
            ));
        }

        let mut connection = Connection::open().context("Failed to establish X11 connection")?;
        let mut window = match Window::new(&connection, width_px, height_px) {
            Ok(window) => window,
            Err(e) => {
                connection.cleanup();
                return Err(e.context("Failed to create X11 window"));
            }
        };
        let graphics = match Graphics::new(&connection, window.id(), width_px, height_px) {
            Ok(graphics) => graphics,
            Err(e) => {
                window.cleanup(&connection);
                connection.cleanup();
                return Err(e.context("Failed to set up X11 graphics"));
            }
        };

        let mut driver = XDriver {
            connection,
            window,
            graphics,
            held_keys: HeldKeys::default(),
            clock: FrameClock::new(),
        };
        if !driver.connection.enable_detectable_auto_repeat() {
            warn!("Detectable auto-repeat unavailable; pairing repeat releases by timestamp.");
        }
        driver.window.setup_protocols_and_hints(&driver.connection);
        driver
            .window
            .set_title(&driver.connection, title)
            .context("Failed to set initial window title")?;
        driver.window.map(&driver.connection);
        info!("X11 window {} ready ({}x{})", driver.window.id(), width_px, height_px);
        Ok(driver)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.connection.is_open() {
            Ok(())
        } else {
            Err(anyhow!("XDriver used after cleanup"))
        }
    }
}

impl Driver for XDriver {
    fn open(width_px: u32, height_px: u32, title: &str) -> Result<Self> {
        Self::new(width_px, height_px, title)
    }

    fn process_events(&mut self) -> Result<Vec<BackendEvent>> {
        self.ensure_open()?;
        let events = event::process_pending_events(&self.connection, &self.window, &mut self.held_keys);
        if !events.is_empty() {
            debug!("XDriver processed {} backend events.", events.len());
        }
        Ok(events)
    }

    fn draw(&mut self, command: DrawCommand) -> Result<()> {
        self.ensure_open()?;
        trace!("XDriver: {:?}", command);
        match command {
            DrawCommand::FillRect { rect, color } => {
                self.graphics.fill_rect(&self.connection, rect, color)
            }
            DrawCommand::DrawImage { image, rect } => {
                self.graphics.draw_image(&self.connection, &image, rect)
            }
            DrawCommand::DrawText {
                text,
                color,
                origin,
                size_px,
                font,
            } => self
                .graphics
                .draw_text(&self.connection, &text, color, origin, size_px, &font),
            DrawCommand::DrawLine {
                color,
                from,
                to,
                width,
            } => self
                .graphics
                .draw_line(&self.connection, color, from, to, width),
        }
    }

    fn present(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.graphics.present(&self.connection, self.window.id())
    }

    fn tick(&mut self, target_fps: u32) {
        self.clock.tick(target_fps);
    }

    fn measure_text(&mut self, text: &str, size_px: u32, font: &str) -> Result<(u32, u32)> {
        self.ensure_open()?;
        self.graphics
            .measure_text(&self.connection, text, size_px, font)
    }

    fn display_size(&self) -> (u32, u32) {
        self.window.dimensions()
    }

    fn set_title(&mut self, title: &str) {
        if !self.connection.is_open() {
            return;
        }
        if let Err(e) = self.window.set_title(&self.connection, title) {
            error!("Failed to set window title: {:#}", e);
        }
    }

    fn set_icon(&mut self, icon: &ImageHandle) -> Result<()> {
        self.ensure_open()?;
        self.window.set_icon(&self.connection, icon)
    }

    /// Releases graphics, then the window, then the connection.
    fn cleanup(&mut self) -> Result<()> {
        if !self.connection.is_open() {
            return Ok(());
        }
        info!("XDriver cleanup.");
        self.graphics.cleanup();
        self.window.cleanup(&self.connection);
        self.connection.cleanup();
        Ok(())
    }
}

impl Drop for XDriver {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            error!("Error during XDriver cleanup in drop: {:#}", e);
        }
    }
}
