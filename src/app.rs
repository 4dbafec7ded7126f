// src/app.rs

//! The application shell: owns a driver, the scale transform and the input
//! normalizer, and runs one frame per `tick`.
//!
//! The frame contract is strict. `tick` drains backend events, turns them into
//! this frame's channel samples, presents everything drawn since the previous
//! tick, and then waits out the frame budget. Input reports read after a
//! `tick` describe the events drained by that `tick`.

use crate::assets::{self, ImageHandle};
use crate::backends::{BackendEvent, DrawCommand, Driver, PixelPoint};
use crate::color::Color;
use crate::config::Config;
use crate::error::ConfigurationError;
use crate::input::{FrameSamples, InputNormalizer};
use crate::keys::KeySymbol;
use crate::scale::{ScaleTransform, StandardPoint};
use anyhow::{anyhow, Context, Result};
use log::{debug, info, trace, warn};

/// Lifecycle of an `App`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Closed,
}

/// A single window with resolution-independent drawing and monostable input.
pub struct App<D: Driver> {
    driver: D,
    scale: ScaleTransform,
    input: InputNormalizer,
    title: String,
    default_font: String,
    target_fps: u32,
    state: AppState,
    /// Set once `close` has released the driver.
    released: bool,
    frames: u64,
}

impl<D: Driver> App<D> {
    /// Wraps an already open driver. The driver's display size must have the
    /// same aspect ratio as the configured canvas.
    pub fn new(mut driver: D, config: &Config) -> Result<Self, ConfigurationError> {
        if config.performance.target_fps == 0 {
            return Err(ConfigurationError::InvalidFrameRate);
        }
        let (device_width, device_height) = driver.display_size();
        let scale = ScaleTransform::new(
            device_width,
            device_height,
            config.canvas.standard_width,
            config.canvas.standard_height,
        )?;

        driver.set_title(&config.window.title);
        info!(
            "App '{}' created: {}x{} px for a {}x{} canvas (ratio {})",
            config.window.title,
            device_width,
            device_height,
            config.canvas.standard_width,
            config.canvas.standard_height,
            scale.ratio()
        );

        Ok(Self {
            driver,
            scale,
            input: InputNormalizer::new(),
            title: config.window.title.clone(),
            default_font: config.text.default_font.clone(),
            target_fps: config.performance.target_fps,
            state: AppState::Running,
            released: false,
            frames: 0,
        })
    }

    /// Opens a window through `D` and builds the app around it. The
    /// configuration is validated before any window is created. The icon, if
    /// configured, is loaded and applied.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.performance.target_fps == 0 {
            return Err(ConfigurationError::InvalidFrameRate.into());
        }
        ScaleTransform::new(
            config.window.width_px,
            config.window.height_px,
            config.canvas.standard_width,
            config.canvas.standard_height,
        )?;

        let driver = D::open(
            config.window.width_px,
            config.window.height_px,
            &config.window.title,
        )
        .context("Failed to open window")?;
        let mut app = Self::new(driver, config)?;

        if let Some(icon_path) = &config.window.icon {
            let icon = assets::load_image(icon_path)?;
            app.set_icon(&icon)?;
        }
        Ok(app)
    }

    /// Runs one frame: drains events, updates the input channels, presents
    /// the frame buffer and waits for the frame budget.
    pub fn tick(&mut self) -> Result<()> {
        self.ensure_not_released()?;
        let events = self
            .driver
            .process_events()
            .context("Failed to process backend events")?;

        let mut samples = FrameSamples::default();
        for event in events {
            self.handle_event(event, &mut samples);
        }
        self.input.begin_frame(samples);

        self.driver.present().context("Failed to present frame")?;
        self.driver.tick(self.target_fps);
        self.frames += 1;
        trace!("App: frame {} done", self.frames);
        Ok(())
    }

    fn handle_event(&mut self, event: BackendEvent, samples: &mut FrameSamples) {
        debug!("App: handling {:?}", event);
        match event {
            BackendEvent::CloseRequested => {
                if self.state == AppState::Running {
                    info!("App: close requested.");
                }
                self.state = AppState::Closed;
            }
            BackendEvent::Key { symbol } => samples.record_key(symbol),
            BackendEvent::MouseButtonPress { x, y } => {
                let point = self.scale.to_standard_point(PixelPoint::new(x, y));
                samples.record_click(point);
            }
            BackendEvent::MouseMove { x, y } => {
                let point = self.scale.to_standard_point(PixelPoint::new(x, y));
                samples.record_motion(point);
            }
            BackendEvent::Resize {
                width_px,
                height_px,
            } => {
                warn!(
                    "App: ignoring resize to {}x{}; the window size is fixed",
                    width_px, height_px
                );
            }
        }
    }

    // --- Input ---

    /// The key pressed this frame, if it differs from the previous frame's key.
    pub fn report_key(&self) -> Option<KeySymbol> {
        self.input.report_key()
    }

    /// The position (standard units) of this frame's last click, if it
    /// differs from the previous frame's.
    pub fn report_click(&self) -> Option<StandardPoint> {
        self.input.report_click()
    }

    /// Where the pointer ended up this frame (standard units), if that
    /// differs from the previous frame's sample.
    pub fn report_motion(&self) -> Option<StandardPoint> {
        self.input.report_motion()
    }

    pub fn last_real_key(&self) -> Option<KeySymbol> {
        self.input.last_real_key()
    }

    pub fn last_real_click(&self) -> Option<StandardPoint> {
        self.input.last_real_click()
    }

    pub fn last_real_motion(&self) -> Option<StandardPoint> {
        self.input.last_real_motion()
    }

    // --- Drawing ---

    /// Fills a rectangle given in standard units.
    pub fn draw_rect(&mut self, color: impl Into<Color>, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        let rect = self.scale.to_device_rect(x, y, width, height);
        self.draw(DrawCommand::FillRect {
            rect,
            color: color.into(),
        })
    }

    /// Stretches `image` over a rectangle given in standard units.
    pub fn draw_image(&mut self, image: &ImageHandle, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        let rect = self.scale.to_device_rect(x, y, width, height);
        self.draw(DrawCommand::DrawImage {
            image: image.clone(),
            rect,
        })
    }

    /// Draws `text` with its top-left corner at `(x, y)`. `size` is in standard
    /// units; `font` of `None` uses the configured default font.
    pub fn draw_text(
        &mut self,
        text: &str,
        color: impl Into<Color>,
        x: f64,
        y: f64,
        size: f64,
        font: Option<&str>,
    ) -> Result<()> {
        let command = DrawCommand::DrawText {
            text: text.to_string(),
            color: color.into(),
            origin: self.scale.to_device_point(x, y),
            size_px: self.scale.to_device_extent(size),
            font: font.unwrap_or(&self.default_font).to_string(),
        };
        self.draw(command)
    }

    pub fn draw_line(
        &mut self,
        color: impl Into<Color>,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
    ) -> Result<()> {
        let command = DrawCommand::DrawLine {
            color: color.into(),
            from: self.scale.to_device_point(x1, y1),
            to: self.scale.to_device_point(x2, y2),
            width: self.scale.to_device_extent(width),
        };
        self.draw(command)
    }

    fn draw(&mut self, command: DrawCommand) -> Result<()> {
        self.ensure_not_released()?;
        trace!("App: {:?}", command);
        self.driver.draw(command).context("Backend draw failed")
    }

    /// Rendered `(width, height)` of `text` in standard units.
    pub fn text_dimensions(&mut self, text: &str, size: f64, font: Option<&str>) -> Result<(i32, i32)> {
        self.ensure_not_released()?;
        let font = font.unwrap_or(&self.default_font).to_string();
        let (width_px, height_px) = self
            .driver
            .measure_text(text, self.scale.to_device_extent(size), &font)
            .with_context(|| format!("Failed to measure text in font '{}'", font))?;
        Ok((
            self.scale.to_standard(i32::try_from(width_px).unwrap_or(i32::MAX)),
            self.scale.to_standard(i32::try_from(height_px).unwrap_or(i32::MAX)),
        ))
    }

    /// Sets the window icon.
    pub fn set_icon(&mut self, icon: &ImageHandle) -> Result<()> {
        self.ensure_not_released()?;
        self.driver.set_icon(icon).context("Failed to set window icon")
    }

    // --- Lifecycle ---

    /// True once a close request has been seen. Never goes back to false.
    pub fn close_requested(&self) -> bool {
        self.state == AppState::Closed
    }

    /// Releases the backend. Further calls only log a warning.
    pub fn close(&mut self) -> Result<()> {
        if self.released {
            warn!("App::close called more than once; ignoring.");
            return Ok(());
        }
        info!("App '{}' closing after {} frames.", self.title, self.frames);
        self.released = true;
        self.state = AppState::Closed;
        self.driver.cleanup().context("Failed to release backend")
    }

    fn ensure_not_released(&self) -> Result<()> {
        if self.released {
            Err(anyhow!("App '{}' used after close", self.title))
        } else {
            Ok(())
        }
    }

    // --- Accessors ---

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn standard_width(&self) -> u32 {
        self.scale.standard_size().0
    }

    pub fn standard_height(&self) -> u32 {
        self.scale.standard_size().1
    }

    pub fn scale(&self) -> &ScaleTransform {
        &self.scale
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    /// Number of completed ticks.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
