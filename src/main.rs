// src/main.rs

//! Demo: one screen with a button that toggles its color when clicked and a
//! line of text showing the last key pressed.

use shell2d::config::CONFIG_ENV_VAR;
use shell2d::{App, Bounds, Color, Config, Driver, NamedColor, Screen, Widget, XDriver};

use anyhow::{Context, Result};
use log::{info, trace};
use std::path::PathBuf;

struct Button {
    bounds: Bounds,
    label: String,
    lit: bool,
}

impl Button {
    fn new(bounds: Bounds, label: &str) -> Self {
        Self {
            bounds,
            label: label.to_string(),
            lit: false,
        }
    }

    fn toggle(&mut self) {
        self.lit = !self.lit;
        info!("Button '{}' toggled (lit: {})", self.label, self.lit);
    }
}

impl<D: Driver> Widget<D> for Button {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn draw(&mut self, app: &mut App<D>) -> Result<()> {
        let Bounds {
            x,
            y,
            width,
            height,
        } = self.bounds;
        let fill = if self.lit {
            NamedColor::Green
        } else {
            NamedColor::Grey
        };
        app.draw_rect(fill, x, y, width, height)?;
        app.draw_line(Color::WHITE, x, y + height, x + width, y + height, 1.0)?;

        let size = height / 2.0;
        let (text_width, text_height) = app.text_dimensions(&self.label, size, None)?;
        app.draw_text(
            &self.label,
            Color::BLACK,
            x + (width - f64::from(text_width)) / 2.0,
            y + (height - f64::from(text_height)) / 2.0,
            size,
            None,
        )
    }
}

struct DemoScreen {
    button: Button,
    last_key: Option<String>,
}

impl DemoScreen {
    fn new() -> Self {
        Self {
            button: Button::new(Bounds::new(150.0, 120.0, 100.0, 40.0), "press"),
            last_key: None,
        }
    }

    /// Applies this frame's input reports.
    fn update<D: Driver>(&mut self, app: &App<D>) {
        if let Some(key) = app.report_key() {
            self.last_key = Some(key.name());
        }
        if let Some(point) = app.report_click() {
            if Widget::<D>::contains_point(&self.button, f64::from(point.x), f64::from(point.y)) {
                self.button.toggle();
            }
        }
        if let Some(motion) = app.report_motion() {
            trace!("Pointer at ({}, {})", motion.x, motion.y);
        }
    }
}

impl<D: Driver> Screen<D> for DemoScreen {
    fn name(&self) -> &str {
        "demo"
    }

    fn background(&self) -> Color {
        Color::Rgb(20, 24, 32)
    }

    fn draw(&mut self, app: &mut App<D>) -> Result<()> {
        self.clear(app)?;
        Widget::<D>::draw(&mut self.button, app)?;
        let message = match &self.last_key {
            Some(name) => format!("last key: {}", name),
            None => "press any key".to_string(),
        };
        app.draw_text(&message, NamedColor::White, 10.0, 10.0, 16.0, None)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let config_path = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
    let config = Config::load_or_default(config_path.as_deref())?;

    let mut app = App::<XDriver>::from_config(&config).context("Failed to start the shell")?;
    let mut screen = DemoScreen::new();
    info!(
        "Running screen '{}'",
        Screen::<XDriver>::name(&screen)
    );

    while !app.close_requested() {
        app.tick()?;
        screen.update(&app);
        screen.draw(&mut app)?;
    }

    app.close()?;
    info!("Exited cleanly after {} frames.", app.frame_count());
    Ok(())
}
