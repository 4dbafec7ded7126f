// src/lib.rs

//! A minimal 2D application shell.
//!
//! An [`App`] owns one fixed-size window. Callers draw in "standard units",
//! a canvas size of their choosing, and the app scales every coordinate to
//! device pixels through a [`ScaleTransform`]. Input is read once per frame
//! through three monostable channels (key, click, motion) that report a value
//! on the frame it first appears and stay idle while it repeats.
//!
//! Windowing is behind the [`Driver`] trait: [`XDriver`] talks to an X
//! server and [`HeadlessDriver`] records everything in memory.

pub mod app;
pub mod assets;
pub mod backends;
pub mod clock;
pub mod color;
pub mod config;
pub mod error;
pub mod input;
pub mod keys;
pub mod scale;
pub mod screen;

pub use app::{App, AppState};
pub use assets::{load_image, ImageHandle};
pub use backends::{Driver, HeadlessDriver, XDriver};
pub use color::{Color, NamedColor};
pub use config::Config;
pub use error::ConfigurationError;
pub use keys::KeySymbol;
pub use scale::{ScaleTransform, StandardPoint};
pub use screen::{Bounds, Screen, Widget};
