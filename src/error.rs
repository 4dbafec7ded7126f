// src/error.rs

//! Error types raised while building the shell.
//!
//! Everything here is a configuration problem: it is detected once, before the
//! first frame, and is never retried. Backend failures are not represented here;
//! they travel up unchanged as `anyhow::Error`.

use thiserror::Error;

/// A fatal problem with the window or canvas configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The window's width-height ratio differs from the standard canvas ratio.
    #[error(
        "the window width-height ratio ({device_width}x{device_height}) doesn't equal \
         the standard width-height ratio ({standard_width}x{standard_height})"
    )]
    AspectRatioMismatch {
        device_width: u32,
        device_height: u32,
        standard_width: u32,
        standard_height: u32,
    },
    /// One of the window or canvas dimensions was zero.
    #[error("{what} must be greater than zero")]
    ZeroDimension { what: &'static str },
    /// The frame clock can't run at zero frames per second.
    #[error("target frame rate must be greater than zero")]
    InvalidFrameRate,
}
