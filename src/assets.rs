// src/assets.rs

//! Image loading.
//!
//! Images are decoded into RGBA8 once and shared through `ImageHandle`, so the
//! same image can be queued for drawing many times without copying pixels.
//! Loading does not need a window or an `App`.

use anyhow::{anyhow, Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use log::debug;
use std::path::Path;
use std::sync::Arc;

/// Decoded RGBA8 pixels.
#[derive(Debug, PartialEq, Eq)]
struct ImageData {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// A cheaply cloneable reference to a decoded image.
#[derive(Debug, Clone)]
pub struct ImageHandle {
    data: Arc<ImageData>,
}

impl ImageHandle {
    /// Wraps raw RGBA8 pixels, laid out row-major with 4 bytes per pixel.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(anyhow!(
                "RGBA buffer for a {}x{} image must hold {} bytes, got {}",
                width,
                height,
                expected,
                rgba.len()
            ));
        }
        Ok(Self {
            data: Arc::new(ImageData {
                width,
                height,
                rgba,
            }),
        })
    }

    pub fn width(&self) -> u32 {
        self.data.width
    }

    pub fn height(&self) -> u32 {
        self.data.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.data.rgba
    }

    /// Returns the pixels stretched to `width` x `height`.
    pub fn scaled_rgba(&self, width: u32, height: u32) -> Result<Vec<u8>> {
        if width == self.width() && height == self.height() {
            return Ok(self.data.rgba.clone());
        }
        let source = RgbaImage::from_raw(self.width(), self.height(), self.data.rgba.clone())
            .context("Image buffer does not match its dimensions")?;
        Ok(imageops::resize(&source, width, height, FilterType::Triangle).into_raw())
    }
}

impl PartialEq for ImageHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) || self.data == other.data
    }
}

/// Loads and decodes an image file (PNG, JPEG, BMP or GIF).
pub fn load_image(path: impl AsRef<Path>) -> Result<ImageHandle> {
    let path = path.as_ref();
    let decoded = image::open(path)
        .with_context(|| format!("Failed to load image '{}'", path.display()))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    debug!("Loaded image '{}' ({}x{})", path.display(), width, height);
    ImageHandle::from_rgba(width, height, decoded.into_raw())
}
