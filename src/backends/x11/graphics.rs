// src/backends/x11/graphics.rs
#![allow(non_snake_case)]

use super::connection::Connection;
use crate::assets::ImageHandle;
use crate::backends::{PixelPoint, PixelRect};
use crate::color::Color;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, trace, warn};
use std::collections::HashMap;
use std::ffi::CString;
use std::mem;
use std::ptr;

use libc::{c_char, c_int, c_uint, c_ulong};
use x11::xrender::{XGlyphInfo, XRenderColor};
use x11::{xft, xlib};

// --- RAII Wrappers for X11 Resources ---

/// Wraps an `XftFont` pointer and closes it on release or drop.
#[derive(Debug)]
struct SafeXftFont {
    ptr: *mut xft::XftFont,
    display: *mut xlib::Display,
}

impl SafeXftFont {
    #[inline]
    fn raw(&self) -> *mut xft::XftFont {
        self.ptr
    }

    fn ascent(&self) -> c_int {
        // SAFETY: `ptr` is non-null for every font kept in the cache.
        unsafe { (*self.ptr).ascent }
    }

    fn descent(&self) -> c_int {
        // SAFETY: as above.
        unsafe { (*self.ptr).descent }
    }
}

impl Drop for SafeXftFont {
    fn drop(&mut self) {
        if !self.ptr.is_null() && !self.display.is_null() {
            trace!("Closing XftFont {:p}", self.ptr);
            unsafe { xft::XftFontClose(self.display, self.ptr) };
            self.ptr = ptr::null_mut();
        }
    }
}

/// Wraps an `XftDraw` pointer and destroys it on drop.
#[derive(Debug)]
struct SafeXftDraw {
    ptr: *mut xft::XftDraw,
}

impl Drop for SafeXftDraw {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            trace!("Destroying XftDraw {:p}", self.ptr);
            unsafe { xft::XftDrawDestroy(self.ptr) };
            self.ptr = ptr::null_mut();
        }
    }
}

/// Wraps an X11 graphics context and frees it on drop.
#[derive(Debug)]
struct SafeGc {
    gc: xlib::GC,
    display: *mut xlib::Display,
}

impl Drop for SafeGc {
    fn drop(&mut self) {
        if !self.gc.is_null() && !self.display.is_null() {
            trace!("Freeing GC {:p}", self.gc);
            unsafe { xlib::XFreeGC(self.display, self.gc) };
            self.gc = ptr::null_mut();
        }
    }
}

/// Wraps a server-side pixmap and frees it on drop.
#[derive(Debug)]
struct SafePixmap {
    id: xlib::Pixmap,
    display: *mut xlib::Display,
}

impl Drop for SafePixmap {
    fn drop(&mut self) {
        if self.id != 0 && !self.display.is_null() {
            trace!("Freeing pixmap {}", self.id);
            unsafe { xlib::XFreePixmap(self.display, self.id) };
            self.id = 0;
        }
    }
}

/// Wraps an allocated `XftColor` and frees it on drop.
#[derive(Debug)]
struct SafeXftColor {
    color: xft::XftColor,
    display: *mut xlib::Display,
    visual: *mut xlib::Visual,
    colormap: xlib::Colormap,
}

impl Drop for SafeXftColor {
    fn drop(&mut self) {
        if !self.display.is_null() {
            trace!("Freeing XftColor pixel {}", self.color.pixel);
            unsafe {
                xft::XftColorFree(self.display, self.visual, self.colormap, &mut self.color)
            };
        }
    }
}

/// Alpha value for fully opaque colors in XRender.
const XRENDER_ALPHA_OPAQUE: u16 = 0xffff;

/// Expands an 8-bit channel to the 16-bit range XRender uses.
fn widen(channel: u8) -> u16 {
    (u16::from(channel) << 8) | u16::from(channel)
}

/// The Xft/fontconfig pattern for `family` at `size_px` pixels.
pub(super) fn font_pattern(family: &str, size_px: u32) -> String {
    format!("{}:pixelsize={}", family, size_px)
}

/// Converts RGBA8 pixels to the 32-bit little-endian BGRX layout of a
/// 24/32-bit TrueColor `ZPixmap`. Alpha is dropped.
pub(super) fn rgba_to_bgrx(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[2], px[1], px[0], 0])
        .collect()
}

/// Composites RGBA8 `src` over the BGRX pixels in `dst`, in place.
pub(super) fn blend_rgba_over_bgrx(src: &[u8], dst: &mut [u8]) {
    for (over, under) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let alpha = u32::from(over[3]);
        for (index, value) in [(0, over[2]), (1, over[1]), (2, over[0])] {
            let below = u32::from(under[index]);
            under[index] = ((u32::from(value) * alpha + below * (255 - alpha) + 127) / 255) as u8;
        }
        under[3] = 0;
    }
}

/// Copies the `width` x `height` block at `(x, y)` out of an RGBA8 image that
/// is `stride` pixels wide.
pub(super) fn crop_rgba(rgba: &[u8], stride: u32, x: u32, y: u32, width: u32, height: u32) -> Vec<u8> {
    let (stride, x, y) = (stride as usize * 4, x as usize * 4, y as usize);
    let row_bytes = width as usize * 4;
    rgba.chunks_exact(stride)
        .skip(y)
        .take(height as usize)
        .flat_map(|row| &row[x..x + row_bytes])
        .copied()
        .collect()
}

fn is_opaque(rgba: &[u8]) -> bool {
    rgba.chunks_exact(4).all(|px| px[3] == u8::MAX)
}

/// Resources for drawing into the off-screen frame buffer.
///
/// Everything is drawn into a pixmap the size of the window; `present` copies
/// it to the window in one request. The resources live until `cleanup`,
/// which must run while the connection is still open.
#[derive(Debug)]
pub struct Graphics {
    // Field order is release order on drop.
    fonts: HashMap<(String, u32), SafeXftFont>,
    colors: HashMap<(u8, u8, u8), SafeXftColor>,
    xft_draw: Option<SafeXftDraw>,
    gc: Option<SafeGc>,
    back_buffer: Option<SafePixmap>,
    width_px: u32,
    height_px: u32,
}

impl Graphics {
    /// Creates the back buffer for `window_id`, cleared to black, plus the
    /// Xft draw and GC that target it.
    pub fn new(
        connection: &Connection,
        window_id: xlib::Window,
        width_px: u32,
        height_px: u32,
    ) -> Result<Self> {
        info!(
            "Graphics: creating {}x{} back buffer for window {}",
            width_px, height_px, window_id
        );
        let display = connection.display();

        // SAFETY: the connection is open and `window_id` is a live window.
        let pixmap_id = unsafe {
            xlib::XCreatePixmap(
                display,
                window_id,
                width_px as c_uint,
                height_px as c_uint,
                connection.depth() as c_uint,
            )
        };
        if pixmap_id == 0 {
            return Err(anyhow!("XCreatePixmap failed for window {}", window_id));
        }
        let back_buffer = SafePixmap {
            id: pixmap_id,
            display,
        };

        // SAFETY: as above; the pixmap was just created on this display.
        let draw_ptr = unsafe {
            xft::XftDrawCreate(
                display,
                pixmap_id,
                connection.visual(),
                connection.colormap(),
            )
        };
        if draw_ptr.is_null() {
            return Err(anyhow!("XftDrawCreate failed for the back buffer"));
        }
        let xft_draw = SafeXftDraw { ptr: draw_ptr };

        // SAFETY: as above.
        let gc_ptr = unsafe { xlib::XCreateGC(display, pixmap_id, 0, ptr::null_mut()) };
        if gc_ptr.is_null() {
            return Err(anyhow!("XCreateGC failed for the back buffer"));
        }
        let gc = SafeGc {
            gc: gc_ptr,
            display,
        };
        debug!(
            "Back buffer {} with XftDraw {:p} and GC {:p}",
            pixmap_id, draw_ptr, gc_ptr
        );

        let mut graphics = Self {
            fonts: HashMap::new(),
            colors: HashMap::new(),
            xft_draw: Some(xft_draw),
            gc: Some(gc),
            back_buffer: Some(back_buffer),
            width_px,
            height_px,
        };
        graphics.fill_rect(
            connection,
            PixelRect::new(0, 0, width_px as i32, height_px as i32),
            Color::BLACK,
        )?;
        Ok(graphics)
    }

    fn draw_ptr(&self) -> Result<*mut xft::XftDraw> {
        self.xft_draw
            .as_ref()
            .map(|draw| draw.ptr)
            .ok_or_else(|| anyhow!("Graphics used after cleanup"))
    }

    fn gc(&self) -> Result<xlib::GC> {
        self.gc
            .as_ref()
            .map(|gc| gc.gc)
            .ok_or_else(|| anyhow!("Graphics used after cleanup"))
    }

    fn pixmap(&self) -> Result<xlib::Pixmap> {
        self.back_buffer
            .as_ref()
            .map(|pixmap| pixmap.id)
            .ok_or_else(|| anyhow!("Graphics used after cleanup"))
    }

    /// Returns the allocated Xft color for `color`, allocating it on first use.
    fn xft_color(&mut self, connection: &Connection, color: Color) -> Result<xft::XftColor> {
        let (r, g, b) = color.to_rgb();
        if let Some(cached) = self.colors.get(&(r, g, b)) {
            return Ok(cached.color);
        }

        let render_color = XRenderColor {
            red: widen(r),
            green: widen(g),
            blue: widen(b),
            alpha: XRENDER_ALPHA_OPAQUE,
        };
        // SAFETY: zeroed is a valid bit pattern for XftColor, and the
        // connection's display, visual and colormap are live.
        let mut allocated: xft::XftColor = unsafe { mem::zeroed() };
        let success = unsafe {
            xft::XftColorAllocValue(
                connection.display(),
                connection.visual(),
                connection.colormap(),
                &render_color,
                &mut allocated,
            ) != 0
        };
        if !success {
            return Err(anyhow!("XftColorAllocValue failed for RGB({},{},{})", r, g, b));
        }
        self.colors.insert(
            (r, g, b),
            SafeXftColor {
                color: allocated,
                display: connection.display(),
                visual: connection.visual(),
                colormap: connection.colormap(),
            },
        );
        Ok(allocated)
    }

    /// Returns the cached font for `(family, size_px)`, opening it on first use.
    fn font(&mut self, connection: &Connection, family: &str, size_px: u32) -> Result<&SafeXftFont> {
        let key = (family.to_string(), size_px);
        if !self.fonts.contains_key(&key) {
            let pattern = font_pattern(family, size_px);
            let pattern_cstr =
                CString::new(pattern.as_str()).context("Font name contains a NUL byte")?;
            // SAFETY: the connection is open and `pattern_cstr` is NUL-terminated.
            let font_ptr = unsafe {
                xft::XftFontOpenName(connection.display(), connection.screen(), pattern_cstr.as_ptr())
            };
            if font_ptr.is_null() {
                return Err(anyhow!("XftFontOpenName failed for font '{}'", pattern));
            }
            debug!("Opened font '{}': {:p}", pattern, font_ptr);
            self.fonts.insert(
                key.clone(),
                SafeXftFont {
                    ptr: font_ptr,
                    display: connection.display(),
                },
            );
        }
        self.fonts
            .get(&key)
            .ok_or_else(|| anyhow!("Font cache lost '{}'", font_pattern(family, size_px)))
    }

    pub fn fill_rect(&mut self, connection: &Connection, rect: PixelRect, color: Color) -> Result<()> {
        if rect.is_empty() {
            return Ok(());
        }
        let draw = self.draw_ptr()?;
        let xft_color = self
            .xft_color(connection, color)
            .context("Failed to resolve color for fill_rect")?;
        // SAFETY: `draw` is live until cleanup.
        unsafe {
            xft::XftDrawRect(
                draw,
                &xft_color,
                rect.x,
                rect.y,
                rect.width as c_uint,
                rect.height as c_uint,
            );
        }
        Ok(())
    }

    /// Draws `text` with its top-left corner at `origin`.
    pub fn draw_text(
        &mut self,
        connection: &Connection,
        text: &str,
        color: Color,
        origin: PixelPoint,
        size_px: u32,
        family: &str,
    ) -> Result<()> {
        if text.is_empty() || size_px == 0 {
            return Ok(());
        }
        let draw = self.draw_ptr()?;
        let xft_color = self
            .xft_color(connection, color)
            .context("Failed to resolve color for draw_text")?;
        let font = self.font(connection, family, size_px)?;
        let c_text = CString::new(text).context("Text contains a NUL byte")?;
        let baseline_y = origin.y + font.ascent();

        // SAFETY: `draw` and the font are live until cleanup; `c_text`
        // outlives the call.
        unsafe {
            xft::XftDrawStringUtf8(
                draw,
                &xft_color,
                font.raw(),
                origin.x,
                baseline_y,
                c_text.as_ptr() as *const u8,
                c_text.as_bytes().len() as c_int,
            );
        }
        Ok(())
    }

    /// Returns the advance width and line height of `text` in pixels.
    pub fn measure_text(
        &mut self,
        connection: &Connection,
        text: &str,
        size_px: u32,
        family: &str,
    ) -> Result<(u32, u32)> {
        if size_px == 0 {
            return Ok((0, 0));
        }
        let font = self.font(connection, family, size_px)?;
        let height = (font.ascent() + font.descent()).max(0) as u32;
        if text.is_empty() {
            return Ok((0, height));
        }
        let c_text = CString::new(text).context("Text contains a NUL byte")?;
        // SAFETY: zeroed is a valid XGlyphInfo; the font is live.
        let mut extents: XGlyphInfo = unsafe { mem::zeroed() };
        unsafe {
            xft::XftTextExtentsUtf8(
                connection.display(),
                font.raw(),
                c_text.as_ptr() as *const u8,
                c_text.as_bytes().len() as c_int,
                &mut extents,
            );
        }
        Ok((extents.xOff.max(0) as u32, height))
    }

    pub fn draw_line(
        &mut self,
        connection: &Connection,
        color: Color,
        from: PixelPoint,
        to: PixelPoint,
        width: u32,
    ) -> Result<()> {
        let gc = self.gc()?;
        let pixmap = self.pixmap()?;
        let pixel = self
            .xft_color(connection, color)
            .context("Failed to resolve color for draw_line")?
            .pixel;
        let display = connection.display();
        // SAFETY: the GC and pixmap are live until cleanup.
        unsafe {
            xlib::XSetForeground(display, gc, pixel);
            xlib::XSetLineAttributes(
                display,
                gc,
                width as c_uint,
                xlib::LineSolid,
                xlib::CapButt,
                xlib::JoinMiter,
            );
            xlib::XDrawLine(display, pixmap, gc, from.x, from.y, to.x, to.y);
        }
        Ok(())
    }

    /// Stretches `image` over `rect`, blending translucent pixels over what
    /// is already in the back buffer. Assumes a 24 or 32-bit TrueColor visual.
    pub fn draw_image(&mut self, connection: &Connection, image: &ImageHandle, rect: PixelRect) -> Result<()> {
        if rect.is_empty() {
            return Ok(());
        }
        if connection.depth() < 24 {
            warn!(
                "draw_image skipped: unsupported visual depth {}",
                connection.depth()
            );
            return Ok(());
        }

        // XGetImage fails outside the pixmap, so only the visible part is drawn.
        let left = rect.x.max(0);
        let top = rect.y.max(0);
        let right = rect.x.saturating_add(rect.width).min(self.width_px as i32);
        let bottom = rect.y.saturating_add(rect.height).min(self.height_px as i32);
        if right <= left || bottom <= top {
            trace!("draw_image: {:?} is off-screen", rect);
            return Ok(());
        }
        let (width, height) = ((right - left) as u32, (bottom - top) as u32);

        let scaled = image.scaled_rgba(rect.width as u32, rect.height as u32)?;
        let visible = crop_rgba(
            &scaled,
            rect.width as u32,
            (left - rect.x) as u32,
            (top - rect.y) as u32,
            width,
            height,
        );
        let mut pixels = if is_opaque(&visible) {
            rgba_to_bgrx(&visible)
        } else {
            match self.read_back_buffer(connection, left, top, width, height)? {
                Some(mut under) => {
                    blend_rgba_over_bgrx(&visible, &mut under);
                    under
                }
                None => {
                    warn!("draw_image: back buffer format not readable; alpha ignored");
                    rgba_to_bgrx(&visible)
                }
            }
        };
        self.put_bgrx(connection, &mut pixels, left, top, width, height)
    }

    /// Reads a block of the back buffer as tightly packed BGRX pixels. Returns
    /// `None` for pixel layouts other than 32-bit little-endian.
    fn read_back_buffer(
        &self,
        connection: &Connection,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<Option<Vec<u8>>> {
        let pixmap = self.pixmap()?;
        // SAFETY: the block lies inside the pixmap. The image and its data
        // come from Xlib and are freed with XFree once copied.
        unsafe {
            let ximage = xlib::XGetImage(
                connection.display(),
                pixmap,
                x,
                y,
                width,
                height,
                c_ulong::MAX,
                xlib::ZPixmap,
            );
            if ximage.is_null() {
                return Err(anyhow!("XGetImage failed for a {}x{} block", width, height));
            }
            let data = (*ximage).data;
            let stride = (*ximage).bytes_per_line.max(0) as usize;
            let row_bytes = width as usize * 4;
            let readable = (*ximage).bits_per_pixel == 32
                && (*ximage).byte_order == xlib::LSBFirst
                && !data.is_null()
                && stride >= row_bytes;
            let pixels = if readable {
                let bytes = std::slice::from_raw_parts(data as *const u8, stride * height as usize);
                let mut packed = Vec::with_capacity(row_bytes * height as usize);
                for row in bytes.chunks_exact(stride) {
                    packed.extend_from_slice(&row[..row_bytes]);
                }
                Some(packed)
            } else {
                None
            };
            if !data.is_null() {
                xlib::XFree(data as *mut libc::c_void);
            }
            xlib::XFree(ximage as *mut libc::c_void);
            Ok(pixels)
        }
    }

    /// Writes `width` x `height` BGRX pixels into the back buffer at `(x, y)`.
    fn put_bgrx(
        &self,
        connection: &Connection,
        pixels: &mut [u8],
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let gc = self.gc()?;
        let pixmap = self.pixmap()?;
        let display = connection.display();

        // SAFETY: `pixels` holds width * height 32-bit pixels and outlives the
        // XImage. The data pointer is detached before XFree so Xlib never
        // frees memory it does not own.
        unsafe {
            let ximage = xlib::XCreateImage(
                display,
                connection.visual(),
                connection.depth() as c_uint,
                xlib::ZPixmap,
                0,
                pixels.as_mut_ptr() as *mut c_char,
                width,
                height,
                32,
                0,
            );
            if ximage.is_null() {
                return Err(anyhow!("XCreateImage failed for a {}x{} image", width, height));
            }
            xlib::XPutImage(display, pixmap, gc, ximage, 0, 0, x, y, width, height);
            (*ximage).data = ptr::null_mut();
            xlib::XFree(ximage as *mut libc::c_void);
        }
        Ok(())
    }

    /// Copies the back buffer to `window_id`.
    pub fn present(&self, connection: &Connection, window_id: xlib::Window) -> Result<()> {
        let gc = self.gc()?;
        let pixmap = self.pixmap()?;
        // SAFETY: the pixmap, GC and window are live.
        unsafe {
            xlib::XCopyArea(
                connection.display(),
                pixmap,
                window_id,
                gc,
                0,
                0,
                self.width_px,
                self.height_px,
                0,
                0,
            );
        }
        connection.flush();
        Ok(())
    }

    /// Releases every server-side resource. Idempotent.
    pub fn cleanup(&mut self) {
        if self.back_buffer.is_none() {
            return;
        }
        info!(
            "Graphics cleanup: {} fonts, {} colors",
            self.fonts.len(),
            self.colors.len()
        );
        self.fonts.clear();
        self.colors.clear();
        self.xft_draw = None;
        self.gc = None;
        self.back_buffer = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_pattern_requests_pixel_size() {
        assert_eq!(font_pattern("monospace", 24), "monospace:pixelsize=24");
    }

    #[test]
    fn rgba_is_reordered_to_bgrx() {
        let rgba = [1, 2, 3, 255, 10, 20, 30, 0];
        assert_eq!(rgba_to_bgrx(&rgba), vec![3, 2, 1, 0, 30, 20, 10, 0]);
    }

    #[test]
    fn translucent_pixels_blend_over_the_buffer() {
        let src = [255, 0, 0, 255, 0, 0, 255, 0, 0, 255, 0, 128];
        let mut dst = vec![10, 20, 30, 0, 10, 20, 30, 0, 0, 0, 0, 0];
        blend_rgba_over_bgrx(&src, &mut dst);
        // Opaque red replaces, transparent blue leaves the buffer, half green mixes.
        assert_eq!(&dst[0..4], &[0, 0, 255, 0]);
        assert_eq!(&dst[4..8], &[10, 20, 30, 0]);
        assert_eq!(&dst[8..12], &[0, 128, 0, 0]);
    }

    #[test]
    fn crop_takes_the_requested_block() {
        // 3x2 image, each pixel tagged with its index in the red channel.
        let rgba: Vec<u8> = (0..6u8).flat_map(|i| [i, 0, 0, 255]).collect();
        let block = crop_rgba(&rgba, 3, 1, 0, 2, 2);
        let reds: Vec<u8> = block.chunks_exact(4).map(|px| px[0]).collect();
        assert_eq!(reds, vec![1, 2, 4, 5]);
        assert!(is_opaque(&block));
        assert!(!is_opaque(&[0, 0, 0, 254]));
    }

    #[test]
    fn channels_widen_to_sixteen_bits() {
        assert_eq!(widen(0), 0);
        assert_eq!(widen(0xff), 0xffff);
        assert_eq!(widen(0x12), 0x1212);
    }
}
