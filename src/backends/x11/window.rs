// src/backends/x11/window.rs
#![allow(non_snake_case)]

use super::connection::Connection;
use crate::assets::ImageHandle;
use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, trace, warn};
use std::ffi::CString;
use std::mem;

use libc::{c_char, c_int, c_uint, c_ulong};
use x11::xlib;

/// Events the window listens for.
const EVENT_MASK: libc::c_long = xlib::ExposureMask
    | xlib::KeyPressMask
    | xlib::KeyReleaseMask
    | xlib::ButtonPressMask
    | xlib::PointerMotionMask
    | xlib::StructureNotifyMask
    | xlib::FocusChangeMask;

/// A fixed-size top-level X11 window.
///
/// `cleanup` must be called before the `Connection` is closed; `Drop` only
/// reports a window that was never cleaned up.
#[derive(Debug)]
pub struct Window {
    id: xlib::Window,
    wm_delete_window: xlib::Atom,
    protocols_atom: xlib::Atom,
    width_px: u32,
    height_px: u32,
}

impl Window {
    /// Creates (but does not map) a window of `width_px` x `height_px` with a
    /// black background.
    pub fn new(connection: &Connection, width_px: u32, height_px: u32) -> Result<Self> {
        info!("Creating X11 window: {}x{}px", width_px, height_px);
        let display = connection.display();
        let screen = connection.screen();

        // SAFETY: the connection is open and its screen resources are valid.
        let window_id = unsafe {
            let root = xlib::XRootWindow(display, screen);
            let mut attributes: xlib::XSetWindowAttributes = mem::zeroed();
            attributes.colormap = connection.colormap();
            attributes.background_pixel = xlib::XBlackPixel(display, screen);
            attributes.border_pixel = attributes.background_pixel;
            attributes.event_mask = EVENT_MASK;

            xlib::XCreateWindow(
                display,
                root,
                0,
                0,
                width_px as c_uint,
                height_px as c_uint,
                0,
                connection.depth(),
                xlib::InputOutput as c_uint,
                connection.visual(),
                xlib::CWColormap | xlib::CWBackPixel | xlib::CWBorderPixel | xlib::CWEventMask,
                &mut attributes,
            )
        };
        if window_id == 0 {
            return Err(anyhow!("XCreateWindow failed"));
        }
        debug!("X window created (ID: {})", window_id);

        Ok(Self {
            id: window_id,
            wm_delete_window: 0,
            protocols_atom: 0,
            width_px,
            height_px,
        })
    }

    /// Registers for `WM_DELETE_WINDOW` and pins the window size with
    /// min/max size hints.
    pub fn setup_protocols_and_hints(&mut self, connection: &Connection) {
        let display = connection.display();
        self.wm_delete_window = connection.intern_atom("WM_DELETE_WINDOW");
        self.protocols_atom = connection.intern_atom("WM_PROTOCOLS");

        // SAFETY: the connection is open and `self.id` is a live window.
        unsafe {
            if self.wm_delete_window != 0 && self.protocols_atom != 0 {
                xlib::XSetWMProtocols(display, self.id, [self.wm_delete_window].as_mut_ptr(), 1);
                debug!("WM_PROTOCOLS (WM_DELETE_WINDOW) registered.");
            } else {
                warn!("WM_DELETE_WINDOW unavailable; the close button will not be reported.");
            }

            let mut size_hints: xlib::XSizeHints = mem::zeroed();
            size_hints.flags = xlib::PMinSize | xlib::PMaxSize;
            size_hints.min_width = self.width_px as c_int;
            size_hints.max_width = self.width_px as c_int;
            size_hints.min_height = self.height_px as c_int;
            size_hints.max_height = self.height_px as c_int;
            xlib::XSetWMNormalHints(display, self.id, &mut size_hints);
        }
        debug!(
            "WM size hints pinned to {}x{}",
            self.width_px, self.height_px
        );
    }

    /// Makes the window visible.
    pub fn map(&self, connection: &Connection) {
        info!("Mapping window ID: {}", self.id);
        // SAFETY: the connection is open and `self.id` is a live window.
        unsafe { xlib::XMapWindow(connection.display(), self.id) };
        connection.flush();
    }

    /// Sets both the legacy `WM_NAME` and the UTF-8 `_NET_WM_NAME`.
    pub fn set_title(&self, connection: &Connection, title: &str) -> Result<()> {
        if self.id == 0 {
            warn!("set_title called on a destroyed window.");
            return Ok(());
        }
        let title_cstr = CString::new(title).context("Window title contains a NUL byte")?;
        let net_wm_name = connection.intern_atom("_NET_WM_NAME");
        let utf8_string = connection.intern_atom("UTF8_STRING");
        let display = connection.display();

        // SAFETY: the connection is open, `self.id` is live, and `title_cstr`
        // outlives both calls.
        unsafe {
            xlib::XStoreName(display, self.id, title_cstr.as_ptr() as *mut c_char);
            if net_wm_name != 0 && utf8_string != 0 {
                xlib::XChangeProperty(
                    display,
                    self.id,
                    net_wm_name,
                    utf8_string,
                    8,
                    xlib::PropModeReplace,
                    title_cstr.as_ptr() as *const u8,
                    title_cstr.as_bytes().len() as c_int,
                );
            }
        }
        connection.flush();
        trace!("Window title set to '{}'", title);
        Ok(())
    }

    /// Publishes `icon` as the `_NET_WM_ICON` property.
    pub fn set_icon(&self, connection: &Connection, icon: &ImageHandle) -> Result<()> {
        let net_wm_icon = connection.intern_atom("_NET_WM_ICON");
        let cardinal = connection.intern_atom("CARDINAL");
        if net_wm_icon == 0 || cardinal == 0 {
            warn!("_NET_WM_ICON unsupported by the X server; icon ignored.");
            return Ok(());
        }

        let data = icon_property_data(icon);
        let len = c_int::try_from(data.len()).context("Icon is too large for _NET_WM_ICON")?;
        // SAFETY: the connection is open, `self.id` is live, and format 32
        // properties are passed to Xlib as an array of C longs.
        unsafe {
            xlib::XChangeProperty(
                connection.display(),
                self.id,
                net_wm_icon,
                cardinal,
                32,
                xlib::PropModeReplace,
                data.as_ptr() as *const u8,
                len,
            );
        }
        connection.flush();
        debug!("Window icon set ({}x{})", icon.width(), icon.height());
        Ok(())
    }

    /// Destroys the window. Idempotent.
    pub fn cleanup(&mut self, connection: &Connection) {
        if self.id != 0 && connection.is_open() {
            info!("Destroying X11 window (ID: {}).", self.id);
            // SAFETY: the connection is open and `self.id` is live.
            unsafe { xlib::XDestroyWindow(connection.display(), self.id) };
            connection.flush();
        }
        self.id = 0;
    }

    #[inline]
    pub fn id(&self) -> xlib::Window {
        self.id
    }

    #[inline]
    pub fn wm_delete_window_atom(&self) -> xlib::Atom {
        self.wm_delete_window
    }

    #[inline]
    pub fn protocols_atom(&self) -> xlib::Atom {
        self.protocols_atom
    }

    /// Size the window was created with.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if self.id != 0 {
            error!(
                "Window (ID: {}) dropped without explicit cleanup. Server-side resources may leak.",
                self.id
            );
        }
    }
}

/// Packs an image as `_NET_WM_ICON` data: width, height, then one ARGB
/// pixel per element, row-major.
pub(super) fn icon_property_data(icon: &ImageHandle) -> Vec<c_ulong> {
    let mut data = Vec::with_capacity(2 + icon.width() as usize * icon.height() as usize);
    data.push(icon.width() as c_ulong);
    data.push(icon.height() as c_ulong);
    data.extend(icon.rgba().chunks_exact(4).map(|px| {
        let [r, g, b, a] = [px[0], px[1], px[2], px[3]].map(c_ulong::from);
        (a << 24) | (r << 16) | (g << 8) | b
    }));
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_data_is_sized_and_argb_packed() {
        let icon = ImageHandle::from_rgba(2, 1, vec![0x11, 0x22, 0x33, 0xff, 0, 0, 0, 0]).unwrap();
        let data = icon_property_data(&icon);
        assert_eq!(data, vec![2, 1, 0xff11_2233, 0]);
    }
}
