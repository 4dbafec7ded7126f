// src/backends/x11/connection.rs
#![allow(non_snake_case)]

use anyhow::{anyhow, Result};
use log::{debug, info, warn};
use std::ptr;

use libc::c_int;
use x11::xlib;

/// Owns an Xlib `Display` pointer and closes it on drop.
#[derive(Debug)]
struct ManagedDisplay {
    ptr: *mut xlib::Display,
}

impl ManagedDisplay {
    /// Opens the display named by the `DISPLAY` environment variable.
    fn open() -> Result<Self> {
        let display_ptr = unsafe { xlib::XOpenDisplay(ptr::null()) };
        if display_ptr.is_null() {
            Err(anyhow!(
                "Failed to open X display. Check the DISPLAY environment variable."
            ))
        } else {
            debug!("X display opened: {:p}", display_ptr);
            Ok(Self { ptr: display_ptr })
        }
    }

    /// Closes the display now. Later calls, and the eventual drop, do nothing.
    fn close(&mut self) {
        if self.ptr.is_null() {
            return;
        }
        info!("Closing X display connection: {:p}", self.ptr);
        // SAFETY: `ptr` came from XOpenDisplay and has not been closed yet.
        let status = unsafe { xlib::XCloseDisplay(self.ptr) };
        if status != 0 {
            warn!("XCloseDisplay returned non-zero status: {}", status);
        }
        self.ptr = ptr::null_mut();
    }
}

impl Drop for ManagedDisplay {
    fn drop(&mut self) {
        self.close();
    }
}

/// The connection to the X server, plus the default screen resources every
/// other part of the backend needs.
#[derive(Debug)]
pub struct Connection {
    display: ManagedDisplay,
    screen: c_int,
    colormap: xlib::Colormap,
    visual: *mut xlib::Visual,
    depth: c_int,
}

impl Connection {
    /// Connects to the X server and looks up the default screen, colormap,
    /// visual and depth.
    pub fn open() -> Result<Self> {
        info!("Connecting to the X server.");
        let display = ManagedDisplay::open()?;

        // SAFETY: the display pointer is valid for the lifetime of `display`.
        let (screen, colormap, visual, depth) = unsafe {
            let screen = xlib::XDefaultScreen(display.ptr);
            (
                screen,
                xlib::XDefaultColormap(display.ptr, screen),
                xlib::XDefaultVisual(display.ptr, screen),
                xlib::XDefaultDepth(display.ptr, screen),
            )
        };
        if visual.is_null() {
            return Err(anyhow!("No default visual for screen {}", screen));
        }
        debug!(
            "Screen {}: colormap {}, visual {:p}, depth {}",
            screen, colormap, visual, depth
        );

        Ok(Connection {
            display,
            screen,
            colormap,
            visual,
            depth,
        })
    }

    /// Asks the server to stop sending a KeyRelease before every auto-repeated
    /// KeyPress, so a held key shows up as presses with no releases between
    /// them. Returns false when the server's XKB doesn't support it.
    pub fn enable_detectable_auto_repeat(&self) -> bool {
        if !self.is_open() {
            return false;
        }
        let mut supported: c_int = 0;
        // SAFETY: the display is open and `supported` is valid for the call.
        let enabled = unsafe {
            xlib::XkbSetDetectableAutoRepeat(self.display.ptr, xlib::True, &mut supported)
        };
        debug!(
            "XkbSetDetectableAutoRepeat: enabled {}, supported {}",
            enabled, supported
        );
        enabled != 0 && supported != 0
    }

    /// Closes the connection. Idempotent.
    pub fn cleanup(&mut self) {
        self.display.close();
    }

    pub fn is_open(&self) -> bool {
        !self.display.ptr.is_null()
    }

    /// The raw display pointer. Null once `cleanup` has run.
    #[inline]
    pub fn display(&self) -> *mut xlib::Display {
        self.display.ptr
    }

    #[inline]
    pub fn screen(&self) -> c_int {
        self.screen
    }

    #[inline]
    pub fn colormap(&self) -> xlib::Colormap {
        self.colormap
    }

    #[inline]
    pub fn visual(&self) -> *mut xlib::Visual {
        self.visual
    }

    #[inline]
    pub fn depth(&self) -> c_int {
        self.depth
    }

    /// Sends all buffered requests to the server.
    pub fn flush(&self) {
        if self.is_open() {
            // SAFETY: the display is open.
            unsafe { xlib::XFlush(self.display.ptr) };
        }
    }

    /// Interns an atom by name. Returns 0 if the name can't be interned.
    pub fn intern_atom(&self, name: &str) -> xlib::Atom {
        if !self.is_open() {
            return 0;
        }
        let Ok(name) = std::ffi::CString::new(name) else {
            return 0;
        };
        // SAFETY: the display is open and `name` is NUL-terminated.
        unsafe { xlib::XInternAtom(self.display.ptr, name.as_ptr(), xlib::False) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_connection() -> Connection {
        Connection {
            display: ManagedDisplay {
                ptr: ptr::null_mut(),
            },
            screen: 0,
            colormap: 0,
            visual: ptr::null_mut(),
            depth: 24,
        }
    }

    #[test]
    fn cleanup_on_closed_connection_is_a_no_op() {
        let mut conn = closed_connection();
        assert!(!conn.is_open());
        conn.cleanup();
        conn.cleanup();
        assert!(conn.display().is_null());
    }

    #[test]
    fn flush_on_closed_connection_does_not_touch_xlib() {
        let conn = closed_connection();
        conn.flush();
        assert_eq!(conn.depth(), 24);
    }
}
