// src/backends/x11/event.rs
#![allow(non_snake_case)]

use super::connection::Connection;
use super::window::Window;
use crate::backends::BackendEvent;
use crate::keys::KeySymbol;

use log::{debug, info, trace, warn};
use std::collections::HashSet;
use std::mem;
use std::ptr;

use libc::{c_char, c_int, c_uint};
use x11::{keysym, xlib};

/// Buffer size for text obtained from `XLookupString`.
const KEY_TEXT_BUFFER_SIZE: usize = 32;

/// `QueuedAfterReading` from Xlib.h; the x11 crate doesn't export it.
const QUEUED_AFTER_READING: c_int = 1;

/// Keycodes that are currently down.
///
/// X keeps sending KeyPress events while a key is held. Only the press that
/// takes a key from up to down becomes a `BackendEvent::Key`.
#[derive(Debug, Default)]
pub struct HeldKeys {
    down: HashSet<c_uint>,
}

impl HeldKeys {
    /// Marks `keycode` as down. Returns false if it already was, i.e. the
    /// press is an auto-repeat.
    pub fn press(&mut self, keycode: c_uint) -> bool {
        self.down.insert(keycode)
    }

    pub fn release(&mut self, keycode: c_uint) {
        self.down.remove(&keycode);
    }

    /// Forgets every held key. Releases that happen while the window is
    /// unfocused never reach it.
    pub fn clear(&mut self) {
        self.down.clear();
    }
}

/// Drains every event queued on the connection and translates the ones the
/// shell cares about into `BackendEvent`s, in arrival order.
pub fn process_pending_events(
    connection: &Connection,
    window: &Window,
    held: &mut HeldKeys,
) -> Vec<BackendEvent> {
    let mut backend_events = Vec::new();
    let display = connection.display();

    // SAFETY: the connection is open; XNextEvent never blocks because
    // XPending reported a queued event.
    while unsafe { xlib::XPending(display) } > 0 {
        let mut xevent: xlib::XEvent = unsafe { mem::zeroed() };
        unsafe { xlib::XNextEvent(display, &mut xevent) };

        // SAFETY: every union field read below matches `event_type`.
        let event_type = unsafe { xevent.type_ };
        match event_type {
            xlib::Expose => {
                // The back buffer is copied to the window on every present.
                trace!("XEvent: Expose");
            }
            xlib::ConfigureNotify => {
                let configure = unsafe { xevent.configure };
                let (width, height) = window.dimensions();
                if configure.width as u32 != width || configure.height as u32 != height {
                    backend_events.push(BackendEvent::Resize {
                        width_px: configure.width.max(0) as u32,
                        height_px: configure.height.max(0) as u32,
                    });
                }
            }
            xlib::KeyPress => {
                let key_event = unsafe { &mut xevent.key };
                if !held.press(key_event.keycode) {
                    trace!("XEvent: KeyPress auto-repeat (keycode {})", key_event.keycode);
                    continue;
                }
                // Index 0 is the keysym without Shift or Lock applied.
                let base_keysym = unsafe { xlib::XLookupKeysym(key_event, 0) };
                let mut text_buffer = [0u8; KEY_TEXT_BUFFER_SIZE];
                // SAFETY: the buffer pointer is valid for the call.
                let count = unsafe {
                    xlib::XLookupString(
                        key_event,
                        text_buffer.as_mut_ptr() as *mut c_char,
                        text_buffer.len() as c_int,
                        ptr::null_mut(),
                        ptr::null_mut(),
                    )
                };
                let text = if count > 0 {
                    String::from_utf8_lossy(&text_buffer[..count as usize]).into_owned()
                } else {
                    String::new()
                };
                let symbol = xkeysym_to_keysymbol(base_keysym, &text);
                debug!(
                    "XEvent: KeyPress (symbol: {:?}, keycode: {}, keysym: {:X}, text: '{}')",
                    symbol, key_event.keycode, base_keysym, text
                );
                backend_events.push(BackendEvent::Key { symbol });
            }
            xlib::KeyRelease => {
                let release = unsafe { xevent.key };
                if next_event_repeats(display, &release) {
                    trace!("XEvent: KeyRelease before auto-repeat (keycode {})", release.keycode);
                } else {
                    trace!("XEvent: KeyRelease (keycode {})", release.keycode);
                    held.release(release.keycode);
                }
            }
            xlib::ClientMessage => {
                let message = unsafe { xevent.client_message };
                if message.message_type == window.protocols_atom()
                    && message.data.get_long(0) as xlib::Atom == window.wm_delete_window_atom()
                {
                    info!("XEvent: WM_DELETE_WINDOW received.");
                    backend_events.push(BackendEvent::CloseRequested);
                } else {
                    trace!("XEvent: ignored ClientMessage (type: {})", message.message_type);
                }
            }
            xlib::FocusOut => {
                debug!("XEvent: FocusOut, forgetting {} held keys", held.down.len());
                held.clear();
            }
            xlib::ButtonPress => {
                let button_event = unsafe { xevent.button };
                debug!(
                    "XEvent: ButtonPress (button: {}, x: {}, y: {})",
                    button_event.button, button_event.x, button_event.y
                );
                backend_events.push(BackendEvent::MouseButtonPress {
                    x: button_event.x,
                    y: button_event.y,
                });
            }
            xlib::MotionNotify => {
                let motion = unsafe { xevent.motion };
                trace!("XEvent: MotionNotify (x: {}, y: {})", motion.x, motion.y);
                backend_events.push(BackendEvent::MouseMove {
                    x: motion.x,
                    y: motion.y,
                });
            }
            _ => trace!("XEvent: ignored (type: {})", event_type),
        }
    }
    backend_events
}

/// True when the event queued right after `release` is a KeyPress for the
/// same key at the same time. Servers without detectable auto-repeat send
/// that pair for every repeat of a held key.
fn next_event_repeats(display: *mut xlib::Display, release: &xlib::XKeyEvent) -> bool {
    // SAFETY: the display is open; XPeekEvent only runs when an event is
    // already queued, so it doesn't block.
    unsafe {
        if xlib::XEventsQueued(display, QUEUED_AFTER_READING) == 0 {
            return false;
        }
        let mut next: xlib::XEvent = mem::zeroed();
        xlib::XPeekEvent(display, &mut next);
        is_repeat_press(release, &next)
    }
}

fn is_repeat_press(release: &xlib::XKeyEvent, next: &xlib::XEvent) -> bool {
    // SAFETY: `key` is only read once the type says it is a key event.
    unsafe {
        next.type_ == xlib::KeyPress
            && next.key.keycode == release.keycode
            && next.key.time == release.time
    }
}

/// Folds a character to lowercase when that gives exactly one character.
fn fold_case(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// The printable character a Latin-1 or Unicode keysym stands for.
fn keysym_char(keysym_u32: u32) -> Option<char> {
    let code = match keysym_u32 {
        0x20..=0x7e | 0xa0..=0xff => keysym_u32,
        0x0100_0100..=0x0110_ffff => keysym_u32 - 0x0100_0000,
        _ => return None,
    };
    char::from_u32(code).filter(|c| !c.is_control())
}

/// Maps an unshifted X keysym to a `KeySymbol`.
///
/// Printable keys become the lowercase `Char` of the key, so `a` and Shift+`a`
/// are the same symbol. `text` from `XLookupString` is only consulted for
/// keysyms outside the Latin-1 and Unicode ranges.
fn xkeysym_to_keysymbol(keysym_val: xlib::KeySym, text: &str) -> KeySymbol {
    let Ok(keysym_u32) = u32::try_from(keysym_val) else {
        warn!("Keysym 0x{:X} out of range, mapping to Unknown", keysym_val);
        return KeySymbol::Unknown;
    };
    if let Some(c) = keysym_char(keysym_u32) {
        return KeySymbol::Char(fold_case(c));
    }

    match keysym_u32 {
        keysym::XK_Shift_L | keysym::XK_Shift_R => KeySymbol::Shift,
        keysym::XK_Control_L | keysym::XK_Control_R => KeySymbol::Control,
        keysym::XK_Alt_L | keysym::XK_Alt_R | keysym::XK_Meta_L | keysym::XK_Meta_R => {
            KeySymbol::Alt
        }
        keysym::XK_Super_L | keysym::XK_Super_R | keysym::XK_Hyper_L | keysym::XK_Hyper_R => {
            KeySymbol::Super
        }
        keysym::XK_Caps_Lock => KeySymbol::CapsLock,
        keysym::XK_Num_Lock => KeySymbol::NumLock,

        keysym::XK_Return => KeySymbol::Enter,
        keysym::XK_KP_Enter => KeySymbol::KeypadEnter,
        keysym::XK_BackSpace => KeySymbol::Backspace,
        keysym::XK_Tab | keysym::XK_KP_Tab | keysym::XK_ISO_Left_Tab => KeySymbol::Tab,
        keysym::XK_Escape => KeySymbol::Escape,
        keysym::XK_KP_Space => KeySymbol::Char(' '),

        keysym::XK_Home | keysym::XK_KP_Home => KeySymbol::Home,
        keysym::XK_Left | keysym::XK_KP_Left => KeySymbol::Left,
        keysym::XK_Up | keysym::XK_KP_Up => KeySymbol::Up,
        keysym::XK_Right | keysym::XK_KP_Right => KeySymbol::Right,
        keysym::XK_Down | keysym::XK_KP_Down => KeySymbol::Down,
        keysym::XK_Page_Up | keysym::XK_KP_Page_Up => KeySymbol::PageUp,
        keysym::XK_Page_Down | keysym::XK_KP_Page_Down => KeySymbol::PageDown,
        keysym::XK_End | keysym::XK_KP_End => KeySymbol::End,
        keysym::XK_Insert | keysym::XK_KP_Insert => KeySymbol::Insert,
        keysym::XK_Delete | keysym::XK_KP_Delete => KeySymbol::Delete,

        keysym::XK_F1 => KeySymbol::F1,
        keysym::XK_F2 => KeySymbol::F2,
        keysym::XK_F3 => KeySymbol::F3,
        keysym::XK_F4 => KeySymbol::F4,
        keysym::XK_F5 => KeySymbol::F5,
        keysym::XK_F6 => KeySymbol::F6,
        keysym::XK_F7 => KeySymbol::F7,
        keysym::XK_F8 => KeySymbol::F8,
        keysym::XK_F9 => KeySymbol::F9,
        keysym::XK_F10 => KeySymbol::F10,
        keysym::XK_F11 => KeySymbol::F11,
        keysym::XK_F12 => KeySymbol::F12,

        keysym::XK_KP_0 => KeySymbol::Keypad0,
        keysym::XK_KP_1 => KeySymbol::Keypad1,
        keysym::XK_KP_2 => KeySymbol::Keypad2,
        keysym::XK_KP_3 => KeySymbol::Keypad3,
        keysym::XK_KP_4 => KeySymbol::Keypad4,
        keysym::XK_KP_5 | keysym::XK_KP_Begin => KeySymbol::Keypad5,
        keysym::XK_KP_6 => KeySymbol::Keypad6,
        keysym::XK_KP_7 => KeySymbol::Keypad7,
        keysym::XK_KP_8 => KeySymbol::Keypad8,
        keysym::XK_KP_9 => KeySymbol::Keypad9,
        keysym::XK_KP_Decimal | keysym::XK_KP_Separator => KeySymbol::KeypadDecimal,
        keysym::XK_KP_Add => KeySymbol::KeypadPlus,
        keysym::XK_KP_Subtract => KeySymbol::KeypadMinus,
        keysym::XK_KP_Multiply => KeySymbol::KeypadMultiply,
        keysym::XK_KP_Divide => KeySymbol::KeypadDivide,
        keysym::XK_KP_Equal => KeySymbol::KeypadEquals,

        keysym::XK_Print | keysym::XK_Sys_Req => KeySymbol::PrintScreen,
        keysym::XK_Scroll_Lock => KeySymbol::ScrollLock,
        keysym::XK_Pause | keysym::XK_Break => KeySymbol::Pause,
        keysym::XK_Menu => KeySymbol::Menu,

        _ => {
            let mut chars = text.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                if c != '\u{FFFD}' && !c.is_control() {
                    return KeySymbol::Char(fold_case(c));
                }
            }
            warn!(
                "Unhandled keysym 0x{:X} (text '{}'), mapping to Unknown",
                keysym_u32, text
            );
            KeySymbol::Unknown
        }
    }
}
