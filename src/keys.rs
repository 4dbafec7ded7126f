// src/keys.rs

//! Backend-neutral key identifiers.
//!
//! `KeySymbol` is the payload of the key input channel. Drivers translate
//! their native key codes into it, and `KeySymbol::name` gives the lowercase
//! symbolic name used when a key needs to be shown or matched as text.

/// Represents a key symbol.
///
/// Covers printable characters, function keys, modifiers, navigation and the
/// numeric keypad. Anything a driver can't classify becomes `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeySymbol {
    // Printable keys
    Char(char),

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Modifier keys
    Shift,
    Control,
    Alt,
    Super,
    CapsLock,
    NumLock,

    // Navigation keys
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Insert,
    Delete,

    // Other common keys
    Enter,
    Backspace,
    Tab,
    Escape,
    PrintScreen,
    ScrollLock,
    Pause,
    Menu,

    // Keypad keys
    Keypad0,
    Keypad1,
    Keypad2,
    Keypad3,
    Keypad4,
    Keypad5,
    Keypad6,
    Keypad7,
    Keypad8,
    Keypad9,
    KeypadEnter,
    KeypadPlus,
    KeypadMinus,
    KeypadMultiply,
    KeypadDivide,
    KeypadDecimal,
    KeypadEquals,

    #[default]
    Unknown,
}

impl KeySymbol {
    /// Lowercase symbolic name of the key, e.g. `"a"`, `"return"`, `"f1"`,
    /// `"page up"` or `"[5]"` for keypad keys.
    pub fn name(&self) -> String {
        let fixed = match self {
            KeySymbol::Char(' ') => "space",
            KeySymbol::Char(c) => return c.to_lowercase().collect(),
            KeySymbol::F1 => "f1",
            KeySymbol::F2 => "f2",
            KeySymbol::F3 => "f3",
            KeySymbol::F4 => "f4",
            KeySymbol::F5 => "f5",
            KeySymbol::F6 => "f6",
            KeySymbol::F7 => "f7",
            KeySymbol::F8 => "f8",
            KeySymbol::F9 => "f9",
            KeySymbol::F10 => "f10",
            KeySymbol::F11 => "f11",
            KeySymbol::F12 => "f12",
            KeySymbol::Shift => "shift",
            KeySymbol::Control => "ctrl",
            KeySymbol::Alt => "alt",
            KeySymbol::Super => "super",
            KeySymbol::CapsLock => "caps lock",
            KeySymbol::NumLock => "numlock",
            KeySymbol::Left => "left",
            KeySymbol::Right => "right",
            KeySymbol::Up => "up",
            KeySymbol::Down => "down",
            KeySymbol::PageUp => "page up",
            KeySymbol::PageDown => "page down",
            KeySymbol::Home => "home",
            KeySymbol::End => "end",
            KeySymbol::Insert => "insert",
            KeySymbol::Delete => "delete",
            KeySymbol::Enter => "return",
            KeySymbol::Backspace => "backspace",
            KeySymbol::Tab => "tab",
            KeySymbol::Escape => "escape",
            KeySymbol::PrintScreen => "print screen",
            KeySymbol::ScrollLock => "scroll lock",
            KeySymbol::Pause => "pause",
            KeySymbol::Menu => "menu",
            KeySymbol::Keypad0 => "[0]",
            KeySymbol::Keypad1 => "[1]",
            KeySymbol::Keypad2 => "[2]",
            KeySymbol::Keypad3 => "[3]",
            KeySymbol::Keypad4 => "[4]",
            KeySymbol::Keypad5 => "[5]",
            KeySymbol::Keypad6 => "[6]",
            KeySymbol::Keypad7 => "[7]",
            KeySymbol::Keypad8 => "[8]",
            KeySymbol::Keypad9 => "[9]",
            KeySymbol::KeypadEnter => "enter",
            KeySymbol::KeypadPlus => "[+]",
            KeySymbol::KeypadMinus => "[-]",
            KeySymbol::KeypadMultiply => "[*]",
            KeySymbol::KeypadDivide => "[/]",
            KeySymbol::KeypadDecimal => "[.]",
            KeySymbol::KeypadEquals => "[=]",
            KeySymbol::Unknown => "unknown key",
        };
        fixed.to_string()
    }
}
