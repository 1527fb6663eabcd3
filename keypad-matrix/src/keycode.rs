//! Logical key codes reported by the scanner.

/// Logical key codes.
///
/// The numeric values are the codes the key-event layer above the scanner
/// stores and compares, so they are fixed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyCode {
    // Digits
    Key0 = 0,
    Key1 = 1,
    Key2 = 2,
    Key3 = 3,
    Key4 = 4,
    Key5 = 5,
    Key6 = 6,
    Key7 = 7,
    Key8 = 8,
    Key9 = 9,

    // Navigation
    Menu = 10,
    Up = 11,
    Down = 12,
    Exit = 13,

    Star = 14,
    /// Function key
    F = 15,

    // Side keys, detected with no column driven low
    Side2 = 22,
    Side1 = 23,

    /// No key / unused matrix position
    #[default]
    Invalid = 0xFF,
}

impl KeyCode {
    /// All valid key codes, in code order.
    pub const ALL: [KeyCode; 18] = [
        KeyCode::Key0,
        KeyCode::Key1,
        KeyCode::Key2,
        KeyCode::Key3,
        KeyCode::Key4,
        KeyCode::Key5,
        KeyCode::Key6,
        KeyCode::Key7,
        KeyCode::Key8,
        KeyCode::Key9,
        KeyCode::Menu,
        KeyCode::Up,
        KeyCode::Down,
        KeyCode::Exit,
        KeyCode::Star,
        KeyCode::F,
        KeyCode::Side2,
        KeyCode::Side1,
    ];

    /// Raw numeric code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Convert a raw code back into a key. Unknown codes map to `Invalid`.
    pub fn from_code(code: u8) -> KeyCode {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.code() == code)
            .unwrap_or(KeyCode::Invalid)
    }

    /// Check if this is the invalid sentinel.
    pub fn is_invalid(self) -> bool {
        self == KeyCode::Invalid
    }

    /// Short label for table printouts.
    pub fn display_name(self) -> &'static str {
        match self {
            KeyCode::Key0 => "0",
            KeyCode::Key1 => "1",
            KeyCode::Key2 => "2",
            KeyCode::Key3 => "3",
            KeyCode::Key4 => "4",
            KeyCode::Key5 => "5",
            KeyCode::Key6 => "6",
            KeyCode::Key7 => "7",
            KeyCode::Key8 => "8",
            KeyCode::Key9 => "9",
            KeyCode::Menu => "Menu",
            KeyCode::Up => "Up",
            KeyCode::Down => "Down",
            KeyCode::Exit => "Exit",
            KeyCode::Star => "*",
            KeyCode::F => "F",
            KeyCode::Side2 => "Side2",
            KeyCode::Side1 => "Side1",
            KeyCode::Invalid => "--",
        }
    }
}
