/// RGBA display value, 8 bits per channel.
pub type Rgba = [u8; 4];

/// Ink used while the word is blanked.
pub const BLANK_INK: Rgba = [255, 255, 255, 255];

/// The four response colors of the task.
///
/// Each color is bound to one fixed display value and one fixed response
/// key; the table is static and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    /// Cycling order used by the block generator.
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    pub const fn rgba(self) -> Rgba {
        match self {
            Color::Red => [0xef, 0x44, 0x44, 0xff],
            Color::Blue => [0x3b, 0x82, 0xf6, 0xff],
            Color::Green => [0x22, 0xc5, 0x5e, 0xff],
            Color::Yellow => [0xea, 0xb3, 0x08, 0xff],
        }
    }

    pub const fn key(self) -> char {
        match self {
            Color::Red => 'r',
            Color::Blue => 'b',
            Color::Green => 'g',
            Color::Yellow => 'y',
        }
    }

    /// Word text shown to the subject.
    pub const fn label(self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::Blue => "BLUE",
            Color::Green => "GREEN",
            Color::Yellow => "YELLOW",
        }
    }

    /// Case-insensitive reverse lookup of the key binding.
    pub fn from_key(key: char) -> Option<Color> {
        let key = key.to_ascii_lowercase();
        Color::ALL.iter().copied().find(|c| c.key() == key)
    }

    /// Reverse lookup of the display value. `None` for values outside the
    /// table, including the blank white ink.
    pub fn from_rgba(rgba: Rgba) -> Option<Color> {
        Color::ALL.iter().copied().find(|c| c.rgba() == rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_round_trips() {
        for color in Color::ALL {
            assert_eq!(Color::from_key(color.key()), Some(color));
            assert_eq!(Color::from_rgba(color.rgba()), Some(color));
        }
    }

    #[test]
    fn key_lookup_is_case_insensitive() {
        assert_eq!(Color::from_key('R'), Some(Color::Red));
        assert_eq!(Color::from_key('Y'), Some(Color::Yellow));
    }

    #[test]
    fn unbound_inputs_resolve_to_none() {
        assert_eq!(Color::from_key('q'), None);
        assert_eq!(Color::from_key(' '), None);
        assert_eq!(Color::from_rgba(BLANK_INK), None);
    }
}
