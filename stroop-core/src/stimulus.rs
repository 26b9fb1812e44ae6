use crate::color::{BLANK_INK, Color, Rgba};

/// One presented color word. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Stimulus {
    /// Word meaning shown to the subject; `None` while blanked.
    pub word: Option<Color>,
    /// Display value the word is drawn in.
    pub ink: Rgba,
    pub congruent: bool,
}

impl Stimulus {
    pub fn congruent(color: Color) -> Stimulus {
        Stimulus {
            word: Some(color),
            ink: color.rgba(),
            congruent: true,
        }
    }

    pub fn incongruent(word: Color, ink: Color) -> Stimulus {
        debug_assert!(word != ink, "incongruent stimulus with matching word and ink");
        Stimulus {
            word: Some(word),
            ink: ink.rgba(),
            congruent: false,
        }
    }

    /// The blanked variant shown after the word interval elapses; never
    /// congruent and never scored on its own.
    pub fn blank() -> Stimulus {
        Stimulus {
            word: None,
            ink: BLANK_INK,
            congruent: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.word.is_none()
    }

    /// Resolves the ink back to its table color.
    pub fn ink_color(&self) -> Option<Color> {
        Color::from_rgba(self.ink)
    }
}
