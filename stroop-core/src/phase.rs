/// Top-level session states.
///
/// `Instructions → Block1 → Pause → Block2 → Results`, with
/// `Results → Instructions` the only cycle-back transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Instructions,
    Block1,
    Pause,
    Block2,
    Results,
}

impl SessionPhase {
    pub fn is_block(self) -> bool {
        matches!(self, SessionPhase::Block1 | SessionPhase::Block2)
    }

    pub fn block_number(self) -> Option<u8> {
        match self {
            SessionPhase::Block1 => Some(1),
            SessionPhase::Block2 => Some(2),
            _ => None,
        }
    }
}
