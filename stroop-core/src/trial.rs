use crate::stimulus::Stimulus;

/// Sub-state of a single trial inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    /// Neutral marker shown; input ignored.
    Fixation,
    /// Word visible; latency measured from its onset.
    Word,
    /// Word hidden; responses still scored against the original onset.
    Blank,
    /// Inter-trial interval after a scored response.
    Gap,
}

impl TrialPhase {
    pub fn accepts_response(self) -> bool {
        matches!(self, TrialPhase::Word | TrialPhase::Blank)
    }

    pub fn shows_fixation(self) -> bool {
        matches!(self, TrialPhase::Fixation)
    }
}

/// Recorded outcome of one answered trial.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub stimulus: Stimulus,
    pub response_time_ms: f64,
    pub correct: bool,
    pub key: char,
}
