/// Protocol durations and per-block composition.
///
/// The timing protocol is identical for both blocks.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub congruent_trials: usize,
    pub incongruent_trials: usize,
    /// Fixation marker duration before each word.
    pub fixation_ms: u64,
    /// Word visibility window, measured from word onset.
    pub word_ms: u64,
    /// Gap between a scored response and the next fixation.
    pub inter_trial_ms: u64,
    /// Inter-block pause countdown.
    pub pause_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            congruent_trials: 30,
            incongruent_trials: 30,
            fixation_ms: 1000,
            word_ms: 750,
            inter_trial_ms: 500,
            pause_secs: 10,
        }
    }
}

impl SessionConfig {
    pub fn block_len(&self) -> usize {
        self.congruent_trials + self.incongruent_trials
    }
}
