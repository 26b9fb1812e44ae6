use crate::phase::SessionPhase;
use crate::stats::BlockStats;
use crate::stimulus::Stimulus;

/// Everything the display surface needs to draw one frame.
///
/// This is the render-state-out half of the session's external contract;
/// the display surface reads it and forwards raw key/pointer events back.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub phase: SessionPhase,
    /// Present during `Block1`/`Block2` only.
    pub trial: Option<TrialView>,
    /// Seconds left on the inter-block pause.
    pub pause_remaining_s: u32,
    /// Present during `Results` only.
    pub results: Option<ResultsView>,
}

/// Active-trial portion of the view.
#[derive(Debug, Clone)]
pub struct TrialView {
    pub block: u8,
    pub fixation: bool,
    /// Visible word (or blank placeholder); `None` during fixation and
    /// the inter-trial gap.
    pub stimulus: Option<Stimulus>,
    pub index: usize,
    pub total: usize,
}

impl TrialView {
    /// Completed fraction of the block.
    pub fn progress(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.index as f32 / self.total as f32
        }
    }
}

/// Results-phase summaries, recomputed at display time and never stored.
#[derive(Debug, Clone, Copy)]
pub struct ResultsView {
    pub block1: BlockStats,
    pub block2: BlockStats,
    pub overall: BlockStats,
    pub stroop_effect_ms: f64,
}
