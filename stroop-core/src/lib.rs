pub mod color;
pub mod phase;
pub mod stats;
pub mod stimulus;
pub mod trial;
pub mod view;

pub use color::{BLANK_INK, Color, Rgba};
pub use phase::SessionPhase;
pub use stats::BlockStats;
pub use stimulus::Stimulus;
pub use trial::{Response, TrialPhase};
pub use view::{ResultsView, SessionView, TrialView};
