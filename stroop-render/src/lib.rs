pub mod layout;
pub mod render;

pub use layout::{HitTarget, hit_test};
pub use render::{FrameRenderer, load_system_font};
