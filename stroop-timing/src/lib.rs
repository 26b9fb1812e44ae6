pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use scheduler::{Scheduler, TimerHandle};
