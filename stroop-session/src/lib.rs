pub mod config;
pub mod generator;
pub mod session;

pub use config::SessionConfig;
pub use generator::generate_block;
pub use session::{Session, SessionInput};
