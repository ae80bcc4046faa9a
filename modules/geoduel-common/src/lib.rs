pub mod config;
pub mod error;
pub mod format;
pub mod types;

pub use config::{GameConfig, TiePolicy};
pub use error::GeoduelError;
pub use types::*;
