use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeoduelError {
    #[error("Unknown game mode: {0}")]
    UnknownMode(String),

    #[error("Unknown tie policy: {0}")]
    UnknownTiePolicy(String),
}
