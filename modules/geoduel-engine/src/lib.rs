//! Country comparison game engine.
//!
//! Provides the session state machine and the controller that paces it:
//! guess → reveal → advance or game over, with every delay routed through a
//! `Scheduler` so tests can run the whole loop without waiting.
//!
//! Collaborators sit behind traits: `CountrySource` (data), `KeyValueStore`
//! (high scores), `EventSink` (presentation), `ScoreReporter` (remote sync).

pub mod error;
pub mod events;
pub mod game;
pub mod provider;
pub mod scheduler;
pub mod session;
pub mod shuffle;
pub mod store;
pub mod sync;

pub use error::{DataError, PersistenceError};
pub use events::{EventSink, GameEvent, RecordingSink};
pub use game::{Game, GameSettings};
pub use provider::{CountrySource, DataProvider, GdpEstimator, PerCapita, StaticSource};
pub use scheduler::{Continuation, ImmediateScheduler, Scheduler, TimerScheduler};
pub use session::{Phase, Roster, ScoreUpdate, Session};
pub use shuffle::Shuffler;
pub use store::{FileStore, KeyValueStore, MemoryStore, ScoreStore};
pub use sync::{report_in_background, ScoreReporter};
