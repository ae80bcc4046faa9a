//! What the game tells the presentation layer.

use std::sync::{Arc, Mutex, PoisonError};

use geoduel_common::{Country, GameMode};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A new pair is on screen. `right`'s value stays hidden until guessed.
    Round {
        left: Country,
        right: Country,
        mode: GameMode,
    },
    /// A guess was accepted; the right-hand value starts revealing.
    ValueRevealed {
        name: String,
        value: f64,
        display: String,
    },
    GuessResult { correct: bool },
    ScoreChanged {
        score: u32,
        high_score: u32,
        is_new_high: bool,
    },
    GameOver {
        score: u32,
        high_score: u32,
        mode: GameMode,
        /// This session beat the previous high score.
        new_high: bool,
    },
}

impl GameEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::Round { .. } => "round",
            GameEvent::ValueRevealed { .. } => "value_revealed",
            GameEvent::GuessResult { .. } => "guess_result",
            GameEvent::ScoreChanged { .. } => "score_changed",
            GameEvent::GameOver { .. } => "game_over",
        }
    }
}

/// Receives game events. Implemented by presentation adapters and by
/// `RecordingSink` for tests.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: GameEvent);
}

// ---------------------------------------------------------------------------
// RecordingSink (tests)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn types(&self) -> Vec<&'static str> {
        self.events().iter().map(GameEvent::event_type).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: GameEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

// ---------------------------------------------------------------------------
// Arc<S> blanket, lets tests keep a handle on the sink
// ---------------------------------------------------------------------------

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: GameEvent) {
        (**self).emit(event)
    }
}
