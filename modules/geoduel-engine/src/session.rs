//! The game session state machine.
//!
//! Pure state transitions, no I/O. Timing and persistence live in
//! [`crate::game::Game`], which drives a `Session` through its phases:
//!
//! ```text
//! Loading → Ready → (Evaluating → Ready)* → GameOver
//! ```

use geoduel_common::{Country, GameMode, TiePolicy};
use serde::Serialize;

use crate::error::DataError;
use crate::shuffle::Shuffler;

/// A country list with at least two entries.
#[derive(Debug, Clone)]
pub struct Roster(Vec<Country>);

impl Roster {
    pub const MIN_LEN: usize = 2;

    pub fn new(countries: Vec<Country>) -> Result<Self, DataError> {
        if countries.len() < Self::MIN_LEN {
            return Err(DataError::InsufficientData {
                found: countries.len(),
            });
        }
        Ok(Self(countries))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Country] {
        &self.0
    }

    /// Reordering only; the length cannot change through a slice.
    pub fn as_mut_slice(&mut self) -> &mut [Country] {
        &mut self.0
    }

    pub fn into_inner(self) -> Vec<Country> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Ready,
    Evaluating,
    GameOver,
}

/// Result of a correct guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreUpdate {
    pub score: u32,
    pub high_score: u32,
    pub is_new_high: bool,
}

/// Correctness of a guess given the two revealed values.
pub fn is_correct(higher: bool, current: f64, next: f64, ties: TiePolicy) -> bool {
    if next == current {
        return ties == TiePolicy::Win;
    }
    (higher && next > current) || (!higher && next < current)
}

#[derive(Debug, Clone)]
pub struct Session {
    countries: Vec<Country>,
    current_index: usize,
    next_index: usize,
    score: u32,
    high_score: u32,
    mode: GameMode,
    is_animating: bool,
    is_game_over: bool,
    /// Set once this session has raised the mode's high score.
    raised_high_score: bool,
    /// Bumped on restart and mode change so work scheduled by an earlier
    /// session can be recognised and dropped.
    generation: u64,
}

impl Session {
    /// Begin a session over an already shuffled roster.
    pub fn start(roster: Roster, mode: GameMode, high_score: u32, generation: u64) -> Self {
        Self {
            countries: roster.into_inner(),
            current_index: 0,
            next_index: 1,
            score: 0,
            high_score,
            mode,
            is_animating: false,
            is_game_over: false,
            raised_high_score: false,
            generation,
        }
    }

    // --- Accessors ---

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn current(&self) -> &Country {
        &self.countries[self.current_index]
    }

    pub fn next(&self) -> &Country {
        &self.countries[self.next_index]
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn raised_high_score(&self) -> bool {
        self.raised_high_score
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        if self.is_game_over {
            Phase::GameOver
        } else if self.is_animating {
            Phase::Evaluating
        } else {
            Phase::Ready
        }
    }

    // --- Transitions ---

    /// Accept a guess and lock the session until the outcome is applied.
    /// Returns `None` (and changes nothing) while animating or after game over.
    pub fn guess(&mut self, higher: bool, ties: TiePolicy) -> Option<bool> {
        if self.is_animating || self.is_game_over {
            return None;
        }
        self.is_animating = true;

        let current = self.mode.value_of(self.current());
        let next = self.mode.value_of(self.next());
        Some(is_correct(higher, current, next, ties))
    }

    /// Count a correct guess, raising the high score if it was beaten.
    pub fn record_correct(&mut self) -> ScoreUpdate {
        self.score += 1;
        let is_new_high = self.score > self.high_score;
        if is_new_high {
            self.high_score = self.score;
            self.raised_high_score = true;
        }
        ScoreUpdate {
            score: self.score,
            high_score: self.high_score,
            is_new_high,
        }
    }

    /// Index of the country that follows `next`.
    ///
    /// Past the end of the list the whole roster is reshuffled. The indices
    /// follow the two countries on screen to their new slots, so the round in
    /// progress is undisturbed. The upcoming country is index 0, and the
    /// right-hand country is moved off index 0 if it landed there.
    pub fn upcoming_index(&mut self, shuffler: &mut Shuffler) -> usize {
        let upcoming = self.next_index + 1;
        if upcoming < self.countries.len() {
            return upcoming;
        }

        let mut tagged: Vec<(usize, Country)> =
            std::mem::take(&mut self.countries).into_iter().enumerate().collect();
        shuffler.shuffle(&mut tagged);

        let last = tagged.len() - 1;
        if tagged[0].0 == self.next_index {
            tagged.swap(0, last);
        }

        let (old_current, old_next) = (self.current_index, self.next_index);
        for (slot, (origin, _)) in tagged.iter().enumerate() {
            if *origin == old_current {
                self.current_index = slot;
            } else if *origin == old_next {
                self.next_index = slot;
            }
        }
        self.countries = tagged.into_iter().map(|(_, country)| country).collect();

        tracing::debug!(len = self.countries.len(), "Reached end of roster, reshuffled");
        0
    }

    /// Slide the window: next becomes current, `upcoming` becomes next.
    pub fn advance(&mut self, upcoming: usize) {
        debug_assert!(upcoming < self.countries.len());
        debug_assert_ne!(upcoming, self.next_index);
        self.current_index = self.next_index;
        self.next_index = upcoming;
        self.is_animating = false;
    }

    /// Enter the terminal state.
    pub fn finish(&mut self) {
        self.is_game_over = true;
        self.is_animating = false;
    }

    /// Fresh play-through with the same mode. Only valid from game over;
    /// returns `false` and changes nothing otherwise.
    pub fn restart(&mut self, shuffler: &mut Shuffler) -> bool {
        if !self.is_game_over {
            return false;
        }
        let high_score = self.high_score;
        self.reset(self.mode, high_score, shuffler);
        true
    }

    /// Fresh play-through under `mode` with that mode's stored high score.
    /// Legal from any phase.
    pub fn reset(&mut self, mode: GameMode, high_score: u32, shuffler: &mut Shuffler) {
        shuffler.shuffle(&mut self.countries);
        self.mode = mode;
        self.high_score = high_score;
        self.score = 0;
        self.current_index = 0;
        self.next_index = 1;
        self.is_game_over = false;
        self.is_animating = false;
        self.raised_high_score = false;
        self.generation += 1;
    }
}
