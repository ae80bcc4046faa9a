//! The game controller.
//!
//! Intent → session transition → schedule continuation → settle.
//! Owns the only `Session`; the presentation layer sees it through
//! emitted `GameEvent`s and read-only accessors.

use geoduel_common::config::TimingsConfig;
use geoduel_common::{GameConfig, GameMode, ModeScores, TiePolicy};
use tracing::{debug, info};
use typed_builder::TypedBuilder;

use crate::events::{EventSink, GameEvent};
use crate::scheduler::{Continuation, Scheduler};
use crate::session::{Phase, Roster, Session};
use crate::shuffle::Shuffler;
use crate::store::{KeyValueStore, ScoreStore};

#[derive(Debug, Clone, TypedBuilder)]
pub struct GameSettings {
    /// Mode of the first session.
    #[builder(default)]
    pub mode: GameMode,
    #[builder(default)]
    pub tie_policy: TiePolicy,
    #[builder(default)]
    pub timings: TimingsConfig,
}

impl GameSettings {
    pub fn from_config(config: &GameConfig, mode: GameMode) -> Self {
        Self {
            mode,
            tie_policy: config.rules.tie_policy,
            timings: config.timings.clone(),
        }
    }
}

pub struct Game<S, K, E>
where
    S: Scheduler,
    K: KeyValueStore,
    E: EventSink,
{
    session: Option<Session>,
    mode: GameMode,
    settings: GameSettings,
    scheduler: S,
    scores: ScoreStore<K>,
    sink: E,
    shuffler: Shuffler,
}

impl<S, K, E> Game<S, K, E>
where
    S: Scheduler,
    K: KeyValueStore,
    E: EventSink,
{
    pub fn new(
        settings: GameSettings,
        scheduler: S,
        scores: ScoreStore<K>,
        sink: E,
        shuffler: Shuffler,
    ) -> Self {
        Self {
            session: None,
            mode: settings.mode,
            settings,
            scheduler,
            scores,
            sink,
            shuffler,
        }
    }

    // --- Read access ---

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Loading, Session::phase)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn high_scores(&self) -> ModeScores {
        self.scores.all()
    }

    pub fn scores(&self) -> &ScoreStore<K> {
        &self.scores
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    // --- Intents ---

    /// Shuffle the loaded roster and open the first session under the
    /// current mode with its stored high score.
    pub fn start(&mut self, mut roster: Roster) {
        self.shuffler.shuffle(roster.as_mut_slice());
        let high_score = self.scores.get(self.mode);
        let generation = self.session.as_ref().map_or(0, |s| s.generation() + 1);

        info!(
            countries = roster.len(),
            mode = self.mode.key(),
            high_score,
            "Starting game"
        );
        let session = Session::start(roster, self.mode, high_score, generation);
        self.scheduler.retain_generation(generation);
        emit_fresh_round(&self.sink, &session);
        self.session = Some(session);
    }

    /// Submit a guess. Returns `false` when it was dropped (not started,
    /// animating, or game over).
    pub fn guess(&mut self, higher: bool) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!("Guess before start ignored");
            return false;
        };
        let Some(correct) = session.guess(higher, self.settings.tie_policy) else {
            debug!(phase = ?session.phase(), "Guess ignored");
            return false;
        };

        let revealed = session.next();
        self.sink.emit(GameEvent::ValueRevealed {
            name: revealed.name.clone(),
            value: session.mode().value_of(revealed),
            display: session.mode().display_value(revealed),
        });

        self.scheduler.after(
            self.settings.timings.value_reveal(),
            Continuation::Reveal {
                generation: session.generation(),
                correct,
            },
        );
        true
    }

    /// Play again after game over. Returns `false` when not in game over.
    pub fn restart(&mut self) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if !session.restart(&mut self.shuffler) {
            debug!(phase = ?session.phase(), "Restart ignored");
            return false;
        }
        info!(mode = session.mode().key(), "Restarted");
        self.scheduler.retain_generation(session.generation());
        emit_fresh_round(&self.sink, session);
        true
    }

    /// Switch comparison mode. Same mode is a no-op returning `false`.
    /// Legal in every phase; always lands in a fresh `Ready` session.
    pub fn change_mode(&mut self, mode: GameMode) -> bool {
        if mode == self.mode {
            return false;
        }
        info!(from = self.mode.key(), to = mode.key(), "Changing game mode");
        self.mode = mode;

        if let Some(session) = self.session.as_mut() {
            let high_score = self.scores.get(mode);
            session.reset(mode, high_score, &mut self.shuffler);
            self.scheduler.retain_generation(session.generation());
            emit_fresh_round(&self.sink, session);
        }
        true
    }

    // --- Continuations ---

    /// Apply the next due continuation. `false` when nothing is queued.
    pub async fn step(&mut self) -> bool {
        match self.scheduler.next_due().await {
            Some(continuation) => {
                self.resume(continuation);
                true
            }
            None => false,
        }
    }

    /// Apply continuations until the queue is empty.
    pub async fn settle(&mut self) {
        while self.step().await {}
    }

    fn resume(&mut self, continuation: Continuation) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if continuation.generation() != session.generation() {
            debug!(?continuation, current = session.generation(), "Dropping stale continuation");
            return;
        }

        let timings = &self.settings.timings;
        match continuation {
            Continuation::Reveal { correct, generation } => {
                self.sink.emit(GameEvent::GuessResult { correct });
                if correct {
                    let update = session.record_correct();
                    if update.is_new_high {
                        self.scores.set(session.mode(), update.high_score);
                    }
                    self.sink.emit(GameEvent::ScoreChanged {
                        score: update.score,
                        high_score: update.high_score,
                        is_new_high: update.is_new_high,
                    });

                    let upcoming = session.upcoming_index(&mut self.shuffler);
                    self.scheduler.after(
                        timings.result_display() + timings.transition(),
                        Continuation::Advance {
                            generation,
                            upcoming,
                        },
                    );
                } else {
                    self.scheduler.after(
                        timings.result_display(),
                        Continuation::EndSession { generation },
                    );
                }
            }
            Continuation::Advance { upcoming, .. } => {
                session.advance(upcoming);
                self.sink.emit(round_event(session));
            }
            Continuation::EndSession { .. } => {
                session.finish();
                info!(
                    score = session.score(),
                    high_score = session.high_score(),
                    mode = session.mode().key(),
                    "Game over"
                );
                self.sink.emit(GameEvent::GameOver {
                    score: session.score(),
                    high_score: session.high_score(),
                    mode: session.mode(),
                    new_high: session.raised_high_score(),
                });
            }
        }
    }
}

fn round_event(session: &Session) -> GameEvent {
    GameEvent::Round {
        left: session.current().clone(),
        right: session.next().clone(),
        mode: session.mode(),
    }
}

fn emit_fresh_round<E: EventSink>(sink: &E, session: &Session) {
    sink.emit(GameEvent::ScoreChanged {
        score: session.score(),
        high_score: session.high_score(),
        is_new_high: false,
    });
    sink.emit(round_event(session));
}
