//! Delayed continuations.
//!
//! The session's pacing delays are expressed as `after(delay, continuation)`.
//! Continuations are plain data applied by the game controller when they
//! come due, always in the order they were scheduled.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// Work deferred until a pacing delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Show the outcome of a guess.
    Reveal { generation: u64, correct: bool },
    /// Slide to the next pair once the transition has played.
    Advance { generation: u64, upcoming: usize },
    /// End the session after a wrong guess.
    EndSession { generation: u64 },
}

impl Continuation {
    /// Session generation that scheduled this continuation.
    pub fn generation(&self) -> u64 {
        match self {
            Continuation::Reveal { generation, .. }
            | Continuation::Advance { generation, .. }
            | Continuation::EndSession { generation } => *generation,
        }
    }
}

#[async_trait]
pub trait Scheduler: Send {
    /// Queue `continuation` to come due after `delay`.
    fn after(&mut self, delay: Duration, continuation: Continuation);

    /// Wait for the oldest queued continuation and hand it back.
    /// `None` when nothing is queued. Dropping the future before it resolves
    /// leaves the queue untouched.
    async fn next_due(&mut self) -> Option<Continuation>;

    fn pending(&self) -> usize;

    /// Drop every queued continuation scheduled by another session generation.
    fn retain_generation(&mut self, generation: u64);
}

// ---------------------------------------------------------------------------
// TimerScheduler (production, tokio timers)
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TimerScheduler {
    queue: VecDeque<(Instant, Continuation)>,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Scheduler for TimerScheduler {
    fn after(&mut self, delay: Duration, continuation: Continuation) {
        self.queue.push_back((Instant::now() + delay, continuation));
    }

    async fn next_due(&mut self) -> Option<Continuation> {
        let deadline = self.queue.front()?.0;
        tokio::time::sleep_until(deadline).await;
        self.queue.pop_front().map(|(_, continuation)| continuation)
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }

    fn retain_generation(&mut self, generation: u64) {
        self.queue
            .retain(|(_, continuation)| continuation.generation() == generation);
    }
}

// ---------------------------------------------------------------------------
// ImmediateScheduler (tests, zero delay)
// ---------------------------------------------------------------------------

/// Runs every continuation as soon as it is asked for. Records the requested
/// delays so tests can check pacing without waiting.
#[derive(Debug, Default)]
pub struct ImmediateScheduler {
    queue: VecDeque<Continuation>,
    requested: Vec<Duration>,
}

impl ImmediateScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay passed to `after`, oldest first.
    pub fn requested_delays(&self) -> &[Duration] {
        &self.requested
    }
}

#[async_trait]
impl Scheduler for ImmediateScheduler {
    fn after(&mut self, delay: Duration, continuation: Continuation) {
        self.requested.push(delay);
        self.queue.push_back(continuation);
    }

    async fn next_due(&mut self) -> Option<Continuation> {
        self.queue.pop_front()
    }

    fn pending(&self) -> usize {
        self.queue.len()
    }

    fn retain_generation(&mut self, generation: u64) {
        self.queue
            .retain(|continuation| continuation.generation() == generation);
    }
}
