//! Delayed, cancelable engine callbacks on a virtual clock.
//!
//! Engines never block. When an engine wants something to happen "after a
//! short pause" (an enemy's turn, the end-of-encounter signal, a dialogue
//! auto-advance) it schedules a task here; the host moves time forward and
//! the engine drains whatever became due.
//!
//! Every task is stamped with the scheduler's generation. [`Scheduler::invalidate`]
//! bumps the generation, which turns every pending task into a no-op, so a
//! torn-down session can never be mutated by a callback scheduled earlier.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

/// Identifier of an encounter or dialogue session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Handle returned by [`Scheduler::schedule`], usable with [`Scheduler::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Clone)]
struct ScheduledTask<T> {
    due: Duration,
    seq: u64,
    generation: u64,
    payload: T,
}

/// A single-threaded task queue keyed to one session.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    session: SessionId,
    now: Duration,
    generation: u64,
    next_seq: u64,
    pending: Vec<ScheduledTask<T>>,
}

impl<T> Scheduler<T> {
    /// Create an empty scheduler for a session, with the clock at zero.
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            now: Duration::ZERO,
            generation: 0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    /// The session this scheduler belongs to.
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Current generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Schedule `payload` to become due `delay` from now.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TaskHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(ScheduledTask {
            due: self.now + delay,
            seq,
            generation: self.generation,
            payload,
        });
        tracing::trace!(session = %self.session, seq, ?delay, "task scheduled");
        TaskHandle(seq)
    }

    /// Cancel one pending task. Returns true if it was still pending.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.seq != handle.0);
        self.pending.len() < before
    }

    /// Invalidate every pending task by moving to a new generation.
    pub fn invalidate(&mut self) {
        let dropped = self
            .pending
            .iter()
            .filter(|t| t.generation == self.generation)
            .count();
        self.generation += 1;
        if dropped > 0 {
            tracing::debug!(session = %self.session, dropped, generation = self.generation, "pending tasks invalidated");
        }
    }

    /// Returns true if any live task is waiting.
    pub fn has_pending(&self) -> bool {
        self.pending.iter().any(|t| t.generation == self.generation)
    }

    /// Time from now until the earliest live task is due.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.pending
            .iter()
            .filter(|t| t.generation == self.generation)
            .map(|t| t.due.saturating_sub(self.now))
            .min()
    }

    /// Pop the earliest live task due at or before `until`, moving the clock
    /// to its due time. Stale tasks are discarded on the way.
    pub fn next_ready(&mut self, until: Duration) -> Option<T> {
        let generation = self.generation;
        self.pending.retain(|t| t.generation == generation);

        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;

        let task = self.pending.remove(index);
        self.now = self.now.max(task.due);
        Some(task.payload)
    }

    /// Move the clock forward to `until` (never backwards).
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}
