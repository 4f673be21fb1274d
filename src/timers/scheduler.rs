use std::time::Duration;

/// Opaque handle for a scheduled timer. Never reused by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub(crate) u64);

/// Epoch counter stamped on every timer event.
///
/// Owners bump it whenever they cancel their timers. A callback that arrives
/// carrying an older value was already queued when the cancel happened and
/// must be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub fn bump(&mut self) -> Self {
        self.0 = self.0.wrapping_add(1);
        *self
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

/// Shortest period a repeating timer runs at.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Timer source for the carousel state machines.
pub trait Scheduler<E> {
    /// Deliver `event` back to the owner after `delay`.
    fn schedule(&mut self, delay: Duration, event: E) -> TimerId;

    /// Deliver a copy of `event` every `period` until cancelled.
    ///
    /// Tick `k` is due at `start + k * period`, where `start` is the time of
    /// this call. Late handling of one tick never shifts the ones after it.
    /// Periods shorter than `MIN_PERIOD` are raised to it.
    fn schedule_repeating(&mut self, period: Duration, event: E) -> TimerId
    where
        E: Clone;

    /// Cancel a pending timer. Unknown or already fired ids are ignored.
    fn cancel(&mut self, id: TimerId);

    /// Number of timers scheduled but not yet fired or cancelled. A repeating
    /// timer counts until it is cancelled.
    fn live_timers(&self) -> usize;
}
