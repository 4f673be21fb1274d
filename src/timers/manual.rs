//! Deterministic virtual-time scheduler.
//!
//! Nothing fires on its own: the owner pulls due events with `pop_due` (or
//! through `VirtualClock::advance`) and hands them to its timer callback. Frame
//! driven hosts advance it by the frame time, tests advance it by exact
//! amounts.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tracing::trace;

use super::scheduler::{Scheduler, TimerId, MIN_PERIOD};

/// Virtual clock with a deadline-ordered timer queue.
#[derive(Debug)]
pub struct ManualScheduler<E> {
    now: Duration,
    next_id: u64,
    /// Keyed by (deadline, id) so equal deadlines fire in scheduling order.
    queue: BTreeMap<(Duration, u64), E>,
    deadlines: HashMap<TimerId, Duration>,
    periods: HashMap<TimerId, Duration>,
}

impl<E> ManualScheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
            periods: HashMap::new(),
        }
    }

    /// Current virtual time since the scheduler was created.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Deadline of the earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Moves the clock forward without firing anything. Never moves backwards.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }
}

impl<E: Clone> ManualScheduler<E> {
    /// Removes and returns the earliest timer due at or before `until`,
    /// moving the clock to its deadline. A repeating timer is queued again
    /// one period after the deadline it just fired at.
    pub fn pop_due(&mut self, until: Duration) -> Option<E> {
        let key = *self.queue.keys().next()?;
        if key.0 > until {
            return None;
        }
        let id = TimerId(key.1);
        let event = self.queue.remove(&key)?;
        match self.periods.get(&id) {
            Some(period) => {
                let next = key.0 + *period;
                self.queue.insert((next, id.0), event.clone());
                self.deadlines.insert(id, next);
            }
            None => {
                self.deadlines.remove(&id);
            }
        }
        self.now = self.now.max(key.0);
        trace!(id = key.1, at_ms = key.0.as_millis() as u64, "Manual timer fired");
        Some(event)
    }
}

impl<E> Default for ManualScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> for ManualScheduler<E> {
    fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay;
        self.queue.insert((deadline, id.0), event);
        self.deadlines.insert(id, deadline);
        id
    }

    fn schedule_repeating(&mut self, period: Duration, event: E) -> TimerId
    where
        E: Clone,
    {
        let period = period.max(MIN_PERIOD);
        let id = self.schedule(period, event);
        self.periods.insert(id, period);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.periods.remove(&id);
        if let Some(deadline) = self.deadlines.remove(&id) {
            self.queue.remove(&(deadline, id.0));
        }
    }

    fn live_timers(&self) -> usize {
        self.queue.len()
    }
}

/// A state machine that runs on a `ManualScheduler`.
pub trait VirtualClock {
    type Event: Clone;

    fn manual_scheduler(&mut self) -> &mut ManualScheduler<Self::Event>;

    /// Handles one fired timer. Returns true if the event changed state.
    fn fire(&mut self, event: Self::Event) -> bool;

    /// Advances virtual time by `by`, firing every timer that comes due,
    /// including ones scheduled by earlier callbacks within the same window.
    ///
    /// Returns the number of events that changed state.
    fn advance(&mut self, by: Duration) -> usize {
        let target = self.manual_scheduler().now() + by;
        let mut applied = 0;
        while let Some(event) = self.manual_scheduler().pop_due(target) {
            if self.fire(event) {
                applied += 1;
            }
        }
        self.manual_scheduler().set_now(target);
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        scheduler: ManualScheduler<&'static str>,
        fired: Vec<(u128, &'static str)>,
        rearm: bool,
    }

    impl VirtualClock for Recorder {
        type Event = &'static str;

        fn manual_scheduler(&mut self) -> &mut ManualScheduler<&'static str> {
            &mut self.scheduler
        }

        fn fire(&mut self, event: &'static str) -> bool {
            self.fired.push((self.scheduler.now().as_millis(), event));
            if self.rearm {
                self.scheduler.schedule(Duration::from_millis(100), event);
            }
            true
        }
    }

    fn recorder(rearm: bool) -> Recorder {
        Recorder {
            scheduler: ManualScheduler::new(),
            fired: Vec::new(),
            rearm,
        }
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut r = recorder(false);
        r.scheduler.schedule(Duration::from_millis(300), "c");
        r.scheduler.schedule(Duration::from_millis(100), "a");
        r.scheduler.schedule(Duration::from_millis(200), "b");

        assert_eq!(r.advance(Duration::from_millis(250)), 2);
        assert_eq!(r.fired, vec![(100, "a"), (200, "b")]);
        assert_eq!(r.scheduler.now(), Duration::from_millis(250));
        assert_eq!(r.scheduler.live_timers(), 1);
    }

    #[test]
    fn test_equal_deadlines_keep_schedule_order() {
        let mut r = recorder(false);
        r.scheduler.schedule(Duration::from_millis(50), "first");
        r.scheduler.schedule(Duration::from_millis(50), "second");
        r.advance(Duration::from_millis(50));
        assert_eq!(r.fired, vec![(50, "first"), (50, "second")]);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut r = recorder(false);
        let id = r.scheduler.schedule(Duration::from_millis(100), "gone");
        r.scheduler.cancel(id);
        // Cancelling twice is harmless.
        r.scheduler.cancel(id);

        assert_eq!(r.advance(Duration::from_secs(1)), 0);
        assert!(r.fired.is_empty());
        assert_eq!(r.scheduler.live_timers(), 0);
    }

    #[test]
    fn test_rearmed_timers_fire_within_window() {
        let mut r = recorder(true);
        r.scheduler.schedule(Duration::from_millis(100), "tick");
        r.advance(Duration::from_millis(300));

        assert_eq!(r.fired, vec![(100, "tick"), (200, "tick"), (300, "tick")]);
        assert_eq!(r.scheduler.next_deadline(), Some(Duration::from_millis(400)));
    }

    #[test]
    fn test_repeating_timer_keeps_its_grid() {
        let mut r = recorder(false);
        let id = r.scheduler.schedule_repeating(Duration::from_millis(100), "tick");
        // Stop short of a deadline, then cross several at once.
        r.advance(Duration::from_millis(150));
        r.advance(Duration::from_millis(260));

        assert_eq!(
            r.fired,
            vec![(100, "tick"), (200, "tick"), (300, "tick"), (400, "tick")]
        );
        assert_eq!(r.scheduler.live_timers(), 1);
        assert_eq!(r.scheduler.next_deadline(), Some(Duration::from_millis(500)));

        r.scheduler.cancel(id);
        assert_eq!(r.advance(Duration::from_secs(1)), 0);
        assert_eq!(r.scheduler.live_timers(), 0);
    }
}
