//! Fixed-period image rotation for the prank detail page.

use std::time::Duration;

use tracing::trace;

use crate::timers::{Generation, ManualScheduler, Scheduler, TimerId, VirtualClock};

/// Detail page rotation period.
pub const DEFAULT_AUTOPLAY_PERIOD_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayTick {
    generation: Generation,
}

/// Cycles through a card's images on a fixed period, wrapping at the end.
#[derive(Debug)]
pub struct SlideAutoplay<S> {
    scheduler: S,
    period: Duration,
    image_count: usize,
    current: usize,
    generation: Generation,
    timer: Option<TimerId>,
}

impl<S: Scheduler<AutoplayTick>> SlideAutoplay<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_period(scheduler, Duration::from_millis(DEFAULT_AUTOPLAY_PERIOD_MS))
    }

    pub fn with_period(scheduler: S, period: Duration) -> Self {
        Self {
            scheduler,
            period,
            image_count: 0,
            current: 0,
            generation: Generation::default(),
            timer: None,
        }
    }

    /// Restarts the rotation at image 0. Fewer than two images never tick.
    pub fn start(&mut self, image_count: usize) {
        self.stop();
        self.image_count = image_count;
        if image_count > 1 {
            self.arm();
        }
    }

    pub fn stop(&mut self) {
        if let Some(id) = self.timer.take() {
            self.scheduler.cancel(id);
        }
        self.generation.bump();
        self.current = 0;
    }

    pub fn on_timer(&mut self, tick: AutoplayTick) -> bool {
        if tick.generation != self.generation || self.image_count < 2 {
            trace!("Dropping stale autoplay tick");
            return false;
        }
        self.current = (self.current + 1) % self.image_count;
        true
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    fn arm(&mut self) {
        self.timer = Some(self.scheduler.schedule_repeating(
            self.period,
            AutoplayTick {
                generation: self.generation,
            },
        ));
    }
}

impl VirtualClock for SlideAutoplay<ManualScheduler<AutoplayTick>> {
    type Event = AutoplayTick;

    fn manual_scheduler(&mut self) -> &mut ManualScheduler<AutoplayTick> {
        &mut self.scheduler
    }

    fn fire(&mut self, event: AutoplayTick) -> bool {
        self.on_timer(event)
    }
}
