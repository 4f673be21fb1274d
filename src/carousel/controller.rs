//! Focus carousel controller.
//!
//! Turns a stream of scroll samples into a single previewing card:
//! - The card nearest the scroll offset becomes the focus target
//! - After the focus holds for the debounce window the card enters preview
//! - While previewing, its images rotate on a fixed period
//!
//! At most one debounce timer and one slideshow timer are live at any time.
//! Every focus change and dispose bumps the timer generation, so callbacks a
//! host had already queued before the cancel are dropped on arrival.

use tracing::{debug, trace};

use super::state::{CarouselSnapshot, CarouselTimer, PreviewState};
use crate::config::CarouselConfig;
use crate::error::Result;
use crate::layout::closest_index;
use crate::models::CardDeck;
use crate::timers::{Generation, ManualScheduler, Scheduler, TimerId, VirtualClock};

/// Focus/preview state machine for a horizontal card strip.
#[derive(Debug)]
pub struct FocusCarouselController<S> {
    config: CarouselConfig,
    /// Per-card image counts from the deck; empty means use the config default.
    image_counts: Vec<usize>,
    scheduler: S,
    focused: Option<i64>,
    preview: PreviewState,
    generation: Generation,
    debounce_timer: Option<TimerId>,
    slide_timer: Option<TimerId>,
    revision: u64,
}

impl<S: Scheduler<CarouselTimer>> FocusCarouselController<S> {
    /// Creates an idle controller. Call `initialize` when the view mounts.
    pub fn new(config: CarouselConfig, scheduler: S) -> Self {
        Self {
            config,
            image_counts: Vec::new(),
            scheduler,
            focused: None,
            preview: PreviewState::Idle,
            generation: Generation::default(),
            debounce_timer: None,
            slide_timer: None,
            revision: 0,
        }
    }

    /// Uses the deck's per-card image counts for the slideshow wrap.
    pub fn with_deck(mut self, deck: &CardDeck) -> Self {
        self.image_counts = deck.image_counts();
        self
    }

    /// Starts the debounce for `initial_index` from a clean state.
    pub fn initialize(&mut self, initial_index: i64) {
        debug!(initial_index, "Carousel mounted");
        self.focus_change(initial_index);
    }

    /// Feeds a scroll sample. `card_pitch` is the card width plus the gap.
    ///
    /// Returns true if the sample moved the focus to a new card.
    ///
    /// # Errors
    /// `InvalidArgument` for a non-positive or non-finite pitch, or a
    /// non-finite offset. State is left untouched.
    pub fn on_scroll(&mut self, offset: f64, card_pitch: f64) -> Result<bool> {
        let closest = closest_index(offset, card_pitch)?;
        if self.focused == Some(closest) {
            return Ok(false);
        }
        self.focus_change(closest);
        Ok(true)
    }

    /// Retargets the choreography at `new_index`, restarting the debounce.
    ///
    /// Valid from every state, including `Idle` after `dispose`.
    pub fn focus_change(&mut self, new_index: i64) {
        self.cancel_timers();
        let generation = self.generation.bump();
        self.focused = Some(new_index);
        self.preview = PreviewState::Pending { index: new_index };
        self.debounce_timer = Some(self.scheduler.schedule(
            self.config.debounce,
            CarouselTimer::Debounce {
                generation,
                index: new_index,
            },
        ));
        self.revision += 1;

        debug!(
            index = new_index,
            generation = generation.value(),
            "Focus changed, debounce started"
        );
    }

    /// Cancels all timers and returns to `Idle`. Safe to call repeatedly.
    pub fn dispose(&mut self) {
        self.cancel_timers();
        self.generation.bump();
        if !self.preview.is_idle() {
            self.preview = PreviewState::Idle;
            self.revision += 1;
            debug!("Carousel disposed");
        }
    }

    /// Handles a fired timer. Returns true if the event changed state.
    ///
    /// Events from an older generation, or that no longer match the current
    /// state, are dropped.
    pub fn on_timer(&mut self, timer: CarouselTimer) -> bool {
        if timer.generation() != self.generation {
            trace!(
                event_generation = timer.generation().value(),
                current = self.generation.value(),
                "Dropping stale carousel timer"
            );
            return false;
        }

        match (timer, self.preview) {
            (CarouselTimer::Debounce { index, .. }, PreviewState::Pending { index: pending })
                if index == pending =>
            {
                self.debounce_timer = None;
                self.preview = PreviewState::Active { index, slide: 0 };
                // Tick k lands at D + k*T.
                self.slide_timer = Some(self.scheduler.schedule_repeating(
                    self.config.slide_interval,
                    CarouselTimer::SlideTick {
                        generation: self.generation,
                    },
                ));
                self.revision += 1;
                debug!(index, "Preview started");
                true
            }
            (CarouselTimer::SlideTick { .. }, PreviewState::Active { index, slide }) => {
                let next = (slide + 1) % self.slide_count(index);
                if next == slide {
                    return false;
                }
                self.preview = PreviewState::Active { index, slide: next };
                self.revision += 1;
                trace!(index, slide = next, "Slide advanced");
                true
            }
            (timer, state) => {
                trace!(?timer, ?state, "Timer does not match carousel state");
                false
            }
        }
    }

    pub fn snapshot(&self) -> CarouselSnapshot {
        CarouselSnapshot {
            focused: self.focused,
            preview: self.preview,
            revision: self.revision,
        }
    }

    pub fn focused_index(&self) -> Option<i64> {
        self.focused
    }

    pub fn preview_state(&self) -> PreviewState {
        self.preview
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    /// Timers currently pending in the scheduler.
    pub fn live_timers(&self) -> usize {
        self.scheduler.live_timers()
    }

    fn cancel_timers(&mut self) {
        if let Some(id) = self.debounce_timer.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = self.slide_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn slide_count(&self, index: i64) -> usize {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.image_counts.get(i).copied())
            .filter(|count| *count > 0)
            .unwrap_or(self.config.slides_per_card)
            .max(1)
    }
}

impl FocusCarouselController<ManualScheduler<CarouselTimer>> {
    /// Controller on a virtual clock, driven with `VirtualClock::advance`.
    pub fn manual(config: CarouselConfig) -> Self {
        Self::new(config, ManualScheduler::new())
    }
}

impl VirtualClock for FocusCarouselController<ManualScheduler<CarouselTimer>> {
    type Event = CarouselTimer;

    fn manual_scheduler(&mut self) -> &mut ManualScheduler<CarouselTimer> {
        &mut self.scheduler
    }

    fn fire(&mut self, event: CarouselTimer) -> bool {
        self.on_timer(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CarouselError;
    use crate::models::Card;
    use std::time::Duration;

    const PITCH: f64 = 316.0;

    type Manual = FocusCarouselController<ManualScheduler<CarouselTimer>>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn controller() -> Manual {
        FocusCarouselController::manual(CarouselConfig::default())
    }

    fn active(index: i64, slide: usize) -> PreviewState {
        PreviewState::Active { index, slide }
    }

    /// Advances in small steps, returning every index that was ever active.
    fn advance_collecting(ctrl: &mut Manual, total: Duration) -> Vec<i64> {
        let mut seen = Vec::new();
        let step = ms(50);
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            ctrl.advance(step);
            elapsed += step;
            if let Some(index) = ctrl.preview_state().active_index() {
                if !seen.contains(&index) {
                    seen.push(index);
                }
            }
        }
        seen
    }

    #[test]
    fn test_initialize_enters_pending() {
        let mut ctrl = controller();
        assert_eq!(ctrl.focused_index(), None);

        ctrl.initialize(0);
        assert_eq!(ctrl.focused_index(), Some(0));
        assert_eq!(ctrl.preview_state(), PreviewState::Pending { index: 0 });
        assert_eq!(ctrl.live_timers(), 1);
    }

    #[test]
    fn test_preview_slideshow_wraps() {
        let mut ctrl = controller();
        ctrl.initialize(0);

        ctrl.advance(ms(1999));
        assert_eq!(ctrl.preview_state(), PreviewState::Pending { index: 0 });

        ctrl.advance(ms(1));
        assert_eq!(ctrl.preview_state(), active(0, 0));
        ctrl.advance(ms(2000));
        assert_eq!(ctrl.preview_state(), active(0, 1));
        ctrl.advance(ms(2000));
        assert_eq!(ctrl.preview_state(), active(0, 2));
        ctrl.advance(ms(2000));
        assert_eq!(ctrl.preview_state(), active(0, 0));
    }

    #[test]
    fn test_scroll_during_debounce_retargets() {
        let mut ctrl = controller();
        ctrl.initialize(0);

        let mut seen = advance_collecting(&mut ctrl, ms(500));
        assert!(ctrl.on_scroll(2.0 * PITCH, PITCH).unwrap());
        assert_eq!(ctrl.preview_state(), PreviewState::Pending { index: 2 });

        ctrl.advance(ms(1999));
        assert_eq!(ctrl.preview_state(), PreviewState::Pending { index: 2 });
        seen.extend(advance_collecting(&mut ctrl, ms(1)));
        assert_eq!(ctrl.preview_state(), active(2, 0));

        seen.extend(advance_collecting(&mut ctrl, ms(10_000)));
        assert!(!seen.contains(&0), "card 0 must never preview");
    }

    #[test]
    fn test_rapid_scroll_only_last_card_previews() {
        let mut ctrl = controller();
        ctrl.initialize(0);

        let mut seen = Vec::new();
        for index in 1..=3 {
            seen.extend(advance_collecting(&mut ctrl, ms(100)));
            ctrl.on_scroll(index as f64 * PITCH, PITCH).unwrap();
        }
        seen.extend(advance_collecting(&mut ctrl, ms(8000)));

        assert_eq!(seen, vec![3]);
        assert_eq!(ctrl.focused_index(), Some(3));
    }

    #[test]
    fn test_burst_of_focus_changes() {
        let bursts: [&[i64]; 4] = [&[1], &[4, 2], &[5, 5, 1, 7], &[0, -1, 9, 3, 3]];
        for burst in bursts {
            let mut ctrl = controller();
            ctrl.initialize(0);
            let mut seen = Vec::new();
            for &index in burst {
                seen.extend(advance_collecting(&mut ctrl, ms(150)));
                ctrl.focus_change(index);
                assert!(ctrl.live_timers() <= 1);
            }
            let last = *burst.last().unwrap();

            seen.extend(advance_collecting(&mut ctrl, ms(2000)));
            assert_eq!(ctrl.preview_state(), active(last, 0));
            assert_eq!(seen, vec![last], "burst {:?}", burst);
        }
    }

    #[test]
    fn test_slide_position_after_k_periods() {
        for k in 0..7u64 {
            let mut ctrl = controller();
            ctrl.initialize(0);
            ctrl.focus_change(4);
            ctrl.advance(ms(2000 + k * 2000));
            assert_eq!(ctrl.preview_state(), active(4, (k % 3) as usize));
            assert!(ctrl.live_timers() <= 1);
        }
    }

    #[test]
    fn test_focus_change_while_active_restarts() {
        let mut ctrl = controller();
        ctrl.initialize(0);
        ctrl.advance(ms(4000));
        assert_eq!(ctrl.preview_state(), active(0, 1));

        ctrl.focus_change(1);
        assert_eq!(ctrl.preview_state(), PreviewState::Pending { index: 1 });
        assert_eq!(ctrl.live_timers(), 1);

        ctrl.advance(ms(2000));
        assert_eq!(ctrl.preview_state(), active(1, 0));
    }

    #[test]
    fn test_scroll_within_same_card_keeps_timers() {
        let mut ctrl = controller();
        ctrl.initialize(0);
        ctrl.advance(ms(1500));

        assert!(!ctrl.on_scroll(100.0, PITCH).unwrap());
        ctrl.advance(ms(500));
        assert_eq!(ctrl.preview_state(), active(0, 0));
    }

    #[test]
    fn test_zero_pitch_is_rejected_without_side_effects() {
        let mut ctrl = controller();
        ctrl.initialize(0);
        let before = ctrl.snapshot();

        let err = ctrl.on_scroll(500.0, 0.0).unwrap_err();
        assert!(matches!(err, CarouselError::InvalidArgument { name: "card_pitch", .. }));
        assert_eq!(ctrl.snapshot(), before);

        ctrl.advance(ms(2000));
        assert_eq!(ctrl.preview_state(), active(0, 0));
    }

    #[test]
    fn test_dispose_stops_everything() {
        for at in [0u64, 1000, 2000, 5000] {
            let mut ctrl = controller();
            ctrl.initialize(0);
            ctrl.advance(ms(at));

            ctrl.dispose();
            assert_eq!(ctrl.live_timers(), 0);
            assert!(ctrl.preview_state().is_idle());

            let after = ctrl.snapshot();
            assert_eq!(ctrl.advance(ms(20_000)), 0);
            assert_eq!(ctrl.snapshot(), after);
        }
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut once = controller();
        once.initialize(0);
        once.advance(ms(3000));
        once.dispose();

        let mut twice = controller();
        twice.initialize(0);
        twice.advance(ms(3000));
        twice.dispose();
        twice.dispose();

        assert_eq!(once.snapshot(), twice.snapshot());
        assert_eq!(twice.live_timers(), 0);
    }

    #[test]
    fn test_focus_change_from_idle_starts_debounce() {
        let mut fresh = controller();
        fresh.focus_change(2);
        assert_eq!(fresh.preview_state(), PreviewState::Pending { index: 2 });
        fresh.advance(ms(2000));
        assert_eq!(fresh.preview_state(), active(2, 0));

        let mut disposed = controller();
        disposed.initialize(0);
        disposed.dispose();
        disposed.focus_change(4);
        assert_eq!(disposed.live_timers(), 1);
        disposed.advance(ms(2000));
        assert_eq!(disposed.preview_state(), active(4, 0));
    }

    #[test]
    fn test_scroll_after_dispose_restarts_choreography() {
        let mut ctrl = controller();
        ctrl.initialize(0);
        ctrl.advance(ms(3000));
        ctrl.dispose();

        assert!(ctrl.on_scroll(3.0 * PITCH, PITCH).unwrap());
        assert_eq!(ctrl.preview_state(), PreviewState::Pending { index: 3 });
        ctrl.advance(ms(2000));
        assert_eq!(ctrl.preview_state(), active(3, 0));
    }

    #[test]
    fn test_slideshow_ticks_hold_fixed_period() {
        let mut ctrl = FocusCarouselController::manual(
            CarouselConfig::default()
                .with_debounce(ms(10))
                .with_slide_interval(ms(10))
                .with_slides_per_card(100_000),
        );
        ctrl.initialize(0);
        ctrl.advance(ms(10 + 200 * 10 + 5));
        assert_eq!(ctrl.preview_state(), active(0, 200));
        assert_eq!(ctrl.live_timers(), 1);
    }

    #[test]
    fn test_stale_generation_is_dropped() {
        let mut ctrl = controller();
        ctrl.initialize(0);
        let queued = CarouselTimer::Debounce {
            generation: ctrl.generation,
            index: 0,
        };

        // The host queued the callback before the focus moved on.
        ctrl.focus_change(1);
        assert!(!ctrl.on_timer(queued));
        assert_eq!(ctrl.preview_state(), PreviewState::Pending { index: 1 });

        let tick = CarouselTimer::SlideTick {
            generation: ctrl.generation,
        };
        // A tick is meaningless while still pending.
        assert!(!ctrl.on_timer(tick));
    }

    #[test]
    fn test_deck_image_counts_drive_wrap() {
        let deck = CardDeck::new(vec![
            Card::new("a", "Two", "x").with_images(["1", "2"]),
            Card::new("b", "None", "x"),
        ]);
        let mut ctrl = FocusCarouselController::manual(CarouselConfig::default()).with_deck(&deck);
        ctrl.initialize(0);
        ctrl.advance(ms(2000 + 2 * 2000));
        assert_eq!(ctrl.preview_state(), active(0, 0));

        // Cards without images and indices past the deck use the default.
        for index in [1, 9] {
            ctrl.focus_change(index);
            ctrl.advance(ms(2000 + 2 * 2000));
            assert_eq!(ctrl.preview_state(), active(index, 2));
        }
    }

    #[test]
    fn test_single_image_card_does_not_churn() {
        let deck = CardDeck::new(vec![Card::new("a", "Solo", "x").with_images(["1"])]);
        let mut ctrl = FocusCarouselController::manual(CarouselConfig::default()).with_deck(&deck);
        ctrl.initialize(0);
        ctrl.advance(ms(2000));
        let revision = ctrl.revision();

        assert_eq!(ctrl.advance(ms(6000)), 0);
        assert_eq!(ctrl.revision(), revision);
        assert_eq!(ctrl.preview_state(), active(0, 0));
        assert_eq!(ctrl.live_timers(), 1);
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut ctrl = controller();
        assert_eq!(ctrl.revision(), 0);
        ctrl.initialize(0);
        assert_eq!(ctrl.revision(), 1);
        ctrl.advance(ms(2000));
        assert_eq!(ctrl.revision(), 2);
        ctrl.advance(ms(2000));
        assert_eq!(ctrl.revision(), 3);
        ctrl.dispose();
        assert_eq!(ctrl.revision(), 4);
        ctrl.dispose();
        assert_eq!(ctrl.revision(), 4);
    }

    #[test]
    fn test_custom_timing() {
        let config = CarouselConfig::default()
            .with_debounce(ms(300))
            .with_slide_interval(ms(100));
        let mut ctrl = FocusCarouselController::manual(config);
        ctrl.initialize(2);
        ctrl.advance(ms(300));
        assert_eq!(ctrl.preview_state(), active(2, 0));
        ctrl.advance(ms(100));
        assert_eq!(ctrl.preview_state(), active(2, 1));
    }
}
