//! Timing and sizing configuration for the carousel.
//!
//! Defaults match the behaviour of the pranks landing page. Each value can be
//! overridden through the environment; command line flags override both.

use std::time::Duration;

/// Time a card must stay focused before its preview starts.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2000;

/// Period of the preview slideshow.
pub const DEFAULT_SLIDE_INTERVAL_MS: u64 = 2000;

/// Image count used for the slideshow wrap when a card does not report its own.
pub const DEFAULT_SLIDES_PER_CARD: usize = 3;

/// Zero-length timers would re-arm forever at the same instant.
const MIN_TIMER: Duration = Duration::from_millis(1);

const ENV_DEBOUNCE_MS: &str = "FOCUS_CAROUSEL_DEBOUNCE_MS";
const ENV_SLIDE_MS: &str = "FOCUS_CAROUSEL_SLIDE_MS";
const ENV_SLIDES_PER_CARD: &str = "FOCUS_CAROUSEL_SLIDES_PER_CARD";

/// Configuration for the focus carousel controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselConfig {
    /// Debounce window before a focused card enters preview (default: 2000ms)
    pub debounce: Duration,
    /// Slideshow period while a card is in preview (default: 2000ms)
    pub slide_interval: Duration,
    /// Fallback image count per card (default: 3)
    pub slides_per_card: usize,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            slide_interval: Duration::from_millis(DEFAULT_SLIDE_INTERVAL_MS),
            slides_per_card: DEFAULT_SLIDES_PER_CARD,
        }
    }
}

impl CarouselConfig {
    /// Defaults with any `FOCUS_CAROUSEL_*` environment overrides applied.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            debounce: env_millis(ENV_DEBOUNCE_MS).unwrap_or(defaults.debounce),
            slide_interval: env_millis(ENV_SLIDE_MS).unwrap_or(defaults.slide_interval),
            slides_per_card: std::env::var(ENV_SLIDES_PER_CARD)
                .ok()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.slides_per_card),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce.max(MIN_TIMER);
        self
    }

    pub fn with_slide_interval(mut self, interval: Duration) -> Self {
        self.slide_interval = interval.max(MIN_TIMER);
        self
    }

    pub fn with_slides_per_card(mut self, count: usize) -> Self {
        self.slides_per_card = count.max(1);
        self
    }
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
        .map(Duration::from_millis)
}
