//! Scroll-driven card focus, preview and slideshow choreography.
//!
//! This module provides:
//! - `FocusCarouselController` - Debounced focus tracking with a preview slideshow
//! - `CardPresentation` - Per-card render treatment derived from a snapshot
//! - `SlideAutoplay` - Fixed-period image rotation for the detail page

pub mod autoplay;
pub mod controller;
pub mod presentation;
pub mod state;

pub use autoplay::*;
pub use controller::*;
pub use presentation::*;
pub use state::*;
