//! Scroll-driven card focus carousel.
//!
//! A horizontal strip of cards reports scroll samples; the card nearest the
//! scroll position becomes the focus target, and once the focus holds for a
//! debounce window that card enters preview and rotates through its images.
//! The state machine is framework independent and runs on either a virtual
//! clock (`timers::ManualScheduler`) or real tokio timers (`runtime`).

pub mod carousel;
pub mod config;
pub mod error;
pub mod generation;
pub mod layout;
pub mod models;
pub mod runtime;
pub mod timers;

pub use carousel::{CarouselSnapshot, FocusCarouselController, PreviewState};
pub use config::CarouselConfig;
pub use error::{CarouselError, Result};
