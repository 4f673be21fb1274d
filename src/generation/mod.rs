//! Simulated image generation for the prank and template detail pages.
//!
//! There is no model behind it: a fixed timeline of status messages plays out
//! and ends in "Done!".

pub mod simulator;

pub use simulator::*;
