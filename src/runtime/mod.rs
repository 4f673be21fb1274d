//! Tokio host for the carousel controller.

pub mod service;

pub use service::*;
