//! Utility functions and helpers
//!
//! Timers, debouncing and the in-memory log buffer.

pub mod debouncer;
pub mod logging;
pub mod timer;
