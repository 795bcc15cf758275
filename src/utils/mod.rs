//! Utility Module
//!
//! - [`time`]: Time-related utilities

pub mod time;

pub use time::Timer;
