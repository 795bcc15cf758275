//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`KinemaError`] covers the recoverable failure modes of
//! the action core: data validation at construction boundaries (animations,
//! frame tables). Contract violations at call sites, such as running an
//! action without a live target or reversing an action with no defined
//! reverse, are treated as programming errors and panic instead.
//!
//! # Usage
//!
//! Fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, KinemaError>`.

use thiserror::Error;

/// The main error type for the Kinema engine.
#[derive(Error, Debug)]
pub enum KinemaError {
    // ========================================================================
    // Animation Data Errors
    // ========================================================================
    /// An animation was constructed with no frames.
    #[error("animation must contain at least one frame")]
    EmptyAnimation,

    /// An animation was constructed with a non-positive per-frame delay.
    #[error("animation frame delay must be positive (got {0})")]
    InvalidFrameDelay(f32),
}

/// Alias for `Result<T, KinemaError>`.
pub type Result<T> = std::result::Result<T, KinemaError>;
