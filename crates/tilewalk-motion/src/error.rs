#![warn(missing_docs)]

//! Error types for the motion library.
//!
//! This module defines the errors raised while building a player, loading its
//! animation table, or switching animation clips.

use core::fmt;

use crate::animation::Action;

/// Errors that can occur while driving a player.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Error for invalid velocity.
    /// This variant is returned when a velocity is provided that is not positive and finite.
    InvalidVelocity(&'static str),
    /// A clip required by an action was not present in the loaded clip table.
    /// Clip labels are matched exactly and case-sensitively.
    MissingAnimation(Action),
    /// An animation operation was attempted before the model finished loading.
    NotLoaded(&'static str),
    /// The load transition was triggered a second time.
    AlreadyLoaded(&'static str),
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidVelocity(msg) => write!(f, "Invalid velocity: {}", msg),
            MotionError::MissingAnimation(action) => {
                write!(f, "Missing animation clip for label '{}'", action.label())
            }
            MotionError::NotLoaded(msg) => write!(f, "Model not loaded: {}", msg),
            MotionError::AlreadyLoaded(msg) => write!(f, "Model already loaded: {}", msg),
        }
    }
}

impl core::error::Error for MotionError {}
