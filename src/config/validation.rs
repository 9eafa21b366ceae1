//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Smallest frame limit that still fits a login line with a long name.
const MIN_FRAME_BYTES: usize = 64;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chat.default_room must not be blank")]
    BlankDefaultRoom,
    #[error("chat.outbound_queue must be at least 1")]
    ZeroOutboundQueue,
    #[error("chat.max_frame_bytes must be at least 64, got {0}")]
    FrameLimitTooSmall(usize),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let chat = &config.chat;

    if chat.default_room.trim().is_empty() {
        errors.push(ValidationError::BlankDefaultRoom);
    }

    if chat.outbound_queue == 0 {
        errors.push(ValidationError::ZeroOutboundQueue);
    }

    if chat.max_frame_bytes < MIN_FRAME_BYTES {
        errors.push(ValidationError::FrameLimitTooSmall(chat.max_frame_bytes));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
