//! Unified error handling for chatd.
//!
//! Login failures are the only errors a client ever sees; everything else is
//! logged and absorbed by the connection that hit it.

use thiserror::Error;

// ============================================================================
// Login Errors (awaiting-login state)
// ============================================================================

/// Errors that can occur while a session is trying to claim a display name.
///
/// The `Display` text is the client-visible reason, so the messages here are
/// part of the wire contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Логин не может быть пустым")]
    EmptyName,

    #[error("Логин уже занят")]
    NameTaken(String),
}

impl LoginError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "empty_name",
            Self::NameTaken(_) => "name_taken",
        }
    }

    /// Render the `ERROR: <reason>` line sent back to the client.
    pub fn to_reply(&self) -> String {
        format!("ERROR: {self}")
    }
}

// ============================================================================
// Send Errors (outbound queue)
// ============================================================================

/// Failure to hand a frame to a session's writer.
///
/// Either way the frame is lost; the caller decides whether that matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The session was closed or its writer task has exited.
    #[error("session closed")]
    Closed,

    /// The bounded outbound queue is saturated (slow reader).
    #[error("outbound queue full")]
    QueueFull,
}

impl SendError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::QueueFull => "queue_full",
        }
    }
}
