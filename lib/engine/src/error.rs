//! Error types for the checkers engine
//!
//! Every failure is reported to the caller; nothing here is retried internally.

use thiserror::Error;

/// Errors that can occur in the checkers engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Requested move or capture is not in the currently legal set
    #[error("Invalid action {0}, ask for hints to get the legal actions")]
    InvalidAction(String),

    /// Coordinate text has the wrong shape or lies outside the board
    #[error("Malformed coordinate: {0}")]
    MalformedCoordinate(String),

    /// Board or search parameters outside the supported range
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Color name other than black or white
    #[error("Unknown color {0}, expected black or white")]
    UnknownColor(String),

    /// Protocol line that matches no command
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
