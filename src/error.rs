use std::time::Duration;
use thiserror::Error;

/// Why a clipboard write did not happen
#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard is unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard access was denied")]
    PermissionDenied,
    #[error("clipboard write did not settle within {0:?}")]
    TimedOut(Duration),
    #[error("clipboard tool `{tool}` exited with {status}")]
    ToolFailed { tool: String, status: String },
    #[error("could not encode payload: {0}")]
    Encode(String),
    #[error("clipboard I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Form input the submit button refuses to send
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your full name.")]
    MissingName,
    #[error("Please enter your email.")]
    MissingEmail,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("max tilt must be within (0, 45] degrees, got {0}")]
    TiltOutOfRange(f64),
    #[error("invalid interest sheet url `{url}`: {reason}")]
    InvalidDestination { url: String, reason: String },
    #[error("clipboard timeout must be greater than zero")]
    ZeroClipboardTimeout,
    #[error("cell size must be non-zero, got {width}x{height}")]
    ZeroCellSize { width: u16, height: u16 },
}
