use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures that abort the process before the frame loop starts.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("frame source '{}' not found", .0.display())]
    SourceNotFound(PathBuf),

    #[error("cannot open frame source '{}': {reason}", .path.display())]
    StreamOpen { path: PathBuf, reason: String },

    #[error("cannot load detection model '{}': {reason}", .path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("cannot connect to plotter: {0}")]
    Connect(#[from] ConnectError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot install stop handler: {0}")]
    Signal(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("plotter unreachable: {0}")]
    Unreachable(String),

    #[error("plotter is already claimed by another session")]
    AlreadyClaimed,

    #[error("session was already disconnected")]
    SessionClosed,
}

/// A motion program failed after the session was up. Recovered by the controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActuationError {
    #[error("plotter session is not connected")]
    NotConnected,

    #[error("motion program did not complete within {0:?}")]
    Timeout(Duration),

    #[error("plotter command failed: {0}")]
    Device(String),

    #[error("plotter queue is full")]
    QueueFull,

    #[error("plotter worker is gone")]
    WorkerGone,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("confidence threshold {0} is outside [0, 1]")]
    Threshold(f32),

    #[error("allow-list is empty")]
    EmptyAllowList,

    #[error("pen-down speed {0} is outside 0-100")]
    PenDownSpeed(u8),

    #[error("drawable area {width}x{height} must be positive")]
    Bounds { width: f64, height: f64 },

    #[error("response shape does not fit the drawable area")]
    ShapeOutOfBounds,

    #[error("response shape needs at least 3 segments, got {0}")]
    Segments(usize),

    #[error("utc offset of {0} hours is invalid")]
    UtcOffset(i32),

    #[error("{0}")]
    Invalid(String),
}
