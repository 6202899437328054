use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotterError {
    #[error("device unreachable: {0}")]
    Unreachable(String),

    #[error("device is already connected")]
    AlreadyClaimed,

    #[error("device is not connected")]
    NotConnected,

    #[error("motion failed: {0}")]
    Motion(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Absolute-position pen plotter. Every call blocks until the motion is physically done.
pub trait DevicePlotter: Send + Sync {
    /// `pen_down_speed` is a percentage of the maximum drawing speed.
    fn connect(&self, pen_down_speed: u8) -> Result<(), PlotterError>;
    fn disconnect(&self) -> Result<(), PlotterError>;
    fn move_to(&self, x: f64, y: f64) -> Result<(), PlotterError>;
    fn line_to(&self, x: f64, y: f64) -> Result<(), PlotterError>;
}
