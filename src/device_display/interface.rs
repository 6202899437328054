use std::error::Error;

/// The plotter indicator picture: a circle while a target is in view, a cross otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indicator {
    Circle,
    #[default]
    Cross,
}

/// Two-line status display with an indicator picture.
pub trait DeviceDisplay: Send + Sync {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Write text to a line (0 or 1). Longer text is truncated.
    fn write_line(&mut self, line: u8, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn set_indicator(&mut self, indicator: Indicator) -> Result<(), Box<dyn Error + Send + Sync>>;

    fn chars_per_line(&self) -> u8 {
        24
    }
}
