use crate::actuator_session::motion_command::Bounds;
use crate::error::ConfigError;
use crate::plotter_controller::response::CircleShape;
use chrono::{Offset, Utc};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum PlotterKind {
    Fake { command_delay: Duration },
    Svg { output: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayKind {
    Console,
    Gui,
    Log,
    None,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of frame images. `None` uses synthetic frames.
    pub source_path: Option<PathBuf>,
    pub fake_frame_count: u64,
    pub frame_interval: Duration,
    /// ONNX weights. `None` uses the random classifier.
    pub model_path: Option<PathBuf>,
    pub model_input_size: u32,
    pub model_class_names: Vec<String>,
    pub confidence_threshold: f32,
    pub allowed_labels: Vec<String>,
    pub plotter: PlotterKind,
    pub plotter_bounds: Bounds,
    pub pen_down_speed: u8,
    pub response_shape: CircleShape,
    pub submit_timeout: Option<Duration>,
    pub idle_pause: Duration,
    pub seed: Option<u64>,
    pub display: DisplayKind,
    pub output_dir: Option<PathBuf>,
    pub logger_timezone: chrono::FixedOffset,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_path: None,
            fake_frame_count: 300,
            frame_interval: Duration::from_millis(100),
            model_path: None,
            model_input_size: 640,
            model_class_names: vec!["pothole".to_string()],
            confidence_threshold: 0.6,
            allowed_labels: vec!["pothole".to_string()],
            plotter: PlotterKind::Fake {
                command_delay: Duration::from_millis(5),
            },
            plotter_bounds: Bounds::default(),
            pen_down_speed: 50,
            response_shape: CircleShape::default(),
            submit_timeout: Some(Duration::from_secs(30)),
            idle_pause: Duration::ZERO,
            seed: None,
            display: DisplayKind::Console,
            output_dir: None,
            logger_timezone: Utc.fix(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Threshold(self.confidence_threshold));
        }
        if self.allowed_labels.iter().all(|l| l.trim().is_empty()) {
            return Err(ConfigError::EmptyAllowList);
        }
        if self.pen_down_speed > 100 {
            return Err(ConfigError::PenDownSpeed(self.pen_down_speed));
        }
        let Bounds { width, height } = self.plotter_bounds;
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ConfigError::Bounds { width, height });
        }
        if self.response_shape.segments < 3 {
            return Err(ConfigError::Segments(self.response_shape.segments));
        }
        if !self.response_shape.fits(self.plotter_bounds) {
            return Err(ConfigError::ShapeOutOfBounds);
        }
        if self.model_input_size == 0 {
            return Err(ConfigError::Invalid("model input size must be positive".to_string()));
        }
        Ok(())
    }
}
