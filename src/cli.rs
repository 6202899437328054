use crate::actuator_session::motion_command::Bounds;
use crate::config::{Config, DisplayKind, PlotterKind};
use crate::error::ConfigError;
use chrono::FixedOffset;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlotterArg {
    /// Logs commands and simulates drawing time.
    Fake,
    /// Records the pen path and writes it as SVG on shutdown.
    Svg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayArg {
    Console,
    Gui,
    Log,
    None,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Draw on a pen plotter whenever the camera sees a pothole"
)]
pub struct Args {
    /// Directory of frame images, processed in file name order.
    /// Without it a synthetic frame stream is used.
    #[arg(long, env = "PLOTTER_SOURCE")]
    pub source: Option<PathBuf>,

    /// ONNX detection model (needs the `tract` feature).
    /// Without it detections are random.
    #[arg(long, env = "PLOTTER_MODEL")]
    pub model: Option<PathBuf>,

    /// Class names of the model, one per line.
    #[arg(long, env = "PLOTTER_LABELS_FILE")]
    pub labels_file: Option<PathBuf>,

    /// Detections must score strictly above this (0.0-1.0).
    #[arg(long, env = "PLOTTER_THRESHOLD", default_value_t = 0.6)]
    pub threshold: f32,

    /// Comma-separated class labels that trigger a response.
    #[arg(
        long,
        env = "PLOTTER_ALLOW",
        value_delimiter = ',',
        default_value = "pothole"
    )]
    pub allow: Vec<String>,

    #[arg(long, env = "PLOTTER_KIND", value_enum, default_value = "fake")]
    pub plotter: PlotterArg,

    /// Where the svg plotter writes its trace.
    #[arg(long, env = "PLOTTER_SVG_OUT", default_value = "plot.svg")]
    pub svg_out: PathBuf,

    /// Pen-down speed in percent (0-100).
    #[arg(long, env = "PLOTTER_PEN_DOWN_SPEED", default_value_t = 50)]
    pub pen_down_speed: u8,

    /// Drawable area width in millimetres.
    #[arg(long, env = "PLOTTER_BOUNDS_WIDTH", default_value_t = 210.0)]
    pub bounds_width: f64,

    /// Drawable area height in millimetres.
    #[arg(long, env = "PLOTTER_BOUNDS_HEIGHT", default_value_t = 297.0)]
    pub bounds_height: f64,

    /// Pause between idle strokes.
    #[arg(long, env = "PLOTTER_IDLE_PAUSE_MS", default_value_t = 0)]
    pub idle_pause_ms: u64,

    /// Seed for idle strokes and the random classifier.
    #[arg(long, env = "PLOTTER_SEED")]
    pub seed: Option<u64>,

    /// Give up on a motion program after this long. 0 waits forever.
    #[arg(long, env = "PLOTTER_SUBMIT_TIMEOUT_SECS", default_value_t = 30)]
    pub submit_timeout_secs: u64,

    #[arg(long, env = "PLOTTER_DISPLAY", value_enum, default_value = "console")]
    pub display: DisplayArg,

    /// Write annotated frames here as numbered PNG files.
    #[arg(long, env = "PLOTTER_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Log timestamps in this offset from UTC.
    #[arg(long, env = "PLOTTER_UTC_OFFSET_HOURS", default_value_t = 0, allow_hyphen_values = true)]
    pub utc_offset_hours: i32,

    /// Length of the synthetic frame stream.
    #[arg(long, env = "PLOTTER_FAKE_FRAMES", default_value_t = 300)]
    pub fake_frames: u64,

    /// Delay between frames.
    #[arg(long, env = "PLOTTER_FRAME_INTERVAL_MS", default_value_t = 100)]
    pub frame_interval_ms: u64,
}

fn read_labels(path: &Path) -> Result<Vec<String>, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("labels file '{}': {}", path.display(), e)))?;
    let labels: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if labels.is_empty() {
        return Err(ConfigError::Invalid(format!(
            "labels file '{}' has no class names",
            path.display()
        )));
    }
    Ok(labels)
}

impl Args {
    /// Builds and validates the runtime configuration.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let defaults = Config::default();

        let logger_timezone = FixedOffset::east_opt(self.utc_offset_hours.saturating_mul(3600))
            .ok_or(ConfigError::UtcOffset(self.utc_offset_hours))?;

        let model_class_names = match &self.labels_file {
            Some(path) => read_labels(path)?,
            None => defaults.model_class_names.clone(),
        };

        let plotter = match self.plotter {
            PlotterArg::Fake => defaults.plotter.clone(),
            PlotterArg::Svg => PlotterKind::Svg {
                output: self.svg_out,
            },
        };

        let display = match self.display {
            DisplayArg::Console => DisplayKind::Console,
            DisplayArg::Gui => DisplayKind::Gui,
            DisplayArg::Log => DisplayKind::Log,
            DisplayArg::None => DisplayKind::None,
        };

        let config = Config {
            source_path: self.source,
            fake_frame_count: self.fake_frames,
            frame_interval: Duration::from_millis(self.frame_interval_ms),
            model_path: self.model,
            model_class_names,
            confidence_threshold: self.threshold,
            allowed_labels: self.allow,
            plotter,
            plotter_bounds: Bounds::new(self.bounds_width, self.bounds_height),
            pen_down_speed: self.pen_down_speed,
            submit_timeout: match self.submit_timeout_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            idle_pause: Duration::from_millis(self.idle_pause_ms),
            seed: self.seed,
            display,
            output_dir: self.output_dir,
            logger_timezone,
            ..defaults
        };
        config.validate()?;
        Ok(config)
    }
}
