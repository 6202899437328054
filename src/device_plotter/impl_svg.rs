use crate::actuator_session::motion_command::Bounds;
use crate::device_plotter::interface::{DevicePlotter, PlotterError};
use crate::library::logger::interface::Logger;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

struct SvgTrace {
    out: BufWriter<File>,
    empty: bool,
}

/// Headless plotter that streams the pen path into an SVG file. The file is
/// complete once the plotter is disconnected.
pub struct DevicePlotterSvg {
    output: PathBuf,
    bounds: Bounds,
    trace: Mutex<Option<SvgTrace>>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl DevicePlotterSvg {
    pub fn new(output: PathBuf, bounds: Bounds, logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            output,
            bounds,
            trace: Mutex::new(None),
            logger: logger.with_namespace("plotter").with_namespace("svg"),
        }
    }

    fn push(&self, op: char, x: f64, y: f64) -> Result<(), PlotterError> {
        let mut guard = self.trace.lock().unwrap_or_else(PoisonError::into_inner);
        let trace = guard.as_mut().ok_or(PlotterError::NotConnected)?;
        let separator = if trace.empty { "" } else { " " };
        write!(trace.out, "{}{} {:.2} {:.2}", separator, op, x, y)?;
        trace.empty = false;
        Ok(())
    }

    fn open(&self) -> Result<SvgTrace, PlotterError> {
        let file = File::create(&self.output).map_err(|e| {
            PlotterError::Unreachable(format!("cannot create {}: {}", self.output.display(), e))
        })?;
        let mut out = BufWriter::new(file);
        write!(
            out,
            concat!(
                "<svg xmlns=\"http://www.w3.org/2000/svg\" ",
                "width=\"{w}mm\" height=\"{h}mm\" viewBox=\"0 0 {w} {h}\">\n",
                "  <path fill=\"none\" stroke=\"black\" stroke-width=\"0.3\" d=\""
            ),
            w = self.bounds.width,
            h = self.bounds.height,
        )?;
        Ok(SvgTrace { out, empty: true })
    }
}

impl DevicePlotter for DevicePlotterSvg {
    fn connect(&self, pen_down_speed: u8) -> Result<(), PlotterError> {
        let mut trace = self.trace.lock().unwrap_or_else(PoisonError::into_inner);
        if trace.is_some() {
            return Err(PlotterError::AlreadyClaimed);
        }
        if let Some(parent) = self.output.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(PlotterError::Unreachable(format!(
                    "output directory {} does not exist",
                    parent.display()
                )));
            }
        }
        *trace = Some(self.open()?);
        let _ = self.logger.info(&format!(
            "Tracing to {} (pen-down speed {}%)",
            self.output.display(),
            pen_down_speed
        ));
        Ok(())
    }

    fn disconnect(&self) -> Result<(), PlotterError> {
        let trace = self
            .trace
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut trace) = trace else {
            return Ok(());
        };
        trace.out.write_all(b"\"/>\n</svg>\n")?;
        trace.out.flush()?;
        let _ = self
            .logger
            .info(&format!("Wrote trace to {}", self.output.display()));
        Ok(())
    }

    fn move_to(&self, x: f64, y: f64) -> Result<(), PlotterError> {
        self.push('M', x, y)
    }

    fn line_to(&self, x: f64, y: f64) -> Result<(), PlotterError> {
        self.push('L', x, y)
    }
}
