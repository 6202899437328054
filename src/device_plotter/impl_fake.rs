use crate::device_plotter::interface::{DevicePlotter, PlotterError};
use crate::library::logger::interface::Logger;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct DevicePlotterFake {
    connected: AtomicBool,
    command_delay: Duration,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl DevicePlotterFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, command_delay: Duration) -> Self {
        Self {
            connected: AtomicBool::new(false),
            command_delay,
            logger: logger.with_namespace("plotter").with_namespace("fake"),
        }
    }

    fn ensure_connected(&self) -> Result<(), PlotterError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PlotterError::NotConnected)
        }
    }
}

impl DevicePlotter for DevicePlotterFake {
    fn connect(&self, pen_down_speed: u8) -> Result<(), PlotterError> {
        if self
            .connected
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PlotterError::AlreadyClaimed);
        }
        let _ = self.logger.info(&format!(
            "Plotter connected (pen-down speed {}%)",
            pen_down_speed
        ));
        Ok(())
    }

    fn disconnect(&self) -> Result<(), PlotterError> {
        if self.connected.swap(false, Ordering::SeqCst) {
            let _ = self.logger.info("Plotter disconnected");
        }
        Ok(())
    }

    fn move_to(&self, x: f64, y: f64) -> Result<(), PlotterError> {
        self.ensure_connected()?;
        std::thread::sleep(self.command_delay);
        let _ = self.logger.info(&format!("move_to({:.1}, {:.1})", x, y));
        Ok(())
    }

    fn line_to(&self, x: f64, y: f64) -> Result<(), PlotterError> {
        self.ensure_connected()?;
        std::thread::sleep(self.command_delay);
        let _ = self.logger.info(&format!("line_to({:.1}, {:.1})", x, y));
        Ok(())
    }
}
