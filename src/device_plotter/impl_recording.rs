use crate::actuator_session::motion_command::{MotionCommand, Point};
use crate::device_plotter::interface::{DevicePlotter, PlotterError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum PlotterCall {
    Connect(u8),
    Disconnect,
    Motion(MotionCommand),
}

/// Test double that records every call and can be told to fail motion.
#[derive(Default)]
pub struct DevicePlotterRecording {
    calls: Mutex<Vec<PlotterCall>>,
    connected: AtomicBool,
    unreachable: AtomicBool,
    failing: AtomicBool,
    command_delay: Mutex<Duration>,
}

impl DevicePlotterRecording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command_delay(delay: Duration) -> Self {
        let plotter = Self::default();
        *plotter.command_delay.lock().unwrap() = delay;
        plotter
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<PlotterCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn motions(&self) -> Vec<MotionCommand> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                PlotterCall::Motion(command) => Some(command),
                _ => None,
            })
            .collect()
    }

    fn record_motion(&self, command: MotionCommand) -> Result<(), PlotterError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(PlotterError::NotConnected);
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(PlotterError::Motion("simulated fault".to_string()));
        }
        let delay = *self
            .command_delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PlotterCall::Motion(command));
        Ok(())
    }
}

impl DevicePlotter for DevicePlotterRecording {
    fn connect(&self, pen_down_speed: u8) -> Result<(), PlotterError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(PlotterError::Unreachable("no device on port".to_string()));
        }
        if self.connected.swap(true, Ordering::SeqCst) {
            return Err(PlotterError::AlreadyClaimed);
        }
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PlotterCall::Connect(pen_down_speed));
        Ok(())
    }

    fn disconnect(&self) -> Result<(), PlotterError> {
        self.connected.store(false, Ordering::SeqCst);
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PlotterCall::Disconnect);
        Ok(())
    }

    fn move_to(&self, x: f64, y: f64) -> Result<(), PlotterError> {
        self.record_motion(MotionCommand::MoveTo(Point::new(x, y)))
    }

    fn line_to(&self, x: f64, y: f64) -> Result<(), PlotterError> {
        self.record_motion(MotionCommand::LineTo(Point::new(x, y)))
    }
}
