use crate::device_display::interface::{DeviceDisplay, Indicator};
use crate::plotter_controller::core::{ControllerState, Model, ResponseSlot};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone)]
pub struct Render {
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
}

impl Render {
    pub fn new(device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>) -> Self {
        Self { device_display }
    }

    pub fn init(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.device_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .init()
    }

    pub fn render(&self, model: &Model) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut device_display = self
            .device_display
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        device_display.clear()?;

        let indicator = match model.state {
            ControllerState::Responding => {
                device_display.write_line(0, "Pothole detected")?;
                Indicator::Circle
            }
            ControllerState::Idle => {
                device_display.write_line(0, "Idle motion")?;
                Indicator::Cross
            }
        };

        let status = match (&model.last_failure, model.response) {
            (_, ResponseSlot::InFlight) => format!("Drawing #{}", model.responses_issued),
            (Some(_), ResponseSlot::Free) => "Plotter fault".to_string(),
            (None, ResponseSlot::Free) => format!("Circles: {}", model.responses_issued),
        };
        device_display.write_line(1, &status)?;

        device_display.set_indicator(indicator)?;

        Ok(())
    }
}
