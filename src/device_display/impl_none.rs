use crate::device_display::interface::{DeviceDisplay, Indicator};
use std::error::Error;

/// Discards every update.
pub struct DeviceDisplayNone;

impl DeviceDisplay for DeviceDisplayNone {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn write_line(&mut self, _line: u8, _text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn set_indicator(&mut self, _indicator: Indicator) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
