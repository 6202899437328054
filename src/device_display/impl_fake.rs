use crate::device_display::interface::{DeviceDisplay, Indicator};
use crate::library::logger::interface::Logger;
use std::error::Error;
use std::sync::Arc;

/// Sends display updates to the log instead of a screen.
pub struct DeviceDisplayFake {
    logger: Arc<dyn Logger + Send + Sync>,
    lines: [String; 2],
    indicator: Indicator,
}

impl DeviceDisplayFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("display"),
            lines: Default::default(),
            indicator: Indicator::default(),
        }
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String; 2] {
        &self.lines
    }

    #[cfg(test)]
    pub fn indicator(&self) -> Indicator {
        self.indicator
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.lines = Default::default();
        Ok(())
    }

    fn write_line(&mut self, line: u8, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let width = self.chars_per_line() as usize;
        let slot = self
            .lines
            .get_mut(line as usize)
            .ok_or("Invalid line number")?;
        *slot = text.chars().take(width).collect();
        Ok(())
    }

    fn set_indicator(&mut self, indicator: Indicator) -> Result<(), Box<dyn Error + Send + Sync>> {
        if indicator != self.indicator {
            self.logger.info(&format!(
                "{:?} | {} | {}",
                indicator, self.lines[0], self.lines[1]
            ))?;
        }
        self.indicator = indicator;
        Ok(())
    }
}
