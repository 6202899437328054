use crate::device_display::interface::{DeviceDisplay, Indicator};
use std::error::Error;

const WIDTH: usize = 24;

pub struct DeviceDisplayConsole {
    display_buffer: [[char; WIDTH]; 2],
    indicator: Indicator,
}

impl DeviceDisplayConsole {
    pub fn new() -> Self {
        Self {
            display_buffer: [[' '; WIDTH]; 2],
            indicator: Indicator::default(),
        }
    }

    fn render_display(&self) {
        let symbol = match self.indicator {
            Indicator::Circle => 'O',
            Indicator::Cross => 'X',
        };
        println!("┌───┬{}┐", "─".repeat(WIDTH));
        for (i, row) in self.display_buffer.iter().enumerate() {
            let text: String = row.iter().collect();
            let cell = if i == 0 { symbol } else { ' ' };
            println!("│ {} │{}│", cell, text);
        }
        println!("└───┴{}┘", "─".repeat(WIDTH));
    }
}

impl DeviceDisplay for DeviceDisplayConsole {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.render_display();
        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.display_buffer = [[' '; WIDTH]; 2];
        Ok(())
    }

    fn write_line(&mut self, line: u8, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        if line >= 2 {
            return Err("Invalid line number".into());
        }

        self.display_buffer[line as usize] = [' '; WIDTH];
        for (i, c) in text.chars().take(WIDTH).enumerate() {
            self.display_buffer[line as usize][i] = c;
        }
        Ok(())
    }

    fn set_indicator(&mut self, indicator: Indicator) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.indicator = indicator;
        // Indicator is set last by the renderer, so draw once per update.
        self.render_display();
        Ok(())
    }
}
