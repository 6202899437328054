use crate::device_display::interface::{DeviceDisplay, Indicator};
use crate::library::logger::interface::Logger;
use eframe::egui;
use std::error::Error;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

const WIDTH: usize = 24;

#[derive(Clone)]
struct Screen {
    lines: [String; 2],
    indicator: Indicator,
}

#[derive(Clone)]
struct DisplayWindow {
    screen: Arc<Mutex<Screen>>,
}

impl DisplayWindow {
    fn paint_indicator(ui: &mut egui::Ui, indicator: Indicator) {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(160.0, 160.0), egui::Sense::hover());
        let painter = ui.painter();
        let stroke = egui::Stroke::new(6.0, egui::Color32::BLACK);
        painter.rect_filled(rect, 8.0, egui::Color32::WHITE);

        match indicator {
            Indicator::Circle => {
                painter.circle_stroke(rect.center(), rect.width() * 0.35, stroke);
            }
            Indicator::Cross => {
                let inner = rect.shrink(rect.width() * 0.2);
                painter.line_segment([inner.left_top(), inner.right_bottom()], stroke);
                painter.line_segment([inner.right_top(), inner.left_bottom()], stroke);
            }
        }
    }
}

impl eframe::App for DisplayWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let screen = self
            .screen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                Self::paint_indicator(ui, screen.indicator);
                ui.add_space(12.0);
                for line in screen.lines.iter() {
                    ui.label(egui::RichText::new(line).monospace().size(18.0));
                }
            });
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

/// Desktop window showing the indicator picture and the status lines.
pub struct DeviceDisplayGui {
    screen: Arc<Mutex<Screen>>,
    logger: Arc<dyn Logger + Send + Sync>,
}

/// Why the window thread ended, if it did not end cleanly.
fn window_failure(outcome: thread::Result<eframe::Result<()>>) -> Option<String> {
    match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e.to_string()),
        Err(panic) => Some(
            panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "window thread panicked".to_string()),
        ),
    }
}

impl DeviceDisplayGui {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            screen: Arc::new(Mutex::new(Screen {
                lines: Default::default(),
                indicator: Indicator::default(),
            })),
            logger: logger.with_namespace("display").with_namespace("gui"),
        }
    }

    fn screen(&self) -> std::sync::MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn init(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let window = DisplayWindow {
            screen: self.screen.clone(),
        };
        let logger = self.logger.clone();

        thread::spawn(move || {
            let options = eframe::NativeOptions {
                viewport: egui::ViewportBuilder::default()
                    .with_inner_size([320.0, 260.0])
                    .with_resizable(false),
                ..Default::default()
            };

            // Blocks this thread until the window is closed.
            let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
                eframe::run_native("Plotter", options, Box::new(|_cc| Box::new(window)))
            }));
            match window_failure(outcome) {
                Some(reason) => {
                    let _ = logger.error(&format!(
                        "Display window failed, updates are no longer shown: {}",
                        reason
                    ));
                }
                None => {
                    let _ = logger.info("Display window closed");
                }
            }
        });

        Ok(())
    }

    fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.screen().lines = Default::default();
        Ok(())
    }

    fn write_line(&mut self, line: u8, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        if line >= 2 {
            return Err("Invalid line number".into());
        }
        self.screen().lines[line as usize] = text.chars().take(WIDTH).collect();
        Ok(())
    }

    fn set_indicator(&mut self, indicator: Indicator) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.screen().indicator = indicator;
        Ok(())
    }
}
