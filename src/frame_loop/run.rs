use crate::detection_filter::DetectionFilter;
use crate::frame_loop::overlay::OverlayWriter;
use crate::frame_source::interface::FrameSource;
use crate::image_classifier::interface::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::plotter_controller::controller::PlotterController;
use crate::plotter_controller::core::ControllerState;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameLoopSummary {
    pub frames: u64,
    pub qualifying_frames: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOutcome {
    pub frame_index: u64,
    pub matched: usize,
    pub state: ControllerState,
}

/// Pulls frames, classifies and filters them, and hands each result to the
/// controller in frame order.
pub struct FrameLoop {
    source: Box<dyn FrameSource>,
    classifier: Arc<dyn ImageClassifier + Send + Sync>,
    filter: DetectionFilter,
    overlay: Option<OverlayWriter>,
    stop: Arc<AtomicBool>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl FrameLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        classifier: Arc<dyn ImageClassifier + Send + Sync>,
        filter: DetectionFilter,
        overlay: Option<OverlayWriter>,
        stop: Arc<AtomicBool>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            source,
            classifier,
            filter,
            overlay,
            stop,
            logger: logger.with_namespace("frame_loop"),
        }
    }

    /// Processes one frame. `None` once the source is exhausted or broken.
    pub fn step(&mut self, controller: &mut PlotterController) -> Option<FrameOutcome> {
        let frame = match self.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => return None,
            Err(e) => {
                let _ = self.logger.error(&format!("Frame read failed: {}", e));
                return None;
            }
        };

        let detections = match self.classifier.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                let _ = self.logger.error(&format!(
                    "Classifier failed on frame {}: {}",
                    frame.index(),
                    e
                ));
                vec![]
            }
        };

        let event = self.filter.apply(&detections);

        if let Some(overlay) = &self.overlay {
            if let Err(e) = overlay.write(&frame, &event.matched) {
                let _ = self.logger.error(&format!(
                    "Overlay write failed for frame {}: {}",
                    frame.index(),
                    e
                ));
            }
        }

        let state = controller.on_frame(frame.index(), &event);
        Some(FrameOutcome {
            frame_index: frame.index(),
            matched: event.matched.len(),
            state,
        })
    }

    /// Runs until the source ends or the stop flag is raised.
    pub fn run(&mut self, controller: &mut PlotterController) -> FrameLoopSummary {
        let mut summary = FrameLoopSummary::default();
        let mut last_state = controller.state();

        while !self.stop.load(Ordering::SeqCst) {
            let Some(outcome) = self.step(controller) else {
                break;
            };
            summary.frames += 1;
            if outcome.matched > 0 {
                summary.qualifying_frames += 1;
            }
            if outcome.state != last_state {
                let _ = self.logger.info(&match outcome.state {
                    ControllerState::Responding => format!(
                        "Frame {}: {} match(es), responding",
                        outcome.frame_index, outcome.matched
                    ),
                    ControllerState::Idle => {
                        format!("Frame {}: back to idle motion", outcome.frame_index)
                    }
                });
                last_state = outcome.state;
            }
        }
        if self.stop.load(Ordering::SeqCst) {
            let _ = self.logger.info("Stop requested");
        }

        let _ = self.logger.info(&format!(
            "Processed {} frames, {} qualifying",
            summary.frames, summary.qualifying_frames
        ));
        summary
    }
}
