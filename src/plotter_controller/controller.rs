use crate::actuator_session::session::ActuatorSession;
use crate::config::Config;
use crate::detection_filter::QualifyingEvent;
use crate::device_display::interface::DeviceDisplay;
use crate::idle_motion::{IdleMotionConfig, IdleMotionDriver};
use crate::library::logger::interface::Logger;
use crate::plotter_controller::core::{init, transition, ControllerState, Event, Model, ResponseSlot};
use crate::plotter_controller::render::Render;
use crate::plotter_controller::run_effect::spawn_response_worker;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Drives the plotter from per-frame detection results.
///
/// Owns the idle-motion driver and the single response worker; shares the
/// session with both. Completed responses are folded in at the start of the
/// next frame.
pub struct PlotterController {
    pub(super) model: Model,
    pub(super) session: Arc<ActuatorSession>,
    pub(super) idle_motion: IdleMotionDriver,
    pub(super) response_requests: Option<SyncSender<()>>,
    pub(super) response_worker: Option<JoinHandle<()>>,
    pub(super) event_sender: Sender<Event>,
    pub(super) event_receiver: Receiver<Event>,
    pub(super) render: Render,
    pub(super) logger: Arc<dyn Logger + Send + Sync>,
}

impl PlotterController {
    pub fn start(
        config: &Config,
        session: Arc<ActuatorSession>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        let logger = logger.with_namespace("controller");

        let idle_motion = IdleMotionDriver::spawn(
            Arc::clone(&session),
            IdleMotionConfig {
                bounds: config.plotter_bounds,
                pause: config.idle_pause,
                seed: config.seed,
            },
            Arc::clone(&logger),
        );

        let (event_sender, event_receiver) = channel();
        let (response_requests, response_worker) = spawn_response_worker(
            Arc::clone(&session),
            config.response_shape.program(),
            event_sender.clone(),
            logger.with_namespace("response"),
        );

        let render = Render::new(device_display);
        if let Err(e) = render.init() {
            let _ = logger.error(&format!("Display init failed: {}", e));
        }

        let (model, effects) = init();
        let controller = Self {
            model,
            session,
            idle_motion,
            response_requests: Some(response_requests),
            response_worker: Some(response_worker),
            event_sender,
            event_receiver,
            render,
            logger,
        };
        controller.render_model();
        for effect in effects {
            controller.run_effect(effect);
        }
        controller
    }

    pub fn state(&self) -> ControllerState {
        self.model.state
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    #[cfg(test)]
    pub fn is_idle_motion_enabled(&self) -> bool {
        self.idle_motion.is_enabled()
    }

    /// Feeds one frame's filter result through the state machine.
    pub fn on_frame(&mut self, frame_index: u64, event: &QualifyingEvent) -> ControllerState {
        self.drain_completed();
        self.dispatch(Event::FrameClassified {
            frame_index,
            qualifies: event.qualifies(),
        });
        self.model.state
    }

    /// Blocks until the in-flight response (if any) has completed and been
    /// folded into the model. Returns `false` on timeout.
    pub fn wait_for_response(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.model.response == ResponseSlot::InFlight {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.event_receiver.recv_timeout(remaining) {
                Ok(event) => self.dispatch(event),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return false
                }
            }
        }
        true
    }

    fn drain_completed(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.dispatch(event);
        }
    }

    pub(super) fn dispatch(&mut self, event: Event) {
        if let Event::ResponseDone(Err(e)) = &event {
            let _ = self
                .logger
                .error(&format!("Response failed, resuming idle motion: {}", e));
        }

        let old_model = self.model.clone();
        let (new_model, effects) = transition(old_model.clone(), event.clone());

        if new_model != old_model || !effects.is_empty() {
            let _ = self.logger.info(&format!(
                "\nold model:\n\t{:?}\n\nevent:\n\t{:?}\n\nnew model:\n\t{:?}\n\neffects:\n\t{:?}",
                old_model, event, new_model, effects
            ));
        }

        let changed = new_model != old_model;
        self.model = new_model;
        if changed {
            self.render_model();
        }

        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn render_model(&self) {
        if let Err(e) = self.render.render(&self.model) {
            let _ = self.logger.error(&format!("Render failed: {}", e));
        }
    }

    /// Stops idle motion, lets the response worker finish, then disconnects
    /// the session. Idempotent.
    pub fn shutdown(&mut self) {
        self.idle_motion.stop();

        self.response_requests.take();
        if let Some(worker) = self.response_worker.take() {
            if worker.join().is_err() {
                let _ = self.logger.error("Response worker panicked");
            }
        }
        self.drain_completed();

        self.session.disconnect();
    }
}

impl Drop for PlotterController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
