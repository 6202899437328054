use crate::actuator_session::motion_command::MotionCommand;
use crate::actuator_session::session::ActuatorSession;
use crate::error::ActuationError;
use crate::library::logger::interface::Logger;
use crate::plotter_controller::controller::PlotterController;
use crate::plotter_controller::core::{Effect, Event};
use std::sync::mpsc::{sync_channel, Sender, SyncSender, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;

impl PlotterController {
    pub(super) fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::EnableIdleMotion => self.idle_motion.enable(),
            // Once this returns no idle stroke can be queued ahead of the response.
            Effect::DisableIdleMotion => self.idle_motion.disable(),
            Effect::DrawResponse => self.request_response(),
        }
    }

    fn request_response(&self) {
        let sent = match &self.response_requests {
            Some(requests) => requests.try_send(()),
            None => Err(TrySendError::Disconnected(())),
        };
        // A rejected request still has to free the response slot.
        let rejected = match sent {
            Ok(()) => return,
            Err(TrySendError::Full(())) => ActuationError::QueueFull,
            Err(TrySendError::Disconnected(())) => ActuationError::WorkerGone,
        };
        let _ = self
            .logger
            .error(&format!("Response request rejected: {}", rejected));
        let _ = self.event_sender.send(Event::ResponseDone(Err(rejected)));
    }
}

/// Starts the one task that draws responses. Requests beyond the single
/// queued slot are rejected rather than piling up.
pub fn spawn_response_worker(
    session: Arc<ActuatorSession>,
    program: Vec<MotionCommand>,
    events: Sender<Event>,
    logger: Arc<dyn Logger + Send + Sync>,
) -> (SyncSender<()>, JoinHandle<()>) {
    let (requests, request_receiver) = sync_channel::<()>(1);

    let worker = std::thread::spawn(move || {
        for () in request_receiver {
            let _ = logger.info(&format!("Drawing response ({} commands)", program.len()));
            let result = session.submit_program(program.clone());
            if events.send(Event::ResponseDone(result)).is_err() {
                break;
            }
        }
    });

    (requests, worker)
}
