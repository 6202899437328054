use crate::actuator_session::motion_command::MotionCommand;
use crate::device_plotter::interface::{DevicePlotter, PlotterError};
use crate::error::{ActuationError, ConnectError};
use crate::library::logger::interface::Logger;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{
    channel, sync_channel, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

/// Programs accepted but not yet started. A stalled plotter fills this up
/// and further programs are refused instead of piling up.
const QUEUE_DEPTH: usize = 4;

struct Job {
    program: Vec<MotionCommand>,
    done: Sender<Result<(), ActuationError>>,
}

enum SessionState {
    Ready,
    Connected {
        jobs: SyncSender<Job>,
        closing: Arc<AtomicBool>,
        worker: JoinHandle<()>,
    },
    Closed,
}

/// Completion handle for a program accepted by [`ActuatorSession::enqueue`].
#[must_use]
pub struct Pending {
    done: Receiver<Result<(), ActuationError>>,
    timeout: Option<Duration>,
}

impl Pending {
    pub fn wait(self) -> Result<(), ActuationError> {
        match self.timeout {
            Some(timeout) => match self.done.recv_timeout(timeout) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => Err(ActuationError::Timeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => Err(ActuationError::WorkerGone),
            },
            None => self.done.recv().unwrap_or(Err(ActuationError::WorkerGone)),
        }
    }
}

/// Sole owner of the plotter connection.
///
/// Programs are executed by one dispatch worker in the order they are
/// accepted, and a program is never interleaved with another one. Every
/// motion call on the device happens on that worker.
pub struct ActuatorSession {
    device: Arc<dyn DevicePlotter + Send + Sync>,
    pen_down_speed: u8,
    submit_timeout: Option<Duration>,
    state: Mutex<SessionState>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ActuatorSession {
    pub fn new(
        device: Arc<dyn DevicePlotter + Send + Sync>,
        pen_down_speed: u8,
        submit_timeout: Option<Duration>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            device,
            pen_down_speed,
            submit_timeout,
            state: Mutex::new(SessionState::Ready),
            logger: logger.with_namespace("session"),
        }
    }

    pub fn open(
        device: Arc<dyn DevicePlotter + Send + Sync>,
        pen_down_speed: u8,
        submit_timeout: Option<Duration>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, ConnectError> {
        let session = Self::new(device, pen_down_speed, submit_timeout, logger);
        session.connect()?;
        Ok(session)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn connect(&self) -> Result<(), ConnectError> {
        let mut state = self.lock_state();
        match *state {
            SessionState::Connected { .. } => return Ok(()),
            SessionState::Closed => return Err(ConnectError::SessionClosed),
            SessionState::Ready => {}
        }

        self.device
            .connect(self.pen_down_speed)
            .map_err(|e| match e {
                PlotterError::AlreadyClaimed => ConnectError::AlreadyClaimed,
                other => ConnectError::Unreachable(other.to_string()),
            })?;

        let (jobs, job_receiver) = sync_channel::<Job>(QUEUE_DEPTH);
        let closing = Arc::new(AtomicBool::new(false));
        let device = Arc::clone(&self.device);
        let worker_closing = Arc::clone(&closing);
        let logger = self.logger.with_namespace("worker");
        let worker = std::thread::spawn(move || {
            run_worker(device, job_receiver, worker_closing, logger)
        });

        *state = SessionState::Connected {
            jobs,
            closing,
            worker,
        };
        let _ = self.logger.info(&format!(
            "Connected (pen-down speed {}%)",
            self.pen_down_speed
        ));
        Ok(())
    }

    #[cfg(test)]
    pub fn is_connected(&self) -> bool {
        matches!(*self.lock_state(), SessionState::Connected { .. })
    }

    /// Hands `program` to the dispatch worker without waiting for it to run.
    pub fn enqueue(&self, program: Vec<MotionCommand>) -> Result<Pending, ActuationError> {
        let state = self.lock_state();
        let jobs = match &*state {
            SessionState::Connected { jobs, .. } => jobs,
            _ => return Err(ActuationError::NotConnected),
        };
        let (done, done_receiver) = channel();
        jobs.try_send(Job { program, done }).map_err(|e| match e {
            TrySendError::Full(_) => ActuationError::QueueFull,
            TrySendError::Disconnected(_) => ActuationError::WorkerGone,
        })?;
        Ok(Pending {
            done: done_receiver,
            timeout: self.submit_timeout,
        })
    }

    pub fn submit_program(&self, program: Vec<MotionCommand>) -> Result<(), ActuationError> {
        self.enqueue(program)?.wait()
    }

    #[cfg(test)]
    pub fn submit(&self, command: MotionCommand) -> Result<(), ActuationError> {
        self.submit_program(vec![command])
    }

    /// Lets the command in flight finish, answers every program that has not
    /// run yet with `NotConnected`, then releases the device. Idempotent; the
    /// session cannot be reconnected afterwards.
    pub fn disconnect(&self) {
        let previous = std::mem::replace(&mut *self.lock_state(), SessionState::Closed);

        if let SessionState::Connected {
            jobs,
            closing,
            worker,
        } = previous
        {
            closing.store(true, Ordering::SeqCst);
            drop(jobs);
            if worker.join().is_err() {
                let _ = self.logger.error("Dispatch worker panicked");
            }
            match self.device.disconnect() {
                Ok(()) => {
                    let _ = self.logger.info("Disconnected");
                }
                Err(e) => {
                    let _ = self.logger.error(&format!("Disconnect failed: {}", e));
                }
            }
        }
    }
}

impl Drop for ActuatorSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}

fn run_worker(
    device: Arc<dyn DevicePlotter + Send + Sync>,
    jobs: Receiver<Job>,
    closing: Arc<AtomicBool>,
    logger: Arc<dyn Logger + Send + Sync>,
) {
    for job in jobs {
        let result = execute(device.as_ref(), &job.program, &closing);
        if let Err(e) = &result {
            let _ = logger.error(&format!(
                "Program of {} commands aborted: {}",
                job.program.len(),
                e
            ));
        }
        // The submitter may have timed out and gone away.
        let _ = job.done.send(result);
    }
}

fn execute(
    device: &(dyn DevicePlotter + Send + Sync),
    program: &[MotionCommand],
    closing: &AtomicBool,
) -> Result<(), ActuationError> {
    for command in program {
        if closing.load(Ordering::SeqCst) {
            return Err(ActuationError::NotConnected);
        }
        let sent = match command {
            MotionCommand::MoveTo(point) => device.move_to(point.x, point.y),
            MotionCommand::LineTo(point) => device.line_to(point.x, point.y),
        };
        sent.map_err(|e| ActuationError::Device(e.to_string()))?;
    }
    Ok(())
}
