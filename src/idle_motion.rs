use crate::actuator_session::motion_command::{Bounds, MotionCommand, Point};
use crate::actuator_session::session::ActuatorSession;
use crate::library::enable_signal::EnableSignal;
use crate::library::logger::interface::Logger;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const FAILURE_BACKOFF: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct IdleMotionConfig {
    pub bounds: Bounds,
    pub pause: Duration,
    pub seed: Option<u64>,
}

/// A random stroke inside `bounds`: travel to a start point, then draw to an end point.
pub fn random_stroke(rng: &mut impl Rng, bounds: Bounds) -> Vec<MotionCommand> {
    let mut random_point = || {
        Point::new(
            rng.random_range(0.0..=bounds.width),
            rng.random_range(0.0..=bounds.height),
        )
    };
    let start = random_point();
    let end = random_point();
    vec![MotionCommand::MoveTo(start), MotionCommand::LineTo(end)]
}

/// Keeps the plotter busy with random strokes while enabled.
pub struct IdleMotionDriver {
    signal: Arc<EnableSignal>,
    worker: Option<JoinHandle<()>>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl IdleMotionDriver {
    /// Starts the background task, enabled.
    pub fn spawn(
        session: Arc<ActuatorSession>,
        config: IdleMotionConfig,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        let logger = logger.with_namespace("idle_motion");
        let signal = Arc::new(EnableSignal::new(true));
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let worker = {
            let signal = Arc::clone(&signal);
            let logger = Arc::clone(&logger);
            std::thread::spawn(move || run(session, signal, config, rng, logger))
        };

        Self {
            signal,
            worker: Some(worker),
            logger,
        }
    }

    pub fn enable(&self) {
        if !self.signal.is_enabled() {
            let _ = self.logger.info("Enabled");
        }
        self.signal.enable();
    }

    /// No new stroke is accepted once this returns. A stroke already handed
    /// to the session still finishes.
    pub fn disable(&self) {
        if self.signal.is_enabled() {
            let _ = self.logger.info("Disabled");
        }
        self.signal.disable();
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.signal.is_enabled()
    }

    pub fn stop(&mut self) {
        self.signal.stop();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                let _ = self.logger.error("Idle motion task panicked");
            }
            let _ = self.logger.info("Stopped");
        }
    }
}

impl Drop for IdleMotionDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    session: Arc<ActuatorSession>,
    signal: Arc<EnableSignal>,
    config: IdleMotionConfig,
    mut rng: StdRng,
    logger: Arc<dyn Logger + Send + Sync>,
) {
    loop {
        let accepted =
            match signal.when_enabled(|| session.enqueue(random_stroke(&mut rng, config.bounds))) {
                Some(accepted) => accepted,
                None => return,
            };

        let pause = match accepted.and_then(|pending| pending.wait()) {
            Ok(()) => config.pause,
            Err(e) => {
                let _ = logger.error(&format!("Idle stroke failed: {}", e));
                config.pause.max(FAILURE_BACKOFF)
            }
        };

        if !signal.pause(pause) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_plotter::impl_recording::DevicePlotterRecording;
    use crate::library::logger::impl_console::LoggerConsole;
    use chrono::{Offset, Utc};
    use std::time::Instant;

    fn logger() -> Arc<dyn Logger + Send + Sync> {
        Arc::new(LoggerConsole::new(Utc.fix()))
    }

    fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    fn config() -> IdleMotionConfig {
        IdleMotionConfig {
            bounds: Bounds::default(),
            pause: Duration::from_millis(1),
            seed: Some(7),
        }
    }

    #[test]
    fn test_random_stroke_stays_in_bounds() {
        let bounds = Bounds::new(10.0, 20.0);
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..500 {
            let stroke = random_stroke(&mut rng, bounds);
            assert_eq!(stroke.len(), 2);
            assert!(matches!(stroke[0], MotionCommand::MoveTo(_)));
            assert!(matches!(stroke[1], MotionCommand::LineTo(_)));
            assert!(stroke.iter().all(|c| bounds.contains(c.target())));
        }
    }

    #[test]
    fn test_random_stroke_is_reproducible_with_seed() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        assert_eq!(
            random_stroke(&mut a, Bounds::default()),
            random_stroke(&mut b, Bounds::default())
        );
    }

    #[test]
    fn test_driver_draws_pairs_while_enabled() {
        let plotter = Arc::new(DevicePlotterRecording::new());
        let session = Arc::new(ActuatorSession::open(plotter.clone(), 50, None, logger()).unwrap());
        let mut driver = IdleMotionDriver::spawn(session.clone(), config(), logger());

        assert!(wait_until(Duration::from_secs(2), || plotter.motions().len() >= 6));
        driver.stop();

        let motions = plotter.motions();
        assert_eq!(motions.len() % 2, 0);
        for pair in motions.chunks(2) {
            assert!(matches!(pair[0], MotionCommand::MoveTo(_)));
            assert!(matches!(pair[1], MotionCommand::LineTo(_)));
        }
    }

    #[test]
    fn test_disable_stops_new_strokes() {
        let plotter = Arc::new(DevicePlotterRecording::new());
        let session = Arc::new(ActuatorSession::open(plotter.clone(), 50, None, logger()).unwrap());
        let mut driver = IdleMotionDriver::spawn(session.clone(), config(), logger());
        assert!(wait_until(Duration::from_secs(2), || !plotter.motions().is_empty()));

        driver.disable();
        assert!(!driver.is_enabled());
        // Whatever was accepted before disable() drains through the session.
        session.submit_program(vec![]).unwrap();
        let settled = plotter.motions().len();
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(plotter.motions().len(), settled);

        driver.enable();
        assert!(wait_until(Duration::from_secs(2), || plotter.motions().len() > settled));
        driver.stop();
    }

    #[test]
    fn test_stop_is_idempotent_and_joins() {
        let plotter = Arc::new(DevicePlotterRecording::new());
        let session = Arc::new(ActuatorSession::open(plotter.clone(), 50, None, logger()).unwrap());
        let mut driver = IdleMotionDriver::spawn(session.clone(), config(), logger());

        driver.stop();
        driver.stop();

        let settled = plotter.motions().len();
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(plotter.motions().len(), settled);
    }

    #[test]
    fn test_failures_do_not_kill_driver() {
        let plotter = Arc::new(DevicePlotterRecording::new());
        let session = Arc::new(ActuatorSession::open(plotter.clone(), 50, None, logger()).unwrap());
        plotter.set_failing(true);
        let mut driver = IdleMotionDriver::spawn(
            session.clone(),
            IdleMotionConfig {
                pause: Duration::ZERO,
                ..config()
            },
            logger(),
        );

        std::thread::sleep(Duration::from_millis(20));
        plotter.set_failing(false);

        assert!(wait_until(Duration::from_secs(3), || !plotter.motions().is_empty()));
        driver.stop();
    }
}
