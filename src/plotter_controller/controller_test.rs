#[cfg(test)]
mod controller_test {
    use crate::actuator_session::motion_command::MotionCommand;
    use crate::actuator_session::session::ActuatorSession;
    use crate::config::Config;
    use crate::detection_filter::QualifyingEvent;
    use crate::device_display::impl_fake::DeviceDisplayFake;
    use crate::device_plotter::impl_recording::{DevicePlotterRecording, PlotterCall};
    use crate::image_classifier::interface::{BoundingBox, Detection};
    use crate::library::logger::impl_console::LoggerConsole;
    use crate::library::logger::interface::Logger;
    use crate::plotter_controller::controller::PlotterController;
    use crate::error::ActuationError;
    use crate::plotter_controller::core::{ControllerState, Effect, Event, ResponseSlot};
    use chrono::{Offset, Utc};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    struct Fixture {
        config: Config,
        plotter: Arc<DevicePlotterRecording>,
        controller: PlotterController,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_plotter(DevicePlotterRecording::new())
        }

        fn with_plotter(plotter: DevicePlotterRecording) -> Self {
            Self::build(plotter, Duration::from_secs(5))
        }

        fn build(plotter: DevicePlotterRecording, submit_timeout: Duration) -> Self {
            let config = Config {
                seed: Some(3),
                idle_pause: Duration::from_millis(1),
                submit_timeout: Some(submit_timeout),
                ..Config::default()
            };
            let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(Utc.fix()));
            let plotter = Arc::new(plotter);
            let session = Arc::new(
                ActuatorSession::open(plotter.clone(), config.pen_down_speed, config.submit_timeout, logger.clone())
                    .unwrap(),
            );
            let display = Arc::new(Mutex::new(DeviceDisplayFake::new(logger.clone())));
            let controller = PlotterController::start(&config, session, display, logger);

            Self {
                config,
                plotter,
                controller,
            }
        }
    }

    fn qualifying() -> QualifyingEvent {
        QualifyingEvent {
            matched: vec![Detection::new(
                BoundingBox::new(1.0, 1.0, 5.0, 5.0),
                "pothole",
                0.9,
            )],
        }
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

    fn position_of(haystack: &[MotionCommand], needle: &[MotionCommand]) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|window| window == needle)
    }

    #[test]
    fn test_starts_idle_with_idle_motion_running() {
        let mut fixture = Fixture::new();

        assert_eq!(fixture.controller.state(), ControllerState::Idle);
        assert!(fixture.controller.is_idle_motion_enabled());
        assert!(wait_until(Duration::from_secs(2), || fixture.plotter.motions().len() >= 2));

        fixture.controller.shutdown();
    }

    #[test]
    fn test_qualifying_frame_interrupts_idle_motion_with_response() {
        let mut fixture = Fixture::new();
        assert!(wait_until(Duration::from_secs(2), || !fixture.plotter.motions().is_empty()));

        let state = fixture.controller.on_frame(1, &qualifying());

        assert_eq!(state, ControllerState::Responding);
        assert!(!fixture.controller.is_idle_motion_enabled());
        assert!(fixture.controller.wait_for_response(Duration::from_secs(5)));

        let circle = fixture.config.response_shape.program();
        let motions = fixture.plotter.motions();
        let start = position_of(&motions, &circle).expect("response program recorded whole");
        // Idle strokes before the response are complete pairs, nothing follows it.
        assert_eq!(start % 2, 0);
        assert_eq!(start + circle.len(), motions.len());
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(fixture.plotter.motions().len(), motions.len());

        fixture.controller.shutdown();
    }

    #[test]
    fn test_repeated_qualifying_frames_are_coalesced() {
        let mut fixture = Fixture::with_plotter(DevicePlotterRecording::with_command_delay(
            Duration::from_millis(2),
        ));

        fixture.controller.on_frame(1, &qualifying());
        fixture.controller.on_frame(2, &qualifying());
        fixture.controller.on_frame(3, &qualifying());
        assert_eq!(fixture.controller.model().responses_issued, 1);

        assert!(fixture.controller.wait_for_response(Duration::from_secs(5)));
        fixture.controller.on_frame(4, &qualifying());
        assert_eq!(fixture.controller.model().responses_issued, 2);
        assert!(fixture.controller.wait_for_response(Duration::from_secs(5)));

        fixture.controller.shutdown();
    }

    #[test]
    fn test_non_qualifying_frame_resumes_idle_motion() {
        let mut fixture = Fixture::new();
        fixture.controller.on_frame(1, &qualifying());
        assert!(fixture.controller.wait_for_response(Duration::from_secs(5)));
        let after_response = fixture.plotter.motions().len();

        let state = fixture.controller.on_frame(2, &QualifyingEvent::default());

        assert_eq!(state, ControllerState::Idle);
        assert!(fixture.controller.is_idle_motion_enabled());
        assert!(wait_until(Duration::from_secs(2), || {
            fixture.plotter.motions().len() >= after_response + 2
        }));

        fixture.controller.shutdown();
    }

    #[test]
    fn test_actuation_failure_returns_to_idle() {
        let mut fixture = Fixture::new();
        fixture.plotter.set_failing(true);

        fixture.controller.on_frame(1, &qualifying());
        assert!(fixture.controller.wait_for_response(Duration::from_secs(5)));

        assert_eq!(fixture.controller.state(), ControllerState::Idle);
        assert_eq!(fixture.controller.model().response, ResponseSlot::Free);
        assert!(fixture.controller.model().last_failure.is_some());
        assert!(fixture.controller.is_idle_motion_enabled());

        fixture.plotter.set_failing(false);
        let state = fixture.controller.on_frame(2, &qualifying());
        assert_eq!(state, ControllerState::Responding);
        assert!(fixture.controller.wait_for_response(Duration::from_secs(5)));
        assert_eq!(fixture.controller.state(), ControllerState::Responding);

        fixture.controller.shutdown();
    }

    #[test]
    fn test_shutdown_disconnects_after_work_drains() {
        let mut fixture = Fixture::new();
        fixture.controller.on_frame(1, &qualifying());

        fixture.controller.shutdown();
        fixture.controller.shutdown();

        let calls = fixture.plotter.calls();
        assert_eq!(calls.last(), Some(&PlotterCall::Disconnect));
        assert_eq!(
            calls.iter().filter(|c| **c == PlotterCall::Disconnect).count(),
            1
        );
        let circle = fixture.config.response_shape.program();
        assert!(position_of(&fixture.plotter.motions(), &circle).is_some());
    }

    #[test]
    fn test_stalled_plotter_times_out_and_shuts_down_promptly() {
        let mut fixture = Fixture::build(
            DevicePlotterRecording::with_command_delay(Duration::from_millis(200)),
            Duration::from_millis(50),
        );

        fixture.controller.on_frame(1, &qualifying());
        assert!(fixture.controller.wait_for_response(Duration::from_secs(5)));
        assert_eq!(fixture.controller.state(), ControllerState::Idle);
        assert!(fixture.controller.model().last_failure.is_some());

        let started = Instant::now();
        fixture.controller.shutdown();

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(fixture.plotter.calls().last(), Some(&PlotterCall::Disconnect));
    }

    #[test]
    fn test_rejected_response_request_reports_failure() {
        let mut fixture = Fixture::with_plotter(DevicePlotterRecording::with_command_delay(
            Duration::from_millis(2),
        ));
        fixture.controller.on_frame(1, &qualifying());

        fixture.controller.run_effect(Effect::DrawResponse);
        fixture.controller.run_effect(Effect::DrawResponse);

        assert_eq!(
            fixture.controller.event_receiver.try_recv().ok(),
            Some(Event::ResponseDone(Err(ActuationError::QueueFull)))
        );
        fixture.controller.shutdown();
    }
}
