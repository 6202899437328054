#[cfg(test)]
mod scenario_test {
    use crate::device_display::interface::Indicator;
    use crate::frame_loop::overlay::OverlayWriter;
    use crate::frame_loop::tests::fixture::Fixture;
    use crate::frame_source::interface::{Frame, FrameSource};
    use crate::image_classifier::impl_scripted::ImageClassifierScripted;
    use crate::image_classifier::interface::{BoundingBox, Detection};
    use crate::actuator_session::motion_command::MotionCommand;
    use crate::plotter_controller::core::ControllerState;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn detection(label: &str, confidence: f32) -> Detection {
        Detection::new(BoundingBox::new(2.0, 2.0, 20.0, 16.0), label, confidence)
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

    fn occurrences(haystack: &[MotionCommand], needle: &[MotionCommand]) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle)
            .count()
    }

    struct BrokenAfterOne {
        served: bool,
    }

    impl FrameSource for BrokenAfterOne {
        fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error + Send + Sync>> {
            if self.served {
                return Err("camera unplugged".into());
            }
            self.served = true;
            Ok(Some(Frame::new(0, RgbImage::from_pixel(8, 8, Rgb([0, 0, 0])))))
        }
    }

    #[test]
    fn test_detection_then_empty_frame() {
        let mut fixture = Fixture::new();
        let classifier = Arc::new(ImageClassifierScripted::new(vec![
            vec![detection("Pothole", 0.9)],
            vec![],
        ]));
        let mut frame_loop = fixture.frame_loop(fixture.fake_frames(2), classifier, None);

        let outcome = frame_loop.step(&mut fixture.controller).unwrap();
        assert_eq!(outcome.state, ControllerState::Responding);
        assert_eq!(outcome.matched, 1);
        assert!(!fixture.controller.is_idle_motion_enabled());
        assert!(fixture.controller.wait_for_response(Duration::from_secs(5)));

        let circle = fixture.config.response_shape.program();
        let after_response = fixture.plotter.motions();
        assert_eq!(occurrences(&after_response, &circle), 1);
        assert_eq!(
            fixture.device_display.lock().unwrap().indicator(),
            Indicator::Circle
        );

        let outcome = frame_loop.step(&mut fixture.controller).unwrap();
        assert_eq!(outcome.state, ControllerState::Idle);
        assert!(fixture.controller.is_idle_motion_enabled());
        assert!(wait_until(Duration::from_secs(2), || {
            fixture.plotter.motions().len() >= after_response.len() + 2
        }));
        let motions = fixture.plotter.motions();
        assert!(matches!(motions[after_response.len()], MotionCommand::MoveTo(_)));
        assert!(matches!(motions[after_response.len() + 1], MotionCommand::LineTo(_)));
        assert_eq!(
            fixture.device_display.lock().unwrap().indicator(),
            Indicator::Cross
        );

        assert!(frame_loop.step(&mut fixture.controller).is_none());
        fixture.controller.shutdown();
    }

    #[test]
    fn test_low_confidence_and_other_labels_do_not_respond() {
        let mut fixture = Fixture::new();
        let classifier = Arc::new(ImageClassifierScripted::new(vec![
            vec![detection("pothole", 0.5)],
            vec![detection("car", 0.99)],
        ]));
        let mut frame_loop = fixture.frame_loop(fixture.fake_frames(2), classifier, None);

        let summary = frame_loop.run(&mut fixture.controller);

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.qualifying_frames, 0);
        assert_eq!(fixture.controller.state(), ControllerState::Idle);
        assert_eq!(fixture.controller.model().responses_issued, 0);
        fixture.controller.shutdown();
    }

    #[test]
    fn test_actuation_failure_does_not_stop_frames() {
        let mut fixture = Fixture::new();
        fixture.plotter.set_failing(true);
        let classifier = Arc::new(ImageClassifierScripted::new(vec![
            vec![detection("pothole", 0.9)],
            vec![detection("pothole", 0.9)],
            vec![],
            vec![detection("pothole", 0.9)],
        ]));
        let mut frame_loop = fixture.frame_loop(fixture.fake_frames(4), classifier, None);

        let summary = frame_loop.run(&mut fixture.controller);
        assert!(fixture.controller.wait_for_response(Duration::from_secs(5)));

        assert_eq!(summary.frames, 4);
        assert_eq!(summary.qualifying_frames, 3);
        assert!(fixture.controller.model().last_failure.is_some());
        assert!(fixture.plotter.motions().is_empty());
        fixture.controller.shutdown();
    }

    #[test]
    fn test_classifier_error_counts_as_empty_frame() {
        let mut fixture = Fixture::new();
        let classifier = Arc::new(ImageClassifierScripted::with_results(vec![
            Err("inference failed".to_string()),
            Ok(vec![detection("pothole", 0.8)]),
        ]));
        let mut frame_loop = fixture.frame_loop(fixture.fake_frames(2), classifier, None);

        let summary = frame_loop.run(&mut fixture.controller);

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.qualifying_frames, 1);
        assert_eq!(fixture.controller.state(), ControllerState::Responding);
        fixture.controller.shutdown();
    }

    #[test]
    fn test_read_error_ends_the_stream() {
        let mut fixture = Fixture::new();
        let classifier = Arc::new(ImageClassifierScripted::new(vec![]));
        let mut frame_loop =
            fixture.frame_loop(Box::new(BrokenAfterOne { served: false }), classifier, None);

        let summary = frame_loop.run(&mut fixture.controller);

        assert_eq!(summary.frames, 1);
        fixture.controller.shutdown();
    }

    #[test]
    fn test_stop_flag_ends_the_loop() {
        let mut fixture = Fixture::new();
        let classifier = Arc::new(ImageClassifierScripted::new(vec![]));
        let mut frame_loop = fixture.frame_loop(fixture.fake_frames(1000), classifier, None);
        fixture.stop.store(true, Ordering::SeqCst);

        let summary = frame_loop.run(&mut fixture.controller);

        assert_eq!(summary.frames, 0);
        fixture.controller.shutdown();
    }

    #[test]
    fn test_overlay_written_for_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixture = Fixture::new();
        let overlay = OverlayWriter::create(dir.path(), fixture.logger.clone()).unwrap();
        let classifier = Arc::new(ImageClassifierScripted::new(vec![
            vec![detection("pothole", 0.9)],
            vec![],
            vec![],
        ]));
        let mut frame_loop = fixture.frame_loop(fixture.fake_frames(3), classifier, Some(overlay));

        frame_loop.run(&mut fixture.controller);
        fixture.controller.shutdown();

        for index in 0..3 {
            assert!(dir.path().join(format!("frame_{:06}.png", index)).exists());
        }
        let annotated = image::open(dir.path().join("frame_000000.png"))
            .unwrap()
            .to_rgb8();
        assert_eq!(annotated.get_pixel(2, 2), &Rgb([0, 255, 0]));
    }
}
