use actuator_session::session::ActuatorSession;
use clap::Parser;
use cli::Args;
use config::{Config, DisplayKind, PlotterKind};
use detection_filter::DetectionFilter;
use device_display::{
    impl_console::DeviceDisplayConsole, impl_fake::DeviceDisplayFake, impl_gui::DeviceDisplayGui,
    impl_none::DeviceDisplayNone, interface::DeviceDisplay,
};
use device_plotter::{
    impl_fake::DevicePlotterFake, impl_svg::DevicePlotterSvg, interface::DevicePlotter,
};
use error::StartupError;
use frame_loop::{overlay::OverlayWriter, run::FrameLoop};
use frame_source::{
    impl_fake::FrameSourceFake, impl_image_dir::FrameSourceImageDir, interface::FrameSource,
};
use image_classifier::interface::ImageClassifier;
use library::logger::{impl_console::LoggerConsole, interface::Logger};
use plotter_controller::controller::PlotterController;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

mod actuator_session;
mod cli;
mod config;
mod detection_filter;
mod device_display;
mod device_plotter;
mod error;
mod frame_loop;
mod frame_source;
mod idle_motion;
mod image_classifier;
mod library;
mod plotter_controller;

fn open_source(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<Box<dyn FrameSource>, StartupError> {
    match &config.source_path {
        Some(path) => Ok(Box::new(FrameSourceImageDir::open(
            path,
            config.frame_interval,
            logger,
        )?)),
        None => Ok(Box::new(FrameSourceFake::new(
            config.fake_frame_count,
            config.frame_interval,
            logger,
        ))),
    }
}

#[cfg(feature = "tract")]
fn load_model(
    config: &Config,
    path: &std::path::Path,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<Arc<dyn ImageClassifier + Send + Sync>, StartupError> {
    Ok(Arc::new(image_classifier::impl_tract::ImageClassifierTract::new(
        path,
        config.model_input_size,
        config.model_class_names.clone(),
        logger,
    )?))
}

#[cfg(not(feature = "tract"))]
fn load_model(
    _config: &Config,
    path: &std::path::Path,
    _logger: Arc<dyn Logger + Send + Sync>,
) -> Result<Arc<dyn ImageClassifier + Send + Sync>, StartupError> {
    Err(StartupError::ModelLoad {
        path: path.to_path_buf(),
        reason: "built without the `tract` feature".to_string(),
    })
}

fn open_classifier(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<Arc<dyn ImageClassifier + Send + Sync>, StartupError> {
    match &config.model_path {
        Some(path) => load_model(config, path, logger),
        None => Ok(Arc::new(
            image_classifier::impl_fake::ImageClassifierFake::new(logger, config.seed),
        )),
    }
}

fn open_plotter(config: &Config, logger: Arc<dyn Logger + Send + Sync>) -> Arc<dyn DevicePlotter + Send + Sync> {
    match &config.plotter {
        PlotterKind::Fake { command_delay } => {
            Arc::new(DevicePlotterFake::new(logger, *command_delay))
        }
        PlotterKind::Svg { output } => Arc::new(DevicePlotterSvg::new(
            output.clone(),
            config.plotter_bounds,
            logger,
        )),
    }
}

fn open_display(
    config: &Config,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Arc<Mutex<dyn DeviceDisplay + Send + Sync>> {
    match config.display {
        DisplayKind::Console => Arc::new(Mutex::new(DeviceDisplayConsole::new())),
        DisplayKind::Gui => Arc::new(Mutex::new(DeviceDisplayGui::new(logger))),
        DisplayKind::Log => Arc::new(Mutex::new(DeviceDisplayFake::new(logger))),
        DisplayKind::None => Arc::new(Mutex::new(DeviceDisplayNone)),
    }
}

fn run(config: Config) -> Result<(), StartupError> {
    let logger: Arc<dyn Logger + Send + Sync> = Arc::new(LoggerConsole::new(config.logger_timezone));

    let _ = logger.info(&format!(
        "Responding to {:?} above {} (model classes {:?})",
        config.allowed_labels, config.confidence_threshold, config.model_class_names
    ));

    let source = open_source(&config, logger.clone())?;
    let classifier = open_classifier(&config, logger.clone())?;
    let overlay = match &config.output_dir {
        Some(dir) => Some(
            OverlayWriter::create(dir, logger.clone()).map_err(|e| StartupError::StreamOpen {
                path: dir.clone(),
                reason: e.to_string(),
            })?,
        ),
        None => None,
    };

    let session = Arc::new(ActuatorSession::open(
        open_plotter(&config, logger.clone()),
        config.pen_down_speed,
        config.submit_timeout,
        logger.clone(),
    )?);

    let stop = Arc::new(AtomicBool::new(false));
    let stop_handler = stop.clone();
    ctrlc::set_handler(move || stop_handler.store(true, Ordering::SeqCst))
        .map_err(|e| StartupError::Signal(e.to_string()))?;

    let device_display = open_display(&config, logger.clone());
    let mut controller = PlotterController::start(&config, session, device_display, logger.clone());

    let mut frame_loop = FrameLoop::new(
        source,
        classifier,
        DetectionFilter::new(config.confidence_threshold, &config.allowed_labels),
        overlay,
        stop,
        logger.clone(),
    );
    let summary = frame_loop.run(&mut controller);

    controller.shutdown();
    let _ = logger.info(&format!(
        "Shut down after {} frames ({} qualifying), {} responses drawn",
        summary.frames,
        summary.qualifying_frames,
        controller.model().responses_issued
    ));
    Ok(())
}

fn main() -> ExitCode {
    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", StartupError::from(e));
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
