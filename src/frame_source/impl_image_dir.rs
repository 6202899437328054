use crate::error::StartupError;
use crate::frame_source::interface::{Frame, FrameSource};
use crate::library::logger::interface::Logger;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Reads a directory of still images in file-name order, one frame per file.
pub struct FrameSourceImageDir {
    files: Vec<PathBuf>,
    first: Option<RgbImage>,
    frame_interval: Duration,
    next_index: usize,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl FrameSourceImageDir {
    pub fn open(
        dir: &Path,
        frame_interval: Duration,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, StartupError> {
        if !dir.exists() {
            return Err(StartupError::SourceNotFound(dir.to_path_buf()));
        }
        let stream_error = |reason: String| StartupError::StreamOpen {
            path: dir.to_path_buf(),
            reason,
        };
        if !dir.is_dir() {
            return Err(stream_error("not a directory of frames".to_string()));
        }

        let entries = std::fs::read_dir(dir).map_err(|e| stream_error(e.to_string()))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| stream_error(e.to_string()))?.path();
            if is_frame_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        let Some(first_file) = files.first() else {
            return Err(stream_error("no frames found".to_string()));
        };
        let first = decode(first_file).map_err(stream_error)?;

        let logger = logger
            .with_namespace("frame_source")
            .with_namespace("image_dir");
        let _ = logger.info(&format!(
            "Opened {} with {} frames",
            dir.display(),
            files.len()
        ));

        Ok(Self {
            files,
            first: Some(first),
            frame_interval,
            next_index: 0,
            logger,
        })
    }
}

fn decode(path: &Path) -> Result<RgbImage, String> {
    image::open(path)
        .map(|image| image.to_rgb8())
        .map_err(|e| format!("cannot decode {}: {}", path.display(), e))
}

fn is_frame_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                FRAME_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
}

impl FrameSource for FrameSourceImageDir {
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error + Send + Sync>> {
        let Some(path) = self.files.get(self.next_index) else {
            let _ = self.logger.info("End of stream");
            return Ok(None);
        };
        if self.next_index > 0 && !self.frame_interval.is_zero() {
            std::thread::sleep(self.frame_interval);
        }
        let image = match self.first.take() {
            Some(image) => image,
            None => decode(path)?,
        };
        let frame = Frame::new(self.next_index as u64, image);
        self.next_index += 1;
        Ok(Some(frame))
    }
}
