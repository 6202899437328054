use crate::frame_source::interface::{Frame, FrameSource};
use crate::library::logger::interface::Logger;
use image::{Rgb, RgbImage};
use std::sync::Arc;
use std::time::Duration;

/// Synthetic grey frames, `frame_count` of them, paced by `frame_interval`.
pub struct FrameSourceFake {
    width: u32,
    height: u32,
    frame_count: u64,
    frame_interval: Duration,
    next_index: u64,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl FrameSourceFake {
    pub fn new(
        frame_count: u64,
        frame_interval: Duration,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Self {
        Self {
            width: 64,
            height: 48,
            frame_count,
            frame_interval,
            next_index: 0,
            logger: logger.with_namespace("frame_source").with_namespace("fake"),
        }
    }
}

impl FrameSource for FrameSourceFake {
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error + Send + Sync>> {
        if self.next_index >= self.frame_count {
            let _ = self.logger.info("End of stream");
            return Ok(None);
        }
        if !self.frame_interval.is_zero() {
            std::thread::sleep(self.frame_interval);
        }
        let index = self.next_index;
        self.next_index += 1;
        let image = RgbImage::from_pixel(self.width, self.height, Rgb([96, 96, 96]));
        Ok(Some(Frame::new(index, image)))
    }
}
