use crate::frame_loop::glyphs::{draw_text, text_size};
use crate::frame_source::interface::Frame;
use crate::image_classifier::interface::{BoundingBox, Detection};
use crate::library::logger::interface::Logger;
use image::{Rgb, RgbImage};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_THICKNESS: u32 = 2;
const CAPTION_SCALE: u32 = 2;

fn draw_box(image: &mut RgbImage, bbox: &BoundingBox) {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return;
    }
    let clamp = |v: f32, max: u32| (v.max(0.0) as u32).min(max - 1);
    let x0 = clamp(bbox.x1, w);
    let y0 = clamp(bbox.y1, h);
    let x1 = clamp(bbox.x2, w);
    let y1 = clamp(bbox.y2, h);

    for t in 0..BOX_THICKNESS {
        let xx0 = x0 + t;
        let yy0 = y0 + t;
        let xx1 = x1.saturating_sub(t);
        let yy1 = y1.saturating_sub(t);
        if xx0 > xx1 || yy0 > yy1 {
            break;
        }
        for x in xx0..=xx1 {
            image.put_pixel(x, yy0, BOX_COLOR);
            image.put_pixel(x, yy1, BOX_COLOR);
        }
        for y in yy0..=yy1 {
            image.put_pixel(xx0, y, BOX_COLOR);
            image.put_pixel(xx1, y, BOX_COLOR);
        }
    }
}

pub fn caption(detection: &Detection) -> String {
    format!("{}: {:.2}", detection.label, detection.confidence)
}

/// Caption above the box, or below it when the box touches the top edge.
fn draw_caption(image: &mut RgbImage, detection: &Detection) {
    let text = caption(detection);
    let (_, text_height) = text_size(&text, CAPTION_SCALE);
    let x = detection.bbox.x1.max(0.0) as i64;
    let top = detection.bbox.y1.max(0.0) as i64;
    let y = if top > text_height as i64 {
        top - text_height as i64 - 1
    } else {
        detection.bbox.y2.max(0.0) as i64 + 2
    };
    draw_text(image, x, y, &text, BOX_COLOR, CAPTION_SCALE);
}

/// Returns a copy of the frame with a labelled box around each detection.
/// The frame itself is left untouched.
pub fn annotate(frame: &Frame, detections: &[Detection]) -> RgbImage {
    let mut image = frame.image().clone();
    for detection in detections {
        draw_box(&mut image, &detection.bbox);
        draw_caption(&mut image, detection);
    }
    image
}

/// Writes annotated frames as `frame_000042.png` into one directory.
pub struct OverlayWriter {
    output_dir: PathBuf,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl OverlayWriter {
    pub fn create(
        output_dir: &Path,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            logger: logger.with_namespace("overlay"),
        })
    }

    pub fn path_for(&self, frame_index: u64) -> PathBuf {
        self.output_dir.join(format!("frame_{:06}.png", frame_index))
    }

    pub fn write(
        &self,
        frame: &Frame,
        detections: &[Detection],
    ) -> Result<PathBuf, Box<dyn Error + Send + Sync>> {
        let path = self.path_for(frame.index());
        annotate(frame, detections).save(&path)?;
        if !detections.is_empty() {
            let _ = self.logger.info(&format!(
                "Wrote {} with {} boxes",
                path.display(),
                detections.len()
            ));
        }
        Ok(path)
    }
}
