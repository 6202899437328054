use crate::frame_source::interface::Frame;
use crate::image_classifier::interface::{BoundingBox, Detection, ImageClassifier};
use crate::library::logger::interface::Logger;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, PoisonError};

const OBJECTS: [&str; 8] = [
    "pothole", "crack", "manhole", "car", "person", "bicycle", "puddle", "sign",
];

/// Produces up to two random detections per frame.
pub struct ImageClassifierFake {
    rng: Mutex<StdRng>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageClassifierFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
            logger: logger
                .with_namespace("image_classifier")
                .with_namespace("fake"),
        }
    }
}

impl ImageClassifier for ImageClassifierFake {
    fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        let count_dist = Uniform::new_inclusive(0usize, 2)?;
        let index_dist = Uniform::new(0, OBJECTS.len())?;
        let confidence_dist = Uniform::new_inclusive(0.0f32, 1.0)?;
        let x_dist = Uniform::new_inclusive(0.0f32, frame.width() as f32)?;
        let y_dist = Uniform::new_inclusive(0.0f32, frame.height() as f32)?;

        let detections: Vec<Detection> = (0..count_dist.sample(&mut *rng))
            .map(|_| {
                let bbox = BoundingBox::new(
                    x_dist.sample(&mut *rng),
                    y_dist.sample(&mut *rng),
                    x_dist.sample(&mut *rng),
                    y_dist.sample(&mut *rng),
                );
                Detection::new(
                    bbox,
                    OBJECTS[index_dist.sample(&mut *rng)],
                    confidence_dist.sample(&mut *rng),
                )
            })
            .collect();

        let _ = self.logger.info(&format!(
            "Frame {}: {} detections",
            frame.index(),
            detections.len()
        ));

        Ok(detections)
    }
}
