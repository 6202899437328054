use crate::frame_source::interface::Frame;
use crate::image_classifier::interface::{Detection, ImageClassifier};
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Replays a fixed list of per-frame results, then reports nothing.
pub struct ImageClassifierScripted {
    script: Mutex<VecDeque<Result<Vec<Detection>, String>>>,
}

impl ImageClassifierScripted {
    pub fn new(frames: Vec<Vec<Detection>>) -> Self {
        Self {
            script: Mutex::new(frames.into_iter().map(Ok).collect()),
        }
    }

    pub fn with_results(results: Vec<Result<Vec<Detection>, String>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
        }
    }
}

impl ImageClassifier for ImageClassifierScripted {
    fn detect(&self, _frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>> {
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match next {
            Some(Ok(detections)) => Ok(detections),
            Some(Err(message)) => Err(message.into()),
            None => Ok(vec![]),
        }
    }
}
