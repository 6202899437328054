use crate::error::StartupError;
use crate::frame_source::interface::Frame;
use crate::image_classifier::interface::{BoundingBox, Detection, ImageClassifier};
use crate::library::logger::interface::Logger;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::prelude::*;

const MIN_SCORE: f32 = 0.1;
const NMS_IOU: f32 = 0.45;

/// YOLO-style ONNX detector. Expects a `[1, 3, size, size]` input and a
/// `[1, 4 + classes, anchors]` output with centre/size boxes in input pixels.
pub struct ImageClassifierTract {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    input_size: u32,
    class_names: Vec<String>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl ImageClassifierTract {
    pub fn new(
        model_path: &Path,
        input_size: u32,
        class_names: Vec<String>,
        logger: Arc<dyn Logger + Send + Sync>,
    ) -> Result<Self, StartupError> {
        let load_error = |reason: String| StartupError::ModelLoad {
            path: model_path.to_path_buf(),
            reason,
        };
        if !model_path.is_file() {
            return Err(load_error("model weights file not found".to_string()));
        }

        let size = input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .and_then(|model| {
                model.with_input_fact(0, f32::fact([1, 3, size, size]).into())
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| load_error(e.to_string()))?;

        let logger = logger
            .with_namespace("image_classifier")
            .with_namespace("tract");
        let _ = logger.info(&format!(
            "Loaded {} ({} classes, input {}x{})",
            model_path.display(),
            class_names.len(),
            input_size,
            input_size
        ));

        Ok(Self {
            model,
            input_size,
            class_names,
            logger,
        })
    }

    fn preprocess(&self, frame: &Frame) -> Tensor {
        let size = self.input_size;
        let resized = image::imageops::resize(
            frame.image(),
            size,
            size,
            image::imageops::FilterType::Triangle,
        );
        tract_ndarray::Array4::from_shape_fn(
            (1, 3, size as usize, size as usize),
            |(_, c, y, x)| resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
        )
        .into_tensor()
    }

    fn label(&self, class_id: usize) -> String {
        self.class_names
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_id))
    }
}

impl ImageClassifier for ImageClassifierTract {
    fn detect(&self, frame: &Frame) -> Result<Vec<Detection>, Box<dyn std::error::Error + Send + Sync>> {
        let input = self.preprocess(frame);
        let outputs = self.model.run(tvec!(input.into_tvalue()))?;
        let output = outputs[0]
            .to_array_view::<f32>()?
            .into_dimensionality::<tract_ndarray::Ix3>()?;

        let (_, attributes, anchors) = output.dim();
        if attributes < 5 {
            return Err(format!("unexpected model output shape {:?}", output.shape()).into());
        }
        let scale_x = frame.width() as f32 / self.input_size as f32;
        let scale_y = frame.height() as f32 / self.input_size as f32;

        let mut candidates = Vec::new();
        for anchor in 0..anchors {
            let (class_id, score) = (4..attributes)
                .map(|a| (a - 4, output[[0, a, anchor]]))
                .fold((0, f32::NEG_INFINITY), |best, next| {
                    if next.1 > best.1 {
                        next
                    } else {
                        best
                    }
                });
            if score < MIN_SCORE {
                continue;
            }
            let cx = output[[0, 0, anchor]];
            let cy = output[[0, 1, anchor]];
            let w = output[[0, 2, anchor]];
            let h = output[[0, 3, anchor]];
            let bbox = BoundingBox::new(
                (cx - w / 2.0) * scale_x,
                (cy - h / 2.0) * scale_y,
                (cx + w / 2.0) * scale_x,
                (cy + h / 2.0) * scale_y,
            );
            candidates.push(Detection::new(bbox, self.label(class_id), score));
        }

        let detections = non_max_suppression(candidates, NMS_IOU);
        let _ = self.logger.info(&format!(
            "Frame {}: {} detections",
            frame.index(),
            detections.len()
        ));
        Ok(detections)
    }
}

/// Greedy per-label suppression, highest confidence first.
pub fn non_max_suppression(mut candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let mut kept: Vec<Detection> = Vec::new();
    for candidate in candidates {
        let overlaps = kept.iter().any(|k| {
            k.label == candidate.label && k.bbox.iou(&candidate.bbox) > iou_threshold
        });
        if !overlaps {
            kept.push(candidate);
        }
    }
    kept
}
