//! Feature-map decoding and the multi-scale pipeline.
//!
//! [`decode_layer`] walks one scale's tensor and converts every grid cell
//! and anchor slot into a candidate prediction when its score clears the
//! confidence threshold. [`Decoder`] runs that per scale, concatenates the
//! candidates and finishes with non-maximum suppression.

use crate::candidate::nms::non_max_suppression;
use crate::candidate::{Prediction, Rect};
use crate::config::{Anchor, DecoderConfig};
use crate::tensor::FeatureView;
use crate::trace::{trace_event, trace_span};
use crate::util::math::{argmax, sigmoid, softmax_in_place};
use crate::util::{BoxDecodeError, BoxDecodeResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Decodes one detection scale into candidates above `confidence_threshold`.
///
/// `anchors` must pair positionally with the view's anchor axis and
/// `grid_scale` converts grid-cell units to input-image pixels. The score
/// of a candidate is its sigmoid-activated objectness times its best
/// softmax class probability; candidates at or below the threshold are
/// discarded. The box transform follows the YOLOv5 `Detect` head:
///
/// ```text
/// x = (sigmoid(tx) * 2 - 0.5 + cx) * grid_scale
/// y = (sigmoid(ty) * 2 - 0.5 + cy) * grid_scale
/// w = (sigmoid(tw) * 2)^2 * anchor.width
/// h = (sigmoid(th) * 2)^2 * anchor.height
/// ```
pub fn decode_layer(
    view: FeatureView<'_>,
    anchors: &[Anchor],
    grid_scale: f32,
    confidence_threshold: f32,
) -> BoxDecodeResult<Vec<Prediction>> {
    if anchors.len() != view.anchors() {
        return Err(BoxDecodeError::AnchorCountMismatch {
            expected: anchors.len(),
            got: view.anchors(),
        });
    }

    let _span = trace_span!(
        "decode_layer",
        height = view.height(),
        width = view.width(),
        anchors = anchors.len()
    )
    .entered();

    let mut class_scores = vec![0.0f32; view.classes()];
    let mut predictions = Vec::new();

    for (anchor_idx, anchor) in anchors.iter().enumerate() {
        for cy in 0..view.height() {
            for cx in 0..view.width() {
                let cell = view.cell(anchor_idx, cy, cx);
                let confidence = sigmoid(cell[4]);

                class_scores.copy_from_slice(&cell[5..]);
                softmax_in_place(&mut class_scores);
                let (class_index, best_class_score) = argmax(&class_scores);

                let score = best_class_score * confidence;
                if score <= confidence_threshold {
                    continue;
                }

                let x = (sigmoid(cell[0]) * 2.0 - 0.5 + cx as f32) * grid_scale;
                let y = (sigmoid(cell[1]) * 2.0 - 0.5 + cy as f32) * grid_scale;
                let w = (sigmoid(cell[2]) * 2.0).powi(2) * anchor.width;
                let h = (sigmoid(cell[3]) * 2.0).powi(2) * anchor.height;

                predictions.push(Prediction {
                    class_index,
                    score,
                    rect: Rect::from_center(x, y, w, h),
                });
            }
        }
    }

    trace_event!("layer_candidates", count = predictions.len());
    Ok(predictions)
}

/// Multi-scale detection decoder with greedy NMS.
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Validates `config` and builds a decoder.
    pub fn new(config: DecoderConfig) -> BoxDecodeResult<Self> {
        let invalid = |reason| BoxDecodeError::InvalidConfig { reason };
        if config.anchors.is_empty() {
            return Err(invalid("no detection scales configured"));
        }
        if config.anchors.len() != config.grid_scales.len() {
            return Err(invalid("anchor and grid scale tables differ in length"));
        }
        if config.anchors.iter().any(Vec::is_empty) {
            return Err(invalid("a scale has an empty anchor list"));
        }
        if !config.confidence_threshold.is_finite() {
            return Err(invalid("confidence threshold must be finite"));
        }
        if !(0.0..=1.0).contains(&config.iou_threshold) {
            return Err(invalid("iou threshold outside [0, 1]"));
        }
        Ok(Self { config })
    }

    /// Returns the configuration this decoder was built with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Runs the full pipeline over one inference result: per-scale decode,
    /// concatenation, then non-maximum suppression.
    ///
    /// `layers` must contain one view per configured scale, in scale order.
    /// Any layer that cannot be decoded fails the whole invocation; no
    /// partial prediction list is ever returned.
    pub fn decode(&self, layers: &[FeatureView<'_>]) -> BoxDecodeResult<Vec<Prediction>> {
        let _span = trace_span!("decode", layers = layers.len()).entered();

        if layers.len() != self.config.anchors.len() {
            return Err(BoxDecodeError::LayerCountMismatch {
                expected: self.config.anchors.len(),
                got: layers.len(),
            });
        }
        if !self.config.labels.is_empty() {
            for view in layers {
                if view.classes() != self.config.labels.len() {
                    return Err(BoxDecodeError::ClassCountMismatch {
                        labels: self.config.labels.len(),
                        classes: view.classes(),
                    });
                }
            }
        }

        let candidates = self.decode_scales(layers)?;
        trace_event!("candidates", count = candidates.len());

        let kept = non_max_suppression(
            &candidates,
            self.config.max_boxes,
            self.config.iou_threshold,
        );
        trace_event!("kept", count = kept.len());
        Ok(kept)
    }

    fn decode_scales(&self, layers: &[FeatureView<'_>]) -> BoxDecodeResult<Vec<Prediction>> {
        #[cfg(feature = "rayon")]
        if self.config.parallel {
            return self.decode_scales_par(layers);
        }

        let mut all = Vec::new();
        for (scale, view) in layers.iter().enumerate() {
            all.extend(decode_layer(
                *view,
                &self.config.anchors[scale],
                self.config.grid_scales[scale],
                self.config.confidence_threshold,
            )?);
        }
        Ok(all)
    }

    /// Decodes scales in parallel; candidates still concatenate in scale
    /// order so the output matches the sequential path exactly.
    #[cfg(feature = "rayon")]
    fn decode_scales_par(&self, layers: &[FeatureView<'_>]) -> BoxDecodeResult<Vec<Prediction>> {
        let results: Vec<_> = layers
            .par_iter()
            .enumerate()
            .map(|(scale, view)| {
                decode_layer(
                    *view,
                    &self.config.anchors[scale],
                    self.config.grid_scales[scale],
                    self.config.confidence_threshold,
                )
            })
            .collect();

        let mut all = Vec::new();
        for result in results {
            all.extend(result?);
        }
        Ok(all)
    }
}
