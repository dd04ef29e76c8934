//! Detection post-processing for anchor-based object detectors.
//!
//! `boxdecode` turns raw multi-scale output tensors of a YOLOv5-style
//! network into a bounded list of class-labelled bounding boxes. The
//! pipeline decodes each detection scale's feature map (anchor-based box
//! reconstruction with objectness and class scoring), concatenates the
//! candidates and finishes with greedy non-maximum suppression. Per-scale
//! decoding can run in parallel via the `rayon` feature.

mod candidate;
pub mod config;
pub mod decode;
pub mod tensor;
pub(crate) mod trace;
pub mod util;

pub use candidate::nms::non_max_suppression;
pub use candidate::{Prediction, Rect};
pub use config::{Anchor, DecoderConfig, BRICK_LABELS};
pub use decode::{decode_layer, Decoder};
pub use tensor::{FeatureView, BOX_CHANNELS};
pub use util::{BoxDecodeError, BoxDecodeResult};
