//! Static pipeline configuration.
//!
//! All tuning lives in an immutable [`DecoderConfig`] handed to the decoder
//! at construction. The defaults are the constants of the reference model:
//! a 640x640 YOLOv5 network with three detection scales, three anchors per
//! scale, and 30 toy-brick classes.

/// Prior box dimensions for one anchor slot of a detection scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// Prior width in input-image pixels.
    pub width: f32,
    /// Prior height in input-image pixels.
    pub height: f32,
}

impl Anchor {
    /// Builds an anchor from its width/height pair.
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Class labels of the reference brick-detection model, index-aligned with
/// the tensor's class channels.
pub const BRICK_LABELS: [&str; 30] = [
    "1×1 Plate, Round",
    "1×2 Plate",
    "1×1 Plate",
    "Technic Pin with Friction Ridges Lengthwise and Center Slots",
    "1×1 Tile, Round",
    "1×2 Tile",
    "1×2 Brick",
    "1×1 Slope 30° (Cheese)",
    "1×4 Plate",
    "1×1 Brick",
    "2×4 Plate",
    "2×2 Plate",
    "Technic Pin Long with Friction Ridges Lengthwise",
    "1×2 Jumper",
    "1×2 Tile, Grille",
    "1×1 Tile",
    "2×3 Plate",
    "1×3 Plate",
    "1×6 Plate",
    "2×2 Brick",
    "1×4 Brick",
    "2×1 Curved",
    "2×4 Brick",
    "1×2 Slope 30° (Double Cheese)",
    "Technic Pin 1/2",
    "1×4 Tile",
    "2×2 Plate, Corner",
    "Brick Round 1 x 1 Open Stud",
    "2×2 Curved",
    "1×1 Plate, Round w/ hole",
];

/// Immutable decoder configuration, fixed at construction.
#[derive(Clone, Debug)]
pub struct DecoderConfig {
    /// Per-scale anchor lists; the outer index is the detection scale and
    /// each inner list pairs positionally with the tensor's anchor axis.
    pub anchors: Vec<Vec<Anchor>>,
    /// Per-scale grid-to-image factors (the model's strides), same length
    /// and order as `anchors`.
    pub grid_scales: Vec<f32>,
    /// Class label table, index-aligned with the class channels. May be
    /// left empty to skip label/class-count validation.
    pub labels: Vec<String>,
    /// Candidates scoring at or below this value are dropped at decode time.
    pub confidence_threshold: f32,
    /// NMS overlap cutoff in [0, 1]; overlap strictly above it suppresses.
    pub iou_threshold: f32,
    /// Maximum number of predictions returned by the pipeline.
    pub max_boxes: usize,
    /// Decode scales in parallel. Only takes effect with the `rayon`
    /// feature; otherwise decoding stays sequential.
    pub parallel: bool,
}

impl DecoderConfig {
    /// Number of detection scales described by this configuration.
    pub fn num_scales(&self) -> usize {
        self.anchors.len()
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            anchors: vec![
                vec![
                    Anchor::new(12.078_12, 10.703_12),
                    Anchor::new(17.359_38, 16.765_62),
                    Anchor::new(16.328_12, 31.578_12),
                ],
                vec![
                    Anchor::new(27.203_12, 20.843_75),
                    Anchor::new(30.593_75, 32.906_25),
                    Anchor::new(50.375, 26.437_5),
                ],
                vec![
                    Anchor::new(47.0, 43.781_25),
                    Anchor::new(37.968_75, 69.75),
                    Anchor::new(75.375, 67.937_5),
                ],
            ],
            grid_scales: vec![8.0, 16.0, 32.0],
            labels: BRICK_LABELS.iter().map(|s| s.to_string()).collect(),
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_boxes: 10,
            parallel: false,
        }
    }
}
