//! Error types for boxdecode.

use thiserror::Error;

/// Result alias for boxdecode operations.
pub type BoxDecodeResult<T> = std::result::Result<T, BoxDecodeError>;

/// Errors that can occur when building views or running the pipeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoxDecodeError {
    /// The tensor shape is not usable as a detection layer.
    #[error("invalid tensor shape [{anchors}, {height}, {width}, {channels}]: {reason}")]
    InvalidShape {
        /// Anchor axis extent.
        anchors: usize,
        /// Grid height.
        height: usize,
        /// Grid width.
        width: usize,
        /// Channel axis extent.
        channels: usize,
        /// Which constraint was violated.
        reason: &'static str,
    },
    /// The channel axis must be densely packed.
    #[error("channel stride must be 1, got {stride}")]
    NonUnitChannelStride {
        /// The offending channel stride.
        stride: usize,
    },
    /// The backing buffer cannot hold the described tensor.
    #[error("tensor buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall {
        /// Minimum number of elements implied by shape and strides.
        needed: usize,
        /// Actual buffer length.
        got: usize,
    },
    /// The decoder configuration is inconsistent.
    #[error("invalid decoder config: {reason}")]
    InvalidConfig {
        /// Which constraint was violated.
        reason: &'static str,
    },
    /// The number of feature layers does not match the configured scales.
    #[error("expected {expected} feature layers, got {got}")]
    LayerCountMismatch {
        /// Scales in the decoder configuration.
        expected: usize,
        /// Layers passed to `decode`.
        got: usize,
    },
    /// A layer's anchor axis disagrees with its configured anchor list.
    #[error("anchor list has {expected} entries, tensor anchor axis has {got}")]
    AnchorCountMismatch {
        /// Length of the configured anchor list.
        expected: usize,
        /// Anchor axis extent of the tensor.
        got: usize,
    },
    /// A layer's class channels disagree with the configured label table.
    #[error("{labels} labels configured, tensor has {classes} class channels")]
    ClassCountMismatch {
        /// Length of the configured label table.
        labels: usize,
        /// Class channel count of the tensor (channels - 5).
        classes: usize,
    },
}
