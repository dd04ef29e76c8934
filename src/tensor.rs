//! Borrowed views over raw detection tensors.
//!
//! `FeatureView` is a read-only 4-D view into a flat `f32` buffer with an
//! explicit shape `[anchors, height, width, channels]` and explicit
//! per-dimension strides. The batch dimension of 1 that inference runtimes
//! report is folded away at this boundary. The channel stride must be 1 so
//! that one grid cell's channels form a contiguous slice; every other
//! stride is arbitrary, which keeps padded or transposed runtime layouts
//! readable without copying.

use crate::util::{BoxDecodeError, BoxDecodeResult};

/// Number of box channels preceding the class scores: tx, ty, tw, th
/// and objectness.
pub const BOX_CHANNELS: usize = 5;

/// Borrowed 4-D detection tensor view with explicit strides.
#[derive(Copy, Clone)]
pub struct FeatureView<'a> {
    data: &'a [f32],
    anchors: usize,
    height: usize,
    width: usize,
    channels: usize,
    anchor_stride: usize,
    row_stride: usize,
    col_stride: usize,
}

impl<'a> FeatureView<'a> {
    /// Creates a view with explicit strides.
    ///
    /// `shape` is `[anchors, height, width, channels]` and `strides` the
    /// element (not byte) strides for the same dimensions. The channel
    /// stride must be 1 and `channels` must be at least `BOX_CHANNELS + 1`
    /// (one class).
    pub fn new(
        data: &'a [f32],
        shape: [usize; 4],
        strides: [usize; 4],
    ) -> BoxDecodeResult<Self> {
        let [anchors, height, width, channels] = shape;
        let [anchor_stride, row_stride, col_stride, channel_stride] = strides;

        let invalid = |reason| BoxDecodeError::InvalidShape {
            anchors,
            height,
            width,
            channels,
            reason,
        };
        if anchors == 0 || height == 0 || width == 0 || channels == 0 {
            return Err(invalid("zero dimension"));
        }
        if channels <= BOX_CHANNELS {
            return Err(invalid("no class channels after the box channels"));
        }
        if channel_stride != 1 {
            return Err(BoxDecodeError::NonUnitChannelStride {
                stride: channel_stride,
            });
        }

        let needed = max_offset(anchors - 1, height - 1, width - 1, strides)
            .and_then(|off| off.checked_add(channels))
            .ok_or(invalid("stride overflow"))?;
        if data.len() < needed {
            return Err(BoxDecodeError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }

        Ok(Self {
            data,
            anchors,
            height,
            width,
            channels,
            anchor_stride,
            row_stride,
            col_stride,
        })
    }

    /// Creates a view over a densely packed row-major buffer.
    pub fn from_contiguous(data: &'a [f32], shape: [usize; 4]) -> BoxDecodeResult<Self> {
        let [_, height, width, channels] = shape;
        let col_stride = channels;
        let row_stride = width.saturating_mul(col_stride);
        let anchor_stride = height.saturating_mul(row_stride);
        Self::new(data, shape, [anchor_stride, row_stride, col_stride, 1])
    }

    /// Extent of the anchor axis.
    pub fn anchors(&self) -> usize {
        self.anchors
    }

    /// Grid height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Grid width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total channels per cell, box channels included.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of class channels (`channels - BOX_CHANNELS`).
    pub fn classes(&self) -> usize {
        self.channels - BOX_CHANNELS
    }

    /// Returns the backing slice including any padding.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Returns one element if all indices are within bounds.
    pub fn get(&self, anchor: usize, row: usize, col: usize, channel: usize) -> Option<f32> {
        if anchor >= self.anchors || row >= self.height || col >= self.width {
            return None;
        }
        if channel >= self.channels {
            return None;
        }
        let offset = self.cell_offset(anchor, row, col) + channel;
        self.data.get(offset).copied()
    }

    /// Returns the contiguous channel slice for one cell/anchor slot,
    /// laid out as `[tx, ty, tw, th, objectness, class scores...]`.
    ///
    /// # Panics
    ///
    /// Panics if `anchor`, `row` or `col` is out of bounds.
    pub fn cell(&self, anchor: usize, row: usize, col: usize) -> &'a [f32] {
        assert!(
            anchor < self.anchors && row < self.height && col < self.width,
            "cell index ({anchor}, {row}, {col}) out of bounds"
        );
        let offset = self.cell_offset(anchor, row, col);
        &self.data[offset..offset + self.channels]
    }

    fn cell_offset(&self, anchor: usize, row: usize, col: usize) -> usize {
        anchor * self.anchor_stride + row * self.row_stride + col * self.col_stride
    }
}

fn max_offset(anchor: usize, row: usize, col: usize, strides: [usize; 4]) -> Option<usize> {
    anchor
        .checked_mul(strides[0])?
        .checked_add(row.checked_mul(strides[1])?)?
        .checked_add(col.checked_mul(strides[2])?)
}
