use boxdecode::{BoxDecodeError, FeatureView};

#[test]
fn feature_view_rejects_zero_dimension() {
    let data = [0.0f32; 8];

    let err = FeatureView::from_contiguous(&data, [0, 1, 1, 6]).err().unwrap();
    assert_eq!(
        err,
        BoxDecodeError::InvalidShape {
            anchors: 0,
            height: 1,
            width: 1,
            channels: 6,
            reason: "zero dimension",
        }
    );

    let err = FeatureView::from_contiguous(&data, [1, 1, 0, 6]).err().unwrap();
    assert_eq!(
        err,
        BoxDecodeError::InvalidShape {
            anchors: 1,
            height: 1,
            width: 0,
            channels: 6,
            reason: "zero dimension",
        }
    );
}

#[test]
fn feature_view_rejects_missing_class_channels() {
    let data = [0.0f32; 8];

    let err = FeatureView::from_contiguous(&data, [1, 1, 1, 5]).err().unwrap();
    assert_eq!(
        err,
        BoxDecodeError::InvalidShape {
            anchors: 1,
            height: 1,
            width: 1,
            channels: 5,
            reason: "no class channels after the box channels",
        }
    );
}

#[test]
fn feature_view_rejects_non_unit_channel_stride() {
    let data = [0.0f32; 16];

    let err = FeatureView::new(&data, [1, 1, 1, 6], [12, 12, 12, 2])
        .err()
        .unwrap();
    assert_eq!(err, BoxDecodeError::NonUnitChannelStride { stride: 2 });
}

#[test]
fn feature_view_rejects_small_buffer() {
    let data = [0.0f32; 5];

    let err = FeatureView::from_contiguous(&data, [1, 1, 1, 6]).err().unwrap();
    assert_eq!(err, BoxDecodeError::BufferTooSmall { needed: 6, got: 5 });
}

#[test]
fn contiguous_view_roundtrips_indices() {
    let channels = 6;
    let (anchors, height, width) = (2usize, 2usize, 3usize);
    let mut data = vec![0.0f32; anchors * height * width * channels];
    for a in 0..anchors {
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    let offset = ((a * height + y) * width + x) * channels + c;
                    data[offset] = (a * 1000 + y * 100 + x * 10 + c) as f32;
                }
            }
        }
    }

    let view = FeatureView::from_contiguous(&data, [anchors, height, width, channels]).unwrap();
    assert_eq!(view.anchors(), anchors);
    assert_eq!(view.height(), height);
    assert_eq!(view.width(), width);
    assert_eq!(view.classes(), 1);
    assert_eq!(view.get(1, 0, 2, 4), Some(1024.0));
    assert_eq!(view.cell(0, 1, 1)[3], 113.0);

    assert_eq!(view.get(2, 0, 0, 0), None);
    assert_eq!(view.get(0, 0, 0, channels), None);
}

#[test]
fn strided_view_reads_padded_layout() {
    let channels = 6;
    let (anchors, height, width) = (2usize, 2usize, 2usize);
    // Two padding elements after each cell, two more after each row.
    let strides = [32usize, 16, 8, 1];
    let mut data = vec![f32::NAN; 64];
    for a in 0..anchors {
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    let offset = a * strides[0] + y * strides[1] + x * strides[2] + c;
                    data[offset] = (a * 1000 + y * 100 + x * 10 + c) as f32;
                }
            }
        }
    }

    let view = FeatureView::new(&data, [anchors, height, width, channels], strides).unwrap();
    for a in 0..anchors {
        for y in 0..height {
            for x in 0..width {
                let cell = view.cell(a, y, x);
                for c in 0..channels {
                    let expected = (a * 1000 + y * 100 + x * 10 + c) as f32;
                    assert_eq!(cell[c], expected);
                    assert_eq!(view.get(a, y, x, c), Some(expected));
                }
            }
        }
    }
}

#[test]
fn strided_view_requires_large_enough_buffer() {
    let data = [0.0f32; 40];

    // Max offset is 1*32 + 1*16 + 1*8 + 6 = 62.
    let err = FeatureView::new(&data, [2, 2, 2, 6], [32, 16, 8, 1])
        .err()
        .unwrap();
    assert_eq!(err, BoxDecodeError::BufferTooSmall { needed: 62, got: 40 });
}
