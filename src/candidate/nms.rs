//! Greedy non-maximum suppression over scored predictions.

use crate::candidate::{sorted_indices_desc, Prediction};

/// Removes boxes that overlap a higher-scored box by more than `threshold`.
///
/// Boxes are visited in descending score order (ties broken by input
/// position, so the result is deterministic). Each box that survives is
/// appended to the result and suppresses every remaining box whose IOU
/// with it strictly exceeds `threshold`; overlap exactly at the threshold
/// does not suppress. At most `limit` boxes are returned.
pub fn non_max_suppression(boxes: &[Prediction], limit: usize, threshold: f32) -> Vec<Prediction> {
    if boxes.is_empty() || limit == 0 {
        return Vec::new();
    }

    let order = sorted_indices_desc(boxes);
    let mut active = vec![true; boxes.len()];
    let mut num_active = boxes.len();
    let mut selected = Vec::with_capacity(limit.min(boxes.len()));

    'outer: for i in 0..order.len() {
        if !active[i] {
            continue;
        }
        let box_a = boxes[order[i]];
        selected.push(box_a);
        if selected.len() >= limit {
            break;
        }

        for j in (i + 1)..order.len() {
            if !active[j] {
                continue;
            }
            let box_b = boxes[order[j]];
            if box_a.rect.iou(&box_b.rect) > threshold {
                active[j] = false;
                num_active -= 1;
                if num_active == 0 {
                    break 'outer;
                }
            }
        }
    }

    selected
}
