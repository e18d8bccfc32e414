//! Measure-relative positions
//!
//! A dragged text remembers where it sits relative to the centre of its
//! nearest measure, so its position can be re-derived after the score is
//! re-rendered and the measures have moved.

use crate::models::edit::{EditRecord, MeasureOffset};
use crate::models::element::Rect;

/// Offset of `element_box`'s centre from the nearest measure centre
///
/// `element_box` is the element's box as displayed (transform included).
/// Returns `None` when there are no measures.
pub fn relative_offset(element_box: &Rect, measure_boxes: &[Rect]) -> Option<MeasureOffset> {
    let center = element_box.center();
    let (index, nearest) = measure_boxes
        .iter()
        .enumerate()
        .map(|(i, m)| (i, m.center()))
        .min_by(|(_, a), (_, b)| {
            a.distance(&center)
                .partial_cmp(&b.distance(&center))
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;

    Some(MeasureOffset {
        measure_number: index + 1,
        offset_x: center.x - nearest.x,
        offset_y: center.y - nearest.y,
    })
}

/// Re-derive the pixel offset of `edit` from its stored measure offset
///
/// `element_box` is the freshly rendered, untransformed box. Returns whether
/// the record changed; records without a measure offset or pointing past the
/// last measure are left alone.
pub fn recalculate(edit: &mut EditRecord, measure_boxes: &[Rect], element_box: &Rect, tenths_per_px: f64) -> bool {
    let Some(offset) = edit.measure_offset else {
        return false;
    };
    let Some(measure) = offset
        .measure_number
        .checked_sub(1)
        .and_then(|i| measure_boxes.get(i))
    else {
        log::warn!("measure: measure {} not found", offset.measure_number);
        return false;
    };

    let target = measure.center();
    let current = element_box.center();
    let x = target.x + offset.offset_x - current.x;
    let y = target.y + offset.offset_y - current.y;
    if x == edit.x && y == edit.y {
        return false;
    }
    edit.set_position(x, y, tenths_per_px);
    true
}
