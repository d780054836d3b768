//! Sample intake shared by all predictors

use tracing::info;

use crate::event::{MotionEvent, PointerCoords, PointerId};

/// Samples repeating the previous position within this window are dropped
pub const EVENT_TIME_IGNORED_THRESHOLD_MS: i64 = 20;

/// Last accepted sample of the current stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LastSample {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) time_ms: i64,
}

impl LastSample {
    /// Does a new sample merely repeat this one?
    ///
    /// Some platforms deliver the same move several times when multiple
    /// pointers are down, with unchanged coordinates and event time.
    /// Folding those into the filter only adds jank.
    pub(crate) fn is_repeated_by(&self, x: f32, y: f32, time_ms: i64) -> bool {
        x == self.x
            && y == self.y
            && time_ms <= self.time_ms.saturating_add(EVENT_TIME_IGNORED_THRESHOLD_MS)
    }
}

/// Batched history of the tracked pointer, or `None` if the event does not carry it
pub(crate) fn tracked_history(
    event: &MotionEvent,
    pointer_id: PointerId,
) -> Option<impl Iterator<Item = (i64, PointerCoords)> + '_> {
    match event.find_pointer_index(pointer_id) {
        Some(index) => Some(event.history(index)),
        None => {
            info!(
                "on_motion_event: cannot find pointer_id={} in event (action={}, pointers={:?})",
                pointer_id, event.action, event.pointer_ids
            );
            None
        }
    }
}
