//! Pointer input and predicted output events
//!
//! Input arrives as [`MotionEvent`]s: an action plus one or more batched
//! sub-samples in chronological order, each carrying one [`PointerCoords`]
//! per pointer index. Predictions leave as a [`PredictedEvent`], an ordered
//! list of [`PredictedSample`]s without timestamps.
//!
//! ```text
//! MotionEvent
//!   ├─ action: Down | Move | Up | Cancel
//!   ├─ pointer_ids: [id0, id1, ...]        (index -> identity)
//!   └─ samples: [BatchedSample { time_ms, coords: [c0, c1, ...] }, ...]
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{PredictionError, Result};

/// Opaque identity of a tracked contact
pub type PointerId = i32;

/// Position and pressure of one pointer in one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerCoords {
    /// X coordinate (device-independent units)
    pub x: f32,
    /// Y coordinate (device-independent units)
    pub y: f32,
    /// Pressure, 0.0-1.0 in device units
    #[serde(default = "default_pressure")]
    pub pressure: f32,
}

fn default_pressure() -> f32 {
    1.0
}

impl PointerCoords {
    /// Create coordinates
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self { x, y, pressure }
    }
}

/// One batched sub-sample of a motion event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchedSample {
    /// Monotonic timestamp in milliseconds
    pub time_ms: i64,
    /// Coordinates indexed by pointer index
    pub coords: Vec<PointerCoords>,
}

/// Action carried by a motion event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerAction {
    /// First contact of a stroke
    Down,
    /// Contact moved
    #[default]
    Move,
    /// Contact lifted
    Up,
    /// Gesture aborted by the platform
    Cancel,
}

impl std::fmt::Display for PointerAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Down => write!(f, "Down"),
            Self::Move => write!(f, "Move"),
            Self::Up => write!(f, "Up"),
            Self::Cancel => write!(f, "Cancel"),
        }
    }
}

/// Motion event with batched history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionEvent {
    /// Event action
    #[serde(default)]
    pub action: PointerAction,
    /// Pointer identity for each pointer index
    pub pointer_ids: Vec<PointerId>,
    /// Batched sub-samples, oldest first
    pub samples: Vec<BatchedSample>,
}

impl MotionEvent {
    /// Create a validated motion event
    ///
    /// Every batched sample must carry exactly one coordinate per pointer id.
    pub fn new(
        action: PointerAction,
        pointer_ids: Vec<PointerId>,
        samples: Vec<BatchedSample>,
    ) -> Result<Self> {
        let event = Self {
            action,
            pointer_ids,
            samples,
        };
        event.validate()?;
        Ok(event)
    }

    /// Convenience constructor for a single pointer with one sample
    pub fn single(
        action: PointerAction,
        pointer_id: PointerId,
        time_ms: i64,
        coords: PointerCoords,
    ) -> Self {
        Self {
            action,
            pointer_ids: vec![pointer_id],
            samples: vec![BatchedSample {
                time_ms,
                coords: vec![coords],
            }],
        }
    }

    /// Check the event shape (used for deserialized traces)
    pub fn validate(&self) -> Result<()> {
        if self.samples.is_empty() {
            return Err(PredictionError::EmptyEvent);
        }
        for sample in &self.samples {
            if sample.coords.len() != self.pointer_ids.len() {
                return Err(PredictionError::PointerCountMismatch {
                    expected: self.pointer_ids.len(),
                    actual: sample.coords.len(),
                });
            }
        }
        Ok(())
    }

    /// Pointer index of `pointer_id`, if present
    pub fn find_pointer_index(&self, pointer_id: PointerId) -> Option<usize> {
        self.pointer_ids.iter().position(|&id| id == pointer_id)
    }

    /// Iterate `(time_ms, coords)` of one pointer index, oldest first
    pub fn history(&self, pointer_index: usize) -> impl Iterator<Item = (i64, PointerCoords)> + '_ {
        self.samples
            .iter()
            .filter_map(move |s| s.coords.get(pointer_index).map(|c| (s.time_ms, *c)))
    }

    /// Timestamp of the most recent batched sample
    pub fn event_time(&self) -> Option<i64> {
        self.samples.last().map(|s| s.time_ms)
    }

    /// Is this the platform cancel signal?
    pub fn is_cancel(&self) -> bool {
        self.action == PointerAction::Cancel
    }
}

/// One synthesized future sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictedSample {
    /// Predicted X coordinate
    pub x: f32,
    /// Predicted Y coordinate
    pub y: f32,
    /// Predicted pressure, always within 0.0-1.0
    pub pressure: f32,
}

/// Ordered sequence of predicted samples for one pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedEvent {
    /// Pointer the prediction belongs to
    pub pointer_id: PointerId,
    /// Predicted samples, nearest first
    pub samples: Vec<PredictedSample>,
}

impl PredictedEvent {
    /// Create an event from already projected samples
    pub fn new(pointer_id: PointerId, samples: Vec<PredictedSample>) -> Self {
        Self {
            pointer_id,
            samples,
        }
    }

    /// Append a batch of samples after the existing ones
    pub fn append_batch(&mut self, batch: impl IntoIterator<Item = PredictedSample>) {
        self.samples.extend(batch);
    }

    /// Number of predicted samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the projection stopped before emitting anything
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Furthest predicted sample
    pub fn last(&self) -> Option<&PredictedSample> {
        self.samples.last()
    }
}
