//! Offline trace replay
//!
//! Feeds a recorded sequence of [`MotionEvent`]s through a
//! [`MotionEventPredictor`] and records what the predictor produced after
//! every event.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::event::{MotionEvent, PredictedEvent};
use crate::predictor::MotionEventPredictor;

/// Predictor output after one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Time of the event's last batched sample (ms)
    pub time_ms: Option<i64>,
    /// Whether the predictor handled the event
    pub handled: bool,
    /// Prediction, `None` when the predictor was not ready
    pub prediction: Option<PredictedEvent>,
}

/// Aggregate statistics over a replay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplaySummary {
    /// Events replayed
    pub events: usize,
    /// Events the predictor handled
    pub handled: usize,
    /// Handled events after which no prediction was available
    pub not_ready: usize,
    /// Total predicted samples
    pub predicted_samples: usize,
    /// Mean samples per prediction
    pub mean_horizon: f64,
    /// Longest prediction
    pub max_horizon: usize,
}

/// Result of replaying a trace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// One frame per input event
    pub frames: Vec<ReplayFrame>,
    /// Aggregate statistics
    pub summary: ReplaySummary,
}

/// Replay `events` through `predictor`
///
/// Predicts only after handled events; unhandled events yield a frame with
/// no prediction and do not count as not-ready.
pub fn replay(predictor: &mut MotionEventPredictor, events: &[MotionEvent]) -> ReplayReport {
    let mut frames = Vec::with_capacity(events.len());
    let mut summary = ReplaySummary {
        events: events.len(),
        ..Default::default()
    };
    let mut predictions = 0usize;

    for event in events {
        let handled = predictor.record(event);
        let prediction = if handled {
            summary.handled += 1;
            let prediction = predictor.predict();
            match &prediction {
                Some(predicted) => {
                    predictions += 1;
                    summary.predicted_samples += predicted.len();
                    summary.max_horizon = summary.max_horizon.max(predicted.len());
                }
                None => summary.not_ready += 1,
            }
            prediction
        } else {
            None
        };

        debug!(
            "Replayed {} event at {:?}: handled={}, predicted={:?}",
            event.action,
            event.event_time(),
            handled,
            prediction.as_ref().map(PredictedEvent::len)
        );

        frames.push(ReplayFrame {
            time_ms: event.event_time(),
            handled,
            prediction,
        });
    }

    if predictions > 0 {
        summary.mean_horizon = summary.predicted_samples as f64 / predictions as f64;
    }

    info!(
        "Replay finished: {} events, {} handled, {} not ready, mean horizon {:.2}",
        summary.events, summary.handled, summary.not_ready, summary.mean_horizon
    );

    ReplayReport { frames, summary }
}

/// Load a JSON trace (array of motion events)
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<MotionEvent>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read trace file: {}", path.display()))?;

    let events: Vec<MotionEvent> =
        serde_json::from_str(&content).context("Failed to parse trace file")?;

    for (index, event) in events.iter().enumerate() {
        event
            .validate()
            .with_context(|| format!("Invalid trace event #{}", index))?;
    }

    info!("Loaded {} events from {}", events.len(), path.display());
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{PointerAction, PointerCoords, PredictedSample};
    use crate::predictor::MockMotionPredictor;

    fn stroke() -> Vec<MotionEvent> {
        (0..4)
            .map(|i| {
                let action = if i == 0 {
                    PointerAction::Down
                } else {
                    PointerAction::Move
                };
                MotionEvent::single(action, 0, i * 8, PointerCoords::new(i as f32, 0.0, 1.0))
            })
            .collect()
    }

    #[test]
    fn test_summary_counts() {
        let mut mock = MockMotionPredictor::new();
        mock.expect_init_stroke_prediction().return_const(());
        let mut calls = 0;
        mock.expect_on_motion_event().returning(move |_| {
            calls += 1;
            calls != 2
        });
        let mut predictions = 0;
        mock.expect_predict().returning(move || {
            predictions += 1;
            if predictions == 1 {
                None
            } else {
                let sample = PredictedSample {
                    x: 0.0,
                    y: 0.0,
                    pressure: 1.0,
                };
                Some(PredictedEvent::new(0, vec![sample; predictions]))
            }
        });
        mock.expect_append_predicted_samples().returning(|p| p);

        let mut predictor = MotionEventPredictor::with_predictor(Box::new(mock));
        let report = replay(&mut predictor, &stroke());

        assert_eq!(report.frames.len(), 4);
        assert!(!report.frames[1].handled);
        assert_eq!(report.frames[3].time_ms, Some(24));

        let summary = report.summary;
        assert_eq!(summary.events, 4);
        assert_eq!(summary.handled, 3);
        assert_eq!(summary.not_ready, 1);
        assert_eq!(summary.predicted_samples, 5);
        assert_eq!(summary.max_horizon, 3);
        assert_eq!(summary.mean_horizon, 2.5);
    }

    #[test]
    fn test_empty_trace() {
        let mut predictor = MotionEventPredictor::new(&Default::default()).unwrap();
        let report = replay(&mut predictor, &[]);
        assert!(report.frames.is_empty());
        assert_eq!(report.summary, ReplaySummary::default());
    }
}
