//! Linear kinematic predictor
//!
//! Physics-based extrapolation from smoothed velocity and acceleration,
//! without a state estimator. Cheaper than the Kalman predictor and more
//! sensitive to input noise.
//!
//! # Physics Model
//!
//! ```text
//! position(t) = position(0) + velocity * t + 0.5 * acceleration * t²
//! ```
//!
//! One sample is emitted per report interval up to the prediction target.
//!
//! # Smoothing
//!
//! Velocity and acceleration are smoothed using exponential moving average
//! to prevent jitter from input noise:
//!
//! ```text
//! velocity_smooth = α * velocity_new + (1 - α) * velocity_old
//! ```

use std::collections::VecDeque;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::intake::{tracked_history, LastSample};
use super::report_rate::ReportRateEstimator;
use super::MotionPredictor;
use crate::error::{PredictionError, Result};
use crate::event::{MotionEvent, PointerId, PredictedEvent, PredictedSample};

/// Accepted samples needed before predicting on the adaptive rate path
pub const MIN_LINEAR_SAMPLES: usize = 3;

/// Configuration for the linear predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPredictorConfig {
    /// Number of samples to keep in history
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Velocity smoothing factor (0.0-1.0, higher = more responsive)
    #[serde(default = "default_velocity_smoothing")]
    pub velocity_smoothing: f64,

    /// Acceleration smoothing factor (0.0-1.0)
    #[serde(default = "default_accel_smoothing")]
    pub acceleration_smoothing: f64,

    /// Maximum prediction distance from the last sample (units)
    #[serde(default = "default_max_prediction")]
    pub max_prediction_distance: f64,

    /// Minimum speed to apply prediction (units/ms)
    #[serde(default = "default_min_speed")]
    pub min_speed: f64,
}

fn default_history_size() -> usize {
    8
}
fn default_velocity_smoothing() -> f64 {
    0.4
}
fn default_accel_smoothing() -> f64 {
    0.2
}
fn default_max_prediction() -> f64 {
    100.0
}
fn default_min_speed() -> f64 {
    0.05
}

impl Default for LinearPredictorConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            velocity_smoothing: default_velocity_smoothing(),
            acceleration_smoothing: default_accel_smoothing(),
            max_prediction_distance: default_max_prediction(),
            min_speed: default_min_speed(),
        }
    }
}

/// Accepted sample with timestamp
#[derive(Debug, Clone, Copy)]
struct TimedSample {
    position: Vector2<f64>,
    pressure: f64,
    time_ms: i64,
}

/// Pointer predictor using smoothed velocity and acceleration
#[derive(Debug, Clone)]
pub struct LinearPredictor {
    /// Configuration
    config: LinearPredictorConfig,

    /// Pointer of the gesture that requires prediction
    pointer_id: PointerId,

    /// Target time in milliseconds to predict
    prediction_target_ms: f64,

    /// Running or explicit report rate
    report_rate: ReportRateEstimator,

    /// Sample count callers expect, only known with an explicit rate
    expected_sample_count: Option<usize>,

    /// Accepted samples of the current stroke, oldest first
    history: VecDeque<TimedSample>,

    /// Smoothed velocity (units/ms)
    velocity: Vector2<f64>,

    /// Smoothed acceleration (units/ms²)
    acceleration: Vector2<f64>,

    /// Furthest sample of the last prediction, used for padding
    last_predicted: Option<PredictedSample>,
}

impl LinearPredictor {
    /// Create a new linear predictor
    ///
    /// `history_size` is raised to [`MIN_LINEAR_SAMPLES`] so the adaptive
    /// rate path can always collect enough samples to predict.
    pub fn new(mut config: LinearPredictorConfig) -> Self {
        config.history_size = config.history_size.max(MIN_LINEAR_SAMPLES);
        Self {
            history: VecDeque::with_capacity(config.history_size),
            config,
            pointer_id: 0,
            prediction_target_ms: 0.0,
            report_rate: ReportRateEstimator::new(),
            expected_sample_count: None,
            velocity: Vector2::zeros(),
            acceleration: Vector2::zeros(),
            last_predicted: None,
        }
    }

    /// Current smoothed velocity (units/ms)
    pub fn velocity(&self) -> Vector2<f64> {
        self.velocity
    }

    /// Current speed (magnitude of velocity)
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Accepted samples kept for the current stroke
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Report rate estimator
    pub fn report_rate(&self) -> &ReportRateEstimator {
        &self.report_rate
    }

    fn reset(&mut self) {
        self.history.clear();
        self.velocity = Vector2::zeros();
        self.acceleration = Vector2::zeros();
        self.last_predicted = None;
    }

    fn update(&mut self, x: f32, y: f32, pressure: f32, time_ms: i64) -> bool {
        if let Some(last) = self.history.back() {
            let last = LastSample {
                x: last.position.x as f32,
                y: last.position.y as f32,
                time_ms: last.time_ms,
            };
            if last.is_repeated_by(x, y, time_ms) {
                return false;
            }
            self.report_rate
                .record_delta(time_ms.saturating_sub(last.time_ms) as f64);
        }

        self.history.push_back(TimedSample {
            position: Vector2::new(x as f64, y as f64),
            pressure: pressure as f64,
            time_ms,
        });
        while self.history.len() > self.config.history_size {
            self.history.pop_front();
        }

        self.update_velocity();
        self.update_acceleration();

        trace!(
            "Linear update: pos=({}, {}), vel=({:.3}, {:.3})",
            x,
            y,
            self.velocity.x,
            self.velocity.y
        );
        true
    }

    fn update_velocity(&mut self) {
        let n = self.history.len();
        if n < 2 {
            return;
        }

        let recent = &self.history[n - 1];
        let prev = &self.history[n - 2];

        let dt = (recent.time_ms - prev.time_ms) as f64;
        if dt <= 0.0 {
            return;
        }

        let instantaneous = (recent.position - prev.position) / dt;

        let alpha = self.config.velocity_smoothing;
        self.velocity = instantaneous * alpha + self.velocity * (1.0 - alpha);
    }

    fn update_acceleration(&mut self) {
        let n = self.history.len();
        if n < 3 {
            return;
        }

        let recent = &self.history[n - 1];
        let mid = &self.history[n - 2];
        let prev = &self.history[n - 3];

        let dt1 = (recent.time_ms - mid.time_ms) as f64;
        let dt2 = (mid.time_ms - prev.time_ms) as f64;
        if dt1 <= 0.0 || dt2 <= 0.0 {
            return;
        }

        let v1 = (recent.position - mid.position) / dt1;
        let v2 = (mid.position - prev.position) / dt2;
        let instantaneous = (v1 - v2) / ((dt1 + dt2) / 2.0);

        let alpha = self.config.acceleration_smoothing;
        self.acceleration = instantaneous * alpha + self.acceleration * (1.0 - alpha);
    }

    fn recompute_expected_sample_count(&mut self) {
        if self.report_rate.is_overridden() {
            self.expected_sample_count =
                Some((self.prediction_target_ms / self.report_rate.rate_ms()).ceil() as usize);
        }
    }
}

impl Default for LinearPredictor {
    fn default() -> Self {
        Self::new(LinearPredictorConfig::default())
    }
}

impl MotionPredictor for LinearPredictor {
    fn prediction_target(&self) -> i32 {
        self.prediction_target_ms as i32
    }

    fn set_prediction_target(&mut self, prediction_target_ms: i32) {
        self.prediction_target_ms = prediction_target_ms.max(0) as f64;
        self.recompute_expected_sample_count();
    }

    fn set_report_rate(&mut self, report_rate_ms: i32) -> Result<()> {
        if report_rate_ms <= 0 {
            return Err(PredictionError::InvalidReportRate(report_rate_ms));
        }
        self.report_rate.override_rate(report_rate_ms as f64);
        self.recompute_expected_sample_count();
        Ok(())
    }

    fn init_stroke_prediction(&mut self, pointer_id: PointerId) {
        debug!("Starting linear stroke prediction for pointer {}", pointer_id);
        self.reset();
        self.pointer_id = pointer_id;
    }

    fn on_motion_event(&mut self, event: &MotionEvent) -> bool {
        if event.is_cancel() {
            self.reset();
            return false;
        }

        let Some(history) = tracked_history(event, self.pointer_id) else {
            return false;
        };
        for (time_ms, coords) in history {
            self.update(coords.x, coords.y, coords.pressure, time_ms);
        }
        true
    }

    fn predict(&mut self) -> Option<PredictedEvent> {
        if self.expected_sample_count.is_none() && self.history.len() < MIN_LINEAR_SAMPLES {
            return None;
        }

        let report_rate_ms = self.report_rate.rate_ms();
        if !(report_rate_ms.is_finite() && report_rate_ms > 0.0) {
            return None;
        }

        let Some(last) = self.history.back().copied() else {
            return Some(PredictedEvent::new(self.pointer_id, Vec::new()));
        };

        // Too slow to gain anything from prediction
        if self.speed() < self.config.min_speed {
            self.last_predicted = None;
            return Some(PredictedEvent::new(self.pointer_id, Vec::new()));
        }

        let mut steps = (self.prediction_target_ms / report_rate_ms).ceil() as usize;
        if let Some(expected) = self.expected_sample_count {
            steps = steps.min(expected);
        }

        let pressure = last.pressure.clamp(0.0, 1.0) as f32;
        let samples: Vec<PredictedSample> = (1..=steps)
            .map(|step| {
                let t = step as f64 * report_rate_ms;
                let mut offset = self.velocity * t + self.acceleration * (0.5 * t * t);

                // Clamp to maximum prediction distance
                let distance = offset.norm();
                if distance > self.config.max_prediction_distance {
                    offset *= self.config.max_prediction_distance / distance;
                }

                let position = last.position + offset;
                PredictedSample {
                    x: position.x as f32,
                    y: position.y as f32,
                    pressure,
                }
            })
            .collect();

        self.last_predicted = samples.last().copied();
        Some(PredictedEvent::new(self.pointer_id, samples))
    }

    fn append_predicted_samples(
        &self,
        predicted: Option<PredictedEvent>,
    ) -> Option<PredictedEvent> {
        let Some(expected) = self.expected_sample_count else {
            return predicted;
        };

        let current = predicted.as_ref().map_or(0, PredictedEvent::len);
        if current >= expected {
            return predicted;
        }

        let padding = self.last_predicted.unwrap_or_else(|| {
            let (position, pressure) = self
                .history
                .back()
                .map(|s| (s.position, s.pressure))
                .unwrap_or_else(|| (Vector2::zeros(), 0.0));
            PredictedSample {
                x: position.x as f32,
                y: position.y as f32,
                pressure: pressure.clamp(0.0, 1.0) as f32,
            }
        });

        let mut event =
            predicted.unwrap_or_else(|| PredictedEvent::new(self.pointer_id, Vec::new()));
        event.append_batch(std::iter::repeat(padding).take(expected - current));
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{PointerAction, PointerCoords};

    fn feed(predictor: &mut LinearPredictor, points: &[(i64, f32, f32)]) {
        for &(time_ms, x, y) in points {
            predictor.on_motion_event(&MotionEvent::single(
                PointerAction::Move,
                0,
                time_ms,
                PointerCoords::new(x, y, 0.8),
            ));
        }
    }

    #[test]
    fn test_default_config() {
        let config = LinearPredictorConfig::default();
        assert_eq!(config.history_size, 8);
        assert_eq!(config.velocity_smoothing, 0.4);
    }

    #[test]
    fn test_history_bounded() {
        let mut predictor = LinearPredictor::default();
        let points: Vec<_> = (0..20).map(|i| (i * 8, i as f32 * 4.0, 0.0)).collect();
        feed(&mut predictor, &points);
        assert_eq!(predictor.history_len(), 8);
    }

    #[test]
    fn test_short_history_still_predicts() {
        let mut predictor = LinearPredictor::new(LinearPredictorConfig {
            history_size: 2,
            ..Default::default()
        });
        predictor.set_prediction_target(24);
        let points: Vec<_> = (0..50).map(|i| (i * 8, i as f32 * 8.0, 0.0)).collect();
        feed(&mut predictor, &points);

        assert_eq!(predictor.history_len(), MIN_LINEAR_SAMPLES);
        let predicted = predictor.predict().unwrap();
        assert!(!predicted.is_empty());
    }

    #[test]
    fn test_not_ready_before_three_samples() {
        let mut predictor = LinearPredictor::default();
        predictor.set_prediction_target(16);
        feed(&mut predictor, &[(0, 0.0, 0.0), (8, 4.0, 0.0)]);
        assert!(predictor.predict().is_none());

        feed(&mut predictor, &[(16, 8.0, 0.0)]);
        assert!(predictor.predict().is_some());
    }

    #[test]
    fn test_moving_pointer_predicts_ahead() {
        let mut predictor = LinearPredictor::default();
        predictor.set_prediction_target(24);

        // Moving right at 0.5 units/ms
        let points: Vec<_> = (0..10).map(|i| (i * 8, i as f32 * 4.0, 50.0)).collect();
        feed(&mut predictor, &points);

        let predicted = predictor.predict().unwrap();
        assert_eq!(predicted.len(), 3);
        assert!(predicted.samples[0].x > 36.0);
        assert!(predicted.samples[2].x > predicted.samples[0].x);
        assert!(predicted.samples.iter().all(|s| s.pressure == 0.8));
    }

    #[test]
    fn test_max_prediction_distance() {
        let config = LinearPredictorConfig {
            max_prediction_distance: 20.0,
            ..Default::default()
        };
        let mut predictor = LinearPredictor::new(config);
        predictor.set_prediction_target(100);

        // Very fast movement
        let points: Vec<_> = (0..10).map(|i| (i * 8, i as f32 * 100.0, 0.0)).collect();
        feed(&mut predictor, &points);

        let predicted = predictor.predict().unwrap();
        for sample in &predicted.samples {
            let dx = sample.x - 900.0;
            let dy = sample.y;
            assert!((dx * dx + dy * dy).sqrt() <= 20.01, "sample {:?}", sample);
        }
    }

    #[test]
    fn test_stationary_pointer_predicts_nothing() {
        let mut predictor = LinearPredictor::default();
        predictor.set_prediction_target(24);
        feed(&mut predictor, &[(0, 5.0, 5.0), (30, 5.0, 5.0), (60, 5.0, 5.0)]);

        let predicted = predictor.predict().unwrap();
        assert!(predicted.is_empty());
    }

    #[test]
    fn test_padding_with_explicit_rate() {
        let mut predictor = LinearPredictor::default();
        predictor.set_prediction_target(32);
        predictor.set_report_rate(8).unwrap();
        feed(&mut predictor, &[(0, 5.0, 5.0), (30, 5.0, 5.0)]);

        let predicted = predictor.predict();
        let padded = predictor.append_predicted_samples(predicted).unwrap();
        assert_eq!(padded.len(), 4);
        assert!(padded.samples.iter().all(|s| s.x == 5.0 && s.y == 5.0));
    }
}
