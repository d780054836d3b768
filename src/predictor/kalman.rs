//! Kalman ink predictor
//!
//! Predicts the location of the pen `prediction_target` milliseconds into the
//! future from the state of a [`PointerKalmanFilter`].
//!
//! This filter can provide solid prediction up to 25ms into the future. When
//! the rendering pipeline is not close to zero latency, prediction errors
//! become more visible and the target should be reduced to 20ms.
//!
//! # Prediction
//!
//! ```text
//! speed      = |velocity| / report_rate            (units/ms)
//! confidence = speed_factor(speed) × (1 − jank_factor(|jank|))
//! horizon    = ceil(target / report_rate × confidence)
//! ```
//!
//! The horizon is then walked with a constant-jerk model, see
//! [`project`](super::projection::project).

use nalgebra::Vector2;
use tracing::{debug, trace};

use super::intake::{tracked_history, LastSample};
use super::projection::{confidence_factor, horizon_samples, project, ProjectionStart};
use super::report_rate::ReportRateEstimator;
use super::MotionPredictor;
use crate::error::{PredictionError, Result};
use crate::estimator::{PointerKalmanFilter, DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE};
use crate::event::{MotionEvent, PointerId, PredictedEvent, PredictedSample};

/// Single pointer predictor backed by a Kalman state estimator
#[derive(Debug, Clone)]
pub struct KalmanPredictor {
    /// The filter is tuned to smooth noise while reacting quickly to direction
    /// changes. A stronger filter gives smoother predictions at the cost of
    /// possible prediction errors.
    kalman: PointerKalmanFilter,

    /// Pointer of the gesture that requires prediction
    pointer_id: PointerId,

    /// Target time in milliseconds to predict
    prediction_target_ms: f64,

    /// Running or explicit report rate
    report_rate: ReportRateEstimator,

    /// Sample count callers expect, only known with an explicit rate
    expected_sample_count: Option<usize>,

    /// Last accepted sample of the current stroke
    last_sample: Option<LastSample>,

    /// State reached by the last projection, used for padding
    last_projected: Option<PredictedSample>,
}

impl KalmanPredictor {
    /// Create a predictor with default filter tuning
    pub fn new() -> Self {
        Self::with_noise(DEFAULT_PROCESS_NOISE, DEFAULT_MEASUREMENT_NOISE)
    }

    /// Create a predictor with custom process and measurement noise
    pub fn with_noise(sigma_process: f64, sigma_measurement: f64) -> Self {
        Self {
            kalman: PointerKalmanFilter::new(sigma_process, sigma_measurement),
            pointer_id: 0,
            prediction_target_ms: 0.0,
            report_rate: ReportRateEstimator::new(),
            expected_sample_count: None,
            last_sample: None,
            last_projected: None,
        }
    }

    /// Fold one sample into the estimate
    ///
    /// Returns false when the sample was dropped as a repeat of the previous one.
    fn update(&mut self, x: f32, y: f32, pressure: f32, time_ms: i64) -> bool {
        if let Some(last) = self.last_sample {
            if last.is_repeated_by(x, y, time_ms) {
                trace!("Dropping repeated sample ({}, {}) at {}ms", x, y, time_ms);
                return false;
            }
            self.report_rate
                .record_delta(time_ms.saturating_sub(last.time_ms) as f64);
        }

        self.kalman.update(x as f64, y as f64, pressure as f64);
        self.last_sample = Some(LastSample { x, y, time_ms });
        true
    }

    fn last_position(&self) -> Vector2<f64> {
        self.last_sample
            .map(|s| Vector2::new(s.x as f64, s.y as f64))
            .unwrap_or_else(Vector2::zeros)
    }

    fn padding_sample(&self) -> PredictedSample {
        self.last_projected.unwrap_or_else(|| {
            let position = self.last_position();
            PredictedSample {
                x: position.x as f32,
                y: position.y as f32,
                pressure: self.kalman.pressure().clamp(0.0, 1.0) as f32,
            }
        })
    }

    /// Underlying state estimator
    pub fn estimator(&self) -> &PointerKalmanFilter {
        &self.kalman
    }

    /// Accepted samples since the stroke started
    pub fn num_iterations(&self) -> usize {
        self.kalman.num_iterations()
    }

    /// Report rate estimator
    pub fn report_rate(&self) -> &ReportRateEstimator {
        &self.report_rate
    }

    /// Sample count expected by callers (explicit rate only)
    pub fn expected_sample_count(&self) -> Option<usize> {
        self.expected_sample_count
    }

    /// Pointer currently tracked
    pub fn pointer_id(&self) -> PointerId {
        self.pointer_id
    }

    /// Timestamp of the last accepted sample
    pub fn last_sample_time(&self) -> Option<i64> {
        self.last_sample.map(|s| s.time_ms)
    }

    fn recompute_expected_sample_count(&mut self) {
        if self.report_rate.is_overridden() {
            self.expected_sample_count =
                Some((self.prediction_target_ms / self.report_rate.rate_ms()).ceil() as usize);
        }
    }
}

impl Default for KalmanPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionPredictor for KalmanPredictor {
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
        debug!("Explicit report rate set: {}ms", report_rate_ms);
        self.report_rate.override_rate(report_rate_ms as f64);
        self.recompute_expected_sample_count();
        Ok(())
    }

    fn init_stroke_prediction(&mut self, pointer_id: PointerId) {
        debug!("Starting stroke prediction for pointer {}", pointer_id);
        self.kalman.reset();
        self.last_sample = None;
        self.last_projected = None;
        self.pointer_id = pointer_id;
    }

    fn on_motion_event(&mut self, event: &MotionEvent) -> bool {
        if event.is_cancel() {
            debug!("Stroke of pointer {} cancelled", self.pointer_id);
            self.kalman.reset();
            self.last_sample = None;
            self.last_projected = None;
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
        if self.expected_sample_count.is_none() && !self.kalman.is_converged() {
            debug!(
                "Not enough samples to predict ({} accepted)",
                self.kalman.num_iterations()
            );
            return None;
        }

        let report_rate_ms = self.report_rate.rate_ms();
        if !(report_rate_ms.is_finite() && report_rate_ms > 0.0) {
            debug!("Report rate unusable ({}ms), skipping prediction", report_rate_ms);
            return None;
        }

        let state = self.kalman.state();
        let start = ProjectionStart {
            position: self.last_position(),
            velocity: state.velocity,
            acceleration: state.acceleration,
            jank: state.jank,
            pressure: state.pressure,
            pressure_change: state.pressure_change,
        };

        // Adjust prediction distance based on filter confidence and movement speed
        let speed = start.velocity.norm() / report_rate_ms;
        let jank = start.jank.norm();
        let confidence = confidence_factor(speed, jank);

        let mut horizon = horizon_samples(self.prediction_target_ms, report_rate_ms, confidence);
        // Normally never hit since confidence stays at or below 1.0
        if let Some(expected) = self.expected_sample_count {
            horizon = horizon.min(expected);
        }

        let projection = project(&start, horizon);

        trace!(
            "Prediction: speed={:.3}, jank={:.4}, confidence={:.3}, horizon={}, emitted={}{}",
            speed,
            jank,
            confidence,
            horizon,
            projection.samples.len(),
            if projection.lifted { " (lift-off)" } else { "" }
        );

        self.last_projected = Some(PredictedSample {
            x: projection.final_position.x as f32,
            y: projection.final_position.y as f32,
            pressure: projection.final_pressure.clamp(0.0, 1.0) as f32,
        });

        Some(PredictedEvent::new(self.pointer_id, projection.samples))
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

        let padding = self.padding_sample();
        let mut event =
            predicted.unwrap_or_else(|| PredictedEvent::new(self.pointer_id, Vec::new()));
        event.append_batch(std::iter::repeat(padding).take(expected - current));
        Some(event)
    }
}
