//! Motion Prediction
//!
//! Predictors ingest the samples of one tracked pointer and synthesize
//! future samples to hide input latency in inking and drawing surfaces.
//!
//! # Strategies
//!
//! | Strategy | Model | Noise handling | Use Case |
//! |----------|-------|----------------|----------|
//! | Kalman | Constant jerk, confidence-scaled horizon | Kalman filter | Default, stylus ink |
//! | Linear | Velocity + acceleration extrapolation | EMA smoothing | Cheap cursor lookahead |
//!
//! # Architecture
//!
//! ```text
//! MotionEvent
//!   └─> MotionEventPredictor
//!       ├─> Down: init_stroke_prediction(pointer)
//!       └─> MotionPredictor (Kalman | Linear)
//!           ├─> Drop repeated samples
//!           ├─> Update report rate estimate
//!           ├─> Update state (filter or smoothing)
//!           └─> predict() ─> append_predicted_samples() ─> PredictedEvent
//! ```
//!
//! # State
//!
//! `Idle → init_stroke_prediction → Tracking → (Cancel) → Idle`. There is no
//! terminal state for a lifted pointer; the next `Down` starts a new stroke.

mod intake;
mod kalman;
mod linear;
mod projection;
mod report_rate;

pub use intake::EVENT_TIME_IGNORED_THRESHOLD_MS;
pub use kalman::KalmanPredictor;
pub use linear::{LinearPredictor, LinearPredictorConfig, MIN_LINEAR_SAMPLES};
pub use projection::{
    confidence_factor, horizon_samples, normalize_range, project, Projection, ProjectionStart,
    ACCELERATION_INFLUENCE, HIGH_JANK, HIGH_SPEED, JANK_INFLUENCE, LIFT_OFF_PRESSURE, LOW_JANK,
    LOW_SPEED, VELOCITY_INFLUENCE,
};
pub use report_rate::{ReportRateEstimator, ReportRateMode, REPORT_RATE_SAMPLES};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::estimator::{DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE};
use crate::event::{MotionEvent, PointerAction, PointerId, PredictedEvent};

/// Default lookahead (ms)
pub const DEFAULT_PREDICTION_TARGET_MS: i32 = 20;

/// Capability shared by all prediction strategies
#[cfg_attr(test, mockall::automock)]
pub trait MotionPredictor {
    /// Target lead time in milliseconds
    fn prediction_target(&self) -> i32;

    /// Set the target lead time (negative values clamp to 0)
    fn set_prediction_target(&mut self, prediction_target_ms: i32);

    /// Fix the report rate, disabling the running estimate for good
    ///
    /// Fails with [`InvalidReportRate`](crate::PredictionError::InvalidReportRate)
    /// for zero or negative rates, leaving the configuration untouched.
    fn set_report_rate(&mut self, report_rate_ms: i32) -> Result<()>;

    /// Reset per-stroke state and track `pointer_id`
    fn init_stroke_prediction(&mut self, pointer_id: PointerId);

    /// Feed a motion event; returns whether it was handled
    fn on_motion_event(&mut self, event: &MotionEvent) -> bool;

    /// Predict future samples, `None` when not enough history exists yet
    fn predict(&mut self) -> Option<PredictedEvent>;

    /// Pad a prediction to the sample count implied by an explicit rate
    fn append_predicted_samples(
        &self,
        predicted: Option<PredictedEvent>,
    ) -> Option<PredictedEvent> {
        predicted
    }
}

/// Prediction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PredictorStrategy {
    /// Kalman state estimate with confidence-scaled horizon
    #[default]
    Kalman,

    /// Smoothed velocity/acceleration extrapolation
    Linear,
}

impl PredictorStrategy {
    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Kalman => "Kalman filter with adaptive confidence (ink quality)",
            Self::Linear => "Linear extrapolation (lowest cost)",
        }
    }
}

impl std::fmt::Display for PredictorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Kalman => write!(f, "Kalman"),
            Self::Linear => write!(f, "Linear"),
        }
    }
}

impl std::str::FromStr for PredictorStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kalman" | "filter" | "default" => Ok(Self::Kalman),
            "linear" | "physics" | "extrapolate" => Ok(Self::Linear),
            _ => Err(format!("Unknown predictor strategy: {}", s)),
        }
    }
}

/// Configuration for a predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Prediction strategy
    #[serde(default)]
    pub strategy: PredictorStrategy,

    /// Target lead time (ms)
    #[serde(default = "default_prediction_target_ms")]
    pub prediction_target_ms: i32,

    /// Explicit report rate (ms); running estimate when unset
    #[serde(default)]
    pub report_rate_ms: Option<i32>,

    /// Kalman process noise
    #[serde(default = "default_process_noise")]
    pub process_noise: f64,

    /// Kalman measurement noise
    #[serde(default = "default_measurement_noise")]
    pub measurement_noise: f64,

    /// Linear strategy tuning
    #[serde(default)]
    pub linear: LinearPredictorConfig,
}

fn default_prediction_target_ms() -> i32 {
    DEFAULT_PREDICTION_TARGET_MS
}
fn default_process_noise() -> f64 {
    DEFAULT_PROCESS_NOISE
}
fn default_measurement_noise() -> f64 {
    DEFAULT_MEASUREMENT_NOISE
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            strategy: PredictorStrategy::default(),
            prediction_target_ms: default_prediction_target_ms(),
            report_rate_ms: None,
            process_noise: default_process_noise(),
            measurement_noise: default_measurement_noise(),
            linear: LinearPredictorConfig::default(),
        }
    }
}

/// Build the predictor selected by `config`
pub fn create_predictor(config: &PredictorConfig) -> Result<Box<dyn MotionPredictor>> {
    let mut predictor: Box<dyn MotionPredictor> = match config.strategy {
        PredictorStrategy::Kalman => Box::new(KalmanPredictor::with_noise(
            config.process_noise,
            config.measurement_noise,
        )),
        PredictorStrategy::Linear => Box::new(LinearPredictor::new(config.linear.clone())),
    };

    predictor.set_prediction_target(config.prediction_target_ms);
    if let Some(report_rate_ms) = config.report_rate_ms {
        predictor.set_report_rate(report_rate_ms)?;
    }

    debug!(
        "Created {} predictor: target={}ms, report_rate={:?}",
        config.strategy, config.prediction_target_ms, config.report_rate_ms
    );
    Ok(predictor)
}

/// Motion event level predictor
///
/// Starts a new stroke on every `Down`, forwards events to the configured
/// strategy and pads predictions to the expected sample count.
pub struct MotionEventPredictor {
    predictor: Box<dyn MotionPredictor>,
}

impl MotionEventPredictor {
    /// Create a predictor from configuration
    pub fn new(config: &PredictorConfig) -> Result<Self> {
        Ok(Self::with_predictor(create_predictor(config)?))
    }

    /// Wrap an existing strategy
    pub fn with_predictor(predictor: Box<dyn MotionPredictor>) -> Self {
        Self { predictor }
    }

    /// Record a motion event; returns whether it was handled
    pub fn record(&mut self, event: &MotionEvent) -> bool {
        if event.action == PointerAction::Down {
            if let Some(&pointer_id) = event.pointer_ids.first() {
                self.predictor.init_stroke_prediction(pointer_id);
            }
        }
        self.predictor.on_motion_event(event)
    }

    /// Predict, padded to the expected sample count when a rate is fixed
    pub fn predict(&mut self) -> Option<PredictedEvent> {
        let predicted = self.predictor.predict();
        self.predictor.append_predicted_samples(predicted)
    }

    /// Underlying strategy
    pub fn predictor(&self) -> &dyn MotionPredictor {
        self.predictor.as_ref()
    }

    /// Underlying strategy (mutable)
    pub fn predictor_mut(&mut self) -> &mut dyn MotionPredictor {
        self.predictor.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PredictionError;
    use crate::event::PointerCoords;
    use mockall::predicate::eq;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "kalman".parse::<PredictorStrategy>().unwrap(),
            PredictorStrategy::Kalman
        );
        assert_eq!(
            "Linear".parse::<PredictorStrategy>().unwrap(),
            PredictorStrategy::Linear
        );
        assert!("spline".parse::<PredictorStrategy>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = PredictorConfig::default();
        assert_eq!(config.strategy, PredictorStrategy::Kalman);
        assert_eq!(config.prediction_target_ms, 20);
        assert_eq!(config.report_rate_ms, None);
        assert_eq!(config.process_noise, 0.01);
    }

    #[test]
    fn test_create_predictor_applies_configuration() {
        let config = PredictorConfig {
            strategy: PredictorStrategy::Linear,
            prediction_target_ms: 30,
            ..Default::default()
        };
        let predictor = create_predictor(&config).unwrap();
        assert_eq!(predictor.prediction_target(), 30);
    }

    #[test]
    fn test_create_predictor_rejects_invalid_rate() {
        let config = PredictorConfig {
            report_rate_ms: Some(0),
            ..Default::default()
        };
        assert_eq!(
            create_predictor(&config).err(),
            Some(PredictionError::InvalidReportRate(0))
        );
    }

    #[test]
    fn test_down_starts_stroke() {
        let mut mock = MockMotionPredictor::new();
        mock.expect_init_stroke_prediction()
            .with(eq(7))
            .times(1)
            .return_const(());
        mock.expect_on_motion_event().times(2).return_const(true);

        let mut predictor = MotionEventPredictor::with_predictor(Box::new(mock));
        let coords = PointerCoords::new(1.0, 2.0, 1.0);
        assert!(predictor.record(&MotionEvent::single(PointerAction::Down, 7, 0, coords)));
        assert!(predictor.record(&MotionEvent::single(PointerAction::Move, 7, 8, coords)));
    }

    #[test]
    fn test_predict_runs_padding_pass() {
        let mut mock = MockMotionPredictor::new();
        mock.expect_predict()
            .times(1)
            .returning(|| Some(PredictedEvent::new(0, Vec::new())));
        mock.expect_append_predicted_samples()
            .times(1)
            .returning(|predicted| {
                predicted.map(|p| PredictedEvent::new(p.pointer_id + 1, p.samples))
            });

        let mut predictor = MotionEventPredictor::with_predictor(Box::new(mock));
        let predicted = predictor.predict().unwrap();
        assert_eq!(predicted.pointer_id, 1);
    }
}
