//! # lamco-motion-predict
//!
//! Pointer motion prediction for low-latency inking.
//!
//! Touch and stylus input reaches the screen a frame or two late. This crate
//! estimates where a single tracked pointer will be a few milliseconds ahead
//! so a drawing surface can render ink under the pen tip:
//! - [`estimator`] - Kalman state estimate (position through jank, plus pressure)
//! - [`predictor`] - Prediction strategies and the motion event facade
//! - [`replay`] - Offline replay of recorded traces
//!
//! # Architecture
//!
//! ```text
//! lamco-motion-predict
//!   ├─> MotionEvent (batched, possibly multi-pointer samples)
//!   ├─> MotionEventPredictor (stroke start on Down)
//!   │     └─> MotionPredictor: Kalman | Linear
//!   │           ├─> ReportRateEstimator (mean inter-sample interval)
//!   │           ├─> PointerKalmanFilter (x, y, pressure channels)
//!   │           └─> Projection (confidence-scaled horizon)
//!   └─> PredictedEvent
//! ```
//!
//! # Example
//!
//! ```rust
//! use lamco_motion_predict::event::{MotionEvent, PointerAction, PointerCoords};
//! use lamco_motion_predict::predictor::{MotionEventPredictor, PredictorConfig};
//!
//! let mut predictor = MotionEventPredictor::new(&PredictorConfig::default())?;
//! for i in 0..10 {
//!     let action = if i == 0 { PointerAction::Down } else { PointerAction::Move };
//!     let coords = PointerCoords::new(i as f32 * 4.0, 0.0, 1.0);
//!     predictor.record(&MotionEvent::single(action, 0, i * 8, coords));
//! }
//! let predicted = predictor.predict();
//! assert!(predicted.is_some());
//! # Ok::<(), lamco_motion_predict::PredictionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Configuration (TOML file + CLI overrides)
pub mod config;

/// Error types
pub mod error;

/// Kalman state estimation
pub mod estimator;

/// Motion event types
pub mod event;

/// Motion prediction strategies
pub mod predictor;

/// Trace replay
pub mod replay;

/// Utility functions
pub mod utils;

pub use error::{PredictionError, Result};
pub use estimator::{KinematicState, PointerKalmanFilter};
pub use event::{MotionEvent, PointerAction, PointerCoords, PredictedEvent, PredictedSample};
pub use predictor::{
    create_predictor, KalmanPredictor, LinearPredictor, MotionEventPredictor, MotionPredictor,
    PredictorConfig, PredictorStrategy,
};
