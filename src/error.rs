//! Prediction Error Types
//!
//! Errors surfaced by the predictor configuration surface and by event
//! construction. Numeric edge cases inside the estimator are not errors:
//! [`predict`](crate::predictor::MotionPredictor::predict) reports them as
//! "not ready" instead.

use thiserror::Error;

/// Result type for prediction operations
pub type Result<T> = std::result::Result<T, PredictionError>;

/// Prediction module error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PredictionError {
    /// Explicit report rate must be strictly positive
    #[error("Invalid report rate: {0}ms (must be strictly positive)")]
    InvalidReportRate(i32),

    /// A batched sample does not carry one coordinate per pointer
    #[error("Pointer count mismatch: event has {expected} pointers but sample has {actual}")]
    PointerCountMismatch {
        /// Number of pointer ids declared by the event
        expected: usize,
        /// Number of coordinates found in the sample
        actual: usize,
    },

    /// Event without any batched sample
    #[error("Motion event contains no samples")]
    EmptyEvent,
}
