//! Confidence model and constant-jerk projection
//!
//! Prediction distance is scaled down when the pen moves slowly (little to
//! gain, noise dominates) or erratically (high jank). The projection itself
//! is a pure function from a state snapshot to the predicted samples.

use nalgebra::Vector2;

use crate::event::PredictedSample;

/// Influence of jank during each prediction sample
pub const JANK_INFLUENCE: f64 = 0.1;

/// Influence of acceleration during each prediction sample
pub const ACCELERATION_INFLUENCE: f64 = 0.5;

/// Influence of velocity during each prediction sample
pub const VELOCITY_INFLUENCE: f64 = 1.0;

/// Jank at or below which full prediction is used
pub const LOW_JANK: f64 = 0.02;

/// Jank at or above which no prediction is used
pub const HIGH_JANK: f64 = 0.2;

/// Pen speed (units/ms) at or below which no prediction is used
pub const LOW_SPEED: f64 = 0.0;

/// Pen speed (units/ms) at or above which full prediction is used
pub const HIGH_SPEED: f64 = 2.0;

/// Projected pressure below which the pen is about to lift
pub const LIFT_OFF_PRESSURE: f64 = 0.1;

/// Upper bound on samples reserved before projecting; lift-off often ends
/// the projection well before the nominal horizon
const PREALLOCATED_SAMPLES: usize = 64;

/// Map `x` linearly from `[min, max]` onto `[0, 1]`, clamped
pub fn normalize_range(x: f64, min: f64, max: f64) -> f64 {
    let normalized = (x - min) / (max - min);
    normalized.max(0.0).min(1.0)
}

/// Confidence in `[0, 1]` from pen speed (units/ms) and jank magnitude
pub fn confidence_factor(speed: f64, jank: f64) -> f64 {
    let speed_factor = normalize_range(speed, LOW_SPEED, HIGH_SPEED);
    let jank_factor = 1.0 - normalize_range(jank, LOW_JANK, HIGH_JANK);
    speed_factor * jank_factor
}

/// Number of samples to project, rounded up
pub fn horizon_samples(target_ms: f64, report_rate_ms: f64, confidence: f64) -> usize {
    (target_ms / report_rate_ms * confidence).ceil().max(0.0) as usize
}

/// Starting point of a projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionStart {
    /// Last observed position
    pub position: Vector2<f64>,
    /// Velocity (units/sample)
    pub velocity: Vector2<f64>,
    /// Acceleration (units/sample²)
    pub acceleration: Vector2<f64>,
    /// Jank (units/sample³)
    pub jank: Vector2<f64>,
    /// Pressure level
    pub pressure: f64,
    /// Pressure change per sample
    pub pressure_change: f64,
}

/// Result of a projection
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    /// Emitted samples, at most the requested step count
    pub samples: Vec<PredictedSample>,
    /// Position after the last computed step
    pub final_position: Vector2<f64>,
    /// Pressure after the last computed step (may be below lift-off)
    pub final_pressure: f64,
    /// Projection stopped early because the pen is lifting
    pub lifted: bool,
}

/// Project the physical state of the pen `steps` samples into the future
pub fn project(start: &ProjectionStart, steps: usize) -> Projection {
    let mut position = start.position;
    let mut velocity = start.velocity;
    let mut acceleration = start.acceleration;
    let mut pressure = start.pressure;
    let mut samples = Vec::with_capacity(steps.min(PREALLOCATED_SAMPLES));
    let mut lifted = false;

    for _ in 0..steps {
        acceleration += start.jank * JANK_INFLUENCE;
        velocity += acceleration * ACCELERATION_INFLUENCE;
        position += velocity * VELOCITY_INFLUENCE;
        pressure += start.pressure_change;

        if pressure < LIFT_OFF_PRESSURE {
            lifted = true;
            break;
        }
        pressure = pressure.min(1.0);

        samples.push(PredictedSample {
            x: position.x as f32,
            y: position.y as f32,
            pressure: pressure as f32,
        });
    }

    Projection {
        samples,
        final_position: position,
        final_pressure: pressure,
        lifted,
    }
}
