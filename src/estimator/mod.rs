//! Pointer State Estimation
//!
//! Recursive estimate of the kinematic state of one pointer from noisy
//! position and pressure observations.
//!
//! # Model
//!
//! Each axis runs an independent constant-jerk Kalman filter over
//! `[position, velocity, acceleration, jank]` with a normalized time step of
//! one sample. The actual report rate is only applied by the predictor when
//! it projects the state forward.
//!
//! ```text
//! p' = p + v + a/2 + j/6
//! v' = v + a + j/2
//! a' = a + j
//! j' = j
//! ```
//!
//! Pressure runs a constant-rate filter over `[pressure, pressure_change]`.
//!
//! Process noise is modeled as a noisy force on the pen: `Q = G·Gᵀ·σp` with
//! `G = [1/6, 1/2, 1, 1]`. A small `σp` favors smooth, laggy estimates; the
//! measurement noise `σm` is the variance of each observed coordinate.

mod kalman;

use nalgebra::{Matrix2, Matrix4, Vector2, Vector4};
use tracing::trace;

use kalman::KalmanChannel;

/// Default process noise (smoothness vs. reactivity)
pub const DEFAULT_PROCESS_NOISE: f64 = 0.01;

/// Default measurement noise
pub const DEFAULT_MEASUREMENT_NOISE: f64 = 1.0;

/// Minimum accepted observations before derivatives are trustworthy
pub const MIN_KALMAN_FILTER_ITERATIONS: usize = 4;

/// Read-only snapshot of the estimated kinematic state
///
/// Derivatives are per sample, not per millisecond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    /// Filtered position
    pub position: Vector2<f64>,
    /// Velocity (units/sample)
    pub velocity: Vector2<f64>,
    /// Acceleration (units/sample²)
    pub acceleration: Vector2<f64>,
    /// Jank, the jerk-like third derivative (units/sample³)
    pub jank: Vector2<f64>,
    /// Filtered pressure
    pub pressure: f64,
    /// Pressure change per sample
    pub pressure_change: f64,
}

impl Default for KinematicState {
    fn default() -> Self {
        Self {
            position: Vector2::zeros(),
            velocity: Vector2::zeros(),
            acceleration: Vector2::zeros(),
            jank: Vector2::zeros(),
            pressure: 0.0,
            pressure_change: 0.0,
        }
    }
}

/// Kalman state estimator for one 2-D pointer plus pressure
#[derive(Debug, Clone)]
pub struct PointerKalmanFilter {
    x: KalmanChannel<4>,
    y: KalmanChannel<4>,
    pressure: KalmanChannel<2>,
    state: KinematicState,
    num_iterations: usize,
}

impl PointerKalmanFilter {
    /// Create an estimator with the given noise tuning
    pub fn new(sigma_process: f64, sigma_measurement: f64) -> Self {
        Self {
            x: axis_channel(sigma_process, sigma_measurement),
            y: axis_channel(sigma_process, sigma_measurement),
            pressure: pressure_channel(sigma_process, sigma_measurement),
            state: KinematicState::default(),
            num_iterations: 0,
        }
    }

    /// Discard all accumulated state
    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
        self.pressure.reset();
        self.state = KinematicState::default();
        self.num_iterations = 0;
    }

    /// Fold one observation into the estimate
    pub fn update(&mut self, x: f64, y: f64, pressure: f64) {
        if self.num_iterations == 0 {
            self.x.seed(x);
            self.y.seed(y);
            self.pressure.seed(pressure);
        } else {
            for (channel, measurement) in [(&mut self.x, x), (&mut self.y, y)] {
                channel.predict();
                channel.correct(measurement);
            }
            self.pressure.predict();
            self.pressure.correct(pressure);
        }
        self.num_iterations += 1;

        self.state = KinematicState {
            position: Vector2::new(self.x.state(0), self.y.state(0)),
            velocity: Vector2::new(self.x.state(1), self.y.state(1)),
            acceleration: Vector2::new(self.x.state(2), self.y.state(2)),
            jank: Vector2::new(self.x.state(3), self.y.state(3)),
            pressure: self.pressure.state(0),
            pressure_change: self.pressure.state(1),
        };

        trace!(
            "Kalman update #{}: pos=({:.2}, {:.2}), vel=({:.3}, {:.3}), jank={:.4}",
            self.num_iterations,
            self.state.position.x,
            self.state.position.y,
            self.state.velocity.x,
            self.state.velocity.y,
            self.state.jank.norm()
        );
    }

    /// Snapshot of the current estimate
    pub fn state(&self) -> &KinematicState {
        &self.state
    }

    /// Filtered position
    pub fn position(&self) -> Vector2<f64> {
        self.state.position
    }

    /// Estimated velocity (units/sample)
    pub fn velocity(&self) -> Vector2<f64> {
        self.state.velocity
    }

    /// Estimated acceleration (units/sample²)
    pub fn acceleration(&self) -> Vector2<f64> {
        self.state.acceleration
    }

    /// Estimated jank (units/sample³)
    pub fn jank(&self) -> Vector2<f64> {
        self.state.jank
    }

    /// Estimated pressure
    pub fn pressure(&self) -> f64 {
        self.state.pressure
    }

    /// Estimated pressure change per sample
    pub fn pressure_change(&self) -> f64 {
        self.state.pressure_change
    }

    /// Accepted updates since the last reset
    pub fn num_iterations(&self) -> usize {
        self.num_iterations
    }

    /// Have enough observations been folded in to trust the derivatives?
    pub fn is_converged(&self) -> bool {
        self.num_iterations >= MIN_KALMAN_FILTER_ITERATIONS
    }
}

impl Default for PointerKalmanFilter {
    fn default() -> Self {
        Self::new(DEFAULT_PROCESS_NOISE, DEFAULT_MEASUREMENT_NOISE)
    }
}

fn axis_channel(sigma_process: f64, sigma_measurement: f64) -> KalmanChannel<4> {
    let dt = 1.0;
    let dtt = dt * dt;
    let dttt = dtt * dt;

    #[rustfmt::skip]
    let transition = Matrix4::new(
        1.0, dt,  0.5 * dtt, dttt / 6.0,
        0.0, 1.0, dt,        0.5 * dtt,
        0.0, 0.0, 1.0,       dt,
        0.0, 0.0, 0.0,       1.0,
    );
    let noise_gain = Vector4::new(dttt / 6.0, 0.5 * dtt, dt, 1.0);

    KalmanChannel::new(transition, noise_gain, sigma_process, sigma_measurement)
}

fn pressure_channel(sigma_process: f64, sigma_measurement: f64) -> KalmanChannel<2> {
    let dt = 1.0;

    #[rustfmt::skip]
    let transition = Matrix2::new(
        1.0, dt,
        0.0, 1.0,
    );
    let noise_gain = Vector2::new(0.5 * dt * dt, dt);

    KalmanChannel::new(transition, noise_gain, sigma_process, sigma_measurement)
}
