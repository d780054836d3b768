//! Single-measurement linear Kalman filter
//!
//! One channel tracks `N` states of which only the first is observed.
//! With a scalar measurement the innovation covariance is a scalar, so the
//! gain is computed by division and never needs a matrix inverse.
//!
//! ```text
//! predict:  x = F·x            P = F·P·Fᵀ + Q
//! correct:  y = z − H·x        S = H·P·Hᵀ + R
//!           K = P·Hᵀ / S       x = x + K·y      P = (I − K·H)·P
//! ```

use nalgebra::{SMatrix, SVector};

/// Kalman filter over `N` states observing state 0
#[derive(Debug, Clone)]
pub(crate) struct KalmanChannel<const N: usize> {
    /// State estimate
    state: SVector<f64, N>,

    /// State covariance (uncertainty)
    covariance: SMatrix<f64, N, N>,

    /// State transition matrix F
    transition: SMatrix<f64, N, N>,

    /// Process noise Q
    process_noise: SMatrix<f64, N, N>,

    /// Observation matrix H
    observation: SMatrix<f64, 1, N>,

    /// Measurement noise variance R
    measurement_noise: f64,
}

impl<const N: usize> KalmanChannel<N> {
    /// Create a channel
    ///
    /// `noise_gain` is the impact G of a unit noisy force on each state;
    /// the process noise is `G·Gᵀ·sigma_process`.
    pub(crate) fn new(
        transition: SMatrix<f64, N, N>,
        noise_gain: SVector<f64, N>,
        sigma_process: f64,
        sigma_measurement: f64,
    ) -> Self {
        let mut observation = SMatrix::<f64, 1, N>::zeros();
        observation[(0, 0)] = 1.0;

        Self {
            state: SVector::<f64, N>::zeros(),
            covariance: SMatrix::<f64, N, N>::identity(),
            transition,
            process_noise: noise_gain * noise_gain.transpose() * sigma_process,
            observation,
            measurement_noise: sigma_measurement,
        }
    }

    /// Zero the state and restore unit covariance
    pub(crate) fn reset(&mut self) {
        self.state = SVector::<f64, N>::zeros();
        self.covariance = SMatrix::<f64, N, N>::identity();
    }

    /// Place the observed state directly (first sample after reset)
    pub(crate) fn seed(&mut self, measurement: f64) {
        self.state[0] = measurement;
    }

    /// Propagate the state one step through the model
    pub(crate) fn predict(&mut self) {
        self.state = self.transition * self.state;
        self.covariance =
            self.transition * self.covariance * self.transition.transpose() + self.process_noise;
    }

    /// Fold one measurement of state 0 into the estimate
    pub(crate) fn correct(&mut self, measurement: f64) {
        let innovation = measurement - (self.observation * self.state)[(0, 0)];
        let innovation_cov = (self.observation * self.covariance * self.observation.transpose())
            [(0, 0)]
            + self.measurement_noise;

        let gain = self.covariance * self.observation.transpose() / innovation_cov;

        self.state += gain * innovation;
        self.covariance =
            (SMatrix::<f64, N, N>::identity() - gain * self.observation) * self.covariance;
    }

    /// Estimated value of state `index`
    pub(crate) fn state(&self, index: usize) -> f64 {
        self.state[index]
    }
}
