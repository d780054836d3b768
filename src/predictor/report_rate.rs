//! Report rate estimation
//!
//! Most sensors do not provide reliable timestamps and do not report at an
//! even interval, so the running mean over the first deltas of a device is
//! only an estimate. Once [`REPORT_RATE_SAMPLES`] deltas were collected the
//! mean stops moving. An explicit rate overrides the estimate for good.

use tracing::debug;

/// Number of inter-sample deltas averaged before the estimate is capped
pub const REPORT_RATE_SAMPLES: usize = 20;

/// Estimator mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportRateMode {
    /// Still collecting deltas
    Accumulating {
        /// Collected deltas (first `len` are valid)
        deltas: [f64; REPORT_RATE_SAMPLES],
        /// Number of collected deltas
        len: usize,
        /// Mean of collected deltas
        mean_ms: f64,
    },

    /// Enough deltas collected, mean kept as is
    Capped {
        /// Final mean
        mean_ms: f64,
    },

    /// Rate supplied by the caller, running estimate disabled
    Overridden {
        /// Explicit rate
        rate_ms: f64,
    },
}

/// Running report rate estimate in milliseconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportRateEstimator {
    mode: ReportRateMode,
}

impl ReportRateEstimator {
    /// Create an estimator with no observed deltas
    pub fn new() -> Self {
        Self {
            mode: ReportRateMode::Accumulating {
                deltas: [0.0; REPORT_RATE_SAMPLES],
                len: 0,
                mean_ms: 0.0,
            },
        }
    }

    /// Add one inter-sample delta (ignored unless accumulating)
    pub fn record_delta(&mut self, delta_ms: f64) {
        if let ReportRateMode::Accumulating {
            deltas,
            len,
            mean_ms,
        } = &mut self.mode
        {
            deltas[*len] = delta_ms;
            *len += 1;
            *mean_ms = deltas[..*len].iter().sum::<f64>() / *len as f64;

            if *len == REPORT_RATE_SAMPLES {
                let mean_ms = *mean_ms;
                debug!("Report rate estimate capped at {:.2}ms", mean_ms);
                self.mode = ReportRateMode::Capped { mean_ms };
            }
        }
    }

    /// Replace the estimate with an explicit rate
    pub fn override_rate(&mut self, rate_ms: f64) {
        self.mode = ReportRateMode::Overridden { rate_ms };
    }

    /// Current rate in milliseconds (0 before any delta)
    pub fn rate_ms(&self) -> f64 {
        match self.mode {
            ReportRateMode::Accumulating { mean_ms, .. } | ReportRateMode::Capped { mean_ms } => {
                mean_ms
            }
            ReportRateMode::Overridden { rate_ms } => rate_ms,
        }
    }

    /// Number of deltas that contributed to the estimate
    pub fn sample_count(&self) -> usize {
        match self.mode {
            ReportRateMode::Accumulating { len, .. } => len,
            ReportRateMode::Capped { .. } => REPORT_RATE_SAMPLES,
            ReportRateMode::Overridden { .. } => 0,
        }
    }

    /// Was an explicit rate configured?
    pub fn is_overridden(&self) -> bool {
        matches!(self.mode, ReportRateMode::Overridden { .. })
    }

    /// Current mode
    pub fn mode(&self) -> &ReportRateMode {
        &self.mode
    }
}

impl Default for ReportRateEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_mean() {
        let mut estimator = ReportRateEstimator::new();
        assert_eq!(estimator.rate_ms(), 0.0);

        estimator.record_delta(8.0);
        estimator.record_delta(10.0);
        assert_eq!(estimator.rate_ms(), 9.0);
        assert_eq!(estimator.sample_count(), 2);
    }

    #[test]
    fn test_capped_after_twenty_deltas() {
        let mut estimator = ReportRateEstimator::new();
        for _ in 0..REPORT_RATE_SAMPLES {
            estimator.record_delta(4.0);
        }
        assert_eq!(estimator.mode(), &ReportRateMode::Capped { mean_ms: 4.0 });

        estimator.record_delta(100.0);
        assert_eq!(estimator.rate_ms(), 4.0);
        assert_eq!(estimator.sample_count(), REPORT_RATE_SAMPLES);
    }

    #[test]
    fn test_override_is_permanent() {
        let mut estimator = ReportRateEstimator::new();
        estimator.record_delta(8.0);
        estimator.override_rate(5.0);
        estimator.record_delta(50.0);

        assert!(estimator.is_overridden());
        assert_eq!(estimator.rate_ms(), 5.0);
    }
}
