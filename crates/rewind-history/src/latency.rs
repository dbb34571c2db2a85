//! Round-trip estimation and the prediction time derived from it.
//!
//! The prediction time is how far in the past, from this peer's view, the
//! authoritative sender captured a replicated pose. Forward prediction of
//! remote entities and hit-validation rewinds both use it.

use std::collections::VecDeque;
use std::time::Duration;

use rewind_config::PredictionConfig;

/// Default number of RTT samples kept for the median.
pub const DEFAULT_MAX_SAMPLES: usize = 16;

/// Default EWMA smoothing factor.
pub const DEFAULT_ALPHA: f64 = 0.125;

/// Exponentially weighted moving average RTT estimator.
#[derive(Debug, Clone)]
pub struct LatencyEstimator {
    samples: VecDeque<Duration>,
    max_samples: usize,
    ewma_rtt: Duration,
    alpha: f64,
}

impl Default for LatencyEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES, DEFAULT_ALPHA)
    }
}

impl LatencyEstimator {
    /// Creates an estimator keeping `max_samples` samples with EWMA factor `alpha`.
    pub fn new(max_samples: usize, alpha: f64) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            ewma_rtt: Duration::ZERO,
            alpha,
        }
    }

    /// Record a new RTT sample and update the EWMA.
    ///
    /// The first sample seeds the average directly so a fresh connection does
    /// not start out predicting from zero latency.
    pub fn record_sample(&mut self, rtt: Duration) {
        let first = self.samples.is_empty();
        self.samples.push_back(rtt);
        if self.samples.len() > self.max_samples {
            self.samples.pop_front();
        }

        if first {
            self.ewma_rtt = rtt;
            return;
        }
        let new_ewma =
            self.alpha * rtt.as_secs_f64() + (1.0 - self.alpha) * self.ewma_rtt.as_secs_f64();
        self.ewma_rtt = Duration::from_secs_f64(new_ewma);
    }

    /// Current smoothed RTT.
    pub fn ewma_rtt(&self) -> Duration {
        self.ewma_rtt
    }

    /// Number of samples currently retained.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Median of the retained samples, robust to jitter spikes.
    pub fn median_rtt(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let mut sorted: Vec<_> = self.samples.iter().copied().collect();
        sorted.sort();
        sorted[sorted.len() / 2]
    }

    /// Prediction time in seconds for the smoothed RTT.
    pub fn prediction_time(&self, config: &PredictionConfig) -> f64 {
        prediction_time_for_ping(self.ewma_rtt.as_secs_f64() * 1000.0, config)
    }
}

/// Half of the fudged, capped round trip, in seconds.
///
/// `0.0005 * clamp(ping_ms - prediction_fudge_ms, 0, max_prediction_ping_ms)`.
/// A zero `max_prediction_ping_ms` turns prediction off.
pub fn prediction_time_for_ping(ping_ms: f64, config: &PredictionConfig) -> f64 {
    let cap = config.max_prediction_ping_ms.max(0.0);
    let compensated = (ping_ms - config.prediction_fudge_ms).max(0.0).min(cap);
    0.0005 * compensated
}
