//! Constant-velocity Kalman filter
//!
//! Two-dimensional state [position, velocity] with scalar position
//! measurements. The matrices are fixed at construction: unit-step transition
//! F = [[1, 1], [0, 1]], observation H = [1, 0], measurement variance R = 5,
//! and a white-acceleration process noise Q derived from sigma = 0.05. The
//! large initial covariance (1000 on both diagonal entries) makes the filter
//! trust early measurements almost entirely.

/// Measurement noise variance
pub const MEASUREMENT_VARIANCE: f64 = 5.0;

/// Per-step acceleration noise magnitude
pub const PROCESS_SIGMA: f64 = 0.05;

/// Initial variance on both state components
pub const INITIAL_VARIANCE: f64 = 1000.0;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    // State estimate [position, velocity]
    x0: f64,
    x1: f64,
    // Covariance, row-major
    p00: f64,
    p01: f64,
    p10: f64,
    p11: f64,
    // Process noise, symmetric
    q00: f64,
    q01: f64,
    q11: f64,
    r: f64,
}

impl KalmanFilter {
    /// Filter starting at `initial_position` with zero velocity
    pub fn new(initial_position: f64) -> Self {
        let sigma_sq = PROCESS_SIGMA * PROCESS_SIGMA;
        Self {
            x0: initial_position,
            x1: 0.0,
            p00: INITIAL_VARIANCE,
            p01: 0.0,
            p10: 0.0,
            p11: INITIAL_VARIANCE,
            q00: sigma_sq / 4.0,
            q01: sigma_sq / 2.0,
            q11: sigma_sq,
            r: MEASUREMENT_VARIANCE,
        }
    }

    /// Project the state one step forward; uncertainty grows
    pub fn predict(&mut self) {
        self.x0 += self.x1;
        // P <- F P Ft + Q for F = [[1, 1], [0, 1]]
        let p00 = self.p00 + self.p01 + self.p10 + self.p11 + self.q00;
        let p01 = self.p01 + self.p11 + self.q01;
        let p10 = self.p10 + self.p11 + self.q01;
        let p11 = self.p11 + self.q11;
        self.p00 = p00;
        self.p01 = p01;
        self.p10 = p10;
        self.p11 = p11;
    }

    /// Fold in a position measurement; uncertainty shrinks
    pub fn update(&mut self, z: f64) {
        let s = self.p00 + self.r;
        let k0 = self.p00 / s;
        let k1 = self.p10 / s;

        let innovation = z - self.x0;
        self.x0 += k0 * innovation;
        self.x1 += k1 * innovation;

        // P <- (I - K H) P for H = [1, 0]
        let p00 = (1.0 - k0) * self.p00;
        let p01 = (1.0 - k0) * self.p01;
        let p10 = self.p10 - k1 * self.p00;
        let p11 = self.p11 - k1 * self.p01;
        self.p00 = p00;
        self.p01 = p01;
        self.p10 = p10;
        self.p11 = p11;
    }

    /// Current position estimate
    pub fn position(&self) -> f64 {
        self.x0
    }

    /// Current variance of the position estimate
    pub fn position_variance(&self) -> f64 {
        self.p00
    }
}

/// Run the filter over a measurement sequence, one posterior per measurement
pub fn filter_sequence(initial_position: f64, measurements: &[f64]) -> Vec<f64> {
    let mut filter = KalmanFilter::new(initial_position);
    measurements
        .iter()
        .map(|&z| {
            filter.predict();
            filter.update(z);
            filter.position()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_grows_and_update_shrinks_variance() {
        let mut filter = KalmanFilter::new(50.0);
        let initial = filter.position_variance();

        filter.predict();
        let predicted = filter.position_variance();
        assert!(predicted > initial);

        filter.update(51.0);
        assert!(filter.position_variance() < predicted);
    }

    #[test]
    fn test_first_update_trusts_measurement() {
        // With P0 = 1000 and R = 5 the first gain is ~0.997, so the estimate
        // lands essentially on the measurement regardless of the prior.
        let mut filter = KalmanFilter::new(0.0);
        filter.predict();
        filter.update(65.0);
        assert!((filter.position() - 65.0).abs() < 0.5);
    }

    #[test]
    fn test_converges_to_constant_signal() {
        let measurements = vec![65.0; 200];
        let estimates = filter_sequence(50.0, &measurements);
        assert_eq!(estimates.len(), measurements.len());

        // Early steps can overshoot while the velocity estimate settles;
        // after that the error decays toward zero.
        let errors: Vec<f64> = estimates.iter().map(|e| (e - 65.0).abs()).collect();
        for pair in errors[10..].windows(2) {
            assert!(pair[1] <= pair[0] + 1e-9);
        }
        assert!(errors[errors.len() - 1] < 0.01);
    }

    #[test]
    fn test_steady_state_variance_beats_moving_average() {
        let mut filter = KalmanFilter::new(50.0);
        for _ in 0..200 {
            filter.predict();
            filter.update(65.0);
        }

        // Averaging w measurements of variance R estimates the position with
        // variance R / w. The filter's steady-state posterior variance for
        // this parameter set settles near 0.95, under the window-5 average's
        // 1.0 (it cannot beat longer windows on a truly static signal, where
        // the velocity state only adds uncertainty).
        let moving_average_variance =
            MEASUREMENT_VARIANCE / crate::smoothing::NOISE_DEMO_WINDOW as f64;
        assert!(filter.position_variance() < moving_average_variance);
    }

    #[test]
    fn test_tracks_linear_trend() {
        let measurements: Vec<f64> = (0..150).map(|i| 50.0 + 0.2 * i as f64).collect();
        let estimates = filter_sequence(50.0, &measurements);
        let last = estimates[estimates.len() - 1];
        let truth = measurements[measurements.len() - 1];
        assert!((last - truth).abs() < 1.0);
    }

    #[test]
    fn test_empty_sequence_yields_empty_output() {
        assert!(filter_sequence(50.0, &[]).is_empty());
    }
}
