//! Signal smoothing demonstrations
//!
//! A trailing moving average and a Kalman filter over synthetic noisy
//! signals. The demo generators produce the exact series the dashboard
//! charts: raw measurements next to each smoother's estimate, with leading
//! nulls where the moving-average window is not yet full.

pub mod kalman;

use crate::drift::linspace;
use crate::types::SmoothedSample;
use rand::thread_rng;
use rand_distr::{Distribution, Normal};

pub use kalman::{filter_sequence, KalmanFilter};

/// Samples per demo series
pub const DEMO_SAMPLES: usize = 100;

/// Moving-average window of the noise-filter demo
pub const NOISE_DEMO_WINDOW: usize = 5;

/// Moving-average window of the kalman comparison demo
pub const KALMAN_DEMO_WINDOW: usize = 10;

/// Trailing simple moving average
///
/// Output has the same length as the input; the first `window - 1` entries
/// are `None` because the window is not yet full there.
pub fn moving_average(signal: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; signal.len()];
    }
    signal
        .iter()
        .enumerate()
        .map(|(idx, _)| {
            if idx + 1 < window {
                None
            } else {
                let sum: f64 = signal[idx + 1 - window..=idx].iter().sum();
                Some(sum / window as f64)
            }
        })
        .collect()
}

/// Noise-filter demo: noisy sine wave smoothed with a window-5 average
pub fn noise_filter_demo() -> Vec<SmoothedSample> {
    let mut rng = thread_rng();
    let noise = Normal::new(0.0, 2.5).expect("valid noise distribution");

    let raw: Vec<f64> = linspace(0.0, 10.0, DEMO_SAMPLES)
        .iter()
        .map(|x| x.sin() * 10.0 + 50.0 + noise.sample(&mut rng))
        .collect();
    let smoothed = moving_average(&raw, NOISE_DEMO_WINDOW);

    raw.iter()
        .zip(smoothed)
        .enumerate()
        .map(|(time_step, (&raw, moving_average))| SmoothedSample {
            time_step,
            raw,
            moving_average,
            kalman_estimate: None,
        })
        .collect()
}

/// Kalman comparison demo: noisy upward trend smoothed both ways
///
/// The moving average lags the trend by half its window; the Kalman filter
/// tracks it once its velocity estimate settles.
pub fn kalman_comparison_demo() -> Vec<SmoothedSample> {
    let mut rng = thread_rng();
    let noise = Normal::new(0.0, 4.0).expect("valid noise distribution");

    let raw: Vec<f64> = linspace(50.0, 80.0, DEMO_SAMPLES)
        .iter()
        .map(|x| x + noise.sample(&mut rng))
        .collect();
    let smoothed = moving_average(&raw, KALMAN_DEMO_WINDOW);
    let kalman = filter_sequence(50.0, &raw);

    raw.iter()
        .zip(smoothed)
        .zip(kalman)
        .enumerate()
        .map(|(time_step, ((&raw, moving_average), estimate))| SmoothedSample {
            time_step,
            raw,
            moving_average,
            kalman_estimate: Some(estimate),
        })
        .collect()
}
