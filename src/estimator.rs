// SPDX-License-Identifier: Apache-2.0

//! Zero-crossing frequency estimation.
//!
//! Each incoming sample is smoothed, then compared with the midpoint of the signal's range.
//! The number of samples between consecutive crossings is accumulated, and once more than
//! `window` crossings were seen the mean half-period is turned into a frequency:
//!
//! ```text
//! raw_freq = 1 / ((accumulator / crossings) * 2 * T)
//! ```
//!
//! The raw value goes through a second [`LowPass`] to produce the published estimate.
//!
//! ## Flat input
//!
//! A signal that never crosses the midpoint never completes a window, so the estimate keeps
//! its last value indefinitely. [`FrequencyEstimator::is_stale`] reports when no crossing has
//! been seen for [`EstimatorConfig::stale_after`] samples; the estimate itself is left alone.
//!
//! ## Counter saturation
//!
//! Counters saturate at [`u32::MAX`]. A window whose accumulator saturated does not describe
//! the signal, so it is discarded without touching the estimate.

use crate::{config::EstimatorConfig, error::ConfigError, filter::LowPass};

/// Internal counters of the estimator
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EstimatorState {
    /// Filtered value of the previous sample
    pub last_sample: f32,
    /// Filtered value of the sample being processed
    pub current_sample: f32,
    /// Samples since the last crossing
    pub elapsed_counter: u32,
    /// Crossings in the current window
    pub crossing_counter: u32,
    /// Sum of `elapsed_counter` over the crossings in the current window
    pub accumulator: u32,
    /// Smoothed frequency, in Hz
    pub frequency_estimate: f32,
}

/// Crossing-counting frequency estimator with pre- and post-smoothing
#[derive(Debug, Clone)]
pub struct FrequencyEstimator {
    /// Validated parameters
    config: EstimatorConfig,
    /// Smooths the raw sample stream before crossing detection
    sample_filter: LowPass,
    /// Smooths each new raw frequency
    frequency_filter: LowPass,
    /// Counters and last estimate
    state: EstimatorState,
    /// Completed windows since startup
    estimates: u32,
}

impl FrequencyEstimator {
    /// Build an estimator, rejecting invalid parameters
    pub fn new(config: EstimatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            sample_filter: LowPass::new(config.sample_cutoff)?,
            frequency_filter: LowPass::new(config.frequency_cutoff)?,
            config,
            state: EstimatorState::default(),
            estimates: 0,
        })
    }

    /// Current counters
    pub fn state(&self) -> &EstimatorState {
        &self.state
    }

    /// Last smoothed frequency in Hz, `0.0` until the first window completes
    pub fn frequency(&self) -> f32 {
        self.state.frequency_estimate
    }

    /// Completed windows since startup
    pub fn estimates(&self) -> u32 {
        self.estimates
    }

    /// True once no crossing has been detected for `stale_after` samples
    pub fn is_stale(&self) -> bool {
        self.config
            .stale_after
            .is_some_and(|limit| self.state.elapsed_counter >= limit)
    }

    /// Feed one sample. Returns the new smoothed frequency when this sample completed a
    /// crossing window.
    pub fn process(&mut self, sample: f32) -> Option<f32> {
        self.state.current_sample = self.sample_filter.update(sample);
        self.state.elapsed_counter = self.state.elapsed_counter.saturating_add(1);

        let mut estimate = None;
        if self.crossed() {
            self.state.crossing_counter = self.state.crossing_counter.saturating_add(1);
            self.state.accumulator = self
                .state
                .accumulator
                .saturating_add(self.state.elapsed_counter);
            self.state.elapsed_counter = 0;

            if self.state.crossing_counter > self.config.window {
                estimate = self.complete_window();
            }
        }

        self.state.last_sample = self.state.current_sample;
        estimate
    }

    /// Landing exactly on the midpoint completes a crossing from either side, while leaving
    /// the midpoint is never counted.
    fn crossed(&self) -> bool {
        let mid = self.config.midpoint;
        let last = self.state.last_sample;
        let current = self.state.current_sample;
        (last > mid && current <= mid) || (last < mid && current >= mid)
    }

    /// Turn the accumulated window into a frequency, then reset the window
    fn complete_window(&mut self) -> Option<f32> {
        let crossings = self.state.crossing_counter;
        let accumulator = self.state.accumulator;
        self.state.crossing_counter = 0;
        self.state.accumulator = 0;

        if accumulator == u32::MAX || accumulator == 0 {
            warn!(
                "discarding crossing window: {} samples over {} crossings",
                accumulator,
                crossings
            );
            return None;
        }

        let half_period = accumulator as f32 / crossings as f32 * self.config.sample_period();
        let raw_freq = 1.0 / (half_period * 2.0);
        let frequency = self.frequency_filter.update(raw_freq);
        self.state.frequency_estimate = frequency;
        self.estimates = self.estimates.saturating_add(1);

        #[cfg(feature = "trace_estimates")]
        trace!(
            "window {}: {} samples / {} crossings -> raw {} Hz, smoothed {} Hz",
            self.estimates,
            accumulator,
            crossings,
            raw_freq,
            frequency
        );
        Some(frequency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Unfiltered estimator over a 0-centred signal so crossings follow the raw input
    fn passthrough(window: u32, rate: f32) -> FrequencyEstimator {
        FrequencyEstimator::new(EstimatorConfig {
            sample_rate_hz: rate,
            midpoint: 0.0,
            window,
            sample_cutoff: 1.0,
            frequency_cutoff: 1.0,
            stale_after: Some(100),
        })
        .unwrap()
    }

    fn sine(freq: f32, rate: f32, n: usize) -> f32 {
        2048.0 + 1000.0 * (2.0 * core::f32::consts::PI * freq * n as f32 / rate).sin()
    }

    #[test]
    fn square_wave_exact_frequency() {
        // 10 samples high, 10 samples low at 1 kHz -> 50 Hz
        let mut estimator = passthrough(4, 1000.0);
        let mut estimates = Vec::new();
        for n in 0..400 {
            let value = if (n / 10) % 2 == 0 { 1.0 } else { -1.0 };
            if let Some(freq) = estimator.process(value) {
                estimates.push(freq);
            }
        }
        assert!(!estimates.is_empty());
        // First window includes the partial interval from startup
        for freq in &estimates[1..] {
            assert!((freq - 50.0).abs() < 1e-3, "{freq}");
        }
    }

    #[test]
    fn crossing_window_is_strict() {
        let mut estimator = passthrough(2, 1000.0);
        let mut completed = Vec::new();
        // Alternate every sample: every sample after the first is a crossing
        for n in 0..4 {
            let value = if n % 2 == 0 { 1.0 } else { -1.0 };
            completed.push(estimator.process(value).is_some());
        }
        // Crossings at samples 1, 2, 3: the third exceeds a window of 2
        assert_eq!(completed, [false, false, false, true]);
        assert_eq!(estimator.state().crossing_counter, 0);
        assert_eq!(estimator.state().accumulator, 0);
        // 4 samples over 3 crossings, the first interval counting from startup
        assert!((estimator.frequency() - 375.0).abs() < 0.01);
    }

    #[test]
    fn elapsed_counter_resets_on_crossing_only() {
        let mut estimator = passthrough(32, 1000.0);
        estimator.process(1.0);
        estimator.process(1.0);
        estimator.process(1.0);
        assert_eq!(estimator.state().elapsed_counter, 3);
        estimator.process(-1.0);
        assert_eq!(estimator.state().elapsed_counter, 0);
        assert_eq!(estimator.state().crossing_counter, 1);
        assert_eq!(estimator.state().accumulator, 4);
    }

    #[test]
    fn midpoint_boundary_asymmetry() {
        let mut estimator = passthrough(32, 1000.0);
        estimator.process(1.0);
        // Reaching the midpoint from above completes a crossing
        estimator.process(0.0);
        assert_eq!(estimator.state().crossing_counter, 1);
        // Leaving the midpoint upwards does not count: last is not below the midpoint
        estimator.process(1.0);
        assert_eq!(estimator.state().crossing_counter, 1);

        let mut estimator = passthrough(32, 1000.0);
        estimator.process(-1.0);
        // Reaching the midpoint from below also completes a crossing
        estimator.process(0.0);
        assert_eq!(estimator.state().crossing_counter, 1);
        // ... and dropping back below does not
        estimator.process(-1.0);
        assert_eq!(estimator.state().crossing_counter, 1);
    }

    #[test]
    fn converges_on_filtered_sine() {
        let rate = 5000.0;
        for target in [120.0, 200.0, 250.0] {
            let mut estimator = FrequencyEstimator::new(EstimatorConfig::DEFAULT).unwrap();
            for n in 0..20_000 {
                estimator.process(sine(target, rate, n));
            }
            let error = (estimator.frequency() - target).abs() / target;
            assert!(
                error < 0.01,
                "{target} Hz estimated as {} Hz",
                estimator.frequency()
            );
        }
    }

    #[test]
    fn flat_signal_freezes_estimate() {
        let mut estimator = FrequencyEstimator::new(EstimatorConfig::DEFAULT).unwrap();
        for n in 0..5000 {
            estimator.process(sine(200.0, 5000.0, n));
        }
        assert!(estimator.frequency() > 0.0);
        assert!(!estimator.is_stale());

        // Settle well above the midpoint, then hold so the filtered value never crosses back
        for _ in 0..10 {
            estimator.process(4000.0);
        }
        let frozen = estimator.frequency();
        let windows = estimator.estimates();
        for _ in 0..20_000 {
            assert_eq!(estimator.process(4000.0), None);
            assert_eq!(estimator.frequency(), frozen);
        }
        assert_eq!(estimator.estimates(), windows);
        assert!(estimator.is_stale());

        // Recovers as soon as the signal crosses again
        estimator.process(0.0);
        assert!(!estimator.is_stale());
    }

    #[test]
    fn no_stale_flag_when_disabled() {
        let mut estimator = FrequencyEstimator::new(EstimatorConfig {
            stale_after: None,
            ..EstimatorConfig::DEFAULT
        })
        .unwrap();
        for _ in 0..10_000 {
            estimator.process(0.0);
        }
        assert!(!estimator.is_stale());
        assert_eq!(estimator.frequency(), 0.0);
    }

    #[test]
    fn saturated_window_is_discarded() {
        let mut estimator = passthrough(1, 1000.0);
        estimator.process(1.0);
        estimator.process(-1.0);
        // Simulate a very long silence before the next crossings
        estimator.state.elapsed_counter = u32::MAX - 1;
        estimator.process(-1.0);
        assert_eq!(estimator.state().elapsed_counter, u32::MAX);
        estimator.process(-1.0);
        assert_eq!(estimator.state().elapsed_counter, u32::MAX);

        assert_eq!(estimator.process(1.0), None);
        assert_eq!(estimator.state().crossing_counter, 0);
        assert_eq!(estimator.state().accumulator, 0);
        assert_eq!(estimator.frequency(), 0.0);
        assert_eq!(estimator.estimates(), 0);
    }

    #[test]
    fn rejects_invalid_config() {
        let config = EstimatorConfig {
            window: 0,
            ..EstimatorConfig::DEFAULT
        };
        assert_eq!(
            FrequencyEstimator::new(config).unwrap_err(),
            ConfigError::ZeroWindow
        );
    }
}
