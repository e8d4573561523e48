// SPDX-License-Identifier: Apache-2.0

//! Pipeline parameters.
//!
//! The reference values describe a 12-bit ADC sampled at 5 kHz watching for a sine wave
//! between 100 and 300 Hz. Every configuration struct is `Copy` and has a `const` default so
//! it can seed a `static` without runtime initialization.

use crate::error::ConfigError;

/// Rate of the sampling interrupt, in Hz
pub const SAMPLE_RATE_HZ: f32 = 5000.0;
/// Sub-conversions averaged into each sample
pub const OVERSAMPLE_COUNT: u8 = 5;
/// Full-scale range of the 12-bit ADC
pub const ADC_RESOLUTION: u16 = 4096;
/// Crossings accumulated before a new estimate is computed
pub const CROSSING_WINDOW: u32 = 32;
/// Blending coefficient shared by the sample and frequency filters
pub const LOW_PASS_CUTOFF: f32 = 0.5;
/// Lower edge of the target band, in Hz
pub const FREQ_LOW_HZ: f32 = 100.0;
/// Upper edge of the target band, in Hz
pub const FREQ_HIGH_HZ: f32 = 300.0;
/// Hysteresis applied on both band edges, in Hz
pub const FREQ_HYSTERESIS_HZ: f32 = 2.0;
/// Period of the reporting task, in milliseconds
pub const REPORT_PERIOD_MS: u32 = 100;
/// Number of report polls between watchdog feeds
pub const WATCHDOG_FEED_DIVIDER: u32 = 10;

/// Check a single-pole filter coefficient
pub fn validate_cutoff(cutoff: f32) -> Result<f32, ConfigError> {
    // NaN fails both comparisons
    if cutoff > 0.0 && cutoff <= 1.0 {
        Ok(cutoff)
    } else {
        Err(ConfigError::InvalidCutoff(cutoff))
    }
}

/// Averaging parameters for [`Sampler`](crate::sampler::Sampler)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplerConfig {
    /// Sub-readings per emitted sample (`M`)
    pub oversample: u8,
}

impl SamplerConfig {
    /// Reference averaging of 5 sub-readings
    pub const DEFAULT: Self = Self {
        oversample: OVERSAMPLE_COUNT,
    };

    /// Reject an empty batch size
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.oversample == 0 {
            return Err(ConfigError::ZeroOversample);
        }
        Ok(())
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters of the crossing-based [`FrequencyEstimator`](crate::estimator::FrequencyEstimator)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EstimatorConfig {
    /// Rate at which samples arrive (`R`), in Hz
    pub sample_rate_hz: f32,
    /// Crossing reference, half of the signal's full-scale range (`MID`)
    pub midpoint: f32,
    /// A new estimate is produced once more than this many crossings were seen (`K`)
    pub window: u32,
    /// Coefficient of the filter applied to every incoming sample
    pub sample_cutoff: f32,
    /// Coefficient of the filter applied to every raw frequency estimate
    pub frequency_cutoff: f32,
    /// Samples without a crossing after which the estimate is flagged stale.
    ///
    /// `None` keeps the estimate frozen silently.
    pub stale_after: Option<u32>,
}

impl EstimatorConfig {
    /// Reference estimator: 5 kHz, midpoint of a 12-bit ADC, 32 crossings, 1 s staleness
    pub const DEFAULT: Self = Self {
        sample_rate_hz: SAMPLE_RATE_HZ,
        midpoint: (ADC_RESOLUTION / 2) as f32,
        window: CROSSING_WINDOW,
        sample_cutoff: LOW_PASS_CUTOFF,
        frequency_cutoff: LOW_PASS_CUTOFF,
        stale_after: Some(SAMPLE_RATE_HZ as u32),
    };

    /// Sampling period `T = 1 / R`, in seconds
    pub fn sample_period(&self) -> f32 {
        1.0 / self.sample_rate_hz
    }

    /// Check every field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate_hz.is_finite() && self.sample_rate_hz > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate_hz));
        }
        if !self.midpoint.is_finite() {
            return Err(ConfigError::InvalidMidpoint(self.midpoint));
        }
        if self.window == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        validate_cutoff(self.sample_cutoff)?;
        validate_cutoff(self.frequency_cutoff)?;
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Band edges and hysteresis for [`RangeClassifier`](crate::classifier::RangeClassifier)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangeClassifierConfig {
    /// Lower band edge, in Hz
    pub low_bound: f32,
    /// Upper band edge, in Hz
    pub high_bound: f32,
    /// Offset applied to the band edges, in Hz
    pub hysteresis_margin: f32,
}

impl RangeClassifierConfig {
    /// Reference band of 100-300 Hz with 2 Hz hysteresis
    pub const DEFAULT: Self = Self {
        low_bound: FREQ_LOW_HZ,
        high_bound: FREQ_HIGH_HZ,
        hysteresis_margin: FREQ_HYSTERESIS_HZ,
    };

    /// Lowest frequency that enters the band
    pub fn enter_low(&self) -> f32 {
        self.low_bound + self.hysteresis_margin
    }

    /// Highest frequency that enters the band
    pub fn enter_high(&self) -> f32 {
        self.high_bound - self.hysteresis_margin
    }

    /// Lowest frequency that stays in the band
    pub fn exit_low(&self) -> f32 {
        self.low_bound - self.hysteresis_margin
    }

    /// Highest frequency that stays in the band
    pub fn exit_high(&self) -> f32 {
        self.high_bound + self.hysteresis_margin
    }

    /// Margin must be a non-negative number and the entry band must not be empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.hysteresis_margin.is_finite() && self.hysteresis_margin >= 0.0) {
            return Err(ConfigError::InvalidMargin(self.hysteresis_margin));
        }
        if !(self.low_bound.is_finite()
            && self.high_bound.is_finite()
            && self.enter_low() <= self.enter_high())
        {
            return Err(ConfigError::EmptyBand {
                low: self.low_bound,
                high: self.high_bound,
                margin: self.hysteresis_margin,
            });
        }
        Ok(())
    }
}

impl Default for RangeClassifierConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Everything needed to assemble a [`Detector`](crate::detector::Detector)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectorConfig {
    /// Sample averaging
    pub sampler: SamplerConfig,
    /// Crossing detection and smoothing
    pub estimator: EstimatorConfig,
    /// In-range decision
    pub classifier: RangeClassifierConfig,
}

impl DetectorConfig {
    /// Reference configuration
    pub const DEFAULT: Self = Self {
        sampler: SamplerConfig::DEFAULT,
        estimator: EstimatorConfig::DEFAULT,
        classifier: RangeClassifierConfig::DEFAULT,
    };

    /// Validate all nested configurations
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sampler.validate()?;
        self.estimator.validate()?;
        self.classifier.validate()
    }
}
