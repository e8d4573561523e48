// SPDX-License-Identifier: Apache-2.0

//! Configuration errors.
//!
//! Nothing on the sampling path returns an error: noisy or malformed readings are absorbed
//! into the next estimate. Invalid parameters are rejected once, when the pipeline is built.

use thiserror::Error;

/// Rejected configuration value
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Filter blending coefficient is outside `(0, 1]`
    #[error("filter cutoff {0} must be within (0, 1]")]
    InvalidCutoff(f32),

    /// Sampling rate is zero, negative or not a number
    #[error("sample rate {0} Hz must be positive and finite")]
    InvalidSampleRate(f32),

    /// Crossing window must contain at least one crossing
    #[error("crossing window must be at least 1")]
    ZeroWindow,

    /// Averaging needs at least one sub-reading per batch
    #[error("oversample count must be at least 1")]
    ZeroOversample,

    /// Crossing reference is not a finite value
    #[error("midpoint {0} must be finite")]
    InvalidMidpoint(f32),

    /// Hysteresis margin is negative or not a number
    #[error("hysteresis margin {0} must be finite and non-negative")]
    InvalidMargin(f32),

    /// Entry band `[low + margin, high - margin]` is empty
    #[error("band [{low}, {high}] with margin {margin} leaves no entry range")]
    EmptyBand {
        /// Lower band edge in Hz
        low: f32,
        /// Upper band edge in Hz
        high: f32,
        /// Hysteresis margin in Hz
        margin: f32,
    },
}
