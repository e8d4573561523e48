// SPDX-License-Identifier: Apache-2.0

//! Single-pole IIR smoothing.

use crate::{config::validate_cutoff, error::ConfigError};

/// Exponential smoothing filter: `output += cutoff * (input - output)`.
///
/// `cutoff` is a blending factor in `(0, 1]`, not a corner frequency. The output starts at
/// zero, so the first few updates are biased towards zero until the transient decays. One
/// instance smooths the incoming samples and another smooths the frequency estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LowPass {
    /// Last filter output
    output: f32,
    /// Blending coefficient towards the newest input
    cutoff: f32,
}

impl LowPass {
    /// Create a filter seeded at zero
    pub fn new(cutoff: f32) -> Result<Self, ConfigError> {
        Ok(Self {
            output: 0.0,
            cutoff: validate_cutoff(cutoff)?,
        })
    }

    /// Blend `input` into the output and return the new output
    pub fn update(&mut self, input: f32) -> f32 {
        self.output += self.cutoff * (input - self.output);
        self.output
    }

    /// Most recent output
    pub fn output(&self) -> f32 {
        self.output
    }
}
