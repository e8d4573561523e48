// SPDX-License-Identifier: Apache-2.0

//! Hysteretic band classification of the frequency estimate.
//!
//! Entering the band requires `low + margin <= f <= high - margin`, leaving it requires
//! `f < low - margin` or `f > high + margin`. The two decision bands are `2 * margin` apart,
//! so an estimate hovering on a band edge does not toggle the indicator.

use crate::{config::RangeClassifierConfig, error::ConfigError};

/// Classifier output
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeState {
    /// Frequency is inside the target band
    InRange,
    /// Frequency is outside the target band. Initial state.
    #[default]
    OutOfRange,
}

impl RangeState {
    /// `true` for [`RangeState::InRange`]
    pub fn is_in_range(&self) -> bool {
        matches!(self, Self::InRange)
    }
}

impl From<bool> for RangeState {
    fn from(in_range: bool) -> Self {
        if in_range {
            Self::InRange
        } else {
            Self::OutOfRange
        }
    }
}

/// Result of one classification step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transition {
    /// State did not change
    Unchanged(RangeState),
    /// Moved from out of range into the band
    Entered,
    /// Moved from the band to out of range
    Exited,
}

impl Transition {
    /// State after the step
    pub fn state(&self) -> RangeState {
        match self {
            Self::Unchanged(state) => *state,
            Self::Entered => RangeState::InRange,
            Self::Exited => RangeState::OutOfRange,
        }
    }

    /// `true` if the state changed
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }
}

/// Two-state hysteretic classifier
#[derive(Debug, Clone, Copy)]
pub struct RangeClassifier {
    /// Band and margin
    config: RangeClassifierConfig,
    /// Current decision
    state: RangeState,
}

impl RangeClassifier {
    /// Start out of range
    pub fn new(config: RangeClassifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: RangeState::OutOfRange,
        })
    }

    /// Current decision
    pub fn state(&self) -> RangeState {
        self.state
    }

    /// Evaluate a new frequency estimate
    pub fn classify(&mut self, frequency: f32) -> Transition {
        let config = &self.config;
        let transition = match self.state {
            RangeState::OutOfRange
                if frequency >= config.enter_low() && frequency <= config.enter_high() =>
            {
                Transition::Entered
            }
            // NaN never re-enters, but does not force an exit either
            RangeState::InRange
                if frequency < config.exit_low() || frequency > config.exit_high() =>
            {
                Transition::Exited
            }
            state => Transition::Unchanged(state),
        };
        self.state = transition.state();
        transition
    }
}
