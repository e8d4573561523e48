// SPDX-License-Identifier: Apache-2.0

//! Sample-to-indicator pipeline run from the sampling interrupt.
//!
//! ```text
//! Sample ─▶ FrequencyEstimator ─▶ RangeClassifier ─▶ Indicator
//!                    │                    │
//!                    └──────▶ SharedState ◀┘
//! ```
//!
//! Nothing here allocates, blocks or locks, so the whole chain can run inside the timer
//! interrupt once per tick.

use crate::{
    classifier::{RangeClassifier, RangeState, Transition},
    config::{EstimatorConfig, RangeClassifierConfig},
    error::ConfigError,
    estimator::{EstimatorState, FrequencyEstimator},
    indicator::Indicator,
    sampler::{ChannelId, Sample, SampleSink},
    shared::{SharedState, Snapshot},
};

/// Full estimator state together with the classifier decision
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrequencyDetectorState {
    /// Crossing counters and frequency estimate
    pub estimator: EstimatorState,
    /// Current in-range decision
    pub in_range_state: RangeState,
}

/// Frequency detector for a single monitored channel
pub struct Detector<'a, I: Indicator> {
    /// Channel whose samples are processed, others are ignored
    channel: ChannelId,
    /// Crossing counting and smoothing
    estimator: FrequencyEstimator,
    /// Hysteretic in-range decision
    classifier: RangeClassifier,
    /// External output
    indicator: I,
    /// Publication slot for the reporting task
    shared: &'a SharedState,
    /// Staleness flag as last published
    stale: bool,
}

impl<'a, I: Indicator> Detector<'a, I> {
    /// Assemble the pipeline. The indicator is driven inactive and an initial snapshot is
    /// published.
    pub fn new(
        channel: ChannelId,
        estimator: EstimatorConfig,
        classifier: RangeClassifierConfig,
        mut indicator: I,
        shared: &'a SharedState,
    ) -> Result<Self, ConfigError> {
        let estimator = FrequencyEstimator::new(estimator)?;
        let classifier = RangeClassifier::new(classifier)?;
        indicator.set_indicator(classifier.state().is_in_range());

        let detector = Self {
            channel,
            estimator,
            classifier,
            indicator,
            shared,
            stale: false,
        };
        detector.shared.publish(&detector.snapshot());
        Ok(detector)
    }

    /// Monitored channel
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Latest smoothed frequency, in Hz
    pub fn frequency(&self) -> f32 {
        self.estimator.frequency()
    }

    /// Current classifier decision
    pub fn range_state(&self) -> RangeState {
        self.classifier.state()
    }

    /// Counters and decision
    pub fn state(&self) -> FrequencyDetectorState {
        FrequencyDetectorState {
            estimator: *self.estimator.state(),
            in_range_state: self.classifier.state(),
        }
    }

    /// Values published to [`SharedState`]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            frequency: self.estimator.frequency(),
            state: self.classifier.state(),
            stale: self.estimator.is_stale(),
            estimates: self.estimator.estimates(),
        }
    }

    /// Indicator being driven
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// Process one averaged reading. Returns the classifier step when this reading completed
    /// a crossing window.
    pub fn process(&mut self, value: u16) -> Option<Transition> {
        let Some(frequency) = self.estimator.process(f32::from(value)) else {
            self.update_stale();
            return None;
        };

        let transition = self.classifier.classify(frequency);
        match transition {
            Transition::Entered => info!("frequency {} Hz in range", frequency),
            Transition::Exited => info!("frequency {} Hz out of range", frequency),
            Transition::Unchanged(_) => debug!("frequency {} Hz", frequency),
        }
        // Driven on every recomputation so the pin always matches the decision
        self.indicator
            .set_indicator(transition.state().is_in_range());

        self.stale = self.estimator.is_stale();
        self.shared.publish(&self.snapshot());
        Some(transition)
    }

    /// Publish the staleness flag on change only
    fn update_stale(&mut self) {
        let stale = self.estimator.is_stale();
        if stale != self.stale {
            if stale {
                warn!(
                    "no crossing for {} samples, holding {} Hz",
                    self.estimator.state().elapsed_counter,
                    self.estimator.frequency()
                );
            }
            self.stale = stale;
            self.shared.set_stale(stale);
        }
    }
}

impl<I: Indicator> SampleSink for Detector<'_, I> {
    fn on_sample(&mut self, sample: Sample) {
        if sample.channel == self.channel {
            self.process(sample.value);
        } else {
            trace!(
                "ignoring sample from channel {} (monitoring {})",
                sample.channel.index(),
                self.channel.index()
            );
        }
    }
}
