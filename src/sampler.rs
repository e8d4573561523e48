// SPDX-License-Identifier: Apache-2.0

//! Oversampling front end.
//!
//! Every timer tick the [`Sampler`] pulls `M` sub-conversions per channel from an
//! [`AdcSource`], averages them and pushes one [`Sample`] per channel into a [`SampleSink`].

use crate::{config::SamplerConfig, error::ConfigError};

/// Identifies an analog input channel
#[derive(Default, Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelId(pub u8);

impl ChannelId {
    /// Raw channel number
    pub fn index(&self) -> u8 {
        self.0
    }
}

/// Monotonic counter indicating the position of averaged samples on a channel.
#[derive(Default, Debug, Ord, PartialOrd, Eq, PartialEq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SampleCounter(u64);

impl SampleCounter {
    /// Get current counter value
    pub fn get_counter(&self) -> u64 {
        self.0
    }

    /// Increment counter. Saturates at [`u64::MAX`] instead of wrapping, so ordering is
    /// never violated.
    pub fn increment(&mut self) {
        match self.0.checked_add(1) {
            None => warn!("sample counter saturated"),
            Some(new_counter) => self.0 = new_counter,
        }
    }
}

/// One averaged reading. Immutable once emitted.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Sample {
    /// Channel the reading came from
    pub channel: ChannelId,
    /// Position of this sample in the channel's stream
    pub sequence: SampleCounter,
    /// Average of the valid sub-readings, in raw ADC counts
    pub value: u16,
}

/// Provider of raw sub-conversions
pub trait AdcSource {
    /// Perform one conversion on `channel`.
    ///
    /// Returns `None` when the converter flags the result as invalid. The reading still
    /// counts towards the batch, but not towards the average.
    fn read(&mut self, channel: ChannelId) -> Option<u16>;
}

/// Downstream handler receiving completed samples
pub trait SampleSink {
    /// Called synchronously, exactly once per completed batch
    fn on_sample(&mut self, sample: Sample);
}

/// Running sum for a single channel
#[derive(Debug, Clone, Copy)]
pub struct ChannelAverager {
    /// Channel being averaged
    channel: ChannelId,
    /// Sum of valid sub-readings in the current batch
    accumulator: u32,
    /// Sub-readings seen in the current batch, valid or not
    received: u8,
    /// Valid sub-readings in the current batch
    valid: u8,
    /// Sequence index for the next emitted sample
    next_sample: SampleCounter,
}

impl ChannelAverager {
    /// New averager with an empty batch
    pub const fn new(channel: ChannelId) -> Self {
        Self {
            channel,
            accumulator: 0,
            received: 0,
            valid: 0,
            next_sample: SampleCounter(0),
        }
    }

    /// Channel this averager belongs to
    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Add one sub-reading. Returns a sample once `oversample` sub-readings were received,
    /// then starts a fresh batch.
    ///
    /// A batch in which every sub-reading was invalid produces no sample.
    pub fn push(&mut self, reading: Option<u16>, oversample: u8) -> Option<Sample> {
        if let Some(value) = reading {
            self.accumulator += u32::from(value);
            self.valid += 1;
        }
        self.received += 1;
        if self.received < oversample {
            return None;
        }

        let batch = if self.valid == 0 {
            warn!(
                "channel {}: no valid readings in batch of {}",
                self.channel.index(),
                oversample
            );
            None
        } else {
            let sample = Sample {
                channel: self.channel,
                sequence: self.next_sample,
                value: (self.accumulator / u32::from(self.valid)) as u16,
            };
            self.next_sample.increment();
            Some(sample)
        };
        self.accumulator = 0;
        self.received = 0;
        self.valid = 0;
        batch
    }
}

/// Averages `M` sub-readings for each of `N` channels per trigger
pub struct Sampler<const N: usize> {
    /// One running batch per monitored channel
    channels: [ChannelAverager; N],
    /// Sub-readings per sample (`M`)
    oversample: u8,
}

impl<const N: usize> Sampler<N> {
    /// Create a sampler for the given channels
    pub fn new(channels: [ChannelId; N], config: SamplerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            channels: channels.map(ChannelAverager::new),
            oversample: config.oversample,
        })
    }

    /// Run one trigger: `M` rounds of conversions across all channels, then hand each
    /// completed sample to `sink`.
    pub fn convert<A: AdcSource, S: SampleSink>(&mut self, adc: &mut A, sink: &mut S) {
        for _ in 0..self.oversample {
            for averager in self.channels.iter_mut() {
                let reading = adc.read(averager.channel());
                if let Some(sample) = averager.push(reading, self.oversample) {
                    #[cfg(feature = "trace_samples")]
                    trace!(
                        "channel {} sample {}: {}",
                        sample.channel.index(),
                        sample.sequence.get_counter(),
                        sample.value
                    );
                    sink.on_sample(sample);
                }
            }
        }
    }
}
