//! This [RP2040](https://docs.rs/rp2040-hal) project watches an analog input for a sine wave,
//! estimates its frequency and lights an indicator while the frequency sits inside a target
//! band. For more information, check out [the repo](https://github.com/jessicarod7/sin_freq_detect).
//!
//! ## Pipeline
//!
//! Everything below runs in the sampling interrupt at 5 kHz:
//!
//! 1. [`Sampler`](sampler::Sampler) averages 5 ADC sub-conversions into one [`Sample`](sampler::Sample).
//! 2. [`FrequencyEstimator`](estimator::FrequencyEstimator) smooths the sample with a
//!    [`LowPass`](filter::LowPass) filter, counts crossings of the ADC midpoint and turns every
//!    window of 32 crossings into a smoothed frequency.
//! 3. [`RangeClassifier`](classifier::RangeClassifier) decides in/out of the 100-300 Hz band
//!    with 2 Hz of hysteresis.
//! 4. [`Detector`](detector::Detector) drives the [`Indicator`](indicator::Indicator) and
//!    publishes to [`SharedState`](shared::SharedState).
//!
//! A lower-priority loop polls [`SharedState`](shared::SharedState) through a
//! [`ReportTask`](report::ReportTask) every 100 ms and feeds the watchdog.
//!
//! ## Crate features
//!
//! - `defmt`: log through [defmt](https://docs.rs/defmt) instead of the [`log`] facade.
//! - `firmware`: builds the RP2040 binary (implies `defmt`).
//! - `active_low_led`: the indicator LED lights when its pin is driven low.
//! - `trace_samples`: Logs every averaged sample. Very noisy!
//! - `trace_estimates`: Logs the counters behind every frequency recomputation.
//!
//! ## Demo
//!
//! ```
//! use sin_freq_detect::{
//!     config::DetectorConfig,
//!     detector::Detector,
//!     indicator::Indicator,
//!     sampler::{AdcSource, ChannelId, Sampler},
//!     shared::SharedState,
//! };
//!
//! struct Led(bool);
//! impl Indicator for Led {
//!     fn set_indicator(&mut self, active: bool) {
//!         self.0 = active;
//!     }
//! }
//!
//! /// 200 Hz sine around the midpoint of a 12-bit ADC, sampled at 25 kHz (5 kHz x 5)
//! struct SineAdc(u32);
//! impl AdcSource for SineAdc {
//!     fn read(&mut self, _channel: ChannelId) -> Option<u16> {
//!         let t = self.0 as f32 / 25_000.0;
//!         self.0 += 1;
//!         Some((2048.0 + 1200.0 * (2.0 * core::f32::consts::PI * 200.0 * t).sin()) as u16)
//!     }
//! }
//!
//! static STATE: SharedState = SharedState::new();
//! let config = DetectorConfig::DEFAULT;
//! let mut sampler = Sampler::new([ChannelId(0)], config.sampler).unwrap();
//! let mut detector = Detector::new(
//!     ChannelId(0),
//!     config.estimator,
//!     config.classifier,
//!     Led(false),
//!     &STATE,
//! )
//! .unwrap();
//!
//! let mut adc = SineAdc(0);
//! for _ in 0..10_000 {
//!     sampler.convert(&mut adc, &mut detector);
//! }
//! assert!(STATE.current_state());
//! assert!((STATE.current_frequency() - 200.0).abs() < 2.0);
//! ```

// Copyright 2024 Cameron Rodriguez
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg), feature(doc_auto_cfg), feature(doc_cfg_hide))]

#[macro_use]
mod fmt;

pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod estimator;
pub mod filter;
pub mod indicator;
pub mod interrupt;
pub mod report;
pub mod sampler;
pub mod shared;

pub use error::ConfigError;
