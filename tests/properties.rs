//! Property tests for the hysteresis, filter, averaging and freeze invariants.

use proptest::prelude::*;
use sin_freq_detect::{
    classifier::{RangeClassifier, RangeState},
    config::{EstimatorConfig, RangeClassifierConfig},
    estimator::FrequencyEstimator,
    filter::LowPass,
    sampler::{ChannelAverager, ChannelId},
};

fn band() -> RangeClassifierConfig {
    RangeClassifierConfig {
        low_bound: 100.0,
        high_bound: 300.0,
        hysteresis_margin: 2.0,
    }
}

proptest! {
    #[test]
    fn in_range_holds_inside_exit_band(values in prop::collection::vec(98.0f32..=302.0, 1..200)) {
        let mut classifier = RangeClassifier::new(band()).unwrap();
        classifier.classify(200.0);
        for f in values {
            prop_assert_eq!(classifier.classify(f).state(), RangeState::InRange);
        }
    }

    #[test]
    fn out_of_range_holds_below_entry(values in prop::collection::vec(98.0f32..102.0, 1..200)) {
        let mut classifier = RangeClassifier::new(band()).unwrap();
        for f in values {
            prop_assert_eq!(classifier.classify(f).state(), RangeState::OutOfRange);
        }
    }

    #[test]
    fn decision_matches_thresholds(values in prop::collection::vec(0.0f32..500.0, 1..200)) {
        let config = band();
        let mut classifier = RangeClassifier::new(config).unwrap();
        for f in values {
            let before = classifier.state();
            let after = classifier.classify(f).state();
            let expected = match before {
                RangeState::OutOfRange => f >= config.enter_low() && f <= config.enter_high(),
                RangeState::InRange => f >= config.exit_low() && f <= config.exit_high(),
            };
            prop_assert_eq!(after.is_in_range(), expected);
        }
    }

    #[test]
    fn filter_output_between_previous_and_input(
        cutoff in 0.01f32..=1.0,
        inputs in prop::collection::vec(-1.0e4f32..1.0e4, 1..100),
    ) {
        let mut filter = LowPass::new(cutoff).unwrap();
        for input in inputs {
            let previous = filter.output();
            let output = filter.update(input);
            let (lo, hi) = if previous <= input { (previous, input) } else { (input, previous) };
            prop_assert!(output >= lo - 1e-2 && output <= hi + 1e-2);
        }
    }

    #[test]
    fn averager_emits_truncated_mean(readings in prop::collection::vec(0u16..4096, 1..=32)) {
        let oversample = readings.len() as u8;
        let mut averager = ChannelAverager::new(ChannelId(0));
        let mut emitted = None;
        for (i, reading) in readings.iter().enumerate() {
            let sample = averager.push(Some(*reading), oversample);
            if i + 1 < readings.len() {
                prop_assert!(sample.is_none());
            }
            emitted = sample;
        }
        let sum: u32 = readings.iter().map(|r| u32::from(*r)).sum();
        prop_assert_eq!(emitted.map(|s| s.value), Some((sum / readings.len() as u32) as u16));
    }

    #[test]
    fn constant_input_never_changes_estimate(
        level in prop_oneof![0u16..1900, 2200u16..4096],
        samples in 1usize..20_000,
    ) {
        let mut estimator = FrequencyEstimator::new(EstimatorConfig::DEFAULT).unwrap();
        // Prime with a sine so there is an estimate to freeze
        for n in 0..5_000 {
            let phase = 2.0 * std::f32::consts::PI * 200.0 * n as f32 / 5000.0;
            estimator.process(2048.0 + 1000.0 * phase.sin());
        }
        // At most one crossing while the filter moves to the new level
        for _ in 0..50 {
            estimator.process(f32::from(level));
        }
        let frozen = estimator.frequency();
        for _ in 0..samples {
            prop_assert_eq!(estimator.process(f32::from(level)), None);
        }
        prop_assert_eq!(estimator.frequency(), frozen);
    }
}
