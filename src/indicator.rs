// SPDX-License-Identifier: Apache-2.0

//! In-range indicator output
use embedded_hal::digital::{OutputPin, PinState};

/// Binary output driven by the classifier
pub trait Indicator {
    /// Set the indicator level. Must be idempotent.
    fn set_indicator(&mut self, active: bool);
}

/// Electrical level which lights the indicator
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Pin high = active
    #[default]
    ActiveHigh,
    /// Pin low = active, e.g. an LED wired from the supply rail to the pin
    ActiveLow,
}

impl Polarity {
    /// Pin level corresponding to `active`
    pub fn level(&self, active: bool) -> PinState {
        match self {
            Self::ActiveHigh => PinState::from(active),
            Self::ActiveLow => PinState::from(!active),
        }
    }
}

/// Drives an indicator LED on a GPIO pin
pub struct PinIndicator<P: OutputPin> {
    /// Output pin
    pin: P,
    /// Level mapping
    polarity: Polarity,
    /// Last requested level
    active: bool,
}

impl<P: OutputPin> PinIndicator<P> {
    /// Take ownership of `pin` and drive it inactive
    pub fn new(pin: P, polarity: Polarity) -> Self {
        let mut indicator = Self {
            pin,
            polarity,
            active: false,
        };
        indicator.set_indicator(false);
        indicator
    }

    /// Last requested level
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Release the pin
    pub fn free(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> Indicator for PinIndicator<P> {
    fn set_indicator(&mut self, active: bool) {
        self.active = active;
        if self.pin.set_state(self.polarity.level(active)).is_err() {
            // Nothing upstream can act on this; next recomputation retries
            warn!("unable to drive indicator pin (active = {})", active);
        }
    }
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use embedded_hal::digital::{ErrorKind, ErrorType};

    use super::*;

    /// Records every level written
    #[derive(Default)]
    struct FakePin {
        levels: Vec<bool>,
    }

    impl ErrorType for FakePin {
        type Error = Infallible;
    }

    impl OutputPin for FakePin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.push(true);
            Ok(())
        }
    }

    /// Always fails
    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = ErrorKind;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            Err(ErrorKind::Other)
        }
    }

    #[test]
    fn active_high_drives_inactive_on_init() {
        let mut indicator = PinIndicator::new(FakePin::default(), Polarity::ActiveHigh);
        indicator.set_indicator(true);
        indicator.set_indicator(true);
        indicator.set_indicator(false);
        assert!(!indicator.is_active());
        assert_eq!(indicator.free().levels, [false, true, true, false]);
    }

    #[test]
    fn active_low_inverts_levels() {
        let mut indicator = PinIndicator::new(FakePin::default(), Polarity::ActiveLow);
        indicator.set_indicator(true);
        assert!(indicator.is_active());
        assert_eq!(indicator.free().levels, [true, false]);
    }

    #[test]
    fn pin_errors_are_absorbed() {
        let mut indicator = PinIndicator::new(BrokenPin, Polarity::ActiveHigh);
        indicator.set_indicator(true);
        assert!(indicator.is_active());
    }
}
