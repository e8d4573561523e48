// SPDX-License-Identifier: Apache-2.0

//! State published by the sampling interrupt for lower-priority readers.
//!
//! The interrupt is the only writer. Every field is a single word written with one atomic
//! store, so readers never lock and never observe a torn value. Fields are read one at a
//! time, which means a [`Snapshot`] may mix two consecutive publications; each field on its
//! own is always consistent. Only loads and stores are used, so this also works on cores
//! without atomic read-modify-write instructions (Cortex-M0+).

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::classifier::RangeState;

/// Values visible to the reporting side
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    /// Smoothed frequency, in Hz
    pub frequency: f32,
    /// Classifier decision
    pub state: RangeState,
    /// No crossing seen for longer than the configured staleness limit
    pub stale: bool,
    /// Completed crossing windows since startup
    pub estimates: u32,
}

/// Lock-free publication slot, usable as a `static`
pub struct SharedState {
    /// `f32` bit pattern of the frequency estimate
    frequency: AtomicU32,
    /// Classifier decision, `true` when in range
    in_range: AtomicBool,
    /// Staleness flag
    stale: AtomicBool,
    /// Completed windows
    estimates: AtomicU32,
}

impl SharedState {
    /// Zero frequency, out of range
    pub const fn new() -> Self {
        Self {
            frequency: AtomicU32::new(0),
            in_range: AtomicBool::new(false),
            stale: AtomicBool::new(false),
            estimates: AtomicU32::new(0),
        }
    }

    /// Write a complete snapshot. Only the sampling interrupt calls this.
    pub fn publish(&self, snapshot: &Snapshot) {
        self.frequency
            .store(snapshot.frequency.to_bits(), Ordering::Release);
        self.in_range
            .store(snapshot.state.is_in_range(), Ordering::Release);
        self.stale.store(snapshot.stale, Ordering::Release);
        self.estimates.store(snapshot.estimates, Ordering::Release);
    }

    /// Update only the staleness flag
    pub fn set_stale(&self, stale: bool) {
        self.stale.store(stale, Ordering::Release);
    }

    /// Latest smoothed frequency, in Hz
    pub fn current_frequency(&self) -> f32 {
        f32::from_bits(self.frequency.load(Ordering::Acquire))
    }

    /// `true` while the frequency is classified in range
    pub fn current_state(&self) -> bool {
        self.in_range.load(Ordering::Acquire)
    }

    /// Read every field
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            frequency: self.current_frequency(),
            state: RangeState::from(self.current_state()),
            stale: self.stale.load(Ordering::Acquire),
            estimates: self.estimates.load(Ordering::Acquire),
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn starts_zeroed() {
        let shared = SharedState::new();
        assert_eq!(shared.current_frequency(), 0.0);
        assert!(!shared.current_state());
        assert_eq!(shared.snapshot(), Snapshot::default());
    }

    #[test]
    fn publish_round_trips_each_field() {
        let shared = SharedState::new();
        let snapshot = Snapshot {
            frequency: 199.75,
            state: RangeState::InRange,
            stale: true,
            estimates: 12,
        };
        shared.publish(&snapshot);
        assert_eq!(shared.snapshot(), snapshot);

        shared.set_stale(false);
        assert!(!shared.snapshot().stale);
        assert_eq!(shared.current_frequency(), 199.75);
        assert!(shared.current_state());
    }

    #[test]
    fn reader_never_sees_torn_frequency() {
        static SHARED: SharedState = SharedState::new();
        let values = [100.5_f32, 250.25, 1.0e6];

        let writer = thread::spawn(move || {
            for i in 0..50_000 {
                SHARED.publish(&Snapshot {
                    frequency: values[i % values.len()],
                    ..Snapshot::default()
                });
            }
        });
        for _ in 0..50_000 {
            let frequency = SHARED.current_frequency();
            assert!(frequency == 0.0 || values.contains(&frequency), "{frequency}");
        }
        writer.join().unwrap();
    }
}
