// SPDX-License-Identifier: Apache-2.0

//! Statics and tick scheduling for interrupt handlers.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::shared::SharedState;

/// Frequency and in-range state published by the sampling interrupt
pub static DETECTOR_STATE: SharedState = SharedState::new();

/// Owned state handed over to an interrupt handler after initialization.
///
/// Only the handler itself borrows the contents once the slot is filled, so the critical
/// section is never contended on the sampling path.
pub struct IrqSlot<T>(Mutex<RefCell<Option<T>>>);

impl<T> IrqSlot<T> {
    /// Empty slot, usable as a `static`
    pub const fn new() -> Self {
        Self(Mutex::new(RefCell::new(None)))
    }

    /// Store `value`, returning any previous contents
    pub fn install(&self, value: T) -> Option<T> {
        critical_section::with(|cs| self.0.replace(cs, Some(value)))
    }

    /// Run `f` on the contents inside a critical section. Returns `None` if the slot is empty.
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        critical_section::with(|cs| self.0.borrow_ref_mut(cs).as_mut().map(f))
    }
}

impl<T> Default for IrqSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute deadlines on a fixed period, in timer ticks.
///
/// Each deadline is the previous one plus the period, so the time spent entering the handler
/// never stretches the sampling period. When the handler falls a whole period behind, the
/// grid restarts from the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    /// Next expected tick
    next: u64,
    /// Ticks between deadlines
    period: u64,
}

impl Deadline {
    /// First deadline one period after `start`
    pub const fn new(start: u64, period: u64) -> Self {
        Self {
            next: start.saturating_add(period),
            period,
        }
    }

    /// Tick the alarm should fire at
    pub fn next(&self) -> u64 {
        self.next
    }

    /// Step to the following deadline, given the current tick
    pub fn advance(&mut self, now: u64) -> u64 {
        let next = self.next.saturating_add(self.period);
        self.next = if next > now {
            next
        } else {
            warn!("sampling overran its deadline by {} ticks", now - next);
            now.saturating_add(self.period)
        };
        self.next
    }
}
