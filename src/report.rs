// SPDX-License-Identifier: Apache-2.0

//! Periodic reporting from a lower-priority context.
//!
//! The reporting side only ever reads [`SharedState`]. How the report leaves the device is
//! decided when the firmware is assembled, by picking a [`Reporter`].

use crate::{
    config::WATCHDOG_FEED_DIVIDER,
    shared::{SharedState, Snapshot},
};

/// Consumer of periodic snapshots
pub trait Reporter {
    /// Handle one snapshot
    fn report(&mut self, snapshot: &Snapshot);
}

/// Writes every snapshot to the log at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, snapshot: &Snapshot) {
        if snapshot.stale {
            info!(
                "sin detect: {}, {} Hz (stale)",
                snapshot.state.is_in_range(),
                snapshot.frequency
            );
        } else {
            info!(
                "sin detect: {}, {} Hz",
                snapshot.state.is_in_range(),
                snapshot.frequency
            );
        }
    }
}

impl<F: FnMut(&Snapshot)> Reporter for F {
    fn report(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// Drives a [`Reporter`] from a periodic loop and paces watchdog feeding.
///
/// ```
/// use sin_freq_detect::{report::{LogReporter, ReportTask}, shared::SharedState};
///
/// static STATE: SharedState = SharedState::new();
/// let mut task = ReportTask::new(LogReporter, 10);
/// let feeds = (0..30).filter(|_| task.poll(&STATE)).count();
/// assert_eq!(feeds, 3);
/// ```
pub struct ReportTask<R: Reporter> {
    /// Output of each poll
    reporter: R,
    /// Polls between watchdog feeds
    feed_every: u32,
    /// Polls left until the next feed
    countdown: u32,
}

impl<R: Reporter> ReportTask<R> {
    /// Feed the watchdog once every `feed_every` polls. `0` is treated as `1`.
    pub fn new(reporter: R, feed_every: u32) -> Self {
        let feed_every = feed_every.max(1);
        Self {
            reporter,
            feed_every,
            countdown: feed_every,
        }
    }

    /// Snapshot `shared`, report it, and return `true` when the watchdog is due
    pub fn poll(&mut self, shared: &SharedState) -> bool {
        self.reporter.report(&shared.snapshot());
        self.countdown -= 1;
        if self.countdown == 0 {
            self.countdown = self.feed_every;
            true
        } else {
            false
        }
    }
}

impl<R: Reporter + Default> Default for ReportTask<R> {
    fn default() -> Self {
        Self::new(R::default(), WATCHDOG_FEED_DIVIDER)
    }
}
