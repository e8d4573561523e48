// SPDX-License-Identifier: Apache-2.0

//! Logging macros which forward to [`defmt`](https://docs.rs/defmt) on target and to the
//! [`log`] facade everywhere else.
//!
//! Only pass primitives (`u8`..`u64`, `f32`, `bool`, `&str`) as arguments, since the same
//! format string has to satisfy both backends.
#![allow(unused_macros)]

/// Very verbose messages, usually gated behind a `trace_*` feature
macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::trace!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::log::trace!($($arg)*);
    }};
}

/// Internal state changes useful while bringing up hardware
macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::log::debug!($($arg)*);
    }};
}

/// Normal operation messages
macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::log::info!($($arg)*);
    }};
}

/// Recoverable conditions which degrade the estimate
macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::log::warn!($($arg)*);
    }};
}

/// Failures the system cannot recover from on its own
macro_rules! error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        ::defmt::error!($($arg)*);
        #[cfg(not(feature = "defmt"))]
        ::log::error!($($arg)*);
    }};
}
