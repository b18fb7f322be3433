// crates/npxl-core/src/duration.rs
//
// Monotonic, non-negative, millisecond-precise duration used throughout the
// playback core. Never represents a point in time by itself — it is either a
// span (`TimedItem::length`) or an offset from the start of the video
// (`TimedItem::start`, the seek position).

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A non-negative span of time, millisecond-precise.
///
/// Subtraction saturates at zero rather than panicking or going negative —
/// callers that compute "space remaining" or "time since X" never have to
/// guard against the other operand being larger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Duration(u64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub const fn from_millis(ms: u64) -> Self {
        Duration(ms)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Duration(secs * 1_000)
    }

    /// Build from a fractional number of seconds. Negative input saturates to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        if secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration((secs * 1_000.0).round() as u64)
        }
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Saturating subtraction: `self - rhs`, clamped to `Duration::ZERO`.
    pub const fn saturating_sub(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_sub(rhs.0))
    }

    /// Scale by a fraction (e.g. `0.7` for the backward-capacity ratio).
    /// A negative fraction saturates to zero.
    pub fn scale(self, fraction: f64) -> Duration {
        if fraction <= 0.0 {
            Duration::ZERO
        } else {
            Duration((self.0 as f64 * fraction).round() as u64)
        }
    }

    pub const fn min(self, other: Duration) -> Duration {
        if self.0 < other.0 { self } else { other }
    }

    pub const fn max(self, other: Duration) -> Duration {
        if self.0 > other.0 { self } else { other }
    }
}

impl Add for Duration {
    type Output = Duration;
    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

/// Saturating — see [`Duration::saturating_sub`]. Provided as an operator
/// overload too since most call sites read more naturally as `a - b`.
impl Sub for Duration {
    type Output = Duration;
    fn sub(self, rhs: Duration) -> Duration {
        self.saturating_sub(rhs)
    }
}

impl std::fmt::Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}
