use std::fmt;
use std::ops::{Add, Sub};

/// A point in simulated time, or a duration, measured in seconds since
/// [`crate::config::Config::initial_time`]. Never negative — arithmetic
/// that would go negative saturates at zero, matching the clamping the
/// original simulator performs when a dwell pushes an arrival backward.
#[derive(Copy, Clone, PartialEq, PartialOrd, Eq, Ord, Debug, Default, Hash)]
pub struct Seconds(pub i64);

impl Seconds {
    pub const ZERO: Seconds = Seconds(0);

    pub fn new(v: i64) -> Seconds {
        Seconds(v)
    }

    pub fn max(self, other: Seconds) -> Seconds {
        if self >= other {
            self
        } else {
            other
        }
    }

    pub fn saturating_sub(self, other: Seconds) -> Seconds {
        if self.0 < other.0 {
            Seconds::ZERO
        } else {
            Seconds(self.0 - other.0)
        }
    }
}

impl Add for Seconds {
    type Output = Seconds;
    fn add(self, other: Seconds) -> Seconds {
        Seconds(self.0 + other.0)
    }
}

impl Sub for Seconds {
    type Output = Seconds;
    fn sub(self, other: Seconds) -> Seconds {
        Seconds(self.0 - other.0)
    }
}

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
