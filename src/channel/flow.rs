use std::cmp::min;
use std::fmt::{Display, Formatter};
use crate::quota::{delta, remaining};

/// The flow control counters for one direction of a channel.
///
/// `seq` / `arm` is the protocol window, `position` / `limit` the application's quota. All four
///  counters are monotonic. `seq` and `position` currently always advance together, but they are
///  deliberately kept apart (see the crate documentation).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlowCounters {
    seq: u64,
    arm: u64,
    limit: u64,
    position: u64,
}

impl FlowCounters {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn arm(&self) -> u64 {
        self.arm
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// the number of bytes the window still permits
    pub fn window_remaining(&self) -> u64 {
        remaining(self.arm, self.seq)
    }

    /// the number of bytes the application quota still permits
    pub fn quota_remaining(&self) -> u64 {
        remaining(self.limit, self.position)
    }

    /// the number of bytes that can be transferred right now, honoring both window and quota
    pub fn available(&self) -> u64 {
        min(self.window_remaining(), self.quota_remaining())
    }

    /// Raises the limit to a new cumulative value, returning the amount it was raised by.
    ///  Lower values leave the limit unchanged.
    pub fn raise_limit_to(&mut self, new_limit: u64) -> u64 {
        let added = delta(new_limit, self.limit);
        self.limit += added;
        added
    }

    pub fn add_limit(&mut self, added: u64) {
        self.limit = self.limit.saturating_add(added);
    }

    pub fn add_arm(&mut self, added: u64) {
        self.arm = self.arm.saturating_add(added);
    }

    /// Returns the previous arm
    pub fn set_arm(&mut self, arm: u64) -> u64 {
        std::mem::replace(&mut self.arm, arm)
    }

    /// Account for `n` bytes that were transferred. Callers must have ensured that the window
    ///  permits them.
    pub fn advance(&mut self, n: u64) {
        assert!(n <= self.window_remaining(), "this is a bug: transferring {} bytes beyond the window {}", n, self);
        self.seq += n;
        self.position += n;
    }
}

impl Display for FlowCounters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "seq:{} arm:{} pos:{} limit:{}", self.seq, self.arm, self.position, self.limit)
    }
}
