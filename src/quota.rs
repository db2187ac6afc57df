//! Clamped arithmetic on the monotonic flow-control counters.
//!
//! Counters only ever grow, but callers can observe them in an order where a subtraction would
//!  go negative (e.g. a redundant `set_limit` call with an outdated value). Those cases clamp to
//!  zero - they are not errors.

/// The part of `limit` that is not yet used up by `position`
pub fn remaining(limit: u64, position: u64) -> u64 {
    limit.saturating_sub(position)
}

/// The amount by which a new cumulative value exceeds the old one, zero if it does not
pub fn delta(new_value: u64, old_value: u64) -> u64 {
    new_value.saturating_sub(old_value)
}

/// For narrowing casts where flow control logic ensures that the value is in the narrower
///  type's range, e.g. a window that was already bounded by a buffer length.
/// NB: The implementations panic otherwise
pub trait PrecheckedCast<T> {
    fn prechecked_cast(self) -> T;
}

impl PrecheckedCast<usize> for u64 {
    fn prechecked_cast(self) -> usize {
        self.try_into().expect("this is a bug: flow control logic should have ensured the value range")
    }
}

impl PrecheckedCast<u32> for usize {
    fn prechecked_cast(self) -> u32 {
        self.try_into().expect("this is a bug: flow control logic should have ensured the value range")
    }
}

/// Widening casts that cannot fail on supported platforms
pub trait SafeCast<T> {
    fn safe_cast(self) -> T;
}

#[cfg(not(target_pointer_width = "128"))]
impl SafeCast<u64> for usize {
    fn safe_cast(self) -> u64 {
        self as u64
    }
}

/// `min(value, bound)` where `bound` is a buffer size
pub fn bounded_by(value: u64, bound: usize) -> usize {
    if value < bound.safe_cast() {
        value.prechecked_cast()
    }
    else {
        bound
    }
}
