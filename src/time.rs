//! Microsecond timestamps shared by every timed state machine.
//!
//! Timestamps are a free-running `u32` microsecond counter, which wraps
//! roughly every 71 minutes. All comparisons go through [`elapsed`].

/// Microseconds since an arbitrary epoch, wrapping.
pub type Micros = u32;

/// Time from `since` to `now`, correct across one counter wrap.
#[inline]
pub fn elapsed(now: Micros, since: Micros) -> Micros {
    now.wrapping_sub(since)
}

/// Source of the current time for code that waits on its own.
pub trait Clock {
    fn now_us(&self) -> Micros;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> Micros {
        (**self).now_us()
    }
}
