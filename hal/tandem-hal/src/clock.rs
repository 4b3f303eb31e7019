//! Millisecond time source

/// Monotonic millisecond clock
///
/// Wraps at `u32::MAX`; consumers compare timestamps with wrapping
/// subtraction.
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary fixed epoch
    fn now_ms(&self) -> u32;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_ms(&self) -> u32 {
        T::now_ms(self)
    }
}

/// Clock backed by `embassy_time::Instant`
#[cfg(feature = "embassy-time")]
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmbassyClock;

#[cfg(feature = "embassy-time")]
impl MonotonicClock for EmbassyClock {
    fn now_ms(&self) -> u32 {
        // Truncation is the intended wraparound
        embassy_time::Instant::now().as_millis() as u32
    }
}
