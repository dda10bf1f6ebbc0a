//! Time sources for the estimator.
//!
//! The estimator never reads the system time itself. It asks a [`Clock`] for the
//! current time, in seconds, and only ever uses differences between two readings.

/// A source of timestamps, in seconds.
pub trait Clock<T> {
    /// Returns the current time in seconds.
    fn now(&mut self) -> T;
}

/// A manually driven clock, e.g. for replaying recorded data or for tests.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulatedClock<T> {
    time: T,
}

impl<T> SimulatedClock<T> {
    /// Creates a clock starting at the given time.
    pub const fn new(start: T) -> Self {
        Self { time: start }
    }

    /// Moves the clock forward by `delta_t` seconds.
    pub fn advance(&mut self, delta_t: T)
    where
        T: Copy + core::ops::Add<T, Output = T>,
    {
        self.time = self.time + delta_t;
    }

    /// Sets the clock to an absolute time.
    pub fn set(&mut self, time: T) {
        self.time = time;
    }

    /// Gets the current time without counting as a clock reading.
    pub fn time(&self) -> T
    where
        T: Copy,
    {
        self.time
    }
}

impl<T> Clock<T> for SimulatedClock<T>
where
    T: Copy,
{
    #[inline]
    fn now(&mut self) -> T {
        self.time
    }
}

/// A monotonic clock measuring seconds since its creation.
#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Creates a clock whose zero is the current instant.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock<f64> for SystemClock {
    fn now(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

#[cfg(feature = "std")]
impl Clock<f32> for SystemClock {
    fn now(&mut self) -> f32 {
        self.origin.elapsed().as_secs_f32()
    }
}
