use web_time::Instant;

/// Source of timestamps for the game timer.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock, also usable from wasm.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
