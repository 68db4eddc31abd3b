//! Wakeup and delay services

/// Holds the system out of suspend for a bounded duration.
///
/// The hold expires on its own; there is no explicit release. Callable
/// from interrupt context.
pub trait WakeSource: Send + Sync {
    fn stay_awake(&self, duration_ms: u32);
}

/// Short busy-wait delays for hardware pulse timing.
pub trait Delay: Send + Sync {
    fn delay_ms(&self, ms: u32);
}
