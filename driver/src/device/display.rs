//! Display power-state events and the display bridge
//!
//! The sensor subscribes to the system's display blanking stream to learn
//! when the panel turns off (start waiting for a finger) or back on. On a
//! finger edge with the panel off, the deferred work task pokes the
//! display bridge to light the panel for unlock.

use alloc::sync::Arc;

/// Which phase of the blanking sequence an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayPhase {
    /// Delivered before the panel state actually changes
    Early,
    /// Delivered once the panel state has changed
    Blank,
}

/// Panel power state carried by a blank event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankState {
    /// Panel turned on
    Unblank,
    /// Panel turned off
    PowerDown,
    /// Any other transition
    Other(u32),
}

/// A display power event. `state` may be absent when the source delivers
/// a notification without a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayEvent {
    pub phase: DisplayPhase,
    pub state: Option<BlankState>,
}

/// Receives display power events.
pub trait DisplayObserver: Send + Sync {
    fn on_display_event(&self, event: DisplayEvent);
}

/// A source of display power events. Observers are compared by `Arc`
/// identity on unsubscribe.
pub trait DisplayEventSource: Send + Sync {
    fn subscribe(&self, observer: Arc<dyn DisplayObserver>);
    fn unsubscribe(&self, observer: &Arc<dyn DisplayObserver>);
}

/// Platform display bridge.
///
/// `interface_enable` asks the display pipeline to come up for at most
/// `timeout_ms`. Fire-and-forget: the sensor never observes the outcome.
pub trait DisplayBridge: Send + Sync {
    fn interface_enable(&self, timeout_ms: u32);
}
