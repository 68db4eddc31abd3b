//! Userspace notification channel
//!
//! A single-subscriber, best-effort message pipe from the driver to one
//! registered listener. The listener announces itself by sending any
//! inbound message; the driver records the sender as the destination for
//! all future status codes. Delivery is at-most-once: with no listener
//! bound, or when the transport cannot take the message, the code is
//! dropped and never reported as an error.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicU32, Ordering};

/// Opaque identifier of the registered listener. Zero never names a real
/// listener; it is the unbound sentinel.
pub type EndpointId = u32;

const NO_LISTENER: EndpointId = 0;

/// Transport backend for listener delivery.
///
/// `unicast` must not block; it is called from interrupt context.
pub trait NotifyTransport: Send + Sync {
    fn unicast(&self, endpoint: EndpointId, payload: &[u8]) -> Result<(), &'static str>;
}

/// The driver's one notification channel.
pub struct NotifyChannel {
    /// Last-known listener. Last writer wins; never cleared explicitly.
    /// Atomic so the interrupt path reads it without a lock.
    endpoint: AtomicU32,
    transport: Arc<dyn NotifyTransport>,
}

impl NotifyChannel {
    pub fn new(transport: Arc<dyn NotifyTransport>) -> Self {
        Self {
            endpoint: AtomicU32::new(NO_LISTENER),
            transport,
        }
    }

    /// Record the sender of an inbound message as the current listener.
    pub fn bind(&self, sender: EndpointId) {
        self.endpoint.store(sender, Ordering::Release);
        log::debug!(target: "fp-notify", "listener bound: {}", sender);
    }

    /// The currently bound listener, if any.
    pub fn endpoint(&self) -> Option<EndpointId> {
        match self.endpoint.load(Ordering::Acquire) {
            NO_LISTENER => None,
            endpoint => Some(endpoint),
        }
    }

    /// Deliver a single status code to the bound listener, best effort.
    pub fn send(&self, code: u8) {
        let Some(endpoint) = self.endpoint() else {
            log::debug!(target: "fp-notify", "no listener, dropping code {}", code);
            return;
        };

        if let Err(e) = self.transport.unicast(endpoint, &[code]) {
            log::warn!(target: "fp-notify", "send of code {} failed: {}", code, e);
        }
    }
}
