//! Fingerprint sensor device core
//!
//! The device object ties the hardware traits together and carries the
//! shared state every execution context operates on:
//!
//! - blocking contexts: open/close (`lifecycle`), control dispatch
//!   (`control`)
//! - interrupt context: the top-half edge handler (`events`)
//! - deferred context: the display-bridge work item
//! - subscriber context: display power events (`events`)
//!
//! Lifecycle state (user count, claimed lines, IRQ enablement) lives under
//! one spinlock so the "resources held iff open" invariant is updated
//! atomically. The flags the interrupt path reads are atomics; the top
//! half never takes a lock.

pub mod control;
pub mod events;
pub mod keys;
mod lifecycle;

use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::config::LineConfig;
use crate::constants::UNLOCK_TIMEOUT_MS;
use crate::device::display::{DisplayBridge, DisplayEventSource, DisplayObserver};
use crate::device::gpio::GpioBank;
use crate::device::input::{InputSink, KeyCapability, EV_KEY, KEY_CAMERA, KEY_HOME, KEY_KPENTER, KEY_POWER};
use crate::device::irq::IrqController;
use crate::device::power::{Delay, WakeSource};
use crate::notify::{EndpointId, NotifyChannel, NotifyTransport};
use crate::work::{WorkItem, WorkQueue};
use crate::{RwLock, Spinlock};

pub use control::ControlRequest;
pub use keys::{FpKey, KeyEvent};

/// Driver error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// Missing or invalid configuration (line identifier, transport)
    Config,
    /// The interrupt could not be resolved or claimed
    IrqRegistration,
    /// Open against an identity the registry does not know
    NoSuchDevice,
    /// Malformed data transfer across the control boundary
    CopyFault,
    /// Lifecycle contract violation
    InvalidState,
}

impl DriverError {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverError::Config => "configuration error",
            DriverError::IrqRegistration => "interrupt registration failed",
            DriverError::NoSuchDevice => "no such device",
            DriverError::CopyFault => "bad control payload",
            DriverError::InvalidState => "invalid device state",
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device identity used by the registry.
pub type DeviceId = u32;

/// Capability set registered with the input sink at probe time. Fixed
/// order, immutable thereafter.
pub const KEY_CAPABILITIES: [KeyCapability; 4] = [
    KeyCapability { event_type: EV_KEY, code: KEY_HOME },
    KeyCapability { event_type: EV_KEY, code: KEY_POWER },
    KeyCapability { event_type: EV_KEY, code: KEY_CAMERA },
    KeyCapability { event_type: EV_KEY, code: KEY_KPENTER },
];

/// The hardware services a device is wired to. Everything is injected;
/// the core holds no process-wide hardware state.
pub struct DeviceDeps {
    pub config: Arc<dyn LineConfig>,
    pub gpio: Arc<dyn GpioBank>,
    pub irq: Arc<dyn IrqController>,
    pub input: Arc<dyn InputSink>,
    pub display: Arc<dyn DisplayEventSource>,
    pub bridge: Arc<dyn DisplayBridge>,
    pub wake: Arc<dyn WakeSource>,
    pub delay: Arc<dyn Delay>,
    pub work_queue: Arc<dyn WorkQueue>,
}

/// Lifecycle state guarded by one lock (see the lock module's ordering
/// protocol).
pub(crate) struct LifecycleState {
    pub users: u32,
    pub reset_line: Option<u32>,
    pub irq_line: Option<u32>,
    pub irq: Option<u32>,
    pub irq_enabled: bool,
}

impl LifecycleState {
    const fn new() -> Self {
        Self {
            users: 0,
            reset_line: None,
            irq_line: None,
            irq: None,
            irq_enabled: false,
        }
    }
}

/// One fingerprint sensor device.
pub struct FpDevice {
    id: DeviceId,
    pub(crate) deps: DeviceDeps,
    pub(crate) notify: Arc<NotifyChannel>,
    pub(crate) work: Arc<WorkItem>,
    pub(crate) state: Spinlock<LifecycleState>,
    // Interrupt-context flags; never guarded, never blocking
    pub(crate) device_available: AtomicBool,
    pub(crate) panel_off: AtomicBool,
    pub(crate) await_finger_down: AtomicBool,
}

impl fmt::Debug for FpDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FpDevice").field("id", &self.id).finish_non_exhaustive()
    }
}

impl FpDevice {
    fn new(id: DeviceId, deps: DeviceDeps, notify: Arc<NotifyChannel>) -> Arc<Self> {
        let bridge = deps.bridge.clone();
        let work = WorkItem::new(move || {
            bridge.interface_enable(UNLOCK_TIMEOUT_MS);
        });

        Arc::new(Self {
            id,
            deps,
            notify,
            work,
            state: Spinlock::new(LifecycleState::new()),
            device_available: AtomicBool::new(false),
            panel_off: AtomicBool::new(false),
            await_finger_down: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Number of open handles.
    pub fn users(&self) -> u32 {
        self.state.lock().users
    }

    /// Whether both lines are currently claimed.
    pub fn resources_held(&self) -> bool {
        let state = self.state.lock();
        state.reset_line.is_some() && state.irq_line.is_some()
    }

    pub fn irq_enabled(&self) -> bool {
        self.state.lock().irq_enabled
    }

    /// True once userspace has signaled readiness.
    pub fn is_available(&self) -> bool {
        self.device_available.load(Ordering::Acquire)
    }

    pub fn panel_off(&self) -> bool {
        self.panel_off.load(Ordering::Acquire)
    }

    pub fn awaiting_finger(&self) -> bool {
        self.await_finger_down.load(Ordering::Acquire)
    }
}

/// Registry of probed devices, keyed by [`DeviceId`].
///
/// Read-mostly: lookups on every open, writes only at probe/remove.
pub struct DeviceRegistry {
    devices: RwLock<Vec<Arc<FpDevice>>>,
}

impl DeviceRegistry {
    pub const fn new() -> Self {
        Self {
            devices: RwLock::new(Vec::new()),
        }
    }

    fn register(&self, device: Arc<FpDevice>) -> Result<(), DriverError> {
        let mut devices = self.devices.write();
        if devices.iter().any(|d| d.id == device.id) {
            return Err(DriverError::InvalidState);
        }
        devices.push(device);
        Ok(())
    }

    fn unregister(&self, id: DeviceId) -> Option<Arc<FpDevice>> {
        let mut devices = self.devices.write();
        let index = devices.iter().position(|d| d.id == id)?;
        Some(devices.swap_remove(index))
    }

    /// Look up a device by identity.
    pub fn lookup(&self, id: DeviceId) -> Result<Arc<FpDevice>, DriverError> {
        self.devices
            .read()
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(DriverError::NoSuchDevice)
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }
}

/// Driver-wide context: the notification channel and the device registry.
///
/// Built once at module load; the channel's transport is the only
/// load-time requirement that can fail, and its absence is fatal.
pub struct FpDriver {
    notify: Arc<NotifyChannel>,
    registry: DeviceRegistry,
}

impl fmt::Debug for FpDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FpDriver").finish_non_exhaustive()
    }
}

impl FpDriver {
    /// Bring the driver up. `transport` is `None` when the platform could
    /// not create the listener transport, which aborts the load.
    pub fn load(transport: Option<Arc<dyn NotifyTransport>>) -> Result<Self, DriverError> {
        crate::klog::init();

        let Some(transport) = transport else {
            log::error!(target: "fp", "no notification transport, aborting load");
            return Err(DriverError::Config);
        };

        Ok(Self {
            notify: Arc::new(NotifyChannel::new(transport)),
            registry: DeviceRegistry::new(),
        })
    }

    /// Create a device, declare its input capabilities, subscribe it to
    /// display power events, and publish it in the registry.
    pub fn probe(&self, id: DeviceId, deps: DeviceDeps) -> Result<Arc<FpDevice>, DriverError> {
        for cap in KEY_CAPABILITIES {
            deps.input.set_capability(cap.event_type, cap.code);
        }

        let device = FpDevice::new(id, deps, self.notify.clone());
        device
            .deps
            .display
            .subscribe(device.clone() as Arc<dyn DisplayObserver>);

        self.registry.register(device.clone())?;
        log::info!(target: "fp", "device {} probed", id);
        Ok(device)
    }

    /// Tear a device down: unsubscribe its observer and drop it from the
    /// registry. Open handles keep the object alive but it is no longer
    /// reachable by identity.
    pub fn remove(&self, id: DeviceId) -> Result<(), DriverError> {
        let device = self.registry.unregister(id).ok_or(DriverError::NoSuchDevice)?;

        let observer = device.clone() as Arc<dyn DisplayObserver>;
        device.deps.display.unsubscribe(&observer);

        if device.users() > 0 {
            log::warn!(target: "fp", "device {} removed with {} open handles", id, device.users());
        } else {
            log::info!(target: "fp", "device {} removed", id);
        }
        Ok(())
    }

    /// Open the device with the given identity.
    pub fn open(&self, id: DeviceId) -> Result<Arc<FpDevice>, DriverError> {
        let device = self.registry.lookup(id)?;
        device.open()?;
        Ok(device)
    }

    /// An inbound message from a listener: record its endpoint as the
    /// notification destination.
    pub fn handle_listener_message(&self, sender: EndpointId) {
        self.notify.bind(sender);
    }

    pub fn notify(&self) -> &Arc<NotifyChannel> {
        &self.notify
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }
}

// ============================================================================
// TEST RIG
// ============================================================================


#[cfg(test)]
mod tests {
    use super::testkit::{rig, DEV_ID};
    use super::*;
    use crate::device::mock::{InputOp, MockTransport};
    use crate::device::input::{EV_KEY, KEY_CAMERA, KEY_HOME, KEY_KPENTER, KEY_POWER};

    #[test]
    fn test_load_without_transport_is_fatal() {
        assert_eq!(FpDriver::load(None).unwrap_err(), DriverError::Config);
    }

    #[test]
    fn test_probe_registers_capability_map_in_order() {
        let rig = rig();
        let caps: Vec<_> = rig
            .input
            .ops()
            .into_iter()
            .filter(|op| matches!(op, InputOp::Capability { .. }))
            .collect();
        assert_eq!(
            caps,
            vec![
                InputOp::Capability { event_type: EV_KEY, code: KEY_HOME },
                InputOp::Capability { event_type: EV_KEY, code: KEY_POWER },
                InputOp::Capability { event_type: EV_KEY, code: KEY_CAMERA },
                InputOp::Capability { event_type: EV_KEY, code: KEY_KPENTER },
            ]
        );
    }

    #[test]
    fn test_probe_subscribes_remove_unsubscribes() {
        let rig = rig();
        assert_eq!(rig.display.observer_count(), 1);

        rig.driver.remove(DEV_ID).unwrap();
        assert_eq!(rig.display.observer_count(), 0);
        assert!(rig.driver.registry().is_empty());
    }

    #[test]
    fn test_duplicate_probe_rejected() {
        let rig = rig();
        let result = rig.driver.registry.register(rig.device.clone());
        assert_eq!(result.unwrap_err(), DriverError::InvalidState);
    }

    #[test]
    fn test_open_unknown_identity() {
        let rig = rig();
        assert_eq!(rig.driver.open(99).unwrap_err(), DriverError::NoSuchDevice);
    }

    #[test]
    fn test_listener_message_binds_endpoint() {
        let rig = rig();
        rig.driver.handle_listener_message(1234);
        assert_eq!(rig.driver.notify().endpoint(), Some(1234));
    }

    #[test]
    fn test_remove_unknown_identity() {
        let transport = Arc::new(MockTransport::new());
        let driver = FpDriver::load(Some(transport)).unwrap();
        assert_eq!(driver.remove(7).unwrap_err(), DriverError::NoSuchDevice);
    }
}
