//! Recording mock hardware for tests
//!
//! Every hardware trait has a mock here that records the calls made
//! against it, so tests can assert on the exact operation sequence the
//! core produced. Failure injection is per-mock and one-shot where it
//! matters (claim failures, transport loss).

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::device::display::{DisplayEvent, DisplayEventSource, DisplayObserver};
use crate::device::gpio::{GpioBank, GpioError};
use crate::device::irq::{IrqController, IrqError, IrqFlags, IrqHandler, IrqStatus};
use crate::device::input::InputSink;
use crate::device::power::{Delay, WakeSource};
use crate::notify::{EndpointId, NotifyTransport};
use crate::work::{WorkItem, WorkQueue};
use crate::Spinlock;

// ============================================================================
// GPIO + DELAY
// ============================================================================

/// One observed pin-level operation. Delays share the log so tests can
/// assert on interleaving (the reset pulse cares about hold ordering).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOp {
    RequestOutput { line: u32, initial: bool },
    RequestInput { line: u32 },
    DirectionOutput { line: u32, value: bool },
    Set { line: u32, value: bool },
    Free { line: u32 },
    Hold { ms: u32 },
}

/// Records GPIO traffic and delays in one ordered log.
pub struct MockBoard {
    ops: Spinlock<Vec<PinOp>>,
    claimed: Spinlock<Vec<u32>>,
    fail_request: Spinlock<Option<u32>>,
}

impl MockBoard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ops: Spinlock::new(Vec::new()),
            claimed: Spinlock::new(Vec::new()),
            fail_request: Spinlock::new(None),
        })
    }

    /// Make the next claim of `line` fail with `Busy`.
    pub fn fail_request_of(&self, line: u32) {
        *self.fail_request.lock() = Some(line);
    }

    pub fn ops(&self) -> Vec<PinOp> {
        self.ops.lock().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().clear();
    }

    pub fn claimed(&self) -> Vec<u32> {
        self.claimed.lock().clone()
    }

    fn claim(&self, line: u32) -> Result<(), GpioError> {
        if *self.fail_request.lock() == Some(line) {
            *self.fail_request.lock() = None;
            return Err(GpioError::Busy);
        }
        let mut claimed = self.claimed.lock();
        if claimed.contains(&line) {
            return Err(GpioError::Busy);
        }
        claimed.push(line);
        Ok(())
    }
}

impl GpioBank for MockBoard {
    fn is_valid(&self, line: u32) -> bool {
        line < 256
    }

    fn request_output(&self, line: u32, initial: bool) -> Result<(), GpioError> {
        self.claim(line)?;
        self.ops.lock().push(PinOp::RequestOutput { line, initial });
        Ok(())
    }

    fn request_input(&self, line: u32) -> Result<(), GpioError> {
        self.claim(line)?;
        self.ops.lock().push(PinOp::RequestInput { line });
        Ok(())
    }

    fn set_direction_output(&self, line: u32, value: bool) {
        self.ops.lock().push(PinOp::DirectionOutput { line, value });
    }

    fn set_value(&self, line: u32, value: bool) {
        self.ops.lock().push(PinOp::Set { line, value });
    }

    fn free(&self, line: u32) {
        self.claimed.lock().retain(|&l| l != line);
        self.ops.lock().push(PinOp::Free { line });
    }
}

impl Delay for MockBoard {
    fn delay_ms(&self, ms: u32) {
        self.ops.lock().push(PinOp::Hold { ms });
    }
}

// ============================================================================
// INTERRUPT CONTROLLER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqOp {
    Request { irq: u32, flags: IrqFlags },
    Enable(u32),
    Disable(u32),
    SetWake { irq: u32, on: bool },
    Free(u32),
}

/// Captures the registered handler so tests can fire edges.
pub struct MockIrqController {
    ops: Spinlock<Vec<IrqOp>>,
    handlers: Spinlock<Vec<(u32, IrqHandler)>>,
    fail_request: AtomicBool,
}

impl MockIrqController {
    /// Offset between line numbers and interrupt numbers, so tests can
    /// tell the two apart.
    pub const IRQ_BASE: u32 = 64;

    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ops: Spinlock::new(Vec::new()),
            handlers: Spinlock::new(Vec::new()),
            fail_request: AtomicBool::new(false),
        })
    }

    pub fn fail_next_request(&self) {
        self.fail_request.store(true, Ordering::SeqCst);
    }

    pub fn ops(&self) -> Vec<IrqOp> {
        self.ops.lock().clone()
    }

    pub fn registered(&self) -> Vec<u32> {
        self.handlers.lock().iter().map(|(irq, _)| *irq).collect()
    }

    /// Simulate a hardware edge on `irq`. Returns what the handler said,
    /// or `None` when nothing is registered.
    pub fn fire(&self, irq: u32) -> Option<IrqStatus> {
        let handlers = self.handlers.lock();
        handlers
            .iter()
            .find(|(registered, _)| *registered == irq)
            .map(|(_, handler)| handler())
    }
}

impl IrqController for MockIrqController {
    fn to_irq(&self, line: u32) -> Result<u32, IrqError> {
        Ok(line + Self::IRQ_BASE)
    }

    fn request(
        &self,
        irq: u32,
        flags: IrqFlags,
        _name: &'static str,
        handler: IrqHandler,
    ) -> Result<(), IrqError> {
        if self.fail_request.swap(false, Ordering::SeqCst) {
            return Err(IrqError::RequestFailed);
        }
        self.ops.lock().push(IrqOp::Request { irq, flags });
        self.handlers.lock().push((irq, handler));
        Ok(())
    }

    fn enable(&self, irq: u32) {
        self.ops.lock().push(IrqOp::Enable(irq));
    }

    fn disable(&self, irq: u32) {
        self.ops.lock().push(IrqOp::Disable(irq));
    }

    fn set_wake(&self, irq: u32, on: bool) {
        self.ops.lock().push(IrqOp::SetWake { irq, on });
    }

    fn free(&self, irq: u32) {
        self.handlers.lock().retain(|(registered, _)| *registered != irq);
        self.ops.lock().push(IrqOp::Free(irq));
    }
}

// ============================================================================
// INPUT SINK
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOp {
    Capability { event_type: u16, code: u16 },
    Key { code: u16, value: u32 },
    Sync,
}

pub struct MockInputSink {
    ops: Spinlock<Vec<InputOp>>,
}

impl MockInputSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            ops: Spinlock::new(Vec::new()),
        })
    }

    pub fn ops(&self) -> Vec<InputOp> {
        self.ops.lock().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().clear();
    }
}

impl InputSink for MockInputSink {
    fn set_capability(&self, event_type: u16, code: u16) {
        self.ops.lock().push(InputOp::Capability { event_type, code });
    }

    fn report_key(&self, code: u16, value: u32) {
        self.ops.lock().push(InputOp::Key { code, value });
    }

    fn sync(&self) {
        self.ops.lock().push(InputOp::Sync);
    }
}

// ============================================================================
// DISPLAY
// ============================================================================

pub struct MockDisplaySource {
    observers: Spinlock<Vec<Arc<dyn DisplayObserver>>>,
}

impl MockDisplaySource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            observers: Spinlock::new(Vec::new()),
        })
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().len()
    }

    /// Deliver an event to every subscribed observer.
    pub fn emit(&self, event: DisplayEvent) {
        let observers: Vec<_> = self.observers.lock().clone();
        for observer in observers {
            observer.on_display_event(event);
        }
    }
}

impl DisplayEventSource for MockDisplaySource {
    fn subscribe(&self, observer: Arc<dyn DisplayObserver>) {
        self.observers.lock().push(observer);
    }

    fn unsubscribe(&self, observer: &Arc<dyn DisplayObserver>) {
        self.observers
            .lock()
            .retain(|o| !Arc::ptr_eq(o, observer));
    }
}

pub struct MockBridge {
    calls: Spinlock<Vec<u32>>,
}

impl MockBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Spinlock::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<u32> {
        self.calls.lock().clone()
    }
}

impl crate::device::display::DisplayBridge for MockBridge {
    fn interface_enable(&self, timeout_ms: u32) {
        self.calls.lock().push(timeout_ms);
    }
}

// ============================================================================
// WAKE SOURCE
// ============================================================================

pub struct MockWakeSource {
    holds: Spinlock<Vec<u32>>,
}

impl MockWakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            holds: Spinlock::new(Vec::new()),
        })
    }

    pub fn holds(&self) -> Vec<u32> {
        self.holds.lock().clone()
    }
}

impl WakeSource for MockWakeSource {
    fn stay_awake(&self, duration_ms: u32) {
        self.holds.lock().push(duration_ms);
    }
}

// ============================================================================
// NOTIFY TRANSPORT
// ============================================================================

pub struct MockTransport {
    sent: Spinlock<Vec<(EndpointId, Vec<u8>)>>,
    fail_next: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            sent: Spinlock::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(EndpointId, Vec<u8>)> {
        self.sent.lock().clone()
    }

    /// Codes delivered, in order, regardless of endpoint.
    pub fn codes(&self) -> Vec<u8> {
        self.sent
            .lock()
            .iter()
            .flat_map(|(_, payload)| payload.iter().copied())
            .collect()
    }
}

impl NotifyTransport for MockTransport {
    fn unicast(&self, endpoint: EndpointId, payload: &[u8]) -> Result<(), &'static str> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err("transport full");
        }
        self.sent.lock().push((endpoint, payload.to_vec()));
        Ok(())
    }
}

// ============================================================================
// WORK QUEUES
// ============================================================================

/// Runs work immediately on enqueue.
pub struct InlineWorkQueue;

impl WorkQueue for InlineWorkQueue {
    fn enqueue(&self, work: Arc<WorkItem>) {
        work.run();
    }
}

/// Holds work until the test runs it, so pending-state coalescing is
/// observable.
pub struct ManualWorkQueue {
    queued: Spinlock<Vec<Arc<WorkItem>>>,
}

impl ManualWorkQueue {
    pub fn new() -> Self {
        Self {
            queued: Spinlock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.queued.lock().len()
    }

    pub fn run_all(&self) {
        let queued: Vec<_> = self.queued.lock().drain(..).collect();
        for work in queued {
            work.run();
        }
    }
}

impl WorkQueue for ManualWorkQueue {
    fn enqueue(&self, work: Arc<WorkItem>) {
        self.queued.lock().push(work);
    }
}
