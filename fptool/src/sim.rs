//! Simulated hardware backends
//!
//! Host-side implementations of the driver's hardware traits. Each one
//! prints the traffic it sees so a run of the tool reads as an annotated
//! trace of the control path.

use std::sync::Arc;

use fp_driver::device::display::{
    DisplayBridge, DisplayEvent, DisplayEventSource, DisplayObserver,
};
use fp_driver::device::gpio::{GpioBank, GpioError};
use fp_driver::device::irq::{IrqController, IrqError, IrqFlags, IrqHandler, IrqStatus};
use fp_driver::device::input::InputSink;
use fp_driver::device::power::{Delay, WakeSource};
use fp_driver::notify::{EndpointId, NotifyTransport};
use fp_driver::work::{WorkItem, WorkQueue};
use fp_driver::Spinlock;

/// GPIO bank plus delay timing in one simulated board.
pub struct SimBoard {
    claimed: Spinlock<Vec<u32>>,
}

impl SimBoard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            claimed: Spinlock::new(Vec::new()),
        })
    }
}

impl GpioBank for SimBoard {
    fn is_valid(&self, line: u32) -> bool {
        line < 256
    }

    fn request_output(&self, line: u32, initial: bool) -> Result<(), GpioError> {
        let mut claimed = self.claimed.lock();
        if claimed.contains(&line) {
            return Err(GpioError::Busy);
        }
        claimed.push(line);
        println!("  gpio: line {line} claimed as output ({})", level(initial));
        Ok(())
    }

    fn request_input(&self, line: u32) -> Result<(), GpioError> {
        let mut claimed = self.claimed.lock();
        if claimed.contains(&line) {
            return Err(GpioError::Busy);
        }
        claimed.push(line);
        println!("  gpio: line {line} claimed as input");
        Ok(())
    }

    fn set_direction_output(&self, line: u32, value: bool) {
        println!("  gpio: line {line} -> output ({})", level(value));
    }

    fn set_value(&self, line: u32, value: bool) {
        println!("  gpio: line {line} = {}", level(value));
    }

    fn free(&self, line: u32) {
        self.claimed.lock().retain(|&l| l != line);
        println!("  gpio: line {line} freed");
    }
}

impl Delay for SimBoard {
    fn delay_ms(&self, ms: u32) {
        println!("  gpio: hold {ms} ms");
    }
}

fn level(value: bool) -> &'static str {
    if value {
        "high"
    } else {
        "low"
    }
}

/// Interrupt controller that hands edges to the registered handler.
pub struct SimIrqController {
    handlers: Spinlock<Vec<(u32, IrqHandler)>>,
}

impl SimIrqController {
    pub const IRQ_BASE: u32 = 64;

    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            handlers: Spinlock::new(Vec::new()),
        })
    }

    /// Simulate a rising edge on the line's interrupt.
    pub fn fire(&self, irq: u32) -> Option<IrqStatus> {
        let handlers = self.handlers.lock();
        handlers
            .iter()
            .find(|(registered, _)| *registered == irq)
            .map(|(_, handler)| handler())
    }
}

impl IrqController for SimIrqController {
    fn to_irq(&self, line: u32) -> Result<u32, IrqError> {
        Ok(line + Self::IRQ_BASE)
    }

    fn request(
        &self,
        irq: u32,
        flags: IrqFlags,
        name: &'static str,
        handler: IrqHandler,
    ) -> Result<(), IrqError> {
        println!("  irq: {irq} registered ({name}, flags {:?})", flags);
        self.handlers.lock().push((irq, handler));
        Ok(())
    }

    fn enable(&self, irq: u32) {
        println!("  irq: {irq} unmasked");
    }

    fn disable(&self, irq: u32) {
        println!("  irq: {irq} masked");
    }

    fn set_wake(&self, irq: u32, on: bool) {
        println!("  irq: {irq} wake {}", if on { "armed" } else { "disarmed" });
    }

    fn free(&self, irq: u32) {
        self.handlers.lock().retain(|(registered, _)| *registered != irq);
        println!("  irq: {irq} freed");
    }
}

/// Prints synthesized input reports.
pub struct SimInputSink;

impl SimInputSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl InputSink for SimInputSink {
    fn set_capability(&self, event_type: u16, code: u16) {
        println!("  input: capability type={event_type} code={code}");
    }

    fn report_key(&self, code: u16, value: u32) {
        println!("  input: key code={code} value={value}");
    }

    fn sync(&self) {
        println!("  input: sync");
    }
}

/// Display event fan-out plus the bridge the deferred work pokes.
pub struct SimDisplay {
    observers: Spinlock<Vec<Arc<dyn DisplayObserver>>>,
}

impl SimDisplay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            observers: Spinlock::new(Vec::new()),
        })
    }

    pub fn emit(&self, event: DisplayEvent) {
        let observers: Vec<_> = self.observers.lock().clone();
        for observer in observers {
            observer.on_display_event(event);
        }
    }
}

impl DisplayEventSource for SimDisplay {
    fn subscribe(&self, observer: Arc<dyn DisplayObserver>) {
        self.observers.lock().push(observer);
    }

    fn unsubscribe(&self, observer: &Arc<dyn DisplayObserver>) {
        self.observers.lock().retain(|o| !Arc::ptr_eq(o, observer));
    }
}

pub struct SimBridge;

impl SimBridge {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl DisplayBridge for SimBridge {
    fn interface_enable(&self, timeout_ms: u32) {
        println!("  bridge: display up for {timeout_ms} ms");
    }
}

pub struct SimWakeSource;

impl SimWakeSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl WakeSource for SimWakeSource {
    fn stay_awake(&self, duration_ms: u32) {
        println!("  wake: hold {duration_ms} ms");
    }
}

/// Listener transport that prints delivered status codes.
pub struct SimTransport;

impl SimTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self)
    }
}

impl NotifyTransport for SimTransport {
    fn unicast(&self, endpoint: EndpointId, payload: &[u8]) -> Result<(), &'static str> {
        println!("  notify: endpoint {endpoint} <- {:?}", payload);
        Ok(())
    }
}

/// Collects deferred work so the trace shows the interrupt path returning
/// before the slow work runs.
pub struct SimWorkQueue {
    queued: Spinlock<Vec<Arc<WorkItem>>>,
}

impl SimWorkQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            queued: Spinlock::new(Vec::new()),
        })
    }

    pub fn run_pending(&self) {
        let queued: Vec<_> = self.queued.lock().drain(..).collect();
        for work in queued {
            println!("  work: running deferred task");
            work.run();
        }
    }
}

impl WorkQueue for SimWorkQueue {
    fn enqueue(&self, work: Arc<WorkItem>) {
        println!("  work: task queued");
        self.queued.lock().push(work);
    }
}
