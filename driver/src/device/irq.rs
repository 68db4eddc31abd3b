//! Interrupt controller abstraction
//!
//! The sensor registers one rising-edge, one-shot handler for its
//! interrupt line and arms it as a system wake source. The handler runs in
//! interrupt context: it must not block and must return promptly.

use alloc::boxed::Box;

use bitflags::bitflags;

bitflags! {
    /// Trigger and threading flags passed at registration time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IrqFlags: u32 {
        /// Fire on the rising edge of the line
        const TRIGGER_RISING = 1 << 0;
        /// Keep the line masked until the handler completes
        const ONE_SHOT = 1 << 1;
    }
}

/// What the handler did with the interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqStatus {
    /// The interrupt was for this device and has been handled
    Handled,
    /// Not ours
    None,
}

/// Handler invoked in interrupt context on each edge.
pub type IrqHandler = Box<dyn Fn() -> IrqStatus + Send + Sync>;

/// Interrupt controller error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqError {
    /// The line has no interrupt mapping
    InvalidLine,
    /// The interrupt could not be claimed
    RequestFailed,
}

impl IrqError {
    pub fn as_str(&self) -> &'static str {
        match self {
            IrqError::InvalidLine => "no interrupt for line",
            IrqError::RequestFailed => "interrupt request failed",
        }
    }
}

/// Interrupt controller trait
pub trait IrqController: Send + Sync {
    /// Resolve the interrupt number for a GPIO line.
    fn to_irq(&self, line: u32) -> Result<u32, IrqError>;

    /// Register a handler for an interrupt. Registration arms delivery.
    fn request(
        &self,
        irq: u32,
        flags: IrqFlags,
        name: &'static str,
        handler: IrqHandler,
    ) -> Result<(), IrqError>;

    /// Unmask delivery for a registered interrupt.
    fn enable(&self, irq: u32);

    /// Mask delivery for a registered interrupt.
    fn disable(&self, irq: u32);

    /// Arm or disarm the interrupt as a system wake source.
    fn set_wake(&self, irq: u32, on: bool);

    /// Unregister the handler and release the interrupt.
    fn free(&self, irq: u32);
}
