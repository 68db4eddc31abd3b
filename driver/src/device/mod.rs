//! Hardware abstraction layer
//!
//! This module provides trait-based abstractions for the hardware services
//! the sensor core depends on, allowing the same driver code to work with
//! both real platform backends and simulated devices:
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │               Sensor Core                       │
//! │  (lifecycle, control, events)                   │
//! └───────────────────┬─────────────────────────────┘
//!                     │
//! ┌───────────────────┴─────────────────────────────┐
//! │              Hardware Traits                    │
//! │  (GpioBank, IrqController, InputSink,           │
//! │   DisplayEventSource, DisplayBridge,            │
//! │   WakeSource, Delay)                            │
//! └───────────────────┬─────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         │                       │
//!    ┌────┴─────┐           ┌─────┴─────┐
//!    │ platform │           │ simulated │
//!    │ backends │           │  devices  │
//!    └──────────┘           └───────────┘
//! ```

pub mod display;
pub mod gpio;
pub mod input;
pub mod irq;
pub mod power;

#[cfg(test)]
pub mod mock;

pub use display::{BlankState, DisplayBridge, DisplayEvent, DisplayEventSource, DisplayObserver, DisplayPhase};
pub use gpio::{GpioBank, GpioError};
pub use input::{InputSink, KeyCapability};
pub use irq::{IrqController, IrqError, IrqFlags, IrqHandler, IrqStatus};
pub use power::{Delay, WakeSource};
