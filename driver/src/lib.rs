//! Control-path core for a capacitive fingerprint sensor.
//!
//! This crate carries the event-routing and lifecycle core of the sensor
//! driver: exclusive open/close arbitration, the interrupt-to-notification
//! pipeline, GPIO reset/IRQ line management, synthesized key injection, and
//! display-power gating. It carries no biometric data path.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 Sensor Core                      │
//! │  (lifecycle, control dispatch, event routing)    │
//! └────────────────────┬─────────────────────────────┘
//!                      │
//! ┌────────────────────┴─────────────────────────────┐
//! │               Hardware Traits                    │
//! │  (GpioBank, IrqController, InputSink,            │
//! │   DisplayEventSource, DisplayBridge, WakeSource) │
//! └────────────────────┬─────────────────────────────┘
//!                      │
//!          platform backends (kernel or simulated)
//! ```
//!
//! Event flow: hardware edge -> interrupt top half -> {notification
//! channel, deferred work} -> display bridge. Display blank events ->
//! observer -> notification channel. Userspace control requests ->
//! dispatcher -> {IRQ enablement, reset pulse, key injection, flags}.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod constants;
pub mod device;
pub mod klog;
mod lock;
pub mod notify;
pub mod sensor;
pub mod work;

pub use lock::{RwLock, RwLockReadGuard, RwLockWriteGuard, Spinlock, SpinlockGuard};
