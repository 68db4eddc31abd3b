//! Control request dispatcher
//!
//! The synchronous request surface userspace drives through the device
//! handle. Payloads cross the boundary as fixed-size byte buffers; a
//! malformed buffer fails that one call with `CopyFault` and changes
//! nothing else.

use crate::constants::{NOTIFY_ROUTE, RESET_PULSE_MS};

use super::keys::{self, KeyEvent};
use super::{DriverError, FpDevice};
use core::sync::atomic::Ordering;

/// One control request. Buffer-carrying variants mirror the fixed wire
/// shapes of the boundary.
pub enum ControlRequest<'a> {
    /// Write the transport route identifier into the caller's buffer
    Init { route_out: &'a mut [u8] },
    /// Mask interrupt delivery
    DisableIrq,
    /// Unmask interrupt delivery
    EnableIrq,
    /// Pulse the reset line
    Reset,
    /// Decode a key event payload and inject it
    InputKey { payload: &'a [u8] },
    /// Userspace signals its stack is ready
    HalReady,
    /// Unrecognized opcodes are accepted and ignored
    Unknown(u32),
}

impl ControlRequest<'_> {
    /// Wire opcode for this request.
    pub fn opcode(&self) -> u32 {
        match self {
            ControlRequest::Init { .. } => 0,
            ControlRequest::Reset => 2,
            ControlRequest::EnableIrq => 3,
            ControlRequest::DisableIrq => 4,
            ControlRequest::InputKey { .. } => 9,
            ControlRequest::HalReady => 15,
            ControlRequest::Unknown(code) => *code,
        }
    }
}

impl FpDevice {
    /// Dispatch one control request.
    ///
    /// Failures are local to the call: no request leaves the device in a
    /// partially mutated state.
    pub fn control(&self, request: ControlRequest<'_>) -> Result<(), DriverError> {
        match request {
            ControlRequest::Init { route_out } => {
                let Some(slot) = route_out.first_mut() else {
                    log::error!(target: "fp", "init response buffer too small");
                    return Err(DriverError::CopyFault);
                };
                *slot = NOTIFY_ROUTE;
                Ok(())
            }

            ControlRequest::DisableIrq => {
                let mut state = self.state.lock();
                if state.irq_enabled {
                    if let Some(irq) = state.irq {
                        self.deps.irq.disable(irq);
                    }
                    state.irq_enabled = false;
                }
                Ok(())
            }

            ControlRequest::EnableIrq => {
                let mut state = self.state.lock();
                if !state.irq_enabled {
                    if let Some(irq) = state.irq {
                        self.deps.irq.enable(irq);
                        state.irq_enabled = true;
                    }
                }
                Ok(())
            }

            ControlRequest::Reset => self.reset_pulse(),

            ControlRequest::InputKey { payload } => {
                let event = KeyEvent::from_bytes(payload).map_err(|e| {
                    log::error!(target: "fp-key", "bad key event payload ({} bytes)", payload.len());
                    e
                })?;
                keys::inject(self.deps.input.as_ref(), &event);
                Ok(())
            }

            ControlRequest::HalReady => {
                self.device_available.store(true, Ordering::Release);
                log::info!(target: "fp", "device {} available", self.id());
                Ok(())
            }

            ControlRequest::Unknown(code) => {
                log::debug!(target: "fp", "ignoring unknown control opcode {}", code);
                Ok(())
            }
        }
    }

    /// Drive the reset sequence: output-high, low, hold, high, hold.
    ///
    /// Requires claimed resources; pulsing an unclaimed line is a
    /// lifecycle violation.
    fn reset_pulse(&self) -> Result<(), DriverError> {
        let reset_line = {
            let state = self.state.lock();
            state.reset_line.ok_or(DriverError::InvalidState)?
        };

        self.deps.gpio.set_direction_output(reset_line, true);
        self.deps.gpio.set_value(reset_line, false);
        self.deps.delay.delay_ms(RESET_PULSE_MS);
        self.deps.gpio.set_value(reset_line, true);
        self.deps.delay.delay_ms(RESET_PULSE_MS);
        Ok(())
    }
}
