//! Open/close lifecycle
//!
//! Reference-counted resource ownership: the first open claims both lines
//! and registers the interrupt; the last close tears everything down and
//! clears readiness. A failed first open unwinds whatever it managed to
//! claim and leaves the count untouched.
//!
//! Interrupts always come up masked. Every successful open forces
//! `irq_enabled` off; only the EnableIrq control request arms delivery.

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::sync::atomic::Ordering;

use crate::constants::{IRQ_LINE_NAME, IRQ_NAME, RESET_LINE_NAME};
use crate::device::irq::{IrqFlags, IrqHandler, IrqStatus};

use super::{DriverError, FpDevice, LifecycleState};

impl FpDevice {
    /// Open a handle to the device.
    ///
    /// On the closed-to-open transition this resolves configuration,
    /// claims both lines, and registers the edge handler. Errors roll the
    /// user count back; the handle is not usable.
    pub fn open(self: &Arc<Self>) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.users += 1;

        if state.users == 1 {
            if let Err(e) = self.acquire_resources(&mut state) {
                state.users -= 1;
                return Err(e);
            }
            if let Err(e) = self.setup_interrupt(&mut state) {
                self.release_resources(&mut state);
                state.users -= 1;
                return Err(e);
            }
        }

        // Delivery starts masked no matter what state the IRQ was left in
        if state.irq_enabled {
            if let Some(irq) = state.irq {
                self.deps.irq.disable(irq);
            }
            state.irq_enabled = false;
        }

        log::debug!(target: "fp", "device {} open, users={}", self.id(), state.users);
        Ok(())
    }

    /// Close a handle.
    ///
    /// The open-to-closed transition frees the interrupt and both lines
    /// and clears readiness. Closing a device with no open handles is a
    /// contract violation.
    pub fn close(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        if state.users == 0 {
            log::error!(target: "fp", "device {} close without open", self.id());
            return Err(DriverError::InvalidState);
        }

        state.users -= 1;
        if state.users == 0 {
            self.teardown_interrupt(&mut state);
            self.release_resources(&mut state);
            self.device_available.store(false, Ordering::Release);
        }

        log::debug!(target: "fp", "device {} closed, users={}", self.id(), state.users);
        Ok(())
    }

    /// Resolve both line names and claim them: reset as an output driven
    /// low, interrupt as an input. A partial claim is released before the
    /// error propagates.
    fn acquire_resources(&self, state: &mut LifecycleState) -> Result<(), DriverError> {
        let reset_line = self
            .deps
            .config
            .line_by_name(RESET_LINE_NAME)
            .ok_or_else(|| {
                log::error!(target: "fp", "failed to resolve {}", RESET_LINE_NAME);
                DriverError::Config
            })?;
        let irq_line = self
            .deps
            .config
            .line_by_name(IRQ_LINE_NAME)
            .ok_or_else(|| {
                log::error!(target: "fp", "failed to resolve {}", IRQ_LINE_NAME);
                DriverError::Config
            })?;

        if !self.deps.gpio.is_valid(reset_line) || !self.deps.gpio.is_valid(irq_line) {
            log::error!(target: "fp", "configured lines out of range: {}, {}", reset_line, irq_line);
            return Err(DriverError::Config);
        }

        if let Err(e) = self.deps.gpio.request_output(reset_line, false) {
            log::error!(target: "fp", "failed to claim reset line {}: {}", reset_line, e.as_str());
            return Err(DriverError::Config);
        }
        if let Err(e) = self.deps.gpio.request_input(irq_line) {
            log::error!(target: "fp", "failed to claim irq line {}: {}", irq_line, e.as_str());
            self.deps.gpio.free(reset_line);
            return Err(DriverError::Config);
        }

        state.reset_line = Some(reset_line);
        state.irq_line = Some(irq_line);
        Ok(())
    }

    /// Release both lines. Idempotent.
    fn release_resources(&self, state: &mut LifecycleState) {
        if let Some(line) = state.irq_line.take() {
            self.deps.gpio.free(line);
        }
        if let Some(line) = state.reset_line.take() {
            self.deps.gpio.free(line);
        }
    }

    /// Resolve the interrupt number, register the rising-edge one-shot
    /// handler, and arm it as a wake source. Registration arms delivery,
    /// so `irq_enabled` comes up set; open masks it again right after.
    fn setup_interrupt(self: &Arc<Self>, state: &mut LifecycleState) -> Result<(), DriverError> {
        let Some(irq_line) = state.irq_line else {
            return Err(DriverError::InvalidState);
        };

        let irq = self.deps.irq.to_irq(irq_line).map_err(|e| {
            log::error!(target: "fp-irq", "no interrupt for line {}: {}", irq_line, e.as_str());
            DriverError::IrqRegistration
        })?;

        let device = Arc::downgrade(self);
        let handler: IrqHandler = Box::new(move || match device.upgrade() {
            Some(device) => device.handle_interrupt(),
            None => IrqStatus::None,
        });

        self.deps
            .irq
            .request(irq, IrqFlags::TRIGGER_RISING | IrqFlags::ONE_SHOT, IRQ_NAME, handler)
            .map_err(|e| {
                log::error!(target: "fp-irq", "failed to request irq {}: {}", irq, e.as_str());
                DriverError::IrqRegistration
            })?;
        self.deps.irq.set_wake(irq, true);

        state.irq = Some(irq);
        state.irq_enabled = true;
        Ok(())
    }

    /// Mask, disarm, and free the interrupt. Safe only after a successful
    /// setup; idempotent through the `Option` take.
    fn teardown_interrupt(&self, state: &mut LifecycleState) {
        if let Some(irq) = state.irq.take() {
            state.irq_enabled = false;
            self.deps.irq.disable(irq);
            self.deps.irq.set_wake(irq, false);
            self.deps.irq.free(irq);
        }
    }
}
