//! Event routing: interrupt top half and display power observer
//!
//! The top half runs in interrupt context: wake hold, notification send,
//! and a coalesced work enqueue. Nothing here blocks and nothing takes a
//! lock. The slow follow-up (lighting the panel through the display
//! bridge) happens in the deferred work item built at probe time.

use core::sync::atomic::Ordering;

use crate::constants::{NOTIFY_IRQ, NOTIFY_SCREEN_OFF, NOTIFY_SCREEN_ON, WAKELOCK_HOLD_MS};
use crate::device::display::{BlankState, DisplayEvent, DisplayObserver, DisplayPhase};
use crate::device::irq::IrqStatus;

use super::FpDevice;

impl FpDevice {
    /// Interrupt top half, invoked on each rising edge of the sensor line.
    ///
    /// Holds the system awake long enough for userspace to react, tells
    /// the listener an edge happened, and - once userspace has signaled
    /// readiness - clears the finger-wait flag and schedules the display
    /// wakeup. The enqueue is coalesced; a burst of edges before the task
    /// runs schedules it once.
    pub fn handle_interrupt(&self) -> IrqStatus {
        self.deps.wake.stay_awake(WAKELOCK_HOLD_MS);
        self.notify.send(NOTIFY_IRQ);

        if self.device_available.load(Ordering::Acquire) {
            self.await_finger_down.store(false, Ordering::Release);
            self.work.schedule(self.deps.work_queue.as_ref());
        }

        IrqStatus::Handled
    }
}

impl DisplayObserver for FpDevice {
    /// Track panel power transitions.
    ///
    /// Only the post-transition phase with a payload counts; the early
    /// phase and payload-less notifications are ignored. Transitions are
    /// also ignored until userspace signals readiness.
    fn on_display_event(&self, event: DisplayEvent) {
        if event.phase != DisplayPhase::Blank {
            return;
        }
        let Some(state) = event.state else {
            return;
        };

        match state {
            BlankState::Unblank => {
                if self.device_available.load(Ordering::Acquire) {
                    self.panel_off.store(false, Ordering::Release);
                    self.notify.send(NOTIFY_SCREEN_ON);
                }
            }
            BlankState::PowerDown => {
                if self.device_available.load(Ordering::Acquire) {
                    self.panel_off.store(true, Ordering::Release);
                    self.await_finger_down.store(true, Ordering::Release);
                    self.notify.send(NOTIFY_SCREEN_OFF);
                }
            }
            BlankState::Other(_) => {}
        }
    }
}
