// Wakeup hold after a finger edge, and the display-bridge budget derived
// from it.
pub const WAKELOCK_HOLD_MS: u32 = 2000;
pub const UNLOCK_TIMEOUT_MS: u32 = WAKELOCK_HOLD_MS - 500;

// Reset line hold time per pulse phase
pub const RESET_PULSE_MS: u32 = 3;

// Notification status codes delivered to the registered listener
pub const NOTIFY_IRQ: u8 = 1;
pub const NOTIFY_SCREEN_OFF: u8 = 2;
pub const NOTIFY_SCREEN_ON: u8 = 3;

// Transport route identifier returned by the Init control request
pub const NOTIFY_ROUTE: u8 = 25;

// Named lines resolved through the configuration source at open time
pub const RESET_LINE_NAME: &str = "fp-gpio-reset";
pub const IRQ_LINE_NAME: &str = "fp-gpio-irq";

// Identity strings
pub const DEVICE_NAME: &str = "fp-sensor";
pub const INPUT_NAME: &str = "uinput-fp";
pub const IRQ_NAME: &str = "fp";
