//! Key injection
//!
//! Maps abstract sensor keys onto input key codes and synthesizes the
//! reports. Power and Camera are pulse triggers: a press always delivers
//! an immediate press+release pair and an explicit key-up from the caller
//! delivers nothing. Home is a real key with distinct press and release.
//! That asymmetry is intentional.

use crate::device::input::{InputSink, KEY_CAMERA, KEY_KPENTER};

use super::DriverError;

/// Abstract key identifier carried in an InputKey control payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpKey {
    None,
    Home,
    Power,
    Camera,
    /// Unmapped identifiers pass through as raw codes
    Other(u32),
}

impl FpKey {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => FpKey::None,
            1 => FpKey::Home,
            2 => FpKey::Power,
            3 => FpKey::Camera,
            other => FpKey::Other(other),
        }
    }

    pub fn as_raw(&self) -> u32 {
        match self {
            FpKey::None => 0,
            FpKey::Home => 1,
            FpKey::Power => 2,
            FpKey::Camera => 3,
            FpKey::Other(raw) => *raw,
        }
    }

    /// The input code this key reports as.
    pub fn code(&self) -> u16 {
        match self {
            FpKey::Home | FpKey::Power => KEY_KPENTER,
            FpKey::Camera => KEY_CAMERA,
            FpKey::None => 0,
            FpKey::Other(raw) => *raw as u16,
        }
    }
}

/// A key event as carried across the control boundary: key identifier
/// plus value (down = 1, up = 0). Transient; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: FpKey,
    pub value: u32,
}

/// Wire size of a key event payload: two little-endian u32 words.
pub const KEY_EVENT_SIZE: usize = 8;

impl KeyEvent {
    pub fn new(key: FpKey, value: u32) -> Self {
        Self { key, value }
    }

    /// Decode the fixed control payload shape.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DriverError> {
        if bytes.len() != KEY_EVENT_SIZE {
            return Err(DriverError::CopyFault);
        }
        let raw = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let value = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        Ok(Self {
            key: FpKey::from_raw(raw),
            value,
        })
    }

    pub fn to_bytes(&self) -> [u8; KEY_EVENT_SIZE] {
        let mut bytes = [0u8; KEY_EVENT_SIZE];
        bytes[..4].copy_from_slice(&self.key.as_raw().to_le_bytes());
        bytes[4..].copy_from_slice(&self.value.to_le_bytes());
        bytes
    }
}

/// Synthesize the input reports for one key event.
pub(crate) fn inject(input: &dyn InputSink, event: &KeyEvent) {
    let code = event.key.code();
    log::debug!(
        target: "fp-key",
        "key event: key={:?} code={} value={}",
        event.key,
        code,
        event.value
    );

    if matches!(event.key, FpKey::Power | FpKey::Camera) && event.value == 1 {
        input.report_key(code, 1);
        input.sync();
        input.report_key(code, 0);
        input.sync();
    }

    if event.key == FpKey::Home {
        input.report_key(code, event.value);
        input.sync();
    }
}
