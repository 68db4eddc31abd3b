//! Driver logging infrastructure
//!
//! Provides a ring buffer for driver messages that is:
//! - Written to by any subsystem through the `log` crate macros
//! - Drained by the embedding kernel's log daemon
//! - Inspectable from tests and diagnostic tools
//!
//! The buffer is the `log::Log` backend for the whole crate; install it
//! once with [`init`]. Oldest entries are dropped when the buffer fills.

use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use log::{LevelFilter, Metadata, Record};

use crate::Spinlock;

/// Maximum messages in the ring buffer
const LOG_BUFFER_SIZE: usize = 128;

/// Maximum length of a single log message
const MAX_MESSAGE_LEN: usize = 256;

/// A single log entry
#[derive(Clone)]
pub struct LogEntry {
    /// Sequence number (total order of accepted messages)
    pub seq: usize,
    /// Log level
    pub level: log::Level,
    /// Subsystem target (e.g., "fp", "fp-irq", "fp-notify")
    pub target: String,
    /// The log message
    pub message: String,
}

impl LogEntry {
    /// Format as a string for display
    pub fn format(&self) -> String {
        format!("[{:>6}] {:<5} {}: {}", self.seq, self.level.as_str(), self.target, self.message)
    }
}

/// Ring buffer for driver log messages
pub struct LogBuffer {
    /// Log entries
    entries: Spinlock<VecDeque<LogEntry>>,
    /// Sequence number for ordering
    sequence: AtomicUsize,
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self {
            entries: Spinlock::new(VecDeque::new()),
            sequence: AtomicUsize::new(0),
        }
    }

    fn push(&self, level: log::Level, target: &str, message: String) {
        // Truncate message if too long
        let message = if message.len() > MAX_MESSAGE_LEN {
            let mut s = String::from(&message[..MAX_MESSAGE_LEN - 3]);
            s.push_str("...");
            s
        } else {
            message
        };

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let entry = LogEntry {
            seq,
            level,
            target: String::from(target),
            message,
        };

        let mut buffer = self.entries.lock();
        if buffer.len() >= LOG_BUFFER_SIZE {
            buffer.pop_front(); // Drop oldest
        }
        buffer.push_back(entry);
    }

    /// Drain all entries for flushing downstream
    pub fn drain(&self) -> Vec<LogEntry> {
        let mut buffer = self.entries.lock();
        buffer.drain(..).collect()
    }

    /// Get recent entries without removing them
    pub fn recent(&self, count: usize) -> Vec<LogEntry> {
        let buffer = self.entries.lock();
        buffer.iter().rev().take(count).cloned().collect()
    }

    /// Get current entry count
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Get sequence number (total messages logged)
    pub fn sequence(&self) -> usize {
        self.sequence.load(Ordering::Relaxed)
    }
}

impl log::Log for LogBuffer {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.push(record.level(), record.target(), format!("{}", record.args()));
    }

    fn flush(&self) {}
}

/// Global driver log buffer
pub static KLOG: LogBuffer = LogBuffer::new();

/// Install [`KLOG`] as the `log` backend.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init() {
    if log::set_logger(&KLOG).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

/// Set the maximum level that will be recorded.
pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}
