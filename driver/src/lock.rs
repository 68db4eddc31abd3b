//! Spinlock and synchronization primitives.
//!
//! This module provides the locking mechanisms used by the driver core:
//! - `Spinlock` - Basic mutual exclusion with swap-based acquisition
//! - `RwLock` - Reader-writer lock (multiple readers OR one writer)
//!
//! ## Lock Ordering Protocol
//!
//! To prevent deadlocks, always acquire locks in this order (lowest to
//! highest):
//! 1. Device registry
//! 2. Device lifecycle state
//! 3. Log buffer
//!
//! Interrupt-context code must not take any of these locks; the flags it
//! reads are atomics (see the sensor module).

use core::cell::UnsafeCell;
use core::hint::spin_loop;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU32, Ordering};

// Lock states as u32 for 32-bit atomic operations, which are available on
// every target this driver is built for.
const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;

/// A mutual exclusion primitive based on spinning.
///
/// Uses simple atomic swap for acquisition.
///
/// # Example
///
/// ```
/// # use fp_driver::Spinlock;
/// static COUNTER: Spinlock<u64> = Spinlock::new(0);
///
/// fn increment() {
///     let mut guard = COUNTER.lock();
///     *guard += 1;
/// }
/// # increment();
/// # assert_eq!(*COUNTER.lock(), 1);
/// ```
pub struct Spinlock<T> {
    locked: AtomicU32,
    data: UnsafeCell<T>,
}

// Safety: Spinlock provides synchronized access to T
unsafe impl<T: Send> Sync for Spinlock<T> {}
unsafe impl<T: Send> Send for Spinlock<T> {}

impl<T> Spinlock<T> {
    /// Create a new spinlock wrapping the given value.
    pub const fn new(data: T) -> Self {
        Self {
            locked: AtomicU32::new(UNLOCKED),
            data: UnsafeCell::new(data),
        }
    }

    /// Acquire the lock, blocking until available.
    ///
    /// Returns a guard that releases the lock when dropped.
    #[inline]
    pub fn lock(&self) -> SpinlockGuard<T> {
        loop {
            // swap(LOCKED) atomically sets the lock and returns the old
            // value; if the old value was UNLOCKED, we acquired the lock.
            if self.locked.swap(LOCKED, Ordering::Acquire) == UNLOCKED {
                return SpinlockGuard {
                    lock: self,
                    _not_send: core::marker::PhantomData,
                };
            }

            while self.locked.load(Ordering::Relaxed) == LOCKED {
                spin_loop();
            }
        }
    }

    /// Try to acquire the lock without blocking.
    ///
    /// Returns `Some(guard)` if successful, `None` if lock is held.
    #[inline]
    pub fn try_lock(&self) -> Option<SpinlockGuard<T>> {
        if self.locked.swap(LOCKED, Ordering::Acquire) == UNLOCKED {
            Some(SpinlockGuard {
                lock: self,
                _not_send: core::marker::PhantomData,
            })
        } else {
            None
        }
    }

    /// Check if the lock is currently held (for debugging).
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed) != UNLOCKED
    }
}

/// RAII guard that releases the spinlock when dropped.
pub struct SpinlockGuard<'a, T> {
    lock: &'a Spinlock<T>,
    // Prevent Send - the guard must be released on the acquiring context
    _not_send: core::marker::PhantomData<*const ()>,
}

impl<T> Deref for SpinlockGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: We hold the lock, so exclusive access is guaranteed
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for SpinlockGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // Safety: We hold the lock exclusively
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for SpinlockGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        self.lock.locked.store(UNLOCKED, Ordering::Release);
    }
}

// ============================================================================
// READER-WRITER LOCK
// ============================================================================

/// Bits layout for RwLock state:
/// - Bits 0-30: Reader count
/// - Bit 31: Writer flag (1 = writer waiting or holding)
const WRITER_BIT: u32 = 1 << 31;
const READER_MASK: u32 = !WRITER_BIT;
const MAX_READERS: u32 = READER_MASK;

/// A reader-writer lock allowing multiple readers OR a single writer.
///
/// Ideal for resources that are read frequently but written rarely, like
/// the device registry.
pub struct RwLock<T> {
    /// State: bits 0-30 = reader count, bit 31 = writer flag
    state: AtomicU32,
    /// Protected data
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Sync for RwLock<T> {}
unsafe impl<T: Send + Sync> Send for RwLock<T> {}

impl<T> RwLock<T> {
    /// Create a new reader-writer lock.
    pub const fn new(data: T) -> Self {
        Self {
            state: AtomicU32::new(0),
            data: UnsafeCell::new(data),
        }
    }

    /// Acquire a read lock.
    ///
    /// Multiple readers can hold the lock simultaneously.
    /// Blocks if a writer is holding or waiting for the lock.
    pub fn read(&self) -> RwLockReadGuard<T> {
        loop {
            let state = self.state.load(Ordering::Relaxed);

            // If no writer is holding/waiting, try to add ourselves as a reader
            if state & WRITER_BIT == 0 {
                if (state & READER_MASK) >= MAX_READERS {
                    panic!("RwLock: too many readers");
                }

                if self
                    .state
                    .compare_exchange_weak(state, state + 1, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
                {
                    return RwLockReadGuard { lock: self };
                }
            }

            spin_loop();
        }
    }

    /// Try to acquire a read lock without blocking.
    ///
    /// Returns `Some(guard)` if successful, `None` if a writer is active.
    pub fn try_read(&self) -> Option<RwLockReadGuard<T>> {
        let state = self.state.load(Ordering::Relaxed);

        if state & WRITER_BIT == 0
            && (state & READER_MASK) < MAX_READERS
            && self
                .state
                .compare_exchange_weak(state, state + 1, Ordering::Acquire, Ordering::Relaxed)
                .is_ok()
        {
            return Some(RwLockReadGuard { lock: self });
        }

        None
    }

    /// Acquire a write lock.
    ///
    /// Blocks until all readers release and no other writer is active.
    pub fn write(&self) -> RwLockWriteGuard<T> {
        // First, set the writer bit to prevent new readers
        loop {
            let state = self.state.load(Ordering::Relaxed);

            if state & WRITER_BIT == 0
                && self
                    .state
                    .compare_exchange_weak(
                        state,
                        state | WRITER_BIT,
                        Ordering::Acquire,
                        Ordering::Relaxed,
                    )
                    .is_ok()
            {
                break;
            }

            spin_loop();
        }

        // Now wait for all readers to finish
        while self.state.load(Ordering::Acquire) != WRITER_BIT {
            spin_loop();
        }

        RwLockWriteGuard { lock: self }
    }

    /// Try to acquire a write lock without blocking.
    ///
    /// Returns `Some(guard)` if we got exclusive access, `None` if busy.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<T>> {
        if self
            .state
            .compare_exchange(0, WRITER_BIT, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return Some(RwLockWriteGuard { lock: self });
        }
        None
    }

    /// Check if the lock has any readers.
    pub fn has_readers(&self) -> bool {
        (self.state.load(Ordering::Relaxed) & READER_MASK) > 0
    }

    /// Check if a writer is holding or waiting.
    pub fn has_writer(&self) -> bool {
        (self.state.load(Ordering::Relaxed) & WRITER_BIT) != 0
    }
}

/// RAII guard for read access
pub struct RwLockReadGuard<'a, T> {
    lock: &'a RwLock<T>,
}

impl<T> Deref for RwLockReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for RwLockReadGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // Decrement reader count
        self.lock.state.fetch_sub(1, Ordering::Release);
    }
}

/// RAII guard for write access
pub struct RwLockWriteGuard<'a, T> {
    lock: &'a RwLock<T>,
}

impl<T> Deref for RwLockWriteGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for RwLockWriteGuard<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for RwLockWriteGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // Clear writer bit (releases the lock)
        self.lock.state.fetch_and(!WRITER_BIT, Ordering::Release);
    }
}

// ============================================================================
// TESTS
// ============================================================================
