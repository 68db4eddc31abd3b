//! Coalesced deferred work
//!
//! Interrupt handlers hand slow follow-up actions to a work item that runs
//! later, outside interrupt context. Each item is single-slot: scheduling
//! while already pending is a no-op, so a burst of edges produces one run.
//! The execution context is supplied by the platform through [`WorkQueue`].

use alloc::boxed::Box;
use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// Execution context for deferred work. Implementations run enqueued items
/// exactly once each, outside interrupt context.
pub trait WorkQueue: Send + Sync {
    fn enqueue(&self, work: Arc<WorkItem>);
}

/// A single-slot deferred work item.
pub struct WorkItem {
    pending: AtomicBool,
    func: Box<dyn Fn() + Send + Sync>,
}

impl WorkItem {
    pub fn new<F: Fn() + Send + Sync + 'static>(func: F) -> Arc<Self> {
        Arc::new(Self {
            pending: AtomicBool::new(false),
            func: Box::new(func),
        })
    }

    /// Schedule this item on `queue`.
    ///
    /// Coalesced: returns `false` without enqueueing when the item is
    /// already pending. Callable from interrupt context.
    pub fn schedule(self: &Arc<Self>, queue: &dyn WorkQueue) -> bool {
        if self.pending.swap(true, Ordering::AcqRel) {
            return false;
        }
        queue.enqueue(Arc::clone(self));
        true
    }

    /// Execute the item. Clears the pending flag before running so a new
    /// edge arriving during the run schedules a fresh pass.
    pub fn run(&self) {
        self.pending.store(false, Ordering::Release);
        (self.func)();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}
