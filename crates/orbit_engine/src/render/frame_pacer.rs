//! Frame pacer - the counting gate bounding frames in flight
//!
//! Before the CPU begins preparing a new frame it must [`acquire`] the
//! gate, which blocks while `N` frames are already submitted but not yet
//! completed. The GPU-driven completion callback calls [`release`] from a
//! thread that is not the submitting one; this pairing is the only
//! cross-thread synchronization the pipeline needs, and it establishes the
//! happens-before edge that lets the CPU safely overwrite a frame slot
//! whose previous generation has completed.
//!
//! [`acquire`]: FramePacer::acquire
//! [`release`]: FramePacer::release

use std::sync::{Condvar, Mutex};

/// Counting semaphore with a fixed capacity.
///
/// Capacity starts at `N`; `acquire` decrements and blocks at zero;
/// `release` increments. Completions are 1:1 with prior acquisitions, so
/// capacity never legitimately exceeds `N`.
pub struct FramePacer {
    capacity: usize,
    available: Mutex<usize>,
    wakeup: Condvar,
}

impl FramePacer {
    /// Create a gate admitting at most `capacity` frames in flight
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            available: Mutex::new(capacity),
            wakeup: Condvar::new(),
        }
    }

    /// Block until a frame slot generation may be prepared, then claim it
    pub fn acquire(&self) {
        let mut available = self.available.lock().expect("lock poisoned");
        while *available == 0 {
            available = self.wakeup.wait(available).expect("lock poisoned");
        }
        *available -= 1;
    }

    /// Claim capacity without blocking; returns `false` if none is free
    pub fn try_acquire(&self) -> bool {
        let mut available = self.available.lock().expect("lock poisoned");
        if *available == 0 {
            return false;
        }
        *available -= 1;
        true
    }

    /// Return capacity after a frame's GPU work completes.
    ///
    /// Safe to call from the completion-callback thread concurrently with
    /// another thread blocked in [`Self::acquire`].
    pub fn release(&self) {
        let mut available = self.available.lock().expect("lock poisoned");
        debug_assert!(
            *available < self.capacity,
            "release without a matching acquire"
        );
        *available = (*available + 1).min(self.capacity);
        drop(available);
        self.wakeup.notify_one();
    }

    /// Capacity currently available
    #[must_use]
    pub fn available(&self) -> usize {
        *self.available.lock().expect("lock poisoned")
    }

    /// Maximum frames in flight this gate admits
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
