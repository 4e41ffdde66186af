//! Bounded frame queue shared between producers and the recognition loop.
//!
//! Producers (sensor callbacks, any number of threads) call
//! [`FrameBuffer::enqueue`]; the single recognition thread calls
//! [`FrameBuffer::drain_all`]. Both take the same lock, held only for the
//! queue manipulation itself. Filtering happens before `enqueue` and evicted
//! frames are dropped after the lock is released.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::core::types::PointCloud;

/// Thread-safe bounded FIFO of point-cloud frames.
///
/// Invariant: after every `enqueue` the depth is at most `capacity`; on
/// overflow the oldest frames are evicted.
#[derive(Debug)]
pub struct FrameBuffer {
    frames: Mutex<VecDeque<PointCloud>>,
    available: Condvar,
    capacity: AtomicUsize,
    evicted: AtomicU64,
}

impl FrameBuffer {
    /// Create a buffer holding at most `capacity` frames (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: Mutex::new(VecDeque::with_capacity(capacity + 1)),
            available: Condvar::new(),
            capacity: AtomicUsize::new(capacity),
            evicted: AtomicU64::new(0),
        }
    }

    /// Maximum depth.
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Acquire)
    }

    /// Change the maximum depth (minimum 1).
    ///
    /// Takes effect at the next `enqueue`; a shrink below the current depth
    /// evicts the surplus oldest frames there.
    pub fn set_capacity(&self, capacity: usize) {
        self.capacity.store(capacity.max(1), Ordering::Release);
    }

    /// Append a frame, evicting the oldest frame(s) if depth would exceed
    /// capacity. Returns the number of frames evicted.
    pub fn enqueue(&self, frame: PointCloud) -> usize {
        let capacity = self.capacity();
        let evicted: Vec<PointCloud> = {
            let mut frames = self.frames.lock();
            frames.push_back(frame);
            let surplus = frames.len().saturating_sub(capacity);
            frames.drain(..surplus).collect()
        };
        self.available.notify_one();

        if !evicted.is_empty() {
            self.evicted
                .fetch_add(evicted.len() as u64, Ordering::Relaxed);
        }
        evicted.len()
    }

    /// Remove and return every queued frame in arrival order.
    ///
    /// An empty buffer yields an empty vector.
    pub fn drain_all(&self) -> Vec<PointCloud> {
        let mut frames = self.frames.lock();
        frames.drain(..).collect()
    }

    /// Current depth.
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Check if buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Total number of frames evicted since creation.
    pub fn evicted_count(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    /// Block until at least one frame is queued, `timeout` elapses, or
    /// `running` is cleared and [`FrameBuffer::notify_all`] is called.
    ///
    /// `running` is checked under the queue lock, so a shutdown signalled
    /// through `notify_all` is never missed. Returns true if frames are
    /// available on return.
    pub fn wait_for_frames(&self, timeout: Duration, running: &AtomicBool) -> bool {
        let mut frames = self.frames.lock();
        if frames.is_empty() && running.load(Ordering::Acquire) {
            let _ = self.available.wait_for(&mut frames, timeout);
        }
        !frames.is_empty()
    }

    /// Wake every waiter (used on shutdown).
    pub fn notify_all(&self) {
        let _frames = self.frames.lock();
        self.available.notify_all();
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(1)
    }
}
