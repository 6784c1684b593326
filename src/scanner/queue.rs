//! Shared work queue for pending directories
//!
//! The queue is a growable circular buffer guarded by a single mutex, with a
//! condvar for consumers blocked on an empty queue. A full queue never blocks
//! the producer: capacity doubles in place, preserving FIFO order. Capacity
//! never shrinks.
//!
//! The queue also owns the in-flight enumeration count used for termination
//! detection. A successful `pop` marks an enumeration as in progress inside
//! the same critical section that removes the item, and `finish` decrements
//! and evaluates the completion predicate under that same lock. An item is
//! therefore always visible to the predicate either in the buffer or in the
//! in-flight count, so the scan can never be declared complete while work
//! remains anywhere.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};

struct QueueState {
    /// Ring storage; `None` slots are free
    slots: Box<[Option<PathBuf>]>,

    /// Index of the oldest item
    head: usize,

    /// Number of queued items
    len: usize,

    /// Directory enumerations currently in progress
    in_flight: usize,
}

impl QueueState {
    /// Double the capacity, compacting items to the start in FIFO order
    fn grow(&mut self) {
        let old_cap = self.slots.len();
        let mut new_slots = vec![None; old_cap * 2].into_boxed_slice();
        for i in 0..self.len {
            new_slots[i] = self.slots[(self.head + i) % old_cap].take();
        }
        self.slots = new_slots;
        self.head = 0;
    }
}

/// Thread-safe FIFO of pending directory paths
pub struct WorkQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,

    /// Monotonic shutdown flag; set by cancellation or by completion detection
    shutdown: AtomicBool,

    /// Latched when the scan drained naturally rather than being cancelled
    completed: AtomicBool,
}

impl WorkQueue {
    /// Create an empty queue with the given initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                slots: vec![None; capacity].into_boxed_slice(),
                head: 0,
                len: 0,
                in_flight: 0,
            }),
            not_empty: Condvar::new(),
            shutdown: AtomicBool::new(false),
            completed: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().expect("work queue lock poisoned")
    }

    /// Enqueue a pending directory, growing the buffer if it is full.
    ///
    /// Work discovered after shutdown is discarded, not queued.
    pub fn push(&self, item: PathBuf) {
        let mut s = self.lock();
        if self.shutdown.load(Ordering::SeqCst) {
            return;
        }
        if s.len == s.slots.len() {
            s.grow();
        }
        let cap = s.slots.len();
        let tail = (s.head + s.len) % cap;
        s.slots[tail] = Some(item);
        s.len += 1;
        drop(s);
        self.not_empty.notify_one();
    }

    /// Dequeue the oldest pending directory, blocking while the queue is
    /// empty and no shutdown has been requested.
    ///
    /// Returns `None` only once shutdown is active and the queue has drained;
    /// that is the worker's exit signal. On success the in-flight count is
    /// incremented before the lock is released, so the returned directory is
    /// already accounted for as an enumeration in progress.
    pub fn pop(&self) -> Option<PathBuf> {
        let mut s = self.lock();
        while s.len == 0 && !self.shutdown.load(Ordering::SeqCst) {
            s = self
                .not_empty
                .wait(s)
                .expect("work queue lock poisoned");
        }
        if s.len == 0 {
            return None;
        }
        let head = s.head;
        let item = s.slots[head].take().expect("queued slot must be occupied");
        s.head = (s.head + 1) % s.slots.len();
        s.len -= 1;
        s.in_flight += 1;
        Some(item)
    }

    /// Mark one directory enumeration as finished and run the termination
    /// check. Must be called exactly once per successful `pop`, on every exit
    /// path including enumeration errors, and only after all of that
    /// directory's children have been pushed.
    ///
    /// Returns `true` for the single call that detects global completion.
    pub fn finish(&self) -> bool {
        let mut s = self.lock();
        debug_assert!(s.in_flight > 0, "finish without matching pop");
        s.in_flight -= 1;
        if s.in_flight == 0 && s.len == 0 && !self.shutdown.load(Ordering::SeqCst) {
            self.completed.store(true, Ordering::SeqCst);
            self.shutdown.store(true, Ordering::SeqCst);
            drop(s);
            self.not_empty.notify_all();
            true
        } else {
            false
        }
    }

    /// Request shutdown and wake every blocked consumer. Idempotent.
    pub fn request_shutdown(&self) {
        let s = self.lock();
        self.shutdown.store(true, Ordering::SeqCst);
        drop(s);
        self.not_empty.notify_all();
    }

    /// Whether shutdown has been requested (by cancellation or completion)
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Whether the scan drained all work rather than being cancelled
    pub fn completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of queued items
    pub fn len(&self) -> usize {
        self.lock().len
    }

    /// Whether the queue holds no pending items
    pub fn is_empty(&self) -> bool {
        self.lock().len == 0
    }

    /// Current ring capacity
    pub fn capacity(&self) -> usize {
        self.lock().slots.len()
    }

    /// Directory enumerations currently in progress
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }
}
