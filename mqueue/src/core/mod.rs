use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};

/// Synchronization state shared by every operation of a queue instance:
/// the guarded buffer, the two wait conditions and the closed flag.
pub(crate) struct Shared<T> {
    // to protect the shared resource (message buffer)
    buffer: Mutex<VecDeque<T>>,
    // to wait on during a blocking pop (there is something to pop)
    not_empty: Condvar,
    // to wait on during a blocking push (there is free space to push into)
    not_full: Condvar,
    // closed flag is atomic so operations can fast-reject without the mutex
    closed: AtomicBool,
    capacity: usize,
}

impl<T> Shared<T> {
    pub(crate) fn new(capacity: usize) -> Shared<T> {
        Shared {
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            closed: AtomicBool::new(false),
            capacity,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Locks the buffer. A poisoned mutex is recovered: every mutation
    /// holds the lock only across a single buffer edit, so the buffer is
    /// never observable in a half-updated state.
    pub(crate) fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        match self.buffer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn wait_not_empty<'a>(
        &self,
        guard: MutexGuard<'a, VecDeque<T>>,
    ) -> MutexGuard<'a, VecDeque<T>> {
        match self.not_empty.wait(guard) {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn wait_not_full<'a>(
        &self,
        guard: MutexGuard<'a, VecDeque<T>>,
    ) -> MutexGuard<'a, VecDeque<T>> {
        match self.not_full.wait(guard) {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Announces a successful push: there is now something to pop, so one
    /// parked popper is woken. A push frees room for at most one pop,
    /// hence notify-one rather than notify-all.
    #[inline]
    pub(crate) fn wake_one_popper(&self) {
        self.not_empty.notify_one();
    }

    /// Announces a successful pop or extraction: there is now free space,
    /// so one parked pusher is woken.
    #[inline]
    pub(crate) fn wake_one_pusher(&self) {
        self.not_full.notify_one();
    }

    /// Transitions the queue to closed and wakes every parked thread on
    /// both conditions.
    ///
    /// The store happens while the mutex is held. Waiters evaluate their
    /// predicate under the same mutex, so a store outside it could slip
    /// between a waiter's check and its park and the notify-all would be
    /// lost; taking the lock first makes that window impossible.
    pub(crate) fn close(&self) {
        let guard = self.lock();
        self.closed.store(true, Ordering::Release);
        drop(guard);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }
}
