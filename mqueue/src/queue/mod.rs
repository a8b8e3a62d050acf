use serde_derive::{Deserialize, Serialize};

use crate::core::Shared;
use crate::errors::{GetError, PopError, PushError, QueueError};

/// How an operation behaves when its capacity condition is not met.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Suspend until the condition is satisfied or the queue is closed.
    Blocking,
    /// Return immediately with a transient-condition result.
    NonBlocking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> QueueConfig {
        QueueConfig { capacity: 2 }
    }
}

/// Bounded, thread-safe, closable FIFO message queue.
///
/// All methods take `&self`; share one instance between producer and
/// consumer threads by wrapping it in an `Arc`. FIFO order holds for
/// push/pop pairs; [`MessageQueue::get`] may remove an interior message
/// out of order.
///
/// Closing is terminal. Once [`MessageQueue::close`] has run, every
/// push, pop and get short-circuits to its `Closed` outcome, including
/// operations on messages still buffered at close time (see `close`).
pub struct MessageQueue<T> {
    shared: Shared<T>,
}

impl<T> MessageQueue<T> {
    /// Creates a queue holding at most `capacity` messages.
    pub fn with_capacity(capacity: usize) -> Result<MessageQueue<T>, QueueError> {
        if capacity == 0 {
            return Err(QueueError::InvalidCapacity);
        }
        Ok(MessageQueue { shared: Shared::new(capacity) })
    }

    pub fn from_config(cfg: &QueueConfig) -> Result<MessageQueue<T>, QueueError> {
        MessageQueue::with_capacity(cfg.capacity)
    }

    /// Appends `message` to the tail of the buffer.
    ///
    /// With [`Policy::NonBlocking`] a full buffer yields
    /// [`PushError::Full`] immediately; with [`Policy::Blocking`] the
    /// call suspends until space frees up or the queue closes. A
    /// successful push wakes one parked popper.
    pub fn push(&self, message: T, policy: Policy) -> Result<(), PushError<T>> {
        if self.shared.is_closed() {
            return Err(PushError::Closed(message));
        }
        let mut buffer = self.shared.lock();
        loop {
            if self.shared.is_closed() {
                return Err(PushError::Closed(message));
            }
            if buffer.len() < self.shared.capacity() {
                break;
            }
            if let Policy::NonBlocking = policy {
                return Err(PushError::Full(message));
            }
            // releases the lock while parked, reacquires before the
            // predicate is checked again; spurious wakeups loop back
            buffer = self.shared.wait_not_full(buffer);
        }
        buffer.push_back(message);
        drop(buffer);
        self.shared.wake_one_popper();
        Ok(())
    }

    /// Removes and returns the head of the buffer (FIFO order).
    ///
    /// With [`Policy::NonBlocking`] an empty buffer yields
    /// [`PopError::Empty`] immediately; with [`Policy::Blocking`] the
    /// call suspends until a message arrives or the queue closes. A
    /// successful pop wakes one parked pusher.
    pub fn pop(&self, policy: Policy) -> Result<T, PopError> {
        if self.shared.is_closed() {
            return Err(PopError::Closed);
        }
        let mut buffer = self.shared.lock();
        loop {
            if self.shared.is_closed() {
                return Err(PopError::Closed);
            }
            if let Some(message) = buffer.pop_front() {
                drop(buffer);
                self.shared.wake_one_pusher();
                return Ok(message);
            }
            if let Policy::NonBlocking = policy {
                return Err(PopError::Empty);
            }
            buffer = self.shared.wait_not_empty(buffer);
        }
    }

    /// Removes and returns the first message, in head-to-tail order,
    /// that satisfies `predicate`.
    ///
    /// Never suspends. Interior removal is supported; the relative
    /// order of the remaining messages is preserved. A successful
    /// extraction wakes one parked pusher.
    pub fn get<P>(&self, mut predicate: P) -> Result<T, GetError>
    where
        P: FnMut(&T) -> bool,
    {
        if self.shared.is_closed() {
            return Err(GetError::Closed);
        }
        let mut buffer = self.shared.lock();
        if buffer.is_empty() {
            return Err(GetError::Empty);
        }
        let at = match buffer.iter().position(|message| predicate(message)) {
            Some(at) => at,
            None => return Err(GetError::NotFound),
        };
        // the index came from the same guarded scan, so the slot is there
        let message = match buffer.remove(at) {
            Some(message) => message,
            None => return Err(GetError::NotFound),
        };
        drop(buffer);
        self.shared.wake_one_pusher();
        Ok(message)
    }

    /// Closes the queue and wakes every parked thread on both
    /// conditions. Idempotent; the transition is never reversed.
    ///
    /// Messages still buffered when the queue closes become
    /// unreachable: pop and get short-circuit to `Closed` exactly like
    /// push does, so closing does not drain. Callers that must not lose
    /// buffered messages should drain before closing.
    pub fn close(&self) {
        self.shared.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Number of messages currently buffered.
    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.shared.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            MessageQueue::<String>::with_capacity(0).err(),
            Some(QueueError::InvalidCapacity)
        );
    }

    #[test]
    fn capacity_one_fills_after_a_single_push() -> Result<(), QueueError> {
        let queue = MessageQueue::with_capacity(1)?;
        assert_eq!(queue.capacity(), 1);
        assert!(queue.push(1, Policy::NonBlocking).is_ok());
        assert_eq!(queue.push(2, Policy::NonBlocking), Err(PushError::Full(2)));
        Ok(())
    }

    #[test]
    fn round_trip() -> Result<(), QueueError> {
        let queue = MessageQueue::with_capacity(1)?;
        assert!(queue.push("x".to_string(), Policy::NonBlocking).is_ok());
        assert_eq!(queue.pop(Policy::NonBlocking), Ok("x".to_string()));
        Ok(())
    }

    #[test]
    fn pop_preserves_push_order() -> Result<(), QueueError> {
        let queue = MessageQueue::with_capacity(8)?;
        for x in 0..5 {
            assert!(queue.push(x, Policy::NonBlocking).is_ok());
        }
        for x in 0..5 {
            assert_eq!(queue.pop(Policy::NonBlocking), Ok(x));
        }
        assert_eq!(queue.pop(Policy::NonBlocking), Err(PopError::Empty));
        Ok(())
    }

    #[test]
    fn non_blocking_push_on_full_leaves_buffer_unchanged() -> Result<(), QueueError> {
        let queue = MessageQueue::with_capacity(2)?;
        assert!(queue.push(10, Policy::NonBlocking).is_ok());
        assert!(queue.push(20, Policy::NonBlocking).is_ok());
        assert_eq!(queue.push(30, Policy::NonBlocking), Err(PushError::Full(30)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(Policy::NonBlocking), Ok(10));
        assert_eq!(queue.pop(Policy::NonBlocking), Ok(20));
        Ok(())
    }

    #[test]
    fn non_blocking_pop_on_empty_returns_empty() -> Result<(), QueueError> {
        let queue = MessageQueue::<u32>::with_capacity(2)?;
        assert_eq!(queue.pop(Policy::NonBlocking), Err(PopError::Empty));
        Ok(())
    }

    #[test]
    fn get_on_empty_returns_empty() -> Result<(), QueueError> {
        let queue = MessageQueue::<u32>::with_capacity(2)?;
        assert_eq!(queue.get(|_| true), Err(GetError::Empty));
        Ok(())
    }

    #[test]
    fn get_without_match_leaves_buffer_unchanged() -> Result<(), QueueError> {
        let queue = MessageQueue::with_capacity(4)?;
        for x in [1, 2, 3] {
            assert!(queue.push(x, Policy::NonBlocking).is_ok());
        }
        assert_eq!(queue.get(|x| *x > 100), Err(GetError::NotFound));
        assert_eq!(queue.len(), 3);
        for x in [1, 2, 3] {
            assert_eq!(queue.pop(Policy::NonBlocking), Ok(x));
        }
        Ok(())
    }

    #[test]
    fn get_removes_first_match_and_keeps_the_rest_in_order() -> Result<(), QueueError> {
        let queue = MessageQueue::with_capacity(8)?;
        for x in [1, 4, 2, 4, 3] {
            assert!(queue.push(x, Policy::NonBlocking).is_ok());
        }
        // head-to-tail tie-break: the first 4, not the second
        assert_eq!(queue.get(|x| *x == 4), Ok(4));
        assert_eq!(queue.len(), 4);
        for x in [1, 2, 4, 3] {
            assert_eq!(queue.pop(Policy::NonBlocking), Ok(x));
        }
        Ok(())
    }

    #[test]
    fn closed_queue_short_circuits_every_operation() -> Result<(), QueueError> {
        let queue = MessageQueue::with_capacity(4)?;
        assert!(queue.push(1, Policy::NonBlocking).is_ok());
        assert!(queue.push(2, Policy::NonBlocking).is_ok());

        queue.close();
        assert!(queue.is_closed());

        // buffered messages are unreachable after close
        assert_eq!(queue.push(3, Policy::NonBlocking), Err(PushError::Closed(3)));
        assert_eq!(queue.push(4, Policy::Blocking), Err(PushError::Closed(4)));
        assert_eq!(queue.pop(Policy::NonBlocking), Err(PopError::Closed));
        assert_eq!(queue.pop(Policy::Blocking), Err(PopError::Closed));
        assert_eq!(queue.get(|_| true), Err(GetError::Closed));

        // closing again is harmless
        queue.close();
        assert!(queue.is_closed());
        Ok(())
    }

    #[test]
    fn length_never_exceeds_capacity() -> Result<(), QueueError> {
        let queue = MessageQueue::with_capacity(2)?;
        for x in 0..10 {
            let _ = queue.push(x, Policy::NonBlocking);
            assert!(queue.len() <= queue.capacity());
        }
        assert!(queue.is_full());
        Ok(())
    }

    #[test]
    fn from_config_uses_the_configured_capacity() -> Result<(), QueueError> {
        let cfg = QueueConfig { capacity: 3 };
        let queue = MessageQueue::<u8>::from_config(&cfg)?;
        assert_eq!(queue.capacity(), 3);
        assert!(queue.is_empty());
        Ok(())
    }

    #[test]
    fn rejected_push_hands_the_message_back() -> Result<(), QueueError> {
        let queue = MessageQueue::with_capacity(1)?;
        assert!(queue.push("kept".to_string(), Policy::NonBlocking).is_ok());
        let err = queue
            .push("bounced".to_string(), Policy::NonBlocking)
            .expect_err("queue is full");
        assert_eq!(err.into_inner(), "bounced");
        Ok(())
    }
}
