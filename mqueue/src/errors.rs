use std::fmt;

/// Construction-time failure of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    /// A zero-capacity queue has no sense; the minimum capacity is 1.
    InvalidCapacity,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::InvalidCapacity => {
                write!(f, "invalid queue capacity: capacity should be greater than zero")
            }
        }
    }
}

impl std::error::Error for QueueError {}

/// Outcome of a push that did not enqueue. The rejected message is handed
/// back to the caller inside the variant.
#[derive(Debug, PartialEq, Eq)]
pub enum PushError<T> {
    /// The buffer was at capacity under the non-blocking policy.
    Full(T),
    /// The queue has been closed.
    Closed(T),
}

impl<T> PushError<T> {
    /// Returns the message that could not be enqueued.
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(message) | PushError::Closed(message) => message,
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => write!(f, "queue is full"),
            PushError::Closed(_) => write!(f, "queue is closed"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for PushError<T> {}

/// Outcome of a pop that did not dequeue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopError {
    /// The buffer was empty under the non-blocking policy.
    Empty,
    /// The queue has been closed.
    Closed,
}

impl fmt::Display for PopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopError::Empty => write!(f, "queue is empty"),
            PopError::Closed => write!(f, "queue is closed"),
        }
    }
}

impl std::error::Error for PopError {}

/// Outcome of a predicate extraction that did not remove a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetError {
    /// The buffer was empty.
    Empty,
    /// No buffered message satisfied the predicate. A query outcome, not
    /// a fault of the queue.
    NotFound,
    /// The queue has been closed.
    Closed,
}

impl fmt::Display for GetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GetError::Empty => write!(f, "queue is empty"),
            GetError::NotFound => write!(f, "no message matched the predicate"),
            GetError::Closed => write!(f, "queue is closed"),
        }
    }
}

impl std::error::Error for GetError {}
