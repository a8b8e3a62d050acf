mod core;
pub mod errors;
pub mod queue;

pub use errors::{GetError, PopError, PushError, QueueError};
pub use queue::{MessageQueue, Policy, QueueConfig};
