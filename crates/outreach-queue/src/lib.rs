pub mod job;
pub mod queue;

pub use job::Job;
pub use queue::{EnqueueError, LocalQueue, TaskQueue};
