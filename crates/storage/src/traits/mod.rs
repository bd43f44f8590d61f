//! Async domain traits for the storage layer.
//!
//! Every mutating operation is idempotent in effect: repeating a delete or
//! a since-superseded update must not corrupt state. There is no
//! compare-and-swap; concurrent read-then-act sequences are resolved by
//! the coordinator's idempotent handlers, not by the store.

mod queue;
mod verification;

pub use queue::{DelayQueueStore, QueuedJob};
pub use verification::VerificationStore;
