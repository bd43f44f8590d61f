//! Verification lifecycle coordinator for doorman.
//!
//! Tracks a pending member from "challenged" to a terminal outcome. Every
//! handler is a short-lived, stateless invocation: progress lives in the
//! record store and the countdown is a self-re-scheduling delayed message,
//! never an in-process timer. Handlers are idempotent and order-independent
//! given the current record snapshot, because the queues deliver at least
//! once and in no particular order.

mod error;
mod verifier;


pub use error::VerifierError;
pub use verifier::Verifier;
