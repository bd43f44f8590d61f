//! Core types and configuration for doorman
//!
//! This crate contains domain types shared across all other crates.

mod config;
mod constants;
mod event;
mod jobs;
mod verification;

pub use config::*;
pub use constants::*;
pub use event::*;
pub use jobs::*;
pub use verification::*;
