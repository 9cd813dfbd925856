//! Core data models for autodidact.
//!
//! Epistemic mapping:
//! - K_i (Knowledge): The literal vocabulary and state shape
//! - B_i (Beliefs): Server payloads, wrapped in Result until reconciled
//! - I^R (Resolvable): Config parameters
//! - I^B (Bounded): Error variants for network failures

mod config;
mod error;
mod literal;
mod state;

pub use config::*;
pub use error::*;
pub use literal::*;
pub use state::*;
