//! autodidact - Terminal client for a remote boolean concept learner.
//!
//! ## Architecture
//!
//! The learning algorithm runs on a remote service. This crate owns the
//! client side of the protocol:
//! - **Transport**: one HTTP call per action, classified failures
//! - **Reconciler**: validates a response into a complete SessionState
//! - **Projector**: text summary plus a fixed-order literal chart
//! - **Session**: state machine and last-submission-wins sequencing
//!
//! ## Epistemic Design
//!
//! - K_i (Knowledge): The ten-literal vocabulary, enforced by types
//! - B_i (Beliefs): Server payloads, validated before use
//! - I^R (Resolvable): Endpoint and display settings from config
//! - I^B (Bounded): Network failures, never retried, never fatal

pub mod client;
pub mod models;
pub mod render;
pub mod session;
pub mod shell;

// Re-exports for convenience
pub use client::{LearnerClient, LearnerTransport};
pub use models::{AutodidactError, Config, Literal, Result, SessionState};
pub use render::{Projection, Projector, TerminalChart, project};
pub use session::{Action, Phase, Session, reconcile};
pub use shell::Shell;
