//! Learner service client module.

mod learner;

pub use learner::*;
