//! Activation token records.

pub mod activation;

pub use activation::{ActivationToken, NewActivationToken};
