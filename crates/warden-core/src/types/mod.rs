//! Core type definitions shared across the Warden workspace.

pub mod id;

pub use id::*;
