//! # warden-entity
//!
//! Domain records for Warden. Every struct in this crate represents a
//! database table row or a domain value object. Database records derive
//! `sqlx::FromRow`; the role bitmask codec lives in [`user::role`].

pub mod session;
pub mod token;
pub mod user;
