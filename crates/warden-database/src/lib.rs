//! # warden-database
//!
//! The account repository. [`AccountStore`] hands out transactions and
//! [`AccountTransaction`] exposes every read and write the authentication
//! flows need. Two stores are provided: [`PgAccountStore`] on PostgreSQL
//! and [`MemoryAccountStore`] for tests and single-process development.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::{FailPoint, MemoryAccountStore};
pub use postgres::PgAccountStore;
pub use store::{AccountStore, AccountTransaction, TxMode};
