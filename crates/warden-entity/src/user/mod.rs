//! User records, roles, and lifecycle state.

pub mod model;
pub mod role;
pub mod state;

pub use model::{NewUser, User};
pub use role::{Role, RoleSet};
pub use state::AccountState;
