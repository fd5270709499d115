//! Custom middleware definitions

mod admin;
mod auth;

pub use admin::{AdminLayer, PrivilegedLayer};
pub use auth::AuthLayer;
