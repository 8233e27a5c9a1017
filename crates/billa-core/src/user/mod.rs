//! User and authentication abstractions.

mod model;
mod service;

pub use model::AuthUser;
pub use service::{AuthProvider, GuestAuthProvider, StaticAuthProvider};
