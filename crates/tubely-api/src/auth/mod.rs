//! Bearer-token authentication.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{parse_bearer_token, validate_jwt};
pub use middleware::{auth_middleware, AuthState};
pub use models::{AccessClaims, UserContext};
