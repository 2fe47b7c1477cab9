//! Bearer-token authentication.
//!
//! `auth_middleware` resolves the `Authorization` header into an [`AuthUser`]
//! before any handler extractor runs, so a bad token is rejected ahead of path or
//! body validation.

pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::{IdentityResolver, JwtIdentityResolver};
pub use middleware::auth_middleware;
pub use models::AuthUser;
