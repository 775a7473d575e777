//! Login credentials and bearer-token authentication
//!
//! - [`service`]: Argon2 secret hashing and HS256 token issuance/verification
//! - [`middleware`]: axum middleware guarding the transfer routes

pub mod middleware;
pub mod service;

pub use middleware::{AuthenticatedAccount, jwt_auth_middleware};
pub use service::{Argon2Hasher, Claims, SecretHasher, TokenResponse, TokenService};
