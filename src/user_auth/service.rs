use argon2::{
    Algorithm as Argon2Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

// ============================================================================
// Secret hashing
// ============================================================================

/// One-way hashing of account secrets.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, secret: &str) -> AppResult<String>;

    /// `Ok(false)` on mismatch; `Err` only for a malformed stored hash.
    fn verify(&self, secret: &str, hash: &str) -> AppResult<bool>;
}

/// Argon2id with a random salt per secret, PHC string output.
#[derive(Clone)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

impl Argon2Hasher {
    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Argon2Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Minimal cost parameters, for tests and local runs only.
    pub fn fast() -> AppResult<Self> {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None)
            .map_err(|e| AppError::internal("invalid argon2 params", e.to_string()))?;
        Ok(Self::with_params(params))
    }
}

impl SecretHasher for Argon2Hasher {
    fn hash(&self, secret: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(secret.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::internal("unable to create the account secret hash", e.to_string()))
    }

    fn verify(&self, secret: &str, hash: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::internal("invalid stored secret hash", e.to_string()))?;
        Ok(self
            .argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok())
    }
}

// ============================================================================
// Bearer tokens
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String, // account id
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn account_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 1800)]
    pub expires_in: i64,
}

/// Issues and verifies HS256 bearer tokens carrying the account id.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, account_id: i64) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = Claims {
            sub: account_id.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::internal("unable to generate token", e))?;

        Ok(TokenResponse {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in: (expires_at - now).num_seconds(),
        })
    }

    /// Verify JWT token
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                AppError::authentication(token_error_message(e.kind()))
            })
    }
}

fn token_error_message(kind: &JwtErrorKind) -> &'static str {
    match kind {
        JwtErrorKind::InvalidToken
        | JwtErrorKind::Base64(_)
        | JwtErrorKind::Json(_)
        | JwtErrorKind::Utf8(_) => "malformed jwt token",
        JwtErrorKind::ExpiredSignature | JwtErrorKind::ImmatureSignature => {
            "expired or premature jwt token"
        }
        JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
            "invalid jwt token signature"
        }
        _ => "unexpected token format",
    }
}
