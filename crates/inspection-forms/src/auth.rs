//! Session tokens
//!
//! Tokens are HS256 JWTs signed with a secret supplied by the caller.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::users::{Role, User, UserId};
use crate::UserError;

/// Lifetime of a token unless configured otherwise
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    /// Expiry as seconds since the Unix epoch
    pub exp: u64,
}

/// Issues and verifies session tokens
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Issuer with the default one-hour lifetime
    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, DEFAULT_TOKEN_TTL)
    }

    /// Issue a token for `user` valid from now
    pub fn issue(&self, user: &User) -> Result<String, UserError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token for `user` valid from `issued_at`
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, UserError> {
        let issued = u64::try_from(issued_at.timestamp()).unwrap_or_default();
        let claims = Claims {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            exp: issued.saturating_add(self.ttl.as_secs()),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Check signature and expiry and return the payload
    pub fn verify(&self, token: &str) -> Result<Claims, UserError> {
        let validation = Validation::new(Algorithm::HS256);
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }
}
