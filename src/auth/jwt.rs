//! JWT Token Service
//! Mission: Issue and verify signed bearer tokens

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

/// Why a presented token was rejected. All variants are handled
/// identically by callers (unauthenticated) but logged distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationError {
    /// Cannot be parsed or decoded at all.
    Malformed,
    /// Decodes but the signature does not match our secret.
    SignatureInvalid,
    /// Correctly signed but past its expiry.
    Expired,
}

impl std::fmt::Display for VerificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationError::Malformed => write!(f, "token malformed"),
            VerificationError::SignatureInvalid => write!(f, "token signature invalid"),
            VerificationError::Expired => write!(f, "token expired"),
        }
    }
}

impl std::error::Error for VerificationError {}

/// JWT handler for token operations
pub struct JwtHandler {
    secret: String,
    ttl_hours: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and a 24-hour token TTL.
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            ttl_hours: 24,
        }
    }

    /// Override the token TTL. Negative values produce already-expired
    /// tokens, which the expiry tests rely on.
    pub fn with_ttl_hours(mut self, ttl_hours: i64) -> Self {
        self.ttl_hours = ttl_hours;
        self
    }

    /// Issue a token for a subject id. Fails only on signing
    /// misconfiguration, which is fatal rather than user-facing.
    pub fn issue(&self, subject: Uuid) -> Result<String> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::hours(self.ttl_hours))
            .context("Invalid timestamp")?
            .timestamp();

        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp() as usize,
            exp: expiration as usize,
        };

        debug!("Issuing token for subject {}, ttl {}h", subject, self.ttl_hours);

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign token")
    }

    /// Verify a token and extract its claims. Pure computation, no I/O.
    pub fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        // Zero leeway keeps expiry deterministic.
        let mut validation = Validation::default();
        validation.leeway = 0;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => VerificationError::Expired,
            ErrorKind::InvalidSignature => VerificationError::SignatureInvalid,
            _ => VerificationError::Malformed,
        })?;

        debug!("Verified token for subject {}", decoded.claims.sub);

        Ok(decoded.claims)
    }
}
