//! Admin access tokens and refresh tokens.
//!
//! Access tokens are short-lived HS256 JWTs issued as `muster` and carrying
//! the admin's organisation and role, so the admin extractor never needs a
//! database round trip. Refresh tokens are opaque; only their SHA-256 digest
//! is stored in `admin_sessions`.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use muster_core::hashing::sha256_hex;
use muster_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::parsed_var;

/// `iss` claim of every admin access token. Tokens from other issuers are rejected.
pub const TOKEN_ISSUER: &str = "muster";

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

/// Seconds of clock skew tolerated on `exp`.
const LEEWAY_SECS: u64 = 30;

/// Payload of an admin access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Admin user id.
    pub sub: DbId,
    /// Organisation every admin query is scoped to.
    pub org: DbId,
    pub role: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Load token settings from the environment.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or an expiry is not a number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            access_token_expiry_mins: parsed_var(
                "JWT_ACCESS_EXPIRY_MINS",
                DEFAULT_ACCESS_EXPIRY_MINS,
            ),
            refresh_token_expiry_days: parsed_var(
                "JWT_REFRESH_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            ),
        }
    }

    /// Access token lifetime in seconds, as reported to clients.
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// Sign an access token for an admin of `organisation_id`.
pub fn issue_access_token(
    admin_id: DbId,
    organisation_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: admin_id,
        org: organisation_id,
        role: role.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        exp: now + config.access_token_expiry_secs(),
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and issuer of an access token.
pub fn verify_access_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.leeway = LEEWAY_SECS;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// A freshly minted refresh token. `plaintext` goes to the client once.
pub struct RefreshToken {
    pub plaintext: String,
    pub hash: String,
}

impl RefreshToken {
    pub fn generate() -> Self {
        let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let hash = hash_refresh_token(&plaintext);
        Self { plaintext, hash }
    }
}

/// Digest under which a refresh token is stored and looked up.
pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token.trim().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    fn sign(claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(config().secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn issued_token_carries_organisation_and_role() {
        let token = issue_access_token(42, 3, "staff", &config()).unwrap();
        let claims = verify_access_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.org, 3);
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.role, "staff");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let token = sign(&Claims {
            sub: 1,
            org: 1,
            role: "owner".into(),
            iss: TOKEN_ISSUER.into(),
            exp: now - 300,
            iat: now - 1200,
            jti: "x".into(),
        });
        assert!(verify_access_token(&token, &config()).is_err());
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let now = Utc::now().timestamp();
        let token = sign(&Claims {
            sub: 1,
            org: 1,
            role: "owner".into(),
            iss: "someone-else".into(),
            exp: now + 600,
            iat: now,
            jti: "x".into(),
        });
        assert!(verify_access_token(&token, &config()).is_err());
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = issue_access_token(1, 1, "admin", &config()).unwrap();
        let other = JwtConfig {
            secret: "different".into(),
            ..config()
        };
        assert!(verify_access_token(&token, &other).is_err());
    }

    #[test]
    fn refresh_token_digest_is_stable() {
        let token = RefreshToken::generate();
        assert_eq!(token.plaintext.len(), 64);
        assert_eq!(token.hash, hash_refresh_token(&token.plaintext));
        assert_ne!(token.plaintext, RefreshToken::generate().plaintext);
    }
}
