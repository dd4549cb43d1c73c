//! Identity token issuance and verification
//!
//! Tokens are HS256 JWTs carrying the caller's email and role. Keys are
//! derived once from the configured secret and shared behind `Arc`s.

use authgate_shared::Role;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Who a token speaks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub role: Role,
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Why a token could not be issued or accepted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature mismatch, foreign secret, tampering or an undecodable token
    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Failed to sign token: {0}")]
    Encoding(String),
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: Arc::new(EncodingKey::from_secret(bytes)),
            decoding: Arc::new(DecodingKey::from_secret(bytes)),
        }
    }

    fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Issues and verifies identity tokens
///
/// Create once at startup and store in `AppState`; cloning is cheap.
#[derive(Clone)]
pub struct TokenAuthority {
    keys: JwtKeys,
    ttl: Duration,
    validation: Arc<Validation>,
}

impl TokenAuthority {
    pub fn new(secret: &SecretString, ttl_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // A token is dead the second its expiry passes
        validation.leeway = 0;

        Self {
            keys: JwtKeys::new(secret),
            ttl: Duration::seconds(ttl_secs),
            validation: Arc::new(validation),
        }
    }

    /// Issue a token for `identity`, valid from now for the configured TTL
    #[inline]
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if it had been minted at `issued_at`
    pub fn issue_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            email: identity.email.clone(),
            role: identity.role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding())
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Check signature and expiry, returning the decoded claims
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::InvalidSignature,
            })
    }

    /// Token lifetime in seconds
    #[inline]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn authority(secret: &str) -> TokenAuthority {
        TokenAuthority::new(&SecretString::new(secret.to_string()), 86_400)
    }

    fn identity(role: Role) -> Identity {
        Identity {
            email: "ada@example.com".to_string(),
            role,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = authority("test-secret");
        let token = tokens.issue(&identity(Role::Admin)).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.identity(), identity(Role::Admin));
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let token = authority("secret-a").issue(&identity(Role::User)).unwrap();
        let result = authority("secret-b").verify(&token);

        assert_eq!(result, Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = authority("test-secret");
        let two_days_ago = Utc::now() - Duration::days(2);
        let token = tokens.issue_at(&identity(Role::User), two_days_ago).unwrap();

        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_expired_token_with_foreign_secret_still_rejected() {
        let two_days_ago = Utc::now() - Duration::days(2);
        let token = authority("secret-a")
            .issue_at(&identity(Role::Admin), two_days_ago)
            .unwrap();

        assert!(authority("secret-b").verify(&token).is_err());
    }

    #[test]
    fn test_token_near_expiry_still_valid() {
        let tokens = authority("test-secret");
        let almost_a_day_ago = Utc::now() - Duration::seconds(86_400 - 30);
        let token = tokens.issue_at(&identity(Role::User), almost_a_day_ago).unwrap();

        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn test_spliced_payload_rejected() {
        let tokens = authority("test-secret");
        let user_token = tokens.issue(&identity(Role::User)).unwrap();
        let admin_token = tokens.issue(&identity(Role::Admin)).unwrap();

        // Admin claims wearing the user token's signature
        let user_parts: Vec<&str> = user_token.split('.').collect();
        let admin_parts: Vec<&str> = admin_token.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

        assert_eq!(tokens.verify(&forged), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = authority("test-secret");
        assert_eq!(tokens.verify(""), Err(TokenError::InvalidSignature));
        assert_eq!(
            tokens.verify("invalid.token.here"),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_authority_is_clone_cheap() {
        let tokens = authority("test-secret");
        let cloned = tokens.clone(); // Should be cheap due to Arc
        let token = tokens.issue(&identity(Role::User)).unwrap();
        assert!(cloned.verify(&token).is_ok());
        assert_eq!(cloned.ttl_secs(), 86_400);
    }

    fn role_strategy() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_round_trip_preserves_identity(
            local in "[a-z0-9._]{1,20}",
            domain in "[a-z]{1,10}\\.[a-z]{2,4}",
            role in role_strategy(),
        ) {
            let tokens = authority("round-trip-secret");
            let identity = Identity { email: format!("{}@{}", local, domain), role };

            let token = tokens.issue(&identity).unwrap();
            let claims = tokens.verify(&token).unwrap();

            prop_assert_eq!(claims.identity(), identity);
        }

        #[test]
        fn prop_other_secret_never_verifies(
            secret_a in "[a-zA-Z0-9]{8,32}",
            secret_b in "[a-zA-Z0-9]{8,32}",
        ) {
            prop_assume!(secret_a != secret_b);
            let token = authority(&secret_a).issue(&identity(Role::Admin)).unwrap();
            prop_assert_eq!(
                authority(&secret_b).verify(&token),
                Err(TokenError::InvalidSignature)
            );
        }
    }
}
