use std::{fmt, time::Duration};

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::{Error as JwtError, ErrorKind},
};
use uuid::Uuid;

use cinedex_config::AuthConfig;
use cinedex_core::domain::users::{Claims, User};

/// Signing key plus every key still accepted for verification.
///
/// Tokens are always signed with the current key. Verification tries the
/// current key first, then each retired key, so tokens issued before a
/// rotation stay valid until they expire.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: Vec<DecodingKey>,
    validation: Validation,
    ttl: Duration,
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("verification_keys", &self.decoding.len())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(current: &str, retired: &[String], ttl: Duration) -> Self {
        let decoding = std::iter::once(current)
            .chain(retired.iter().map(String::as_str))
            .map(|secret| DecodingKey::from_secret(secret.as_bytes()))
            .collect();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(current.as_bytes()),
            decoding,
            validation,
            ttl,
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(&auth.jwt_secret, &auth.retired_jwt_secrets, auth.token_ttl)
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> u64 {
        self.ttl.as_secs()
    }

    pub fn issue(&self, user: &User) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            sub: user.id,
            role: user.role,
            iat: now,
            exp: now.saturating_add(ttl),
            jti: Uuid::now_v7(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut last_error = None;
        for key in &self.decoding {
            match decode::<Claims>(token, key, &self.validation) {
                Ok(data) => return Ok(data.claims),
                // Only a signature mismatch is retried with an older key.
                Err(err)
                    if matches!(err.kind(), ErrorKind::InvalidSignature) =>
                {
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error
            .unwrap_or_else(|| JwtError::from(ErrorKind::InvalidToken)))
    }
}
