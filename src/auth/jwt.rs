use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{config::AuthConfig, error::AppError};

/// Token payload shared with the Better Auth frontend: a subject, an
/// auxiliary email claim, and the two timestamps. No issuer or
/// audience; compatibility rests on the shared secret alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys, derived from the shared secret once
/// at startup and cloned into the router state.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl JwtKeys {
    pub fn new(config: &AuthConfig) -> anyhow::Result<Self> {
        let algorithm = config
            .algorithm
            .parse::<Algorithm>()
            .map_err(|e| anyhow::anyhow!("unsupported JWT_ALGORITHM {:?}: {e}", config.algorithm))?;
        Ok(Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm,
            default_ttl: Duration::minutes(config.token_ttl_minutes),
        })
    }

    /// Sign a token for `sub`, stamping issued-at now and expiry `ttl`
    /// later (the configured lifetime when `ttl` is `None`).
    pub fn issue(
        &self,
        sub: &str,
        email: Option<&str>,
        ttl: Option<Duration>,
    ) -> Result<String, AppError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl.unwrap_or(self.default_ttl);
        let claims = Claims {
            sub: sub.to_string(),
            email: email.map(str::to_string),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| anyhow::Error::new(e).context("jwt encode"))?;
        debug!(sub = %claims.sub, "jwt signed");
        Ok(token)
    }

    /// Signature or payload problems (including a missing or empty
    /// subject) are [`AppError::TokenInvalid`]; a well-formed token at
    /// or past its expiry instant is [`AppError::TokenExpired`].
    /// Expiry is compared against this process's UTC clock, no leeway.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(self.algorithm);
        // expiry is checked below so that it gets a distinct error
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|_| AppError::TokenInvalid)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() {
            return Err(AppError::TokenInvalid);
        }
        if OffsetDateTime::now_utc().unix_timestamp() >= claims.exp {
            return Err(AppError::TokenExpired);
        }
        debug!(sub = %claims.sub, "jwt verified");
        Ok(claims)
    }
}
