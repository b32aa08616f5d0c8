//! Session token verification.
//!
//! Users sign in with an external auth provider that issues JWTs. The
//! server only verifies them: HS256 with a shared secret, or RS256 with
//! the provider's PEM public key. The `sub` claim is the user id that
//! scopes every row the user can see.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use webs_core::types::UserId;

/// Claims read from a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the auth provider's user id.
    pub sub: UserId,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    #[serde(default)]
    pub iat: i64,
    /// Issuer, checked when `AUTH_JWT_ISSUER` is configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Key material and rules for validating session tokens.
#[derive(Clone)]
pub struct JwtConfig {
    algorithm: Algorithm,
    decoding_key: DecodingKey,
    /// Only set for HS256, where the server can also mint tokens.
    secret: Option<String>,
    issuer: Option<String>,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtConfig {
    /// HS256 verification with a shared secret.
    pub fn hs256(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        Self {
            algorithm: Algorithm::HS256,
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            secret: Some(secret),
            issuer: None,
        }
    }

    /// RS256 verification with a PEM-encoded public key.
    pub fn rs256(public_key_pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            algorithm: Algorithm::RS256,
            decoding_key: DecodingKey::from_rsa_pem(public_key_pem.as_bytes())?,
            secret: None,
            issuer: None,
        })
    }

    /// Require tokens to carry this `iss` claim.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var               | Required            |
    /// |-----------------------|---------------------|
    /// | `AUTH_JWT_SECRET`     | one of these two    |
    /// | `AUTH_JWT_PUBLIC_KEY` | one of these two    |
    /// | `AUTH_JWT_ISSUER`     | no                  |
    ///
    /// The public key wins when both are set.
    ///
    /// # Panics
    ///
    /// Panics if neither key is set, or the PEM does not parse.
    pub fn from_env() -> Self {
        let public_key = std::env::var("AUTH_JWT_PUBLIC_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let secret = std::env::var("AUTH_JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        let config = match (public_key, secret) {
            (Some(pem), _) => {
                // Single-line env values often carry literal "\n".
                let pem = pem.replace("\\n", "\n");
                Self::rs256(&pem).unwrap_or_else(|e| panic!("AUTH_JWT_PUBLIC_KEY is invalid: {e}"))
            }
            (None, Some(secret)) => Self::hs256(secret),
            (None, None) => panic!("AUTH_JWT_SECRET or AUTH_JWT_PUBLIC_KEY must be set"),
        };

        match std::env::var("AUTH_JWT_ISSUER") {
            Ok(issuer) if !issuer.is_empty() => config.with_issuer(issuer),
            _ => config,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }
        validation
    }
}

/// Validate and decode a session token, returning its [`Claims`].
///
/// Checks the signature and expiration, plus the issuer when configured.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(token, &config.decoding_key, &config.validation())?;
    Ok(token_data.claims)
}

/// Mint an HS256 token for `user_id`, valid for `ttl_secs`.
///
/// Only available with a shared-secret config; used for local development
/// and tests. Returns `None` for RS256 configs.
pub fn issue_token(user_id: &str, ttl_secs: i64, config: &JwtConfig) -> Option<String> {
    let secret = config.secret.as_ref()?;
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + ttl_secs,
        iat: now,
        iss: config.issuer.clone(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .ok()
}
