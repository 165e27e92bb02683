//! Main token service implementation

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::entities::{Claims, Credential, TokenKind, TokenPair};
use crate::errors::TokenError;

use super::config::TokenServiceConfig;

const BEARER_PREFIX: &str = "Bearer ";

/// Signing and verification keys for one token kind
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Stateless codec for signed access and refresh tokens
///
/// Expiry is checked against the injected [`Clock`] rather than by
/// `jsonwebtoken`, so lifetimes can be tested deterministically.
pub struct TokenService {
    config: TokenServiceConfig,
    access_keys: KeyPair,
    refresh_keys: KeyPair,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a new token service instance
    ///
    /// # Returns
    ///
    /// * `Err(TokenError::KeyMisconfigured)` - A secret is empty or both kinds
    ///   share one secret
    pub fn new(config: TokenServiceConfig, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if config.access_secret.is_empty() || config.refresh_secret.is_empty() {
            return Err(TokenError::KeyMisconfigured {
                reason: "signing secret is empty".to_string(),
            });
        }
        if config.access_secret == config.refresh_secret {
            return Err(TokenError::KeyMisconfigured {
                reason: "access and refresh secrets must differ".to_string(),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.validate_exp = false;
        validation.leeway = 0;

        Ok(Self {
            access_keys: KeyPair::from_secret(&config.access_secret),
            refresh_keys: KeyPair::from_secret(&config.refresh_secret),
            config,
            validation,
            clock,
        })
    }

    pub fn access_token_ttl(&self) -> chrono::Duration {
        self.config.access_token_ttl
    }

    pub fn refresh_token_ttl(&self) -> chrono::Duration {
        self.config.refresh_token_ttl
    }

    /// Issues an access token carrying id, role and status
    pub fn issue_access_token(&self, credential: &Credential) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: credential.id.to_string(),
            role: Some(credential.role),
            status: Some(credential.status),
            kind: TokenKind::Access,
            nonce: None,
            device: None,
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.config.access_token_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        self.encode(&claims, &self.access_keys)
    }

    /// Issues a refresh token with a fresh random nonce
    pub fn issue_refresh_token(
        &self,
        credential: &Credential,
        device: &str,
    ) -> Result<String, TokenError> {
        let now = self.clock.now();
        let claims = Claims {
            sub: credential.id.to_string(),
            role: None,
            status: None,
            kind: TokenKind::Refresh,
            nonce: Some(random_nonce()),
            device: Some(device.to_string()),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: (now + self.config.refresh_token_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        self.encode(&claims, &self.refresh_keys)
    }

    /// Issues both tokens for one device
    pub fn issue_token_pair(
        &self,
        credential: &Credential,
        device: &str,
    ) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(credential)?,
            refresh_token: self.issue_refresh_token(credential, device)?,
            access_expires_in: self.config.access_token_ttl.num_seconds(),
            refresh_expires_in: self.config.refresh_token_ttl.num_seconds(),
        })
    }

    /// Verifies signature, issuer, audience, kind and expiry, in that order
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let keys = match expected {
            TokenKind::Access => &self.access_keys,
            TokenKind::Refresh => &self.refresh_keys,
        };

        let claims = decode::<Claims>(token, &keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if claims.kind != expected {
            return Err(TokenError::WrongKind);
        }
        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn encode(&self, claims: &Claims, keys: &KeyPair) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &keys.encoding).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign token");
            TokenError::SigningFailed
        })
    }
}

/// Parses an `Authorization: Bearer <token>` header value
pub fn extract_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix(BEARER_PREFIX)?.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return None;
    }
    Some(token)
}

fn random_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
