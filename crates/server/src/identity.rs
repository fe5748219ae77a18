//! Bearer token verification.
//!
//! The server never issues tokens: an external identity provider does, and
//! an [`IdentityVerifier`] turns a presented token into the caller email.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

/// A caller whose token has been verified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IdentityError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token does not carry an email")]
    MissingEmail,
}

/// Resolves a bearer token to a verified identity.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct Claims {
    email: Option<String>,
}

/// Verifies HS256 JSON Web Tokens signed with a shared secret.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Only accept tokens whose `iss` claim matches.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Only accept tokens whose `aud` claim matches.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.validate_aud = true;
        self.validation.set_audience(&[audience]);
        self
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|err| {
                tracing::debug!("token rejected: {err}");
                IdentityError::InvalidToken
            })?;

        data.claims
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .map(|email| Identity { email })
            .ok_or(IdentityError::MissingEmail)
    }
}
