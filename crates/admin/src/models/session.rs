//! Store sessions and how they are resolved from a request context.
//!
//! BigCommerce loads the app inside the control panel with a
//! `signed_payload_jwt`: an HS256 token signed with the app's client secret
//! whose `sub` claim is `stores/<store_hash>`. The page passes that token on as
//! the `context` query parameter. A [`SessionResolver`] verifies it and turns
//! it into the store hash and access token used for catalog calls.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::{AppAuthConfig, BigCommerceConfig};

/// Issuer BigCommerce puts on signed payloads.
const SIGNED_PAYLOAD_ISSUER: &str = "bc";

/// Credentials for one store, resolved once per request.
#[derive(Clone)]
pub struct StoreSession {
    /// Store hash (the `{store_hash}` path segment of API URLs).
    pub store_hash: String,
    /// Access token sent as `X-Auth-Token`.
    pub access_token: SecretString,
}

impl StoreSession {
    /// Create a session from its parts.
    #[must_use]
    pub fn new(store_hash: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            store_hash: store_hash.into(),
            access_token,
        }
    }
}

impl std::fmt::Debug for StoreSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSession")
            .field("store_hash", &self.store_hash)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Resolves the `context` query parameter of a request to a store session.
pub trait SessionResolver: Send + Sync {
    /// Returns `None` when the context is not a valid credential for a known store.
    fn resolve(&self, context: &str) -> Option<StoreSession>;
}

/// Claims read from a signed payload. Expiry, audience and issuer are checked
/// by [`Validation`].
#[derive(Debug, Deserialize)]
struct SignedPayloadClaims {
    sub: String,
}

/// Resolver for the single store configured through the environment.
///
/// Only a token signed with the app's client secret, addressed to the app's
/// client id, unexpired, and naming the configured store yields a session. A
/// bare store hash is never accepted.
pub struct SignedContextResolver {
    session: StoreSession,
    subject: String,
    key: DecodingKey,
    validation: Validation,
}

impl SignedContextResolver {
    /// Create a resolver for the configured store and app credentials.
    #[must_use]
    pub fn new(bigcommerce: &BigCommerceConfig, auth: &AppAuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[auth.client_id.as_str()]);
        validation.set_issuer(&[SIGNED_PAYLOAD_ISSUER]);
        validation.set_required_spec_claims(&["exp", "aud", "iss", "sub"]);

        Self {
            session: StoreSession::new(
                bigcommerce.store_hash.clone(),
                bigcommerce.access_token.clone(),
            ),
            subject: format!("stores/{}", bigcommerce.store_hash),
            key: DecodingKey::from_secret(auth.client_secret.expose_secret().as_bytes()),
            validation,
        }
    }
}

impl std::fmt::Debug for SignedContextResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedContextResolver")
            .field("session", &self.session)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl SessionResolver for SignedContextResolver {
    fn resolve(&self, context: &str) -> Option<StoreSession> {
        let token = context.trim();
        let claims = match decode::<SignedPayloadClaims>(token, &self.key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "Store context failed verification");
                return None;
            }
        };

        if claims.sub != self.subject {
            tracing::debug!(subject = %claims.sub, "Store context names another store");
            return None;
        }

        Some(self.session.clone())
    }
}
