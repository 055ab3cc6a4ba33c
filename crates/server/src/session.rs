use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use shared::domain::{Session, UserId};
use tracing::debug;

pub(crate) const SESSION_COOKIE: &str = "sb-access-token";

/// Access-token claims issued by the hosted auth service.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Claims {
    pub(crate) sub: String,
    #[serde(default)]
    pub(crate) email: Option<String>,
    pub(crate) exp: i64,
}

/// Turns request credentials into a [`Session`]. Without a secret every
/// request is anonymous.
pub(crate) struct SessionVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl SessionVerifier {
    pub(crate) fn new(secret: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        Self {
            key: secret.map(|secret| DecodingKey::from_secret(secret.as_bytes())),
            validation,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    pub(crate) fn verify(&self, token: &str) -> Option<Session> {
        let key = self.key.as_ref()?;
        match decode::<Claims>(token, key, &self.validation) {
            Ok(data) => Some(Session {
                user_id: UserId(data.claims.sub),
                email: data.claims.email,
                access_token: token.to_string(),
            }),
            Err(err) => {
                debug!(error = %err, "rejecting access token");
                None
            }
        }
    }

    pub(crate) fn from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        let token = bearer_token(headers).or_else(|| cookie_token(headers))?;
        self.verify(token)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn cookie_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
