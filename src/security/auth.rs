//! Authentication gate.
//!
//! Protected routes consult the gate before anything is forwarded. The
//! gateway consumes a single pass/fail decision; credential parsing and
//! verification live behind the [`AuthGate`] trait.

use std::collections::HashMap;

use axum::http::{header, request::Parts, StatusCode};
use futures_util::future::BoxFuture;

use crate::config::schema::AuthConfig;

/// Identity attached to a request that passed the gate.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub subject: String,
}

/// A rejected request, carrying the status the gate wants surfaced.
#[derive(Clone, Debug)]
pub struct AuthDenied {
    pub status: StatusCode,
    pub message: String,
}

impl AuthDenied {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }
}

/// Credential check for protected routes.
///
/// Implementations may suspend (remote token introspection, key lookup);
/// they must be internally thread-safe.
pub trait AuthGate: Send + Sync {
    fn authorize<'a>(&'a self, parts: &'a Parts) -> BoxFuture<'a, Result<AuthContext, AuthDenied>>;
}

/// Gate that accepts a fixed set of bearer tokens from configuration.
pub struct StaticTokenGate {
    /// token -> subject
    keys: HashMap<String, String>,
}

impl StaticTokenGate {
    pub fn from_config(config: &AuthConfig) -> Self {
        let keys = config
            .keys
            .iter()
            .map(|k| (k.key.clone(), k.subject.clone()))
            .collect();
        Self { keys }
    }
}

impl AuthGate for StaticTokenGate {
    fn authorize<'a>(&'a self, parts: &'a Parts) -> BoxFuture<'a, Result<AuthContext, AuthDenied>> {
        Box::pin(async move {
            let header_value = parts
                .headers
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .ok_or_else(|| AuthDenied::unauthorized("Missing Authorization header."))?;

            let token = header_value
                .strip_prefix("Bearer ")
                .ok_or_else(|| AuthDenied::unauthorized("Malformed Authorization header."))?;

            match self.keys.get(token) {
                Some(subject) => Ok(AuthContext {
                    subject: subject.clone(),
                }),
                None => Err(AuthDenied::forbidden("Invalid credentials.")),
            }
        })
    }
}
