//! Credentials and the authenticated session handle.
//!
//! Identity itself is out of scope — whatever backs authentication is assumed
//! to yield an opaque session identifier. This module carries just enough to
//! express the `Anonymous → Authenticated` edge: a credentials pair, the
//! synchronous validation applied to it, and the opaque [`SessionHandle`]
//! minted on success.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// An email/password pair as submitted by the presentation layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Validate shape: a plausible email and a non-empty password.
    pub(crate) fn validate(&self) -> Result<(), AuthError> {
        let email = self.email.trim();
        let plausible = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !plausible || self.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(())
    }

    /// Display name derived from the email local part.
    #[must_use]
    pub(crate) fn display_name(&self) -> String {
        self.email
            .trim()
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Opaque token identifying one authenticated period.
///
/// Minted on login, invalidated by logout. Carries the display name purely
/// as a consumer convenience.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    id: Uuid,
    display_name: String,
}

impl SessionHandle {
    pub(crate) fn mint(display_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name,
        }
    }

    /// Name shown to the user, derived from their email local part.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Synchronous authentication failures.
#[derive(Debug, Error, Diagnostic)]
pub enum AuthError {
    /// The email is malformed or the password empty.
    #[error("invalid credentials")]
    #[diagnostic(
        code(docweave::auth::invalid_credentials),
        help("Provide a well-formed email address and a non-empty password.")
    )]
    InvalidCredentials,

    /// A session is already active; log out first.
    #[error("already authenticated")]
    #[diagnostic(
        code(docweave::auth::already_authenticated),
        help("Call logout() before logging in again; login never implicitly discards a session.")
    )]
    AlreadyAuthenticated,
}
