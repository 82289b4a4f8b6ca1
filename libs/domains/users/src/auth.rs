//! Admin-only access to the user endpoints.
//!
//! Handlers take an [`Admin`] as their first extractor and every service
//! method demands one, so no store access can happen before the role check.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_helpers::JwtClaims;

use crate::error::{UserError, UserResult};
use crate::models::Role;

/// Identity decoded from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub subject: String,
    /// `None` when the claim is missing, not a string or not a known role
    pub role: Option<Role>,
}

impl Caller {
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            subject: claims.sub.clone(),
            role: claims.role.as_deref().and_then(|r| r.parse().ok()),
        }
    }
}

/// Proof that the caller holds the admin role.
#[derive(Debug, Clone)]
pub struct Admin {
    subject: String,
}

impl Admin {
    pub fn authorize(caller: &Caller) -> UserResult<Self> {
        match caller.role {
            Some(Role::Admin) => Ok(Self {
                subject: caller.subject.clone(),
            }),
            _ => {
                tracing::debug!(subject = %caller.subject, role = ?caller.role, "Rejected non-admin caller");
                Err(UserError::Unauthorized)
            }
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl<S> FromRequestParts<S> for Admin
where
    S: Send + Sync,
{
    type Rejection = UserError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<JwtClaims>()
            .ok_or(UserError::Unauthorized)?;

        Admin::authorize(&Caller::from_claims(claims))
    }
}
