use crate::auth::token::{Claims, TokenIssuer};
use crate::core::{Result, ShopError};
use http::{HeaderMap, Request, header};
use std::sync::Arc;
use tracing::warn;

const BEARER: &str = "bearer";

/// Role requirement of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Any valid token
    Authenticated,
    /// A valid token whose role is `admin`
    Admin,
}

/// Request-pipeline authentication and role gating.
///
/// Only needs the token verifier, never the document store.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    tokens: Arc<TokenIssuer>,
}

impl AuthGuard {
    pub fn new(tokens: Arc<TokenIssuer>) -> Self {
        Self { tokens }
    }

    /// Token from an `Authorization: Bearer <token>` header.
    pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case(BEARER) {
            return None;
        }

        let token = token.trim();
        (!token.is_empty()).then_some(token)
    }

    /// Verified claims of the request's bearer token
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Claims> {
        let token = Self::bearer_token(headers)
            .ok_or_else(|| ShopError::Unauthenticated("no token provided".to_string()))?;

        self.tokens.verify(token).map_err(|_| {
            warn!("request rejected: invalid token");
            ShopError::Unauthenticated("invalid token".to_string())
        })
    }

    /// Role step for admin-only routes
    pub fn require_admin(claims: &Claims) -> Result<()> {
        if !claims.is_admin() {
            warn!(id = %claims.id, role = %claims.role, "request rejected: admin required");
            return Err(ShopError::Forbidden("admin access required".to_string()));
        }
        Ok(())
    }

    /// Authenticates `request`, attaches the claims to its extensions, then
    /// applies the role requirement.
    pub fn authorize<B>(&self, request: &mut Request<B>, access: Access) -> Result<Claims> {
        let claims = self.authenticate(request.headers())?;
        request.extensions_mut().insert(claims.clone());

        if access == Access::Admin {
            Self::require_admin(&claims)?;
        }

        Ok(claims)
    }
}

/// Claims attached by [`AuthGuard::authorize`]
pub fn identity<B>(request: &Request<B>) -> Option<&Claims> {
    request.extensions().get::<Claims>()
}
