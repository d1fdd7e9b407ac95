// SPDX-FileCopyrightText: 2026 Oasis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token middleware for the inbox API.
//!
//! When no token is configured, all requests are rejected (fail-closed).

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

/// Authentication configuration for the inbox API.
#[derive(Clone)]
pub struct AuthConfig {
    /// Expected bearer token. `None` rejects every request.
    pub bearer_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

impl AuthConfig {
    fn accepts(&self, header: Option<&str>) -> bool {
        let Some(expected) = self.bearer_token.as_deref() else {
            return false;
        };
        header
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected)
    }
}

/// Middleware that requires `Authorization: Bearer <token>`.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if auth.bearer_token.is_none() {
        tracing::error!("gateway.bearer_token is not configured, rejecting inbox API request");
        return Err(StatusCode::UNAUTHORIZED);
    }

    let header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());
    if auth.accepts(header) {
        Ok(next.run(request).await)
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(token: Option<&str>) -> AuthConfig {
        AuthConfig {
            bearer_token: token.map(String::from),
        }
    }

    #[test]
    fn matching_bearer_is_accepted() {
        assert!(config(Some("secret")).accepts(Some("Bearer secret")));
    }

    #[test]
    fn wrong_or_malformed_header_is_rejected() {
        let auth = config(Some("secret"));
        assert!(!auth.accepts(Some("Bearer nope")));
        assert!(!auth.accepts(Some("secret")));
        assert!(!auth.accepts(Some("Basic secret")));
        assert!(!auth.accepts(None));
    }

    #[test]
    fn missing_token_fails_closed() {
        assert!(!config(None).accepts(Some("Bearer ")));
    }

    #[test]
    fn debug_redacts_token() {
        let debug = format!("{:?}", config(Some("secret-token")));
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[redacted]"));
    }
}
