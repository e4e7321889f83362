//! Bearer-token authentication and role checks.
//!
//! Two credential kinds are accepted: a session token resolved through the
//! store, or the configured `ADMIN_TOKEN` (compared in constant time),
//! which acts as a superAdmin without a user row.  Role rejection happens
//! before any data access.

use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

use pledge_store::{StoreError, User};

use pledge_shared::Role;

use crate::api::AppState;
use crate::error::ApiError;

/// The authenticated caller.  `user` is `None` only for `ADMIN_TOKEN` auth.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: Option<User>,
    pub role: Role,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers.get("authorization")?.to_str().ok()?;
    Some(auth.strip_prefix("Bearer ").unwrap_or(auth))
}

fn matches_admin_token(token: &str, expected: &str) -> bool {
    // Constant-time comparison to prevent timing attacks on the token.
    let token_bytes = token.as_bytes();
    let expected_bytes = expected.as_bytes();
    token_bytes.len() == expected_bytes.len()
        && token_bytes.ct_eq(expected_bytes).unwrap_u8() == 1
}

/// Resolve the caller from the Authorization header.
pub async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<AuthContext, ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Err(ApiError::Forbidden("Missing bearer token".into()));
    };

    if let Some(ref expected) = state.config.admin_token {
        if matches_admin_token(token, expected) {
            return Ok(AuthContext {
                user: None,
                role: Role::SuperAdmin,
            });
        }
    }

    let db = state.db.lock().await;
    match db.find_user_by_session(token) {
        Ok(user) => {
            let role = user.role;
            Ok(AuthContext {
                user: Some(user),
                role,
            })
        }
        Err(StoreError::NotFound) => Err(ApiError::Forbidden("Invalid or expired session".into())),
        Err(other) => Err(other.into()),
    }
}

/// Require the configured admin token itself.  Session tokens are not
/// accepted here, superAdmin or otherwise; this guards the session-minting
/// exchange used by the trusted auth frontend.
pub fn require_admin_token(headers: &HeaderMap, state: &AppState) -> Result<(), ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Err(ApiError::Forbidden("Missing bearer token".into()));
    };
    match state.config.admin_token {
        Some(ref expected) if matches_admin_token(token, expected) => Ok(()),
        _ => Err(ApiError::Forbidden("Admin token required".into())),
    }
}

/// Authenticate and require an analytics-capable role (moderator or above).
pub async fn require_analytics_role(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<AuthContext, ApiError> {
    let ctx = authenticate(headers, state).await?;
    if !ctx.role.can_view_analytics() {
        return Err(ApiError::Forbidden(
            "Analytics access requires a moderator role".into(),
        ));
    }
    Ok(ctx)
}

/// Authenticate and require a real user session (the admin token alone is
/// not enough when the operation must be attributed to a user).
pub async fn require_session_user(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<User, ApiError> {
    let ctx = authenticate(headers, state).await?;
    ctx.user.ok_or_else(|| {
        ApiError::Forbidden("This operation requires a user session".into())
    })
}
