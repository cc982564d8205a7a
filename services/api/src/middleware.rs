//! Middleware for session verification and the authorization gates

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::Role,
    session::{SESSION_COOKIE, SessionError},
    state::AppState,
};

/// The authenticated caller, as proven by the session token.
///
/// Self-service handlers scope every query through `user_id`; client-supplied
/// user ids are never trusted. Admin handlers additionally call
/// [`Identity::require_admin`].
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl Identity {
    /// Role gate for the admin surface
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

/// Extract and verify the session cookie, attaching the caller's identity
/// to the request for downstream handlers.
///
/// Verification is stateless: no user-store round trip happens here, so the
/// role reflects what was issued at sign-in.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(SessionError::NoToken)?;

    let claims = state.session_service.verify(&token)?;

    req.extensions_mut().insert(Identity {
        user_id: claims.sub,
        username: claims.username,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_gate_rejects_plain_users() {
        let identity = Identity {
            user_id: Uuid::new_v4(),
            username: "reader42".to_string(),
            role: Role::User,
        };
        assert!(matches!(
            identity.require_admin(),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn admin_gate_admits_admins() {
        let identity = Identity {
            user_id: Uuid::new_v4(),
            username: "shopkeeper".to_string(),
            role: Role::Admin,
        };
        assert!(identity.require_admin().is_ok());
    }
}
