//! Session service for token issuance, verification, and the session cookie
//!
//! Sessions are stateless: a signed HS256 token carries the user id,
//! username, and role, and validity is determined entirely by signature and
//! expiry. There is no server-side session table and no revocation list;
//! logout only clears the cookie, and a role change takes effect at the
//! next sign-in.

use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{Role, User};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "bookmart_session";

/// Session verification failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No session cookie on the request
    #[error("Authentication token required")]
    NoToken,
    /// Token expiry has passed
    #[error("Session expired, please sign in again")]
    Expired,
    /// Signature or structure failed to verify
    #[error("Invalid session token")]
    Invalid,
}

/// Session token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub username: String,
    /// Role as issued at sign-in; stale until re-authentication
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Session service
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
    cookie_secure: bool,
    cookie_domain: Option<String>,
}

impl SessionService {
    /// Initialize a new session service from the application configuration
    pub fn new(config: &AppConfig) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        SessionService {
            encoding_key: EncodingKey::from_secret(config.session_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.session_secret.as_bytes()),
            validation,
            ttl_seconds: config.session_ttl_seconds,
            cookie_secure: config.cookie_secure,
            cookie_domain: config.cookie_domain.clone(),
        }
    }

    /// Issue a signed session token for a user
    pub fn issue(&self, user: &User) -> anyhow::Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now,
            exp: now + self.ttl_seconds,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a token and return the claims
    ///
    /// Expired tokens and otherwise-invalid tokens fail with distinct
    /// variants so clients can tell them apart.
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid,
            })
    }

    /// Shared attribute set for the session cookie.
    ///
    /// Set and clear must agree on every attribute or the browser treats
    /// them as different cookies and logout silently fails; both go through
    /// this one builder.
    fn base_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE, value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Strict);
        cookie.set_secure(self.cookie_secure);
        if let Some(domain) = &self.cookie_domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    /// Build the session cookie carrying a freshly issued token
    pub fn cookie(&self, token: String) -> Cookie<'static> {
        let mut cookie = self.base_cookie(token);
        cookie.set_max_age(time::Duration::seconds(self.ttl_seconds as i64));
        cookie
    }

    /// Build the cookie used to clear the session at logout
    pub fn removal_cookie(&self) -> Cookie<'static> {
        self.base_cookie(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_config() -> AppConfig {
        AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            session_secret: "test-secret-do-not-use".to_string(),
            session_ttl_seconds: 3600,
            cookie_secure: true,
            cookie_domain: Some("bookmart.example".to_string()),
            order_webhook_url: None,
            admin_email: None,
        }
    }

    fn test_user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            username: "reader42".to_string(),
            email: "reader42@example.com".to_string(),
            password_hash: "$argon2id$irrelevant".to_string(),
            address: "42 Shelf Lane".to_string(),
            avatar: "https://example.com/avatar.png".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_tokens_verify_and_carry_the_identity() {
        let service = SessionService::new(&test_config());
        let user = test_user(Role::User);

        let token = service.issue(&user).expect("issue failed");
        let claims = service.verify(&token).expect("verify failed");

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "reader42");
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_tokens_fail_with_expired_not_invalid() {
        let service = SessionService::new(&test_config());
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Expired well past the default decode leeway
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "reader42".to_string(),
            role: Role::User,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-do-not-use"),
        )
        .unwrap();

        assert_eq!(service.verify(&token), Err(SessionError::Expired));
    }

    #[test]
    fn tampered_tokens_fail_with_invalid() {
        let service = SessionService::new(&test_config());
        let user = test_user(Role::User);
        let token = service.issue(&user).unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert_eq!(service.verify(&tampered), Err(SessionError::Invalid));

        let other_secret = EncodingKey::from_secret(b"a-different-secret");
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let forged = encode(
            &Header::default(),
            &Claims {
                sub: user.id,
                username: user.username,
                role: Role::Admin,
                iat: now,
                exp: now + 3600,
            },
            &other_secret,
        )
        .unwrap();
        assert_eq!(service.verify(&forged), Err(SessionError::Invalid));
    }

    #[test]
    fn role_in_the_token_is_the_role_at_issuance() {
        // A user promoted to admin after sign-in keeps the old role until
        // re-authentication; the token is the only source of truth.
        let service = SessionService::new(&test_config());
        let mut user = test_user(Role::User);
        let token = service.issue(&user).unwrap();

        user.role = Role::Admin;

        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn set_and_clear_cookies_share_every_attribute() {
        let service = SessionService::new(&test_config());
        let set = service.cookie("some-token".to_string());
        let clear = service.removal_cookie();

        assert_eq!(set.name(), clear.name());
        assert_eq!(set.path(), clear.path());
        assert_eq!(set.domain(), clear.domain());
        assert_eq!(set.http_only(), clear.http_only());
        assert_eq!(set.same_site(), clear.same_site());
        assert_eq!(set.secure(), clear.secure());
    }

    #[test]
    fn cookie_attributes_match_the_configuration() {
        let service = SessionService::new(&test_config());
        let cookie = service.cookie("some-token".to_string());

        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.domain(), Some("bookmart.example"));
        assert_eq!(
            cookie.max_age(),
            Some(time::Duration::seconds(3600))
        );
    }
}
