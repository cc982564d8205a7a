//! Application configuration
//!
//! All configuration is read from the environment once at startup and held
//! in an immutable struct shared through the application state. Nothing
//! re-reads the environment per request.

use anyhow::Result;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// Origins allowed by the CORS layer (the storefront)
    pub allowed_origins: Vec<String>,
    /// Secret used to sign session tokens
    pub session_secret: String,
    /// Session token lifetime in seconds (default: 7 days)
    pub session_ttl_seconds: u64,
    /// Whether the session cookie carries the Secure attribute
    pub cookie_secure: bool,
    /// Optional Domain attribute for the session cookie
    pub cookie_domain: Option<String>,
    /// Webhook receiving order notifications, if configured
    pub order_webhook_url: Option<String>,
    /// Admin address included in order notifications
    pub admin_email: Option<String>,
}

impl AppConfig {
    /// Create a new AppConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BIND_ADDR`: listen address (default: "0.0.0.0:3000")
    /// - `ALLOWED_ORIGINS`: comma-separated origin allow-list
    ///   (default: "http://localhost:5173")
    /// - `SESSION_SECRET`: token signing secret (required)
    /// - `SESSION_TTL_SECONDS`: token lifetime (default: 604800)
    /// - `COOKIE_SECURE`: set the Secure cookie attribute (default: true)
    /// - `COOKIE_DOMAIN`: cookie Domain attribute (default: unset)
    /// - `ORDER_WEBHOOK_URL`: order notification webhook (default: unset)
    /// - `ADMIN_EMAIL`: admin address for order notifications (default: unset)
    pub fn from_env() -> Result<Self> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let session_secret = std::env::var("SESSION_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_SECRET environment variable not set"))?;

        let session_ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .unwrap_or_else(|_| "604800".to_string()) // 7 days
            .parse()
            .unwrap_or(604800);

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let cookie_domain = std::env::var("COOKIE_DOMAIN").ok().filter(|s| !s.is_empty());

        let order_webhook_url = std::env::var("ORDER_WEBHOOK_URL")
            .ok()
            .filter(|s| !s.is_empty());

        let admin_email = std::env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty());

        Ok(AppConfig {
            bind_addr,
            allowed_origins,
            session_secret,
            session_ttl_seconds,
            cookie_secure,
            cookie_domain,
            order_webhook_url,
            admin_email,
        })
    }
}
