//! Application configuration loaded from environment variables.
//!
//! Secrets are read once at startup and cached in memory. In hosted
//! deployments they arrive as env vars via the platform's secret bindings,
//! so no direct secret-manager calls are needed.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Supabase project URL (public)
    pub supabase_url: String,
    /// Supabase anon key (public, used for identity verification)
    pub supabase_anon_key: String,
    /// Frontend URL for CORS and redirect targets
    pub frontend_url: String,
    /// Checkout session endpoint (hosted payment function)
    pub checkout_url: String,
    /// Free-tier squad member limit
    pub free_member_limit: usize,
    /// Static premium allow-list (ops scaffolding, comma-separated emails)
    pub premium_allowlist: Vec<String>,
    /// Server port
    pub port: u16,

    // --- Secrets (injected as env vars) ---
    /// Supabase service-role key (premium registry writes)
    pub supabase_service_key: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Payment webhook signing secret (HMAC-SHA256)
    pub payment_webhook_secret: String,
    /// Invite code signing key (raw bytes)
    pub invite_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8888".to_string()),
            checkout_url: env::var("CHECKOUT_URL").unwrap_or_else(|_| {
                "http://localhost:8888/.netlify/functions/create-checkout-session".to_string()
            }),
            free_member_limit: env::var("FREE_MEMBER_LIMIT")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            premium_allowlist: env::var("PREMIUM_ALLOWLIST")
                .map(|v| parse_allowlist(&v))
                .unwrap_or_default(),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_KEY"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            payment_webhook_secret: env::var("PAYMENT_WEBHOOK_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("PAYMENT_WEBHOOK_SECRET"))?,
            invite_signing_key: env::var("INVITE_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("INVITE_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// Default config for tests only.
    pub fn test_default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test_anon_key".to_string(),
            frontend_url: "http://localhost:8888".to_string(),
            checkout_url: "http://localhost:8888/checkout".to_string(),
            free_member_limit: 1,
            premium_allowlist: Vec::new(),
            port: 8080,
            supabase_service_key: "test_service_key".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            payment_webhook_secret: "test_webhook_secret".to_string(),
            invite_signing_key: b"test_invite_key".to_vec(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::test_default()
    }
}

/// Split a comma-separated allow-list, normalizing to lowercase.
fn parse_allowlist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_allowlist() {
        let list = parse_allowlist("Kaycheckmate@gmail.com, truesliks@gmail.com,,");
        assert_eq!(list, vec!["kaycheckmate@gmail.com", "truesliks@gmail.com"]);
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("SUPABASE_URL", "http://localhost:54321/");
        env::set_var("SUPABASE_ANON_KEY", "anon");
        env::set_var("SUPABASE_SERVICE_KEY", "service");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("PAYMENT_WEBHOOK_SECRET", "whsec");
        env::set_var("INVITE_SIGNING_KEY", "invite_key");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.supabase_url, "http://localhost:54321");
        assert_eq!(config.port, 8080);
        assert_eq!(config.free_member_limit, 1);
    }
}
