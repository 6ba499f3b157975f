//! Server configuration

use crate::BoxError;

/// Server configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    /// HTTP port
    pub http_port: u16,
    /// PostgreSQL connection URL; `None` runs on the in-memory store
    pub database_url: Option<String>,
    /// HS256 secret shared with the login service
    pub jwt_secret: String,
    /// Tenant key used for IP literals and dotless hosts
    pub fallback_tenant: String,
    /// Seed a demo tenant on startup
    pub seed_demo: bool,
    /// Directory for daily rolling log files
    pub log_dir: Option<String>,
    /// Permissive CORS for browser clients served from other origins
    pub cors_allow_any: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn flag(name: &str, default: bool) -> bool {
        std::env::var(name)
            .ok()
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_dev = environment == "development";

        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            fallback_tenant: std::env::var("FALLBACK_TENANT")
                .ok()
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "default".into()),
            seed_demo: Self::flag("SEED_DEMO", is_dev),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            cors_allow_any: Self::flag("CORS_ALLOW_ANY", true),
            environment,
        })
    }
}
