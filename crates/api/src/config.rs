use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use futurist_core::lockout::{
    LockoutPolicy, DEFAULT_ATTEMPT_WINDOW_MINS, DEFAULT_BLOCK_DURATION_MINS,
    DEFAULT_MAX_ATTEMPTS,
};
use futurist_core::validation::normalize_email;

use crate::auth::jwt::JwtConfig;

/// Deployment environment, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
    #[default]
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    pub fn as_str(self) -> &'static str {
        match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Test => "test",
            AppEnvironment::Production => "production",
        }
    }

    pub fn is_production(self) -> bool {
        self == AppEnvironment::Production
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppEnvironment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(AppEnvironment::Development),
            "test" => Ok(AppEnvironment::Test),
            "production" | "prod" => Ok(AppEnvironment::Production),
            other => Err(format!(
                "unknown APP_ENV '{other}' (expected development, test or production)"
            )),
        }
    }
}

/// Per-IP request rate limits applied by the governor layers.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Seconds to replenish one request on `/api/auth`.
    pub auth_period_secs: u64,
    pub auth_burst: u32,
    /// Milliseconds to replenish one request on the rest of `/api`.
    pub api_period_ms: u64,
    pub api_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_period_secs: 6,
            auth_burst: 10,
            api_period_ms: 500,
            api_burst: 100,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub environment: AppEnvironment,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Attach a synthetic user when no verifiable token is present.
    /// Never honored in production.
    pub auth_dev_fallback: bool,
    /// Read the client IP from proxy headers instead of the socket peer.
    pub trust_proxy_headers: bool,
    pub lockout: LockoutPolicy,
    pub rate_limit: RateLimitConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default                                        |
    /// |-------------------------------|------------------------------------------------|
    /// | `APP_ENV`                     | `development`                                  |
    /// | `HOST`                        | `0.0.0.0`                                      |
    /// | `PORT`                        | `5000`                                         |
    /// | `CORS_ORIGINS`                | `http://localhost:5173,http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS`        | `30`                                           |
    /// | `AUTH_DEV_FALLBACK`           | `false`                                        |
    /// | `TRUST_PROXY_HEADERS`         | `false`                                        |
    /// | `LOCKOUT_MAX_ATTEMPTS`        | `5`                                            |
    /// | `LOCKOUT_WINDOW_MINS`         | `15`                                           |
    /// | `LOCKOUT_BLOCK_MINS`          | `15`                                           |
    /// | `LOCKOUT_EXEMPT_EMAILS`       | demo accounts                                  |
    /// | `RATE_LIMIT_ENABLED`          | `true`                                         |
    /// | `RATE_LIMIT_AUTH_PERIOD_SECS` | `6`                                            |
    /// | `RATE_LIMIT_AUTH_BURST`       | `10`                                           |
    /// | `RATE_LIMIT_API_PERIOD_MS`    | `500`                                          |
    /// | `RATE_LIMIT_API_BURST`        | `100`                                          |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values, and when `AUTH_DEV_FALLBACK` is enabled in
    /// production.
    pub fn from_env() -> Self {
        let environment: AppEnvironment = std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".into())
            .parse()
            .unwrap_or_else(|e| panic!("{e}"));

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", 5000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", 30);

        let jwt = JwtConfig::from_env(environment);

        let auth_dev_fallback: bool = env_or("AUTH_DEV_FALLBACK", false);
        assert!(
            !(auth_dev_fallback && environment.is_production()),
            "AUTH_DEV_FALLBACK must not be enabled in production"
        );

        let trust_proxy_headers: bool = env_or("TRUST_PROXY_HEADERS", false);

        let mut lockout = LockoutPolicy {
            max_attempts: env_or("LOCKOUT_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            attempt_window: chrono::Duration::minutes(env_or(
                "LOCKOUT_WINDOW_MINS",
                DEFAULT_ATTEMPT_WINDOW_MINS,
            )),
            block_duration: chrono::Duration::minutes(env_or(
                "LOCKOUT_BLOCK_MINS",
                DEFAULT_BLOCK_DURATION_MINS,
            )),
            ..LockoutPolicy::default()
        };
        assert!(lockout.max_attempts > 0, "LOCKOUT_MAX_ATTEMPTS must be positive");
        if let Ok(list) = std::env::var("LOCKOUT_EXEMPT_EMAILS") {
            lockout.exempt_emails = parse_email_list(&list);
        }

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            enabled: env_or("RATE_LIMIT_ENABLED", defaults.enabled),
            auth_period_secs: env_or("RATE_LIMIT_AUTH_PERIOD_SECS", defaults.auth_period_secs),
            auth_burst: env_or("RATE_LIMIT_AUTH_BURST", defaults.auth_burst),
            api_period_ms: env_or("RATE_LIMIT_API_PERIOD_MS", defaults.api_period_ms),
            api_burst: env_or("RATE_LIMIT_API_BURST", defaults.api_burst),
        };

        Self {
            environment,
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            auth_dev_fallback,
            trust_proxy_headers,
            lockout,
            rate_limit,
        }
    }

    /// Whether the development auth fallback is in effect.
    pub fn dev_fallback_active(&self) -> bool {
        self.auth_dev_fallback && !self.environment.is_production()
    }
}

/// Read and parse an env var, falling back to `default` when unset.
///
/// Panics with the variable name when the value is present but unparsable.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} has an invalid value '{raw}': {e}")),
        Err(_) => default,
    }
}

/// Parse a comma-separated list of emails, normalized, blanks dropped.
fn parse_email_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(normalize_email)
        .filter(|e| !e.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_aliases() {
        assert_eq!("prod".parse::<AppEnvironment>().unwrap(), AppEnvironment::Production);
        assert_eq!(" Test ".parse::<AppEnvironment>().unwrap(), AppEnvironment::Test);
        assert!("staging".parse::<AppEnvironment>().is_err());
    }

    #[test]
    fn email_list_is_normalized() {
        let set = parse_email_list(" QA@Demo.com , ,ops@demo.com");
        assert_eq!(set.len(), 2);
        assert!(set.contains("qa@demo.com"));
        assert!(set.contains("ops@demo.com"));
    }

    #[test]
    fn dev_fallback_never_active_in_production() {
        let mut config = crate::test_support::config();
        config.auth_dev_fallback = true;
        assert!(config.dev_fallback_active());
        config.environment = AppEnvironment::Production;
        assert!(!config.dev_fallback_active());
    }
}
