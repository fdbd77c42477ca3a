//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Input validation limits.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as read from configuration sources.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    3600 // 1 hour
}

/// Bounds applied to user-supplied values.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Upper bound (inclusive) for any monetary amount.
    #[serde(default = "default_max_amount")]
    pub max_amount: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_amount: default_max_amount(),
        }
    }
}

fn default_max_amount() -> u32 {
    1_000_000
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CAMPUS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("CAMPUS__DATABASE__URL", Some("postgres://localhost/campus_test")),
                ("CAMPUS__JWT__SECRET", Some("test-secret")),
                ("CAMPUS__SERVER__PORT", None),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/campus_test");
                assert_eq!(config.jwt.secret, "test-secret");
                assert_eq!(config.jwt.access_token_expiry_secs, 3600);
                assert_eq!(config.server.port, 5000);
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.validation.max_amount, 1_000_000);
            },
        );
    }

    #[test]
    fn test_environment_overrides_port_and_limits() {
        temp_env::with_vars(
            [
                ("CAMPUS__DATABASE__URL", Some("postgres://localhost/campus_test")),
                ("CAMPUS__JWT__SECRET", Some("test-secret")),
                ("CAMPUS__SERVER__PORT", Some("8081")),
                ("CAMPUS__VALIDATION__MAX_AMOUNT", Some("5000")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.server.port, 8081);
                assert_eq!(config.validation.max_amount, 5000);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("CAMPUS__DATABASE__URL", None::<&str>),
                ("CAMPUS__JWT__SECRET", Some("test-secret")),
                ("RUN_MODE", Some("test-nonexistent")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
