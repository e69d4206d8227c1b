use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub escrow: EscrowConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
}

/// Comma-separated admin email allow-list. Parsed once into the
/// AdminDirectory at startup; nothing else reads this string.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AdminConfig {
    #[serde(default)]
    pub emails: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EscrowConfig {
    pub auto_release_days: i64,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self { auto_release_days: 14 }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("escrow.auto_release_days", 14)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with TROVE__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("TROVE").separator("__"))

            .build()?;

        config.try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite://trove.db".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
            },
            admin: AdminConfig::default(),
            escrow: EscrowConfig::default(),
        }
    }
}
