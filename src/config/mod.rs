use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub seed_lookups: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub session_expiry_hours: u64,
    pub registration_expiry_minutes: u64,
    pub bcrypt_cost: u32,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Only ever used when APP_ENV is development and JWT_SECRET is unset.
const DEVELOPMENT_JWT_SECRET: &str = "survey-exchange-development-secret";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SURVEY_EXCHANGE_HOST") {
            self.server.bind_host = v;
        }
        if let Some(port) = env::var("SURVEY_EXCHANGE_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_SEED_LOOKUPS") {
            self.database.seed_lookups = v.parse().unwrap_or(self.database.seed_lookups);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours = v.parse().unwrap_or(self.security.session_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_REGISTRATION_EXPIRY_MINUTES") {
            self.security.registration_expiry_minutes =
                v.parse().unwrap_or(self.security.registration_expiry_minutes);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                seed_lookups: true,
            },
            security: SecurityConfig {
                jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
                session_expiry_hours: 24 * 7, // 1 week
                registration_expiry_minutes: 60,
                bcrypt_cost: 4,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                seed_lookups: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                session_expiry_hours: 24,
                registration_expiry_minutes: 30,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                bind_host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                seed_lookups: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                session_expiry_hours: 4,
                registration_expiry_minutes: 15,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_host, self.server.port)
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_development {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Development)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.jwt_secret, DEVELOPMENT_JWT_SECRET);
        assert!(config.database.seed_lookups);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(config.security.jwt_secret.is_empty());
        assert!(!config.database.seed_lookups);
        assert_eq!(config.security.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn jwt_secret_is_never_serialized() {
        let value = serde_json::to_value(AppConfig::development()).unwrap();
        assert!(value["security"].get("jwt_secret").is_none());
    }
}
