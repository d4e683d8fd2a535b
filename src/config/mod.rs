use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub pagination: PaginationConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Page size used when a list request carries no `limit`
    pub default_limit: u64,
    /// Hard cap applied to any requested limit; `None` disables the cap
    pub max_limit: Option<u64>,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    /// chrono pattern used to render date columns in responses
    pub date_format: String,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    /// Header carrying the acting user id, set by the upstream auth proxy
    pub principal_header: String,
}

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
        // Pagination overrides
        if let Ok(v) = env::var("PAGINATION_DEFAULT_LIMIT") {
            self.pagination.default_limit = v.parse().unwrap_or(self.pagination.default_limit);
        }
        if let Ok(v) = env::var("PAGINATION_MAX_LIMIT") {
            self.pagination.max_limit = v.parse().ok();
        }
        if let Ok(v) = env::var("PAGINATION_DEBUG_LOGGING") {
            self.pagination.debug_logging = v.parse().unwrap_or(self.pagination.debug_logging);
        }

        // Database overrides
        match env::var("DATABASE_BACKEND").as_deref() {
            Ok("memory") => self.database.backend = StorageBackend::Memory,
            Ok("postgres") => self.database.backend = StorageBackend::Postgres,
            _ if env::var("DATABASE_URL").is_err() => self.database.backend = StorageBackend::Memory,
            _ => {}
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // API overrides
        if let Ok(v) = env::var("PORT") {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_DATE_FORMAT") {
            self.api.date_format = v;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("SECURITY_PRINCIPAL_HEADER") {
            self.security.principal_header = v.to_ascii_lowercase();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: Some(1000),
                debug_logging: true,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            api: ApiConfig {
                port: 5000,
                date_format: DEFAULT_DATE_FORMAT.to_string(),
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                principal_header: DEFAULT_PRINCIPAL_HEADER.to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: Some(500),
                debug_logging: false,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            api: ApiConfig {
                port: 5000,
                date_format: DEFAULT_DATE_FORMAT.to_string(),
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
                principal_header: DEFAULT_PRINCIPAL_HEADER.to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            pagination: PaginationConfig {
                default_limit: 10,
                max_limit: Some(100),
                debug_logging: false,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            api: ApiConfig {
                port: 5000,
                date_format: DEFAULT_DATE_FORMAT.to_string(),
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
                principal_header: DEFAULT_PRINCIPAL_HEADER.to_string(),
            },
        }
    }
}

/// `MMM D, YYYY h A`, e.g. `Mar 5, 2024 3 PM`
pub const DEFAULT_DATE_FORMAT: &str = "%b %-d, %Y %-I %p";
pub const DEFAULT_PRINCIPAL_HEADER: &str = "x-user-id";

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
