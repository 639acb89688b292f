//! Server configuration for the JSON:API service.
//!
//! Configuration is read from command line flags with environment variable
//! fallbacks, or built programmatically.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DICOTOPO_SERVER_PORT` | 8080 | Server port |
//! | `DICOTOPO_SERVER_HOST` | 127.0.0.1 | Host to bind |
//! | `DICOTOPO_LOG_LEVEL` | info | Log level |
//! | `DICOTOPO_REQUEST_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `DICOTOPO_ENABLE_CORS` | true | Enable CORS |
//! | `DICOTOPO_CORS_ORIGINS` | * | Allowed origins |
//! | `DICOTOPO_ENABLE_REQUEST_ID` | true | Generate and propagate `x-request-id` |
//! | `DICOTOPO_BASE_URL` | http://localhost:8080 | Scheme and host used in links |
//! | `DICOTOPO_URL_PREFIX` | /dico-topo | Mount prefix of the API |
//! | `DICOTOPO_API_VERSION` | 1.0 | Version path segment |
//! | `DICOTOPO_DATABASE_URL` | dicotopo.db | SQLite path or `:memory:` |
//! | `DICOTOPO_DEFAULT_PAGE_SIZE` | 200 | Default `page[size]` |
//! | `DICOTOPO_MAX_PAGE_SIZE` | 200 | Largest accepted `page[size]` |
//! | `DICOTOPO_SORT_DIRECTION` | per-field | `per-field` or `legacy-uniform` |
//! | `DICOTOPO_FILTER_VALUES` | all | `all` (AND) or `any` (OR) |
//!
//! # Example
//!
//! ```rust
//! use dicotopo_rest::ServerConfig;
//! use dicotopo_rest::config::SortDirectionMode;
//!
//! let config = ServerConfig {
//!     port: 3000,
//!     sort_direction: SortDirectionMode::LegacyUniform,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;

use clap::{Parser, ValueEnum};

use crate::pagination::PageLimits;
use crate::query::QueryOptions;

/// How the directions of several sort criteria combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SortDirectionMode {
    /// Each criterion keeps its own direction.
    #[default]
    PerField,
    /// Once any criterion is descending, every criterion is descending.
    LegacyUniform,
}

/// How several values given for one filtered field combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FilterValueMode {
    /// Every value is an equality predicate and all must hold.
    #[default]
    All,
    /// A resource matches when the field equals any of the values.
    Any,
}

impl fmt::Display for SortDirectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirectionMode::PerField => write!(f, "per-field"),
            SortDirectionMode::LegacyUniform => write!(f, "legacy-uniform"),
        }
    }
}

impl fmt::Display for FilterValueMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValueMode::All => write!(f, "all"),
            FilterValueMode::Any => write!(f, "any"),
        }
    }
}

/// Server configuration for the JSON:API service.
///
/// This struct can be constructed from command line arguments and the
/// environment using [`ServerConfig::parse`], or programmatically.
#[derive(Debug, Clone, Parser)]
#[command(name = "dicotopo")]
#[command(about = "Dicotopo gazetteer JSON:API server")]
pub struct ServerConfig {
    /// Port to listen on.
    #[arg(short, long, env = "DICOTOPO_SERVER_PORT", default_value = "8080")]
    pub port: u16,

    /// Host address to bind to.
    #[arg(long, env = "DICOTOPO_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "DICOTOPO_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Request timeout in seconds.
    #[arg(long, env = "DICOTOPO_REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout: u64,

    /// Enable CORS.
    #[arg(long, env = "DICOTOPO_ENABLE_CORS", default_value = "true")]
    pub enable_cors: bool,

    /// Allowed CORS origins (comma-separated, or * for all).
    #[arg(long, env = "DICOTOPO_CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Enable request ID tracking.
    #[arg(long, env = "DICOTOPO_ENABLE_REQUEST_ID", default_value = "true")]
    pub enable_request_id: bool,

    /// Scheme and authority prepended to every generated link.
    #[arg(long, env = "DICOTOPO_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Path prefix the API is mounted under (empty for the root).
    #[arg(long, env = "DICOTOPO_URL_PREFIX", default_value = "/dico-topo")]
    pub url_prefix: String,

    /// API version path segment.
    #[arg(long, env = "DICOTOPO_API_VERSION", default_value = "1.0")]
    pub api_version: String,

    /// SQLite database path, or `:memory:`.
    #[arg(long, env = "DICOTOPO_DATABASE_URL", default_value = "dicotopo.db")]
    pub database_url: String,

    /// Page size used when only `page[number]` is given.
    #[arg(long, env = "DICOTOPO_DEFAULT_PAGE_SIZE", default_value = "200")]
    pub default_page_size: u64,

    /// Largest page size a client may request.
    #[arg(long, env = "DICOTOPO_MAX_PAGE_SIZE", default_value = "200")]
    pub max_page_size: u64,

    /// How directions of multiple sort criteria combine.
    #[arg(long, env = "DICOTOPO_SORT_DIRECTION", value_enum, default_value_t = SortDirectionMode::PerField)]
    pub sort_direction: SortDirectionMode,

    /// How multiple values of one filter combine.
    #[arg(long, env = "DICOTOPO_FILTER_VALUES", value_enum, default_value_t = FilterValueMode::All)]
    pub filter_values: FilterValueMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            log_level: "info".to_string(),
            request_timeout: 30,
            enable_cors: true,
            cors_origins: "*".to_string(),
            enable_request_id: true,
            base_url: "http://localhost:8080".to_string(),
            url_prefix: "/dico-topo".to_string(),
            api_version: "1.0".to_string(),
            database_url: "dicotopo.db".to_string(),
            default_page_size: 200,
            max_page_size: 200,
            sort_direction: SortDirectionMode::PerField,
            filter_values: FilterValueMode::All,
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the path under which resource types are routed, for example
    /// `/dico-topo/api/1.0`.
    pub fn api_path(&self) -> String {
        format!("{}/api/{}", self.url_prefix.trim_end_matches('/'), self.api_version)
    }

    /// Returns the base URL without a trailing slash.
    pub fn link_base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Returns the default page limits.
    pub fn page_limits(&self) -> PageLimits {
        PageLimits::new(self.default_page_size, self.max_page_size)
    }

    /// Returns the query parsing options.
    pub fn query_options(&self) -> QueryOptions {
        QueryOptions {
            sort_direction: self.sort_direction,
            filter_values: self.filter_values,
        }
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.port == 0 {
            errors.push("Port cannot be 0".to_string());
        }

        if self.request_timeout == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.default_page_size == 0 {
            errors.push("Default page size cannot be 0".to_string());
        }

        if self.max_page_size == 0 {
            errors.push("Max page size cannot be 0".to_string());
        }

        if self.default_page_size > self.max_page_size {
            errors.push("Default page size cannot exceed max page size".to_string());
        }

        if !self.url_prefix.is_empty() && !self.url_prefix.starts_with('/') {
            errors.push(format!(
                "URL prefix '{}' must start with '/'",
                self.url_prefix
            ));
        }

        if self.api_version.is_empty() || self.api_version.contains('/') {
            errors.push(format!("Invalid API version '{}'", self.api_version));
        }

        if url::Url::parse(&self.base_url).is_err() {
            errors.push(format!("Base URL '{}' is not an absolute URL", self.base_url));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a configuration suitable for testing.
    ///
    /// Uses small page limits and disables layers that add response
    /// headers.
    pub fn for_testing() -> Self {
        Self {
            port: 0,
            log_level: "debug".to_string(),
            request_timeout: 5,
            enable_cors: false,
            enable_request_id: false,
            base_url: "http://localhost".to_string(),
            database_url: ":memory:".to_string(),
            default_page_size: 10,
            max_page_size: 50,
            ..Default::default()
        }
    }
}
