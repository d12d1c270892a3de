//! PolyRisk core library
//!
//! This module exports the core functionality of the PolyRisk
//! polypharmacy risk assessment service.

pub mod ai;
pub mod analytics;
pub mod api;
pub mod assistant;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod interactions;
pub mod models;
pub mod risk;
pub mod store;
pub mod utils;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize)]
    pub struct Config {
        pub server: ServerConfig,
        pub catalog: CatalogConfig,
        pub ai: AiConfig,
        pub store: StoreConfig,
        pub auth: AuthConfig,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ServerConfig {
        pub host: String,
        pub port: u16,
        #[serde(default)]
        pub cors_origins: Vec<String>,
        pub web_root: Option<String>,
        pub tls: Option<TlsConfig>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct TlsConfig {
        pub cert_path: String,
        pub key_path: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct CatalogConfig {
        pub drugs_path: String,
        pub interactions_path: String,
        pub max_interaction_rows: usize,
        pub search_limit: usize,
        pub min_query_len: usize,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct AiConfig {
        pub base_url: String,
        pub model: String,
        #[serde(default)]
        pub api_key: String,
        pub timeout_secs: u64,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct StoreConfig {
        pub data_dir: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct AuthConfig {
        pub enabled: bool,
        #[serde(default)]
        pub secret: String,
    }

    /// Load configuration from file and environment
    pub fn load_config() -> Result<Config, config::ConfigError> {
        let env = std::env::var("POLYRISK_ENV").unwrap_or_else(|_| "development".into());

        // Start with default settings, override with environment-specific
        // settings, then with POLYRISK__-style environment variables.
        config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                config::Environment::with_prefix("POLYRISK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
