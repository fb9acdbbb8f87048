//! Configuration module - environment and file-based configuration.
//!
//! Settings are layered from defaults, optional config files and
//! `TALENTDESK`-prefixed environment variables.

use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};

use crate::routing::RoutePolicy;

/// Main console configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub provider: ProviderSettings,
    pub routes: RouteSettings,
    pub logging: LoggingConfig,
}

/// Remote identity provider endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Base URL of the provider's REST surface
    pub base_url: String,
    /// Public API key sent with every request
    pub api_key: String,
}

/// Route names the guard policy is built from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSettings {
    pub login: String,
    pub landing: String,
    pub guest_only: Vec<String>,
    pub public: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            provider: ProviderSettings {
                base_url: "http://127.0.0.1:54321/".to_string(),
                api_key: String::new(),
            },
            routes: RouteSettings {
                login: "/login".to_string(),
                landing: "/dashboard".to_string(),
                guest_only: vec![
                    "/login".to_string(),
                    "/register".to_string(),
                    "/password-reset".to_string(),
                    "/forgot-password".to_string(),
                ],
                public: vec![],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file (YAML/TOML)
    /// 3. Default values (lowest priority)
    pub fn load() -> Result<Self, ConfigError> {
        if std::path::Path::new(".env").exists() {
            dotenvy::dotenv().ok();
        }

        let builder = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("TALENTDESK").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// Load configuration with custom file path.
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path.as_ref()))
            .add_source(config::Environment::with_prefix("TALENTDESK").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// Guard policy derived from the route settings.
    pub fn route_policy(&self) -> RoutePolicy {
        RoutePolicy {
            login_route: self.routes.login.clone(),
            landing_route: self.routes.landing.clone(),
            guest_only: self.routes.guest_only.clone(),
            public: self.routes.public.clone(),
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        url::Url::parse(&self.provider.base_url)
            .map_err(|e| format!("provider.base_url is not a valid URL: {e}"))?;

        for (name, route) in [("routes.login", &self.routes.login), ("routes.landing", &self.routes.landing)] {
            if !route.starts_with('/') {
                return Err(format!("{name} must start with '/'"));
            }
        }

        Ok(())
    }
}
