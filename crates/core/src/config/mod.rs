//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SMARTTASK_SW_*)
//! 2. TOML config file (if SMARTTASK_SW_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::GenerationSet;
use crate::router::Router;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SMARTTASK_SW_*)
/// 2. TOML config file (if SMARTTASK_SW_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via SMARTTASK_SW_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the worker is registered for. Relative URLs and the
    /// precache list resolve against it.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Application name, used as notification title and offline page heading.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Prefix shared by every cache generation name.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Version tag of the current build. Changing it invalidates every
    /// generation on the next activation.
    ///
    /// Set via SMARTTASK_SW_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Paths stored in the static generation at install time.
    #[serde(default = "default_precache_assets")]
    pub precache_assets: Vec<String>,

    /// Requests under this path prefix are served network-first.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Build output directory whose contents are served cache-first.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Web app manifest path, served cache-first.
    #[serde(default = "default_manifest_path")]
    pub manifest_path: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SMARTTASK_SW_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SMARTTASK_SW_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via SMARTTASK_SW_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./smarttask-sw-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_app_name() -> String {
    "SmartTask".into()
}

fn default_cache_prefix() -> String {
    "smarttask".into()
}

fn default_cache_version() -> String {
    "1.0.0".into()
}

fn default_precache_assets() -> Vec<String> {
    ["/", "/manifest.json", "/icon-192x192.png", "/icon-512x512.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_static_dir() -> String {
    "/_next/static/".into()
}

fn default_manifest_path() -> String {
    "/manifest.json".into()
}

fn default_user_agent() -> String {
    "smarttask-sw/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            app_name: default_app_name(),
            cache_prefix: default_cache_prefix(),
            cache_version: default_cache_version(),
            precache_assets: default_precache_assets(),
            api_prefix: default_api_prefix(),
            static_dir: default_static_dir(),
            manifest_path: default_manifest_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SMARTTASK_SW_`
    /// 2. TOML file from `SMARTTASK_SW_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SMARTTASK_SW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SMARTTASK_SW_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Parsed origin URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `origin` is not an absolute URL.
    pub fn origin_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })
    }

    /// The three generation names of the current build.
    pub fn generations(&self) -> GenerationSet {
        GenerationSet::new(&self.cache_prefix, &self.cache_version)
    }

    /// Router configured with this build's path rules.
    pub fn router(&self) -> Router {
        Router::new(&self.api_prefix, &self.static_dir, &self.manifest_path)
    }
}
