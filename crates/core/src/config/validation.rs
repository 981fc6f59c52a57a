//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - a name or version field is empty
    /// - `origin` is not an absolute http(s) URL
    /// - a path rule or precache asset is not absolute
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        for (field, value) in [
            ("user_agent", &self.user_agent),
            ("app_name", &self.app_name),
            ("cache_prefix", &self.cache_prefix),
            ("cache_version", &self.cache_version),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }

        let origin = self.origin_url()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid("origin", "must use http or https"));
        }

        for (field, value) in [
            ("api_prefix", &self.api_prefix),
            ("static_dir", &self.static_dir),
            ("manifest_path", &self.manifest_path),
        ] {
            if !value.starts_with('/') {
                return Err(invalid(field, "must start with '/'"));
            }
        }

        if self.precache_assets.is_empty() {
            return Err(invalid("precache_assets", "must list at least one asset"));
        }
        if let Some(asset) = self.precache_assets.iter().find(|a| !a.starts_with('/')) {
            return Err(ConfigError::Invalid {
                field: "precache_assets".into(),
                reason: format!("{asset:?} must start with '/'"),
            });
        }

        if !self.precache_assets.iter().any(|a| a == "/") {
            tracing::warn!(
                assets = self.precache_assets.len(),
                "precache_assets does not include '/'; navigations will skip the root page fallback"
            );
        }

        Ok(())
    }
}
