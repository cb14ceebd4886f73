//! # Skarv Configuration System
//!
//! Hierarchical configuration for the allocation service: defaults first,
//! then YAML files, then environment variables, validated as one unit.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod service;
mod sim;
mod telemetry;
mod validation;

pub use error::ConfigError;
pub use service::ServiceConfig;
pub use sim::SimSettings;
pub use telemetry::TelemetryConfig;

/// Top-level configuration container for the allocation service.
#[derive(Debug, Serialize, Deserialize, Validate, Default)]
pub struct SkarvConfig {
    /// Front-end and loader parameters.
    #[validate(nested)]
    pub service: ServiceConfig,

    /// Simulated allocation module parameters.
    #[validate(nested)]
    pub sim: SimSettings,

    /// Logging and metrics parameters.
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl SkarvConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/skarv.yaml` - base settings. If missing, defaults are used.
    /// 3. `config/<environment>.yaml` - environment-specific overrides.
    /// 4. `SKARV_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(SkarvConfig::default()));

        if Path::new("config/skarv.yaml").exists() {
            figment = figment.merge(Yaml::file("config/skarv.yaml"));
        } else {
            println!("config/skarv.yaml not found, using default configuration");
        }

        let env = std::env::var("SKARV_ENV").unwrap_or_else(|_| "production".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        figment
            .merge(Env::prefixed("SKARV_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }

    /// Load configuration from a specific path for testing/validation.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(SkarvConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("SKARV_").split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
