//! Configuration for notewise
//!
//! Settings are layered with the `config` crate:
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config`, or `<config_dir>/notewise/config.toml`)
//! 3. Environment variables prefixed `NOTEWISE__` (e.g. `NOTEWISE__LLM__MODEL`)
//!
//! The inference credential is never read from the file; it comes from
//! `ANTHROPIC_API_KEY` only and is kept behind a [`SecretString`].

use crate::error::Result;
use crate::transform::recovery::InBandScan;
use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable holding the inference credential
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Listen address
    pub addr: String,
}

/// Inference service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Base URL of the Messages API
    pub api_base: String,
    /// Model identifier
    pub model: String,
    /// Value of the `anthropic-version` header
    pub anthropic_version: String,
    pub transform_temperature: f32,
    pub transform_max_tokens: u32,
    pub definition_temperature: f32,
    pub definition_max_tokens: u32,
    /// Scope of the in-band error phrase scan on transform replies
    #[serde(default)]
    pub in_band_error_scan: InBandScan,
}

/// Effective notewise configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotewiseConfig {
    pub server: ServerSettings,
    pub llm: LlmSettings,
}

impl Default for NotewiseConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                addr: "127.0.0.1:3000".to_string(),
            },
            llm: LlmSettings {
                api_base: "https://api.anthropic.com".to_string(),
                model: "claude-3-5-haiku-20241022".to_string(),
                anthropic_version: "2023-06-01".to_string(),
                transform_temperature: 0.2,
                transform_max_tokens: 4096,
                definition_temperature: 0.3,
                definition_max_tokens: 256,
                in_band_error_scan: InBandScan::WholeReply,
            },
        }
    }
}

impl NotewiseConfig {
    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notewise")
            .join("config.toml")
    }

    /// Load configuration, using the default file location when `path` is None.
    ///
    /// A missing file is not an error; defaults and environment apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        debug!("Loading configuration (file: {})", path.display());

        let defaults = Self::default();
        let config = Config::builder()
            .set_default("server.addr", defaults.server.addr)?
            .set_default("llm.api_base", defaults.llm.api_base)?
            .set_default("llm.model", defaults.llm.model)?
            .set_default("llm.anthropic_version", defaults.llm.anthropic_version)?
            .set_default(
                "llm.transform_temperature",
                defaults.llm.transform_temperature as f64,
            )?
            .set_default(
                "llm.transform_max_tokens",
                defaults.llm.transform_max_tokens as i64,
            )?
            .set_default(
                "llm.definition_temperature",
                defaults.llm.definition_temperature as f64,
            )?
            .set_default(
                "llm.definition_max_tokens",
                defaults.llm.definition_max_tokens as i64,
            )?
            .set_default("llm.in_band_error_scan", "whole_reply")?
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("NOTEWISE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

/// Read the inference credential from the environment.
///
/// Returns None when unset or empty; callers surface that as
/// `Unauthenticated` at call time rather than at start-up.
pub fn api_key_from_env() -> Option<SecretString> {
    match env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => {
            debug!("Using API key from {} environment variable", API_KEY_ENV);
            Some(SecretString::new(key.into()))
        }
        _ => {
            debug!("{} not set", API_KEY_ENV);
            None
        }
    }
}
