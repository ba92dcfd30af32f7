//! CLI command handlers
//!
//! Each subcommand is implemented in its own module.

pub mod config;
pub mod define;
pub mod serve;
pub mod transform;

use notewise_core::{
    api::AppState, client::LocalBackend, config::NotewiseConfig, HttpBackend, LlmConfig,
    LlmService, TransformBackend,
};
use std::sync::Arc;
use tracing::debug;

/// Backend for one-shot commands: a remote server when `server` is given,
/// otherwise the handlers in-process.
pub(crate) fn backend(config: &NotewiseConfig, server: Option<String>) -> Arc<dyn TransformBackend> {
    match server {
        Some(url) => {
            debug!("Using remote backend at {}", url);
            Arc::new(HttpBackend::new(url))
        }
        None => {
            let llm = Arc::new(LlmService::new(LlmConfig::from_settings(&config.llm)));
            let state = AppState::from_config(config, llm);
            Arc::new(LocalBackend::new(state.transform, state.definitions))
        }
    }
}
