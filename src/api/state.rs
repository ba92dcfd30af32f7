//! Shared state for the HTTP API

use crate::config::NotewiseConfig;
use crate::services::InferenceService;
use crate::transform::{
    DefinitionHandler, DefinitionSettings, TransformHandler, TransformSettings,
};
use std::sync::Arc;

/// State handed to every route handler
#[derive(Clone)]
pub struct AppState {
    pub transform: Arc<TransformHandler>,
    pub definitions: Arc<DefinitionHandler>,
    /// Short random ID of this server process
    pub instance_id: String,
    llm: Arc<dyn InferenceService>,
}

impl AppState {
    /// Build handlers over `llm` with default sampling settings
    pub fn new(llm: Arc<dyn InferenceService>) -> Self {
        Self::with_settings(llm, TransformSettings::default(), DefinitionSettings::default())
    }

    pub fn with_settings(
        llm: Arc<dyn InferenceService>,
        transform: TransformSettings,
        definitions: DefinitionSettings,
    ) -> Self {
        Self {
            transform: Arc::new(TransformHandler::new(Arc::clone(&llm), transform)),
            definitions: Arc::new(DefinitionHandler::new(Arc::clone(&llm), definitions)),
            instance_id: uuid::Uuid::new_v4().to_string()[..8].to_string(),
            llm,
        }
    }

    /// Build handlers using the sampling settings from `config`
    pub fn from_config(config: &NotewiseConfig, llm: Arc<dyn InferenceService>) -> Self {
        Self::with_settings(
            llm,
            TransformSettings {
                temperature: config.llm.transform_temperature,
                max_tokens: config.llm.transform_max_tokens,
                in_band_scan: config.llm.in_band_error_scan,
            },
            DefinitionSettings {
                temperature: config.llm.definition_temperature,
                max_tokens: config.llm.definition_max_tokens,
            },
        )
    }

    /// Whether the inference credential is configured
    pub fn has_credentials(&self) -> bool {
        self.llm.has_credentials()
    }
}
