//! Definition request handler
//!
//! One short, plain-text definition per call. The reply is trimmed and used
//! as-is; it is never parsed as structured data.

use crate::error::{NotewiseError, Result};
use crate::services::{InferenceRequest, InferenceService};
use crate::transform::instructions::build_definition_prompt;
use crate::types::{DefinitionEntry, DefinitionRequest};
use std::sync::Arc;
use tracing::debug;

/// Sampling settings for definition calls
#[derive(Debug, Clone, Copy)]
pub struct DefinitionSettings {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for DefinitionSettings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 256,
        }
    }
}

/// Server-side definition handler
pub struct DefinitionHandler {
    llm: Arc<dyn InferenceService>,
    settings: DefinitionSettings,
}

impl DefinitionHandler {
    pub fn new(llm: Arc<dyn InferenceService>, settings: DefinitionSettings) -> Self {
        Self { llm, settings }
    }

    pub async fn handle(&self, request: &DefinitionRequest) -> Result<DefinitionEntry> {
        if request.term.trim().is_empty() {
            return Err(NotewiseError::invalid("term", "must be a non-empty string"));
        }
        if !self.llm.has_credentials() {
            return Err(NotewiseError::Unauthenticated(format!(
                "{} is not set",
                crate::config::API_KEY_ENV
            )));
        }

        debug!("Defining term '{}'", request.term);

        let prompt = build_definition_prompt(&request.term, &request.context);
        let reply = self
            .llm
            .complete(InferenceRequest {
                system: prompt.system,
                user: prompt.user,
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
            })
            .await?;

        let definition = reply.trim();
        if definition.is_empty() {
            return Err(NotewiseError::EmptyResponse(request.term.clone()));
        }

        Ok(DefinitionEntry {
            term: request.term.clone(),
            definition: definition.to_string(),
        })
    }
}
