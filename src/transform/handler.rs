//! Transform request handler
//!
//! Validates a request, builds the prompt, makes one inference call, recovers
//! the structured result and maps every failure onto the error taxonomy.

use crate::error::{NotewiseError, Result};
use crate::services::{InferenceRequest, InferenceService};
use crate::transform::instructions::build_transform_prompt;
use crate::transform::recovery::{recover_transform_result, InBandScan};
use crate::types::{TransformRequest, TransformResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Sampling settings for transform calls
#[derive(Debug, Clone, Copy)]
pub struct TransformSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub in_band_scan: InBandScan,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 4096,
            in_band_scan: InBandScan::WholeReply,
        }
    }
}

/// Server-side transform handler
pub struct TransformHandler {
    llm: Arc<dyn InferenceService>,
    settings: TransformSettings,
}

impl TransformHandler {
    pub fn new(llm: Arc<dyn InferenceService>, settings: TransformSettings) -> Self {
        Self { llm, settings }
    }

    /// Run one transform.
    ///
    /// Highlights and comments are cleared when their option was off, whatever
    /// the model returned.
    pub async fn handle(&self, request: &TransformRequest) -> Result<TransformResult> {
        if request.text.is_empty() {
            return Err(NotewiseError::invalid("text", "must be a non-empty string"));
        }
        if !self.llm.has_credentials() {
            return Err(NotewiseError::Unauthenticated(format!(
                "{} is not set",
                crate::config::API_KEY_ENV
            )));
        }

        debug!(
            "Transforming {} chars with options {:?}",
            request.text.chars().count(),
            request.options
        );

        let prompt = build_transform_prompt(&request.text, &request.options);
        let raw = self
            .llm
            .complete(InferenceRequest {
                system: prompt.system,
                user: prompt.user,
                temperature: self.settings.temperature,
                max_tokens: self.settings.max_tokens,
            })
            .await?;

        let result = recover_transform_result(&raw, self.settings.in_band_scan)?
            .enforce_options(&request.options);

        info!(
            "Transform complete: {} highlights, {} comments",
            result.highlights.len(),
            result.comments.len()
        );
        Ok(result)
    }
}
