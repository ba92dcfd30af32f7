//! Services layer for notewise
//!
//! Provides the inference-service integration used by the transform and
//! definition handlers.

pub mod llm;

pub use llm::{InferenceRequest, InferenceService, LlmConfig, LlmService};
