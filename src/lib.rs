//! Notewise - AI-assisted note transformation
//!
//! Takes raw study notes and, through a hosted language model:
//! - restructures them into simple HTML (headings, paragraphs, lists)
//! - picks out the key terms and wraps them in highlight markers
//! - attaches short study comments
//! - defines selected terms, using the note itself as context
//!
//! # Architecture
//!
//! - **Types**: request/response shapes and the note model
//! - **Transform**: prompt construction, reply recovery, request handlers
//! - **Services**: the inference seam and the Anthropic client behind it
//! - **Highlight**: inserting and stripping key-term markers
//! - **Orchestrator**: option state, definition fan-out, generation guard
//! - **API**: the HTTP routes
//! - **Storage**: the note/folder store interface
//!
//! # Example
//!
//! ```ignore
//! use notewise_core::{AppState, LlmService, TransformOptions, TransformRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> notewise_core::Result<()> {
//!     let state = AppState::new(Arc::new(LlmService::with_default()));
//!     let request = TransformRequest::new("photosynthesis uses light", TransformOptions::default())?;
//!     let result = state.transform.handle(&request).await?;
//!     println!("{}", result.formatted_text);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod highlight;
pub mod orchestrator;
pub mod services;
pub mod storage;
pub mod transform;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use api::{router, ApiServer, ApiServerConfig, AppState};
pub use client::{HttpBackend, LocalBackend, TransformBackend};
pub use config::NotewiseConfig;
pub use error::{NotewiseError, Result};
pub use highlight::{highlight_terms, remove_highlights};
pub use orchestrator::{DefinitionLookup, TransformOrchestrator, DEFINITION_FALLBACK};
pub use services::{InferenceRequest, InferenceService, LlmConfig, LlmService};
pub use storage::{InMemoryNoteStore, NoteStore};
pub use transform::{DefinitionHandler, TransformHandler};
pub use types::{
    DefinitionEntry, DefinitionRequest, Folder, FolderId, Note, NoteId, TransformOption,
    TransformOptions, TransformRequest, TransformResult,
};
