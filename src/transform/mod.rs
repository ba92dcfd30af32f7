//! Transform and definition pipeline
//!
//! - [`instructions`]: options → prompt
//! - [`recovery`]: noisy model reply → [`TransformResult`](crate::types::TransformResult)
//! - [`handler`]: one validated transform call
//! - [`definitions`]: one validated definition call

pub mod definitions;
pub mod handler;
pub mod instructions;
pub mod recovery;

pub use definitions::{DefinitionHandler, DefinitionSettings};
pub use handler::{TransformHandler, TransformSettings};
pub use instructions::{build_definition_prompt, build_transform_prompt, TransformPrompt};
pub use recovery::{recover_transform_result, InBandScan};
