//! One-shot term definition command

use super::backend;
use notewise_core::{config::NotewiseConfig, error::Result, DefinitionRequest};

/// Handle definition command
pub async fn handle(
    config: NotewiseConfig,
    term: String,
    context: Option<String>,
    server: Option<String>,
) -> Result<()> {
    let request = DefinitionRequest::new(term, context.unwrap_or_default())?;
    let entry = backend(&config, server).define(request).await?;

    println!("{}: {}", entry.term, entry.definition);
    Ok(())
}
