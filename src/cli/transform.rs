//! One-shot transform command

use super::backend;
use clap::ValueEnum;
use notewise_core::{
    config::NotewiseConfig,
    error::{NotewiseError, Result},
    DefinitionLookup, TransformOrchestrator, TransformOptions,
};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Output format for transform results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Highlighted text followed by definitions and comments
    Text,
    /// Full orchestrator snapshot as JSON
    Json,
}

/// Arguments of the transform command
pub struct TransformArgs {
    pub file: Option<PathBuf>,
    pub options: TransformOptions,
    pub server: Option<String>,
    pub format: OutputFormat,
}

fn read_input(file: Option<&PathBuf>) -> Result<String> {
    match file {
        Some(path) => {
            debug!("Reading notes from {}", path.display());
            Ok(std::fs::read_to_string(path)?)
        }
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Handle transform command
pub async fn handle(config: NotewiseConfig, args: TransformArgs) -> Result<()> {
    let text = read_input(args.file.as_ref())?;
    if text.is_empty() {
        return Err(NotewiseError::invalid("text", "no input given"));
    }

    let orchestrator = TransformOrchestrator::with_options(backend(&config, args.server), args.options);
    let result = orchestrator.transform(&text).await?;

    match args.format {
        OutputFormat::Json => {
            let snapshot = orchestrator.snapshot().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        OutputFormat::Text => {
            let rendered = orchestrator
                .render()
                .await
                .unwrap_or_else(|| result.formatted_text.clone());
            println!("{}", rendered);

            if !result.highlights.is_empty() {
                println!();
                println!("Key terms:");
                for term in &result.highlights {
                    match orchestrator.definition(term).await {
                        DefinitionLookup::Ready(definition) => {
                            println!("  - {}: {}", term, definition)
                        }
                        _ => println!("  - {}", term),
                    }
                }
            }

            if !result.comments.is_empty() {
                println!();
                println!("Comments:");
                for comment in &result.comments {
                    println!("  - {}", comment);
                }
            }
        }
    }

    Ok(())
}
