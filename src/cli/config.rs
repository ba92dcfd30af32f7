//! Configuration inspection command

use clap::Subcommand;
use notewise_core::{
    config::{api_key_from_env, NotewiseConfig, API_KEY_ENV},
    error::{NotewiseError, Result},
};
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration and where it came from
    Show,
}

/// Handle configuration command
pub async fn handle(
    action: ConfigAction,
    config: NotewiseConfig,
    config_path: &Path,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| NotewiseError::Other(format!("Failed to render config: {}", e)))?;

            println!("# Config file: {}", config_path.display());
            if !config_path.exists() {
                println!("#   (not present, using defaults and environment)");
            }
            if api_key_from_env().is_some() {
                println!("# API key: set ({})", API_KEY_ENV);
            } else {
                println!("# API key: not set; export {} to enable transforms", API_KEY_ENV);
            }
            println!();
            print!("{}", rendered);
            Ok(())
        }
    }
}
