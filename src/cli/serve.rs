//! HTTP API server command

use notewise_core::{
    api::{ApiServer, ApiServerConfig, AppState},
    config::NotewiseConfig,
    error::Result,
    LlmConfig, LlmService,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// Handle API server startup command
pub async fn handle(config: NotewiseConfig, addr: Option<String>) -> Result<()> {
    debug!("Starting HTTP API server...");

    let addr = addr.unwrap_or_else(|| config.server.addr.clone());
    let socket_addr: SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address '{}': {}", addr, e))?;

    let llm = Arc::new(LlmService::new(LlmConfig::from_settings(&config.llm)));
    let state = AppState::from_config(&config, llm);

    println!();
    println!("Notewise API Server");
    println!();
    println!("   Address: http://{}", socket_addr);
    println!("   Model:   {}", config.llm.model);
    println!();
    println!("   Endpoints:");
    println!("   - POST /api/transform   - Format, highlight and annotate notes");
    println!("   - POST /api/definitions - Define a key term");
    println!("   - GET  /health          - Health check");
    println!();

    let server = ApiServer::new(ApiServerConfig { addr: socket_addr }, state);
    server.serve().await?;

    Ok(())
}
