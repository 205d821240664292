//! Serve command handler.
//!
//! Runs the chat HTTP API.

use clap::Args;
use companion_core::{config::AppConfig, AppError, AppResult};
use std::net::SocketAddr;

use super::build_chat_service;
use crate::server;

/// Run the chat HTTP server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to listen on (overrides config)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}

impl ServeCommand {
    /// Execute the serve command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing serve command");

        let addr = match self.bind {
            Some(addr) => addr,
            None => config.bind_addr()?,
        };

        // Knowledge load failures stop startup here
        let service = build_chat_service(config)?;

        let app = server::build_app(service, &config.server.allowed_origins)
            .map_err(|e| AppError::Config(format!("{:#}", e)))?;

        server::run_server(addr, app)
            .await
            .map_err(|e| AppError::Other(format!("Server error: {:#}", e)))
    }
}
