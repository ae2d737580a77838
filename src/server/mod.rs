//! HTTP server
//!
//! Exposes analysis, generation and execution over a small JSON API.

pub mod api;

use anyhow::{Context, Result};
use axum::Router;
use colored::Colorize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use api::{api_router, AppState};

use crate::ai::ProviderManager;
use crate::driver::http::ReqwestProbe;
use crate::driver::web::PlaywrightLauncher;
use crate::utils::config::Config;
use crate::utils::session::SessionStore;

pub const DEFAULT_PORT: u16 = 8000;

pub struct Server {
    config: Config,
    port: u16,
}

impl Server {
    pub fn new(config: Config, port: u16) -> Self {
        Self { config, port }
    }

    /// State backed by Playwright, reqwest and the configured providers
    pub fn state(&self) -> Result<AppState> {
        Ok(AppState {
            store: SessionStore::new(self.config.output_dir.clone()),
            providers: ProviderManager::from_config(&self.config),
            launcher: Arc::new(PlaywrightLauncher),
            http: Arc::new(ReqwestProbe::new()?),
            config: self.config.clone(),
        })
    }

    pub fn router(state: AppState) -> Router {
        api_router()
            .layer(CorsLayer::permissive())
            .with_state(Arc::new(state))
    }

    /// Start the server; runs until the process is stopped
    pub async fn start(&self) -> Result<()> {
        let app = Self::router(self.state()?);
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        println!("\n{} Scout server started", "▶".green());
        println!("   Listening: http://localhost:{}", self.port);
        println!("   Artifacts: {}", self.config.output_dir.display());
        println!("\n   Press Ctrl+C to stop.\n");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind port {}", self.port))?;
        axum::serve(listener, app.into_make_service()).await?;

        Ok(())
    }
}
