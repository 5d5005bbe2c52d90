//! Arranque del servidor HTTP

use anyhow::Context;

use crate::api;
use crate::core::{Config, ServerState};

pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Servidor sobre un estado ya construido (tests, embedding)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await,
        };

        state.start_background_tasks();

        let app = api::create_router(state.clone());

        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        tracing::info!("Booking server listening on {}", addr);
        tracing::info!("Environment: {}", self.config.environment);
        tracing::info!("Work dir: {}", self.config.work_dir);

        let shutdown = state.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutting down...");
                shutdown.cancel();
            })
            .await
            .context("HTTP server error")?;

        Ok(())
    }
}
