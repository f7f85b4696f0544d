//! Quizhall server binary.
//!
//! Configured through the environment:
//!
//! - `QUIZHALL_JWT_SECRET` (required): HS256 secret for host tokens
//! - `QUIZHALL_BIND`: listen address, default `0.0.0.0:8080`
//! - `QUIZHALL_QUIZ_FILE`: JSON array of quizzes to serve
//! - `QUIZHALL_IDLE_TIMEOUT_SECS`: close silent connections after this long
//! - `RUST_LOG`: log filter, default `info`

mod config;

use std::sync::Arc;

use quizhall::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let catalog = match &config.quiz_file {
        Some(path) => {
            let catalog = MemoryCatalog::load(path)?;
            tracing::info!(path = %path.display(), quizzes = catalog.len(), "quiz catalog loaded");
            catalog
        }
        None => {
            tracing::warn!("QUIZHALL_QUIZ_FILE not set, serving an empty quiz catalog");
            MemoryCatalog::new()
        }
    };

    let server = QuizhallServerBuilder::new()
        .bind(&config.bind)
        .idle_timeout(config.idle_timeout)
        .build(
            JwtGate::hs256(config.jwt_secret.as_bytes()),
            Arc::new(MemorySessionStore::new()),
            Arc::new(catalog),
        )
        .await?;

    tracing::info!(addr = %server.local_addr()?, "listening");
    server.run().await?;
    Ok(())
}
