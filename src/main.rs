//! Pokémon Hangman · Game Backend
//!
//! - Axum HTTP JSON API around the round engine (per-player sessions in memory)
//! - Species artwork from PokéAPI, cached on disk and served under /static
//! - Built-in fallback word bank when static/pokemon.txt is missing
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   HANGMAN_CONFIG_PATH : path to TOML config (word list, image cache, session expiry)
//!   POKEAPI_BASE_URL    : default "https://pokeapi.co/api/v2"
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod seeds;
mod pokeapi;
mod wordbank;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: word bank, artwork cache, session store.
  let state = Arc::new(AppState::new());

  spawn_session_sweeper(state.clone());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "pokemon_hangman_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "pokemon_hangman_backend", "HTTP server stopped");
  Ok(())
}

/// Periodically drop idle sessions.
fn spawn_session_sweeper(state: Arc<AppState>) {
  let every = state.config.sessions.sweep_interval();
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    loop {
      ticker.tick().await;
      state.sessions.sweep_expired().await;
      let active = state.sessions.len().await;
      debug!(target: "pokemon_hangman_backend", active, "Session sweep done");
    }
  });
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "pokemon_hangman_backend", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  info!(target: "pokemon_hangman_backend", "Shutdown signal received");
}
