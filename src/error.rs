//! Error taxonomy.
//!
//! Gameplay outcomes (bad letter, repeated letter, wrong letter) are view-model messages,
//! not errors. What remains here is caller misuse of the engine and collaborator failures
//! that the word bank absorbs before they reach gameplay.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
  /// A guess arrived while no round is in progress (never started, won, or lost).
  #[error("no active round; pick a difficulty to start one")]
  NoActiveRound,
}

impl GameError {
  pub fn code(&self) -> &'static str {
    match self {
      GameError::NoActiveRound => "NO_ACTIVE_ROUND",
    }
  }
}

#[derive(Serialize)]
struct ErrorBody {
  error: String,
  code: &'static str,
  redirect: &'static str,
  #[serde(rename = "sessionId")]
  session_id: String,
}

/// A `GameError` tagged with the session it happened in, so the client keeps its id.
#[derive(Debug)]
pub struct SessionError {
  pub session_id: String,
  pub error: GameError,
}

impl IntoResponse for SessionError {
  fn into_response(self) -> Response {
    let status = match self.error {
      GameError::NoActiveRound => StatusCode::CONFLICT,
    };
    let body = ErrorBody {
      error: self.error.to_string(),
      code: self.error.code(),
      redirect: "/api/v1/round",
      session_id: self.session_id,
    };
    (status, Json(body)).into_response()
  }
}

/// Failures while resolving artwork. Never surfaced to gameplay.
#[derive(Debug, Error)]
pub enum ImageError {
  #[error("HTTP request failed: {0}")]
  Http(#[from] reqwest::Error),
  #[error("species API returned HTTP {status} for {api_key}")]
  Status { api_key: String, status: u16 },
  #[error("no official artwork for {0}")]
  MissingArtwork(String),
  #[error("cache I/O failed: {0}")]
  Io(#[from] std::io::Error),
}
