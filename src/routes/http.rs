//! HTTP endpoint handlers. These are thin wrappers that resolve the caller's session,
//! lock it for the duration of the request and forward to the round engine.

use std::sync::Arc;
use axum::{extract::{State, Query}, Json, response::IntoResponse};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, instrument};

use crate::domain::Difficulty;
use crate::error::SessionError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, q))]
pub async fn http_get_game(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> Json<GameOut> {
  let (session_id, handle) = state.sessions.get_or_create(q.session_id.as_deref()).await;
  let entry = handle.lock().await;
  let view = current_view(&entry.state);
  Json(GameOut { session_id, view })
}

#[instrument(level = "info", skip(state, body), fields(difficulty = ?body.difficulty))]
pub async fn http_post_round(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RoundIn>,
) -> Json<GameOut> {
  let (session_id, handle) = state.sessions.get_or_create(body.session_id.as_deref()).await;
  let mut entry = handle.lock().await;
  let difficulty = match body.difficulty.as_deref() {
    Some(d) => Difficulty::from_param(Some(d)),
    None => entry.state.difficulty,
  };
  let mut rng = StdRng::from_entropy();
  let view = resume_or_start(&mut entry.state, difficulty, state.bank.as_ref(), &mut rng).await;
  info!(target: "hangman", session = %session_id, difficulty = difficulty.as_str(), "HTTP round served");
  Json(GameOut { session_id, view })
}

#[instrument(level = "info", skip(state, body), fields(guess_len = body.guess.len()))]
pub async fn http_post_guess(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GuessIn>,
) -> Result<Json<GameOut>, SessionError> {
  let (session_id, handle) = state.sessions.get_or_create(body.session_id.as_deref()).await;
  let mut entry = handle.lock().await;
  match submit_guess(&mut entry.state, &body.guess) {
    Ok(view) => Ok(Json(GameOut { session_id, view })),
    Err(error) => {
      info!(target: "hangman", session = %session_id, %error, "Guess rejected");
      Err(SessionError { session_id, error })
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(difficulty = ?body.difficulty))]
pub async fn http_post_difficulty(
  State(state): State<Arc<AppState>>,
  Json(body): Json<DifficultyIn>,
) -> Json<GameOut> {
  let (session_id, handle) = state.sessions.get_or_create(body.session_id.as_deref()).await;
  let mut entry = handle.lock().await;
  let view = change_difficulty(&mut entry.state, Difficulty::from_param(body.difficulty.as_deref()));
  Json(GameOut { session_id, view })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_restart(
  State(state): State<Arc<AppState>>,
  body: Option<Json<SessionIn>>,
) -> Json<GameOut> {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let (session_id, handle) = state.sessions.get_or_create(body.session_id.as_deref()).await;
  let mut entry = handle.lock().await;
  restart(&mut entry.state);
  let difficulty = entry.state.difficulty;
  let mut rng = StdRng::from_entropy();
  let view = start_round(&mut entry.state, difficulty, state.bank.as_ref(), &mut rng).await;
  info!(target: "hangman", session = %session_id, difficulty = difficulty.as_str(), "HTTP restart served");
  Json(GameOut { session_id, view })
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_reset(
  State(state): State<Arc<AppState>>,
  body: Option<Json<SessionIn>>,
) -> Json<GameOut> {
  let body = body.map(|Json(b)| b).unwrap_or_default();
  let (session_id, handle) = state.sessions.get_or_create(body.session_id.as_deref()).await;
  let mut entry = handle.lock().await;
  let view = reset(&mut entry.state);
  info!(target: "hangman", session = %session_id, "HTTP full reset");
  Json(GameOut { session_id, view })
}
