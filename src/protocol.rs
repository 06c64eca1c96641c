//! Public protocol structs: view models returned by the engine and HTTP request/response DTOs.
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{AlertKind, Difficulty, ImageVisibility};

pub const TITLE: &str = "Pokémon Hangman";
pub const COMPLETE_TITLE: &str = "Pokémon Hangman - Complete!";

/// What the presentation layer should draw next.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum GameView {
    /// Difficulty selection with running stats.
    Lobby(LobbyView),
    Round(RoundView),
    /// Every species in the bank has been presented this campaign.
    CampaignComplete(CompletionView),
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LobbyView {
    pub title: String,
    pub rounds_won: u32,
    pub rounds_lost: u32,
    pub caught: usize,
    pub difficulty: Difficulty,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct RoundView {
    pub title: String,
    pub rounds_won: u32,
    pub rounds_lost: u32,
    pub difficulty: Difficulty,
    /// Number of names encountered this campaign.
    pub progress: usize,
    pub image_ref: Option<String>,
    pub image_class: ImageVisibility,
    pub round_complete: bool,
    pub active: bool,
    /// Space-joined mask while playing, the capitalized name once finished.
    pub word: String,
    pub guessed_letters: String,
    pub attempts_left: u32,
    pub message: String,
    pub alert_type: AlertKind,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct CompletionView {
    pub title: String,
    pub caught_pokemon: usize,
    pub total_pokemon: usize,
    pub rounds_won: u32,
    pub rounds_lost: u32,
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionIn {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoundIn {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GuessIn {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub guess: String,
}

#[derive(Debug, Deserialize)]
pub struct DifficultyIn {
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<String>,
    /// Absent or unknown values select Medium.
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// Every game response echoes the session id so a new client can keep using it.
#[derive(Debug, Serialize)]
pub struct GameOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub view: GameView,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
