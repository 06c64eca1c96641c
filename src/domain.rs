//! Domain models: difficulty table, reveal cells, the round, and per-player session state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::util::{capitalize, fold_letter, upper_letter};

/// How many wrong guesses a round tolerates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Easy,
  #[default]
  Medium,
  Hard,
  Extreme,
}

impl Difficulty {
  pub fn max_attempts(self) -> u32 {
    match self {
      Difficulty::Easy => 10,
      Difficulty::Medium => 6,
      Difficulty::Hard => 3,
      Difficulty::Extreme => 1,
    }
  }

  /// Lenient parse used for request parameters: unknown or missing values mean Medium.
  pub fn from_param(raw: Option<&str>) -> Self {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
      Some("easy") => Difficulty::Easy,
      Some("hard") => Difficulty::Hard,
      Some("extreme") => Difficulty::Extreme,
      _ => Difficulty::Medium,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
      Difficulty::Extreme => "extreme",
    }
  }
}

/// Bootstrap-style severity attached to every gameplay message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
  #[default]
  Info,
  Warning,
  Success,
  Danger,
}

/// CSS class controlling how much of the artwork the player may see.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageVisibility {
  #[serde(rename = "pokemon-image-visible")]
  Visible,
  #[serde(rename = "pokemon-image-blurred")]
  Blurred,
  #[serde(rename = "pokemon-image-hidden")]
  Hidden,
}

impl ImageVisibility {
  /// Presentation only; never consulted by gameplay.
  pub fn for_round(difficulty: Difficulty, round_complete: bool) -> Self {
    if round_complete || difficulty == Difficulty::Easy {
      ImageVisibility::Visible
    } else if difficulty == Difficulty::Medium {
      ImageVisibility::Blurred
    } else {
      ImageVisibility::Hidden
    }
  }
}

pub const PLACEHOLDER: char = '_';

/// One round of guessing a single hidden species name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Round {
  pub target_name: String,
  /// One cell per character of `target_name`; `None` is still hidden.
  pub reveal_mask: Vec<Option<char>>,
  /// Guess order is kept for display; membership is what matters.
  pub guessed_letters: Vec<char>,
  pub attempts_left: u32,
  pub is_active: bool,
  #[serde(default)]
  pub image_ref: Option<String>,
}

impl Round {
  /// Fresh round: letters hidden, separators (hyphen, space, apostrophe, ...) shown.
  pub fn new(target_name: &str, max_attempts: u32, image_ref: Option<String>) -> Self {
    let reveal_mask = target_name
      .chars()
      .map(|c| if c.is_alphabetic() { None } else { Some(c) })
      .collect();
    Self {
      target_name: target_name.to_string(),
      reveal_mask,
      guessed_letters: Vec::new(),
      attempts_left: max_attempts,
      is_active: true,
      image_ref,
    }
  }

  pub fn has_guessed(&self, letter: char) -> bool {
    self.guessed_letters.contains(&letter)
  }

  /// Reveal every cell matching `letter`; returns how many cells matched.
  pub fn reveal(&mut self, letter: char) -> usize {
    let mut hits = 0;
    for (i, (cell, c)) in self.reveal_mask.iter_mut().zip(self.target_name.chars()).enumerate() {
      if c.is_alphabetic() && fold_letter(c) == letter {
        *cell = Some(if i == 0 { upper_letter(letter) } else { letter });
        hits += 1;
      }
    }
    hits
  }

  pub fn is_solved(&self) -> bool {
    self.reveal_mask.iter().all(Option::is_some)
  }

  pub fn is_complete(&self) -> bool {
    !self.is_active
  }

  pub fn capitalized_name(&self) -> String {
    capitalize(&self.target_name)
  }

  /// Space-joined mask, e.g. `P _ _ _ _ _ _`.
  pub fn masked_word(&self) -> String {
    self.reveal_mask
      .iter()
      .map(|cell| cell.unwrap_or(PLACEHOLDER).to_string())
      .collect::<Vec<_>>()
      .join(" ")
  }

  pub fn guessed_display(&self) -> String {
    self.guessed_letters
      .iter()
      .map(|c| c.to_string())
      .collect::<Vec<_>>()
      .join(", ")
  }
}

/// Everything the server remembers about one player.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionState {
  pub difficulty: Difficulty,
  /// Names already presented during the current campaign.
  pub encountered_names: BTreeSet<String>,
  /// Capitalized names ever guessed correctly; only a full reset clears it.
  pub caught_names: BTreeSet<String>,
  pub rounds_won: u32,
  pub rounds_lost: u32,
  pub active_round: Option<Round>,
}
