//! Seed data: the built-in species list and the word-list loader that falls back to it.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

/// Minimal built-in word bank that keeps the game playable without `pokemon.txt`.
pub const FALLBACK_NAMES: [&str; 4] = ["Pikachu", "Charmander", "Bulbasaur", "Squirtle"];

pub fn fallback_names() -> Vec<String> {
  FALLBACK_NAMES.iter().map(|s| s.to_string()).collect()
}

/// Parse a newline-separated name list. Blank lines, repeats and entries without
/// any letter are dropped; a name with no letters would start out already solved.
pub fn parse_names(text: &str) -> Vec<String> {
  let mut seen = HashSet::new();
  text
    .lines()
    .map(str::trim)
    .filter(|l| l.chars().any(char::is_alphabetic))
    .filter(|l| seen.insert(l.to_string()))
    .map(str::to_string)
    .collect()
}

/// Load the word list from disk. Never fails: any problem degrades to `FALLBACK_NAMES`.
pub fn load_names(path: &Path) -> Vec<String> {
  match std::fs::read_to_string(path) {
    Ok(text) => {
      let names = parse_names(&text);
      if names.is_empty() {
        warn!(target: "hangman", path = %path.display(), "Word list has no usable names; using built-in list");
        return fallback_names();
      }
      info!(target: "hangman", path = %path.display(), count = names.len(), "Loaded word list");
      names
    }
    Err(e) => {
      warn!(target: "hangman", path = %path.display(), error = %e, "Word list unavailable; using built-in list");
      fallback_names()
    }
  }
}
