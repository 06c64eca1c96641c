//! Loading service configuration (word list, image cache, session expiry) from TOML.
//!
//! Every field is optional; see `GameConfig::default` for the values used when the
//! file is absent or unreadable.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

pub const DEFAULT_POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameConfig {
  pub word_list_path: PathBuf,
  /// Served under `/static`; the default artwork cache lives inside it.
  pub static_dir: PathBuf,
  pub images: ImagesConfig,
  pub sessions: SessionsConfig,
}

impl Default for GameConfig {
  fn default() -> Self {
    Self {
      word_list_path: PathBuf::from("static/pokemon.txt"),
      static_dir: PathBuf::from("static"),
      images: ImagesConfig::default(),
      sessions: SessionsConfig::default(),
    }
  }
}

/// Artwork lookup against the species API and the on-disk cache in front of it.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
  pub enabled: bool,
  pub api_base_url: String,
  pub cache_dir: PathBuf,
  /// URL prefix under which `cache_dir` is served.
  pub url_prefix: String,
  pub timeout_secs: u64,
}

impl Default for ImagesConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      api_base_url: DEFAULT_POKEAPI_BASE_URL.into(),
      cache_dir: PathBuf::from("static/pokemon_images"),
      url_prefix: "/static/pokemon_images".into(),
      timeout_secs: 10,
    }
  }
}

impl ImagesConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs.max(1))
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
  pub ttl_secs: u64,
  pub sweep_interval_secs: u64,
}

impl Default for SessionsConfig {
  fn default() -> Self {
    Self { ttl_secs: 24 * 60 * 60, sweep_interval_secs: 10 * 60 }
  }
}

impl SessionsConfig {
  pub fn ttl(&self) -> Duration {
    Duration::from_secs(self.ttl_secs)
  }

  pub fn sweep_interval(&self) -> Duration {
    Duration::from_secs(self.sweep_interval_secs.max(1))
  }
}

pub fn parse_config(text: &str) -> Result<GameConfig, toml::de::Error> {
  toml::from_str::<GameConfig>(text)
}

/// Build the effective config: TOML from HANGMAN_CONFIG_PATH (if any) plus env overrides.
/// Read/parse problems are logged and replaced by defaults.
pub fn load_config_from_env() -> GameConfig {
  let mut cfg = match std::env::var("HANGMAN_CONFIG_PATH") {
    Ok(path) => match std::fs::read_to_string(&path) {
      Ok(s) => match parse_config(&s) {
        Ok(cfg) => {
          info!(target: "pokemon_hangman_backend", %path, "Loaded config (TOML)");
          cfg
        }
        Err(e) => {
          error!(target: "pokemon_hangman_backend", %path, error = %e, "Failed to parse TOML config; using defaults");
          GameConfig::default()
        }
      },
      Err(e) => {
        error!(target: "pokemon_hangman_backend", %path, error = %e, "Failed to read TOML config file; using defaults");
        GameConfig::default()
      }
    },
    Err(_) => GameConfig::default(),
  };

  if let Ok(url) = std::env::var("POKEAPI_BASE_URL") {
    cfg.images.api_base_url = url;
  }
  cfg
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg = parse_config(
      r#"
      word_list_path = "/data/names.txt"
      [images]
      enabled = false
      "#,
    )
    .unwrap();
    assert_eq!(cfg.word_list_path, PathBuf::from("/data/names.txt"));
    assert!(!cfg.images.enabled);
    assert_eq!(cfg.images.api_base_url, DEFAULT_POKEAPI_BASE_URL);
    assert_eq!(cfg.sessions.ttl_secs, 86_400);
  }

  #[test]
  fn empty_toml_is_default() {
    let cfg = parse_config("").unwrap();
    assert!(cfg.images.enabled);
    assert_eq!(cfg.images.url_prefix, "/static/pokemon_images");
    assert_eq!(cfg.sessions.sweep_interval(), Duration::from_secs(600));
  }

  #[test]
  fn bad_toml_is_an_error() {
    assert!(parse_config("word_list_path = [").is_err());
  }
}
