//! Word bank provider: the candidate species names plus best-effort artwork lookup.

use async_trait::async_trait;
use rand::RngCore;
use tracing::{info, warn};

use crate::config::GameConfig;
use crate::pokeapi::{ArtworkSource, ImageCache, PokeApi};
use crate::seeds::load_names;

#[async_trait]
pub trait WordBank: Send + Sync {
  /// Every candidate name, in file order.
  fn list_names(&self) -> &[String];

  /// Display-safe image reference for `name`. Failures degrade to `None`.
  async fn resolve_image(&self, name: &str, rng: &mut (dyn RngCore + Send)) -> Option<String>;
}

pub struct SpeciesBank<S = PokeApi> {
  names: Vec<String>,
  images: Option<ImageCache<S>>,
}

impl SpeciesBank<PokeApi> {
  /// Load names from the configured list and wire the PokéAPI-backed cache if enabled.
  pub fn from_config(cfg: &GameConfig) -> Self {
    let names = load_names(&cfg.word_list_path);
    let images = if cfg.images.enabled {
      match PokeApi::new(&cfg.images.api_base_url, cfg.images.timeout()) {
        Ok(api) => {
          info!(target: "pokemon_hangman_backend", base_url = %api.base_url, cache_dir = %cfg.images.cache_dir.display(), "Artwork lookup enabled");
          Some(ImageCache::new(api, cfg.images.cache_dir.clone(), &cfg.images.url_prefix))
        }
        Err(e) => {
          warn!(target: "pokemon_hangman_backend", error = %e, "Failed to build HTTP client; artwork disabled");
          None
        }
      }
    } else {
      info!(target: "pokemon_hangman_backend", "Artwork lookup disabled by config");
      None
    };
    Self::new(names, images)
  }
}

impl<S: ArtworkSource> SpeciesBank<S> {
  pub fn new(names: Vec<String>, images: Option<ImageCache<S>>) -> Self {
    Self { names, images }
  }
}

#[async_trait]
impl<S: ArtworkSource> WordBank for SpeciesBank<S> {
  fn list_names(&self) -> &[String] {
    &self.names
  }

  async fn resolve_image(&self, name: &str, rng: &mut (dyn RngCore + Send)) -> Option<String> {
    let cache = self.images.as_ref()?;
    match cache.resolve(name, rng).await {
      Ok(reference) => Some(reference),
      Err(e) => {
        warn!(target: "hangman", %name, error = %e, "Artwork unavailable; continuing without image");
        None
      }
    }
  }
}
