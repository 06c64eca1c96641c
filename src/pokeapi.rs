//! Species artwork: a minimal PokéAPI client and the file-backed cache in front of it.
//!
//! Lookups go through `ArtworkSource` so the cache can be exercised without the network.
//! The cache stores one PNG per species under its slug and hands back a URL path
//! under the configured static prefix.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{seq::SliceRandom, RngCore};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::ImageError;
use crate::util::normalize_name;

/// Fetches raw artwork bytes for a canonical API key (e.g. `pikachu`, `nidoran-f`).
#[async_trait]
pub trait ArtworkSource: Send + Sync {
  async fn fetch_artwork(&self, api_key: &str) -> Result<Vec<u8>, ImageError>;
}

#[derive(Clone)]
pub struct PokeApi {
  pub client: reqwest::Client,
  pub base_url: String,
}

impl PokeApi {
  pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ImageError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
  }
}

#[async_trait]
impl ArtworkSource for PokeApi {
  #[instrument(level = "info", skip(self), fields(base_url = %self.base_url))]
  async fn fetch_artwork(&self, api_key: &str) -> Result<Vec<u8>, ImageError> {
    let url = format!("{}/pokemon/{}", self.base_url, api_key);
    let start = std::time::Instant::now();
    let res = self.client.get(&url)
      .header(USER_AGENT, "pokemon-hangman-backend/0.1")
      .send().await?;

    if !res.status().is_success() {
      return Err(ImageError::Status { api_key: api_key.to_string(), status: res.status().as_u16() });
    }

    let body: SpeciesResponse = res.json().await?;
    let image_url = body.official_artwork()
      .ok_or_else(|| ImageError::MissingArtwork(api_key.to_string()))?;

    let img = self.client.get(&image_url)
      .header(USER_AGENT, "pokemon-hangman-backend/0.1")
      .send().await?;
    if !img.status().is_success() {
      return Err(ImageError::Status { api_key: api_key.to_string(), status: img.status().as_u16() });
    }
    let bytes = img.bytes().await?;
    info!(elapsed = ?start.elapsed(), size = bytes.len(), "Artwork downloaded");
    Ok(bytes.to_vec())
  }
}

// --- Species DTOs (only the path we read) ---

#[derive(Deserialize)]
struct SpeciesResponse {
  sprites: Sprites,
}
#[derive(Deserialize)]
struct Sprites {
  #[serde(default)] other: Option<OtherSprites>,
}
#[derive(Deserialize)]
struct OtherSprites {
  #[serde(default, rename = "official-artwork")] official_artwork: Option<Artwork>,
}
#[derive(Deserialize)]
struct Artwork {
  #[serde(default)] front_default: Option<String>,
}

impl SpeciesResponse {
  fn official_artwork(self) -> Option<String> {
    self.sprites.other?.official_artwork?.front_default.filter(|u| !u.is_empty())
  }
}

/// Bytes escaped when a slug is placed in the returned URL path.
const SLUG_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-');

/// Turn a display name into the API/file slug: `Farfetch'd` -> `farfetchd`, `Mr. Mime` -> `mr-mime`.
pub fn species_slug(name: &str) -> String {
  normalize_name(name)
    .split_whitespace()
    .map(|part| part.chars().filter(|c| c.is_alphanumeric() || *c == '-').collect::<String>())
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("-")
}

/// Map a word-bank slug to the API entry it refers to.
/// `nidoran` exists as two gendered entries; one is picked at random. The word bank
/// spells Mr. Mime as plain `mime`.
pub fn api_key_for(slug: &str, rng: &mut (dyn RngCore + Send)) -> String {
  match slug {
    "nidoran" => {
      let gender = ["m", "f"].choose(rng).copied().unwrap_or("m");
      format!("nidoran-{gender}")
    }
    "mime" => "mr-mime".to_string(),
    other => other.to_string(),
  }
}

pub struct ImageCache<S> {
  source: S,
  cache_dir: PathBuf,
  url_prefix: String,
}

impl<S: ArtworkSource> ImageCache<S> {
  pub fn new(source: S, cache_dir: PathBuf, url_prefix: &str) -> Self {
    Self { source, cache_dir, url_prefix: url_prefix.trim_end_matches('/').to_string() }
  }

  /// Return the cached reference for `name`, fetching and storing the artwork on a miss.
  /// The file is keyed by the word-bank slug, so a random gender choice sticks after the first write.
  #[instrument(level = "debug", skip(self, rng))]
  pub async fn resolve(&self, name: &str, rng: &mut (dyn RngCore + Send)) -> Result<String, ImageError> {
    let slug = species_slug(name);
    if slug.is_empty() {
      return Err(ImageError::MissingArtwork(name.to_string()));
    }
    let file = self.cache_dir.join(format!("{slug}.png"));
    let reference = format!("{}/{}.png", self.url_prefix, utf8_percent_encode(&slug, SLUG_SEGMENT));

    if tokio::fs::try_exists(&file).await? {
      debug!(target: "hangman", %slug, "Artwork cache hit");
      return Ok(reference);
    }

    let api_key = api_key_for(&slug, rng);
    let bytes = self.source.fetch_artwork(&api_key).await?;

    tokio::fs::create_dir_all(&self.cache_dir).await?;
    // Write then rename so a concurrent reader never serves a partial file.
    let tmp = self.cache_dir.join(format!(".{slug}.{}.tmp", Uuid::new_v4()));
    tokio::fs::write(&tmp, &bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, &file).await {
      let _ = tokio::fs::remove_file(&tmp).await;
      return Err(e.into());
    }
    info!(target: "hangman", %slug, %api_key, "Artwork cached");
    Ok(reference)
  }
}
