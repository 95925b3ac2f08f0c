use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub api: ApiConfig,
  #[serde(default)]
  pub agenda: AgendaConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Endpoint the backend's action dispatcher listens on
  pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgendaConfig {
  /// Start in week view instead of day view
  #[serde(default)]
  pub week_view: bool,
  /// Professional whose agenda is listed (backend default when unset)
  pub professional: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Disable to go straight to the network on every load
  #[serde(default = "default_cache_enabled")]
  pub enabled: bool,
  /// Staleness cutoff for cached listings, in seconds
  #[serde(default = "default_cache_max_age_secs")]
  pub max_age_secs: u64,
}

fn default_cache_enabled() -> bool {
  true
}

fn default_cache_max_age_secs() -> u64 {
  120
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: default_cache_enabled(),
      max_age_secs: default_cache_max_age_secs(),
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./prontio.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/prontio/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/prontio/config.yaml\n\
                 with at least an api.url entry."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("prontio.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("prontio").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Get the API token from environment variables.
  ///
  /// Checks PRONTIO_API_TOKEN first, then PRONTIO_TOKEN as fallback.
  pub fn get_api_token() -> Result<String> {
    std::env::var("PRONTIO_API_TOKEN")
      .or_else(|_| std::env::var("PRONTIO_TOKEN"))
      .map_err(|_| {
        eyre!("API token not found. Set PRONTIO_API_TOKEN or PRONTIO_TOKEN environment variable.")
      })
  }
}
