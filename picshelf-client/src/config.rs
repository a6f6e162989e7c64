//! Client configuration.
//!
//! Evaluation order, later wins:
//! 1) built-in defaults,
//! 2) a TOML or JSON file (`$PICSHELF_CONFIG_PATH`, else the first of
//!    `picshelf.toml`, `picshelf.json`, `config/picshelf.toml` that exists),
//! 3) `PICSHELF_*` environment variables, with `.env` loaded first,
//! 4) explicit overrides from the caller (CLI flags).

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::domains::gallery::service::DEFAULT_PAGE_SIZE;
use crate::domains::gallery::triggers::{
    DEFAULT_PREFETCH_MARGIN, DEFAULT_SCROLL_DEBOUNCE, TriggerSettings,
};
use crate::infra::api_client::{DEFAULT_TIMEOUT, normalize_base_url};

pub const DEFAULT_API_URL: &str = "http://localhost:3030/api/images";

pub const ENV_CONFIG_PATH: &str = "PICSHELF_CONFIG_PATH";
pub const ENV_API_URL: &str = "PICSHELF_API_URL";
pub const ENV_PAGE_SIZE: &str = "PICSHELF_PAGE_SIZE";
pub const ENV_TIMEOUT_SECS: &str = "PICSHELF_TIMEOUT_SECS";
pub const ENV_DOWNLOAD_DIR: &str = "PICSHELF_DOWNLOAD_DIR";

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error("invalid API URL '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API URL '{url}' must use http or https")]
    UnsupportedScheme { url: String },
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

/// Where the file layer came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base of the image API; list, upload and fetch hang off it.
    pub api_url: String,
    /// Images requested per page.
    pub page_size: u32,
    #[serde(deserialize_with = "deserialize_duration")]
    pub request_timeout: Duration,
    /// Quiet period before a scroll/resize burst is evaluated.
    #[serde(deserialize_with = "deserialize_duration")]
    pub scroll_debounce: Duration,
    /// Distance in pixels from the list end at which the next page loads.
    pub prefetch_margin_px: f32,
    pub download_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: DEFAULT_TIMEOUT,
            scroll_debounce: DEFAULT_SCROLL_DEBOUNCE,
            prefetch_margin_px: DEFAULT_PREFETCH_MARGIN,
            download_dir: PathBuf::from("."),
        }
    }
}

impl ClientConfig {
    /// Loads file and environment layers on top of the defaults.
    pub fn load() -> Result<(Self, ConfigSource), ConfigLoadError> {
        Self::load_from(None)
    }

    /// Like [`ClientConfig::load`], but an explicit file replaces the
    /// discovery step.
    pub fn load_from(
        explicit: Option<&Path>,
    ) -> Result<(Self, ConfigSource), ConfigLoadError> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("[Config] Loaded {}", path.display()),
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err.into()),
        }

        let (mut config, source) = match explicit {
            Some(path) => (
                Self::load_from_file(path)?,
                ConfigSource::File(path.to_path_buf()),
            ),
            None => Self::load_file_layer(|key| std::env::var(key).ok())?,
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok((config, source))
    }

    fn load_file_layer(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(Self, ConfigSource), ConfigLoadError> {
        if let Some(path_str) = lookup(ENV_CONFIG_PATH)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::EnvPath(path)));
        }

        if let Some(path) = Self::find_default_file() {
            let config = Self::load_from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::default(), ConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| {
                ConfigLoadError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            })?;
        let origin = path.display().to_string();

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents).map_err(|err| {
                ConfigLoadError::Parse {
                    origin,
                    message: err.to_string(),
                }
            }),
            Some("toml") => toml::from_str(&contents).map_err(|err| {
                ConfigLoadError::Parse {
                    origin,
                    message: err.to_string(),
                }
            }),
            _ => Self::parse_from_str(&contents, &origin),
        }
    }

    /// Tries TOML first, then JSON.
    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> Result<Self, ConfigLoadError> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                ConfigLoadError::Parse {
                    origin: origin.to_string(),
                    message: format!(
                        "toml error: {}; json error: {}",
                        toml_err, json_err
                    ),
                }
            })
        })
    }

    /// Applies `PICSHELF_*` variables returned by `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigLoadError> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_blank(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(raw) = non_blank(ENV_PAGE_SIZE) {
            self.page_size = parse_number(ENV_PAGE_SIZE, &raw)?;
        }
        if let Some(raw) = non_blank(ENV_TIMEOUT_SECS) {
            self.request_timeout =
                Duration::from_secs(parse_number(ENV_TIMEOUT_SECS, &raw)?);
        }
        if let Some(dir) = non_blank(ENV_DOWNLOAD_DIR) {
            self.download_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Normalises the API URL and rejects values the client cannot use.
    pub fn validate(&mut self) -> Result<(), ConfigLoadError> {
        let normalized = normalize_base_url(&self.api_url);
        let parsed = Url::parse(&normalized).map_err(|source| {
            ConfigLoadError::InvalidUrl {
                url: self.api_url.clone(),
                source,
            }
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigLoadError::UnsupportedScheme { url: normalized });
        }
        self.api_url = normalized;

        if self.page_size == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "page_size".to_string(),
                value: "0".to_string(),
            });
        }
        if !self.prefetch_margin_px.is_finite() || self.prefetch_margin_px < 0.0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "prefetch_margin_px".to_string(),
                value: self.prefetch_margin_px.to_string(),
            });
        }
        Ok(())
    }

    pub fn trigger_settings(&self) -> TriggerSettings {
        TriggerSettings {
            debounce: self.scroll_debounce,
            margin: self.prefetch_margin_px,
        }
    }

    fn find_default_file() -> Option<PathBuf> {
        const CANDIDATES: &[&str] =
            &["picshelf.toml", "picshelf.json", "config/picshelf.toml"];

        CANDIDATES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(|path| path.to_path_buf())
    }
}

fn parse_number<T: std::str::FromStr>(
    key: &str,
    raw: &str,
) -> Result<T, ConfigLoadError> {
    raw.trim().parse().map_err(|_| ConfigLoadError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Text(String),
    Millis(u64),
}

/// Accepts humantime strings ("200ms", "30s") or plain milliseconds.
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match RawDuration::deserialize(deserializer)? {
        RawDuration::Text(text) => humantime::parse_duration(text.trim())
            .map_err(serde::de::Error::custom),
        RawDuration::Millis(ms) => Ok(Duration::from_millis(ms)),
    }
}
