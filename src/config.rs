//! Game configuration: personas, prompt template and AI endpoint settings
//!
//! The document is plain JSON, read from a local file or fetched over HTTP.
//! It is loaded once and treated as read-only afterwards.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::llm::DEFAULT_MODEL;

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_REVEAL_DELAY_MS: u64 = 1500;

/// Errors that make the config unavailable. All of them abort initialization.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to fetch config from {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },
    #[error("failed to load config from {url}: HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A historical figure the AI impersonates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Persona {
    pub id: String,
    pub display_name: String,
    pub background: String,
    /// Gallery caption for the relic; never reveals the name
    #[serde(default)]
    pub relic: Option<String>,
    /// Biography shown on the reveal screen
    #[serde(default)]
    pub details: Option<String>,
}

/// Connection settings for the chat-completions endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiSettings {
    pub endpoint: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ApiSettings {
    /// Replace the `Authorization` header with a bearer token.
    pub fn set_bearer_token(&mut self, token: &str) {
        self.headers
            .retain(|name, _| !name.eq_ignore_ascii_case("authorization"));
        self.headers
            .insert("Authorization".to_string(), format!("Bearer {token}"));
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_reveal_delay_ms() -> u64 {
    DEFAULT_REVEAL_DELAY_MS
}

/// Validated game configuration
#[derive(Debug, Clone)]
pub struct GameConfig {
    personas: Vec<Persona>,
    pub system_prompt_template: String,
    pub api_settings: ApiSettings,
    pub reveal_delay: Duration,
    pub background_story: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(deserialize_with = "ordered_characters")]
    characters: Vec<(String, Persona)>,
    system_prompt_template: String,
    api_settings: ApiSettings,
    #[serde(default = "default_reveal_delay_ms")]
    reveal_delay_ms: u64,
    #[serde(default)]
    background_story: Option<String>,
}

/// Keep `characters` in document order; the gallery numbers relics by it.
fn ordered_characters<'de, D>(deserializer: D) -> Result<Vec<(String, Persona)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct CharactersVisitor;

    impl<'de> Visitor<'de> for CharactersVisitor {
        type Value = Vec<(String, Persona)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map from persona id to persona")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Persona>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(CharactersVisitor)
}

impl GameConfig {
    /// Parse and validate a config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(json)?;

        if raw.api_settings.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("api_settings.endpoint is empty".into()));
        }
        // reqwest fails a zero timeout before the request is sent
        if raw.api_settings.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api_settings.timeout_secs must be positive".into()));
        }

        let mut seen = HashSet::new();
        let mut personas = Vec::with_capacity(raw.characters.len());
        for (key, persona) in raw.characters {
            if persona.id.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "character {key:?} has an empty id"
                )));
            }
            // The reveal step looks personas up by `id`, sessions by key.
            if persona.id != key {
                return Err(ConfigError::Invalid(format!(
                    "character key {key:?} does not match its id {:?}",
                    persona.id
                )));
            }
            if !seen.insert(key.clone()) {
                return Err(ConfigError::Invalid(format!("duplicate character {key:?}")));
            }
            personas.push(persona);
        }

        Ok(Self {
            personas,
            system_prompt_template: raw.system_prompt_template,
            api_settings: raw.api_settings,
            reveal_delay: Duration::from_millis(raw.reveal_delay_ms),
            background_story: raw.background_story,
        })
    }

    /// Personas in document order
    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn persona(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }
}

/// Where the config document lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Url(String),
}

impl ConfigSource {
    /// `http://` and `https://` locations are fetched, anything else is a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Url(location.to_string())
        } else {
            Self::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

/// Load the config once. No retry; the caller reports the failure and stops.
pub async fn load(source: &ConfigSource) -> Result<GameConfig, ConfigError> {
    let body = match source {
        ConfigSource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?
        }
        ConfigSource::Url(url) => fetch(url).await?,
    };

    let config = GameConfig::from_json(&body)?;
    tracing::info!(
        source = %source,
        personas = config.personas.len(),
        model = %config.api_settings.model,
        "Loaded game config"
    );
    Ok(config)
}

async fn fetch(url: &str) -> Result<String, ConfigError> {
    let fetch_err = |source| ConfigError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = reqwest::get(url).await.map_err(fetch_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(ConfigError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response.text().await.map_err(fetch_err)
}
