use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use std::{env, fs};

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{Catalog, Category};
use crate::timer::{FadeOut, TimerConfig};
use crate::track::DEFAULT_TRACK_DOMAIN;
use crate::widget::LayoutMode;

pub const CONFIG_FILE: &str = "hushbox.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("fade_out must be one of 0, 5, 10, 15, 20, 30, 60 (got {0})")]
    InvalidFadeOut(u32),
    #[error("unknown layout {0:?}")]
    InvalidLayout(String),
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("catalog has no sounds")]
    EmptyCatalog,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub player: PlayerConfig,
    pub timer: TimerConfig,
    pub metadata: MetadataConfig,
    pub catalog: Catalog,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player: PlayerConfig::default(),
            timer: TimerConfig::default(),
            metadata: MetadataConfig::default(),
            catalog: Catalog::builtin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub volume: u8,
    pub layout: LayoutMode,
    /// Substring a custom track URL has to contain
    pub custom_track_domain: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 80,
            layout: LayoutMode::Attached,
            custom_track_domain: DEFAULT_TRACK_DOMAIN.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataConfig {
    pub lookup: bool,
    pub timeout: Duration,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            lookup: true,
            timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load `explicit`, or the first config file found next to the working
    /// directory or the executable. Defaults when nothing is found.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        for path in Self::candidates() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        log::info!("No {} found; using defaults", CONFIG_FILE);
        Ok(Config::default())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(current_dir) = env::current_dir() {
            candidates.push(current_dir.join(CONFIG_FILE));
            candidates.push(current_dir.join("config").join(CONFIG_FILE));
        }

        if let Ok(exe) = env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join(CONFIG_FILE));
                candidates.push(dir.join("config").join(CONFIG_FILE));
            }
        }

        candidates
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&data)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(data: &str) -> Result<Self, ConfigError> {
        let doc: ConfigDocument = toml::from_str(data)?;
        Self::try_from(doc)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    player: PlayerSection,
    #[serde(default)]
    timer: TimerSection,
    #[serde(default)]
    metadata: MetadataSection,
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Default, Deserialize)]
struct PlayerSection {
    volume: Option<u8>,
    layout: Option<String>,
    custom_track_domain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TimerSection {
    fade_out: Option<u32>,
    restore_grace_ms: Option<u64>,
    countdown_tick_ms: Option<u64>,
    ramp_tick_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MetadataSection {
    lookup: Option<bool>,
    timeout_secs: Option<u64>,
}

fn nonzero_ms(value: Option<u64>, default: Duration, name: &'static str) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(default),
        Some(0) => Err(ConfigError::ZeroInterval(name)),
        Some(ms) => Ok(Duration::from_millis(ms)),
    }
}

impl TryFrom<ConfigDocument> for Config {
    type Error = ConfigError;

    fn try_from(value: ConfigDocument) -> Result<Self, Self::Error> {
        let defaults = Config::default();

        let layout = match value.player.layout {
            Some(name) => LayoutMode::from_str(&name).map_err(|_| ConfigError::InvalidLayout(name))?,
            None => defaults.player.layout,
        };
        let player = PlayerConfig {
            volume: value.player.volume.unwrap_or(defaults.player.volume).min(100),
            layout,
            custom_track_domain: value
                .player
                .custom_track_domain
                .unwrap_or(defaults.player.custom_track_domain),
        };

        let fade_out = match value.timer.fade_out {
            Some(seconds) => FadeOut::from_seconds(seconds).ok_or(ConfigError::InvalidFadeOut(seconds))?,
            None => defaults.timer.fade_out,
        };
        let timer = TimerConfig {
            fade_out,
            countdown_tick: nonzero_ms(
                value.timer.countdown_tick_ms,
                defaults.timer.countdown_tick,
                "countdown_tick_ms",
            )?,
            ramp_tick: nonzero_ms(value.timer.ramp_tick_ms, defaults.timer.ramp_tick, "ramp_tick_ms")?,
            // Zero grace is allowed: restore right after the pause.
            restore_grace: value
                .timer
                .restore_grace_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.timer.restore_grace),
        };

        let metadata = MetadataConfig {
            lookup: value.metadata.lookup.unwrap_or(defaults.metadata.lookup),
            timeout: value
                .metadata
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.metadata.timeout),
        };

        let catalog = if value.categories.is_empty() {
            defaults.catalog
        } else {
            Catalog::from_categories(value.categories).ok_or(ConfigError::EmptyCatalog)?
        };

        Ok(Config {
            player,
            timer,
            metadata,
            catalog,
        })
    }
}
