//! Persistent application configuration model and defaults.

use std::path::{Path, PathBuf};

use log::{error, info};

/// Root configuration persisted to `rondo.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Playback preferences restored on startup.
    pub playback: PlaybackConfig,
}

/// Playback preferences persisted between sessions.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub repeat_mode: StartupRepeatMode,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            repeat_mode: StartupRepeatMode::default(),
        }
    }
}

/// Persisted repeat preference for startup restore.
#[derive(Debug, Clone, Copy, serde::Deserialize, serde::Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StartupRepeatMode {
    #[default]
    Off,
    All,
}

fn default_volume() -> f32 {
    0.5
}

/// Clamps out-of-range values read from disk into usable ones.
pub fn sanitize_config(config: Config) -> Config {
    Config {
        playback: PlaybackConfig {
            volume: config.playback.volume.clamp(0.0, 1.0),
            repeat_mode: config.playback.repeat_mode,
        },
    }
}

/// Default config file location under the platform config directory.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rondo").join("rondo.toml"))
}

/// Reads the config file, creating it with defaults when missing. Unreadable
/// or unparsable content falls back to defaults rather than failing startup.
pub fn load_or_create(config_file: &Path) -> Config {
    if !config_file.exists() {
        let default_config = Config::default();
        info!(
            "Config file not found. Creating default config. path={}",
            config_file.display()
        );
        save(config_file, &default_config);
        return default_config;
    }

    match std::fs::read_to_string(config_file) {
        Ok(content) => sanitize_config(toml::from_str::<Config>(&content).unwrap_or_default()),
        Err(e) => {
            error!(
                "Failed to read config file, using defaults. path={} error={}",
                config_file.display(),
                e
            );
            Config::default()
        }
    }
}

/// Writes the config to disk, creating parent directories as needed.
pub fn save(config_file: &Path, config: &Config) {
    if let Some(parent) = config_file.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            error!(
                "Failed to create config directory. path={} error={}",
                parent.display(),
                e
            );
            return;
        }
    }

    let serialized = match toml::to_string(config) {
        Ok(serialized) => serialized,
        Err(e) => {
            error!("Failed to serialize config: {}", e);
            return;
        }
    };
    if let Err(e) = std::fs::write(config_file, serialized) {
        error!(
            "Failed to write config file. path={} error={}",
            config_file.display(),
            e
        );
    }
}
