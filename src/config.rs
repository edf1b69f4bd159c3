//! Configuration for the shader catalog
//!
//! Loads config from the platform config directory
//! (e.g. ~/.config/shadertoy-catalog/config.toml) with sensible defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Initial inner width in logical pixels
    pub width: u32,
    /// Initial inner height in logical pixels
    pub height: u32,
    /// Title prefix; the active unit and parameter are appended
    pub title: String,
    /// Present with vsync (Fifo) or as fast as possible
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Shadertoys".to_string(),
            vsync: true,
        }
    }
}

/// What to show first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Key of the first unit; the first in display order when unset
    pub shader: Option<String>,
    /// Start with the clock paused
    pub paused: bool,
}

/// Where the compiled SPIR-V module lives when it isn't embedded at build time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadersConfig {
    pub binary: Option<PathBuf>,
}

/// A named channel texture: a single image, or a directory of frames
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextureEntry {
    Image(PathBuf),
    Sequence { frames: PathBuf, fps: f32 },
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub startup: StartupConfig,
    pub shaders: ShadersConfig,
    pub textures: HashMap<String, TextureEntry>,
    /// Per-unit parameter overrides, keyed by unit key then parameter name
    pub params: HashMap<String, HashMap<String, f32>>,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    /// Get the config directory path (e.g. ~/.config/shadertoy-catalog)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("shadertoy-catalog"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Load config from the default location, or return defaults if absent or broken
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::info!("Could not determine config path, using defaults");
            return Self::default();
        };

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{:#}, using defaults", anyhow::Error::from(e));
                Self::default()
            }
        }
    }

    /// Load config from an explicit path; errors are returned, not swallowed
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn shader_binary(&self) -> Option<PathBuf> {
        self.shaders.binary.as_deref().map(|p| self.resolve_path(p))
    }

    pub fn params_for(&self, key: &str) -> Option<&HashMap<String, f32>> {
        self.params.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.window.width, 1280);
        assert!(config.window.vsync);
        assert!(config.startup.shader.is_none());
        assert!(config.textures.is_empty());
    }

    #[test]
    fn parses_every_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[window]
width = 640
title = "Catalog"

[startup]
shader = "plasma"
paused = true

[shaders]
binary = "shaders.spv"

[textures]
swirl-source = "images/swirl.png"
flames = {{ frames = "/data/flames", fps = 24.0 }}

[params.plasma]
speed = 0.5
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        let dir = file.path().parent().unwrap();
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.startup.shader.as_deref(), Some("plasma"));
        assert!(config.startup.paused);
        assert_eq!(config.shader_binary(), Some(dir.join("shaders.spv")));
        assert_eq!(
            config.textures["swirl-source"],
            TextureEntry::Image(PathBuf::from("images/swirl.png"))
        );
        assert_eq!(
            config.textures["flames"],
            TextureEntry::Sequence {
                frames: PathBuf::from("/data/flames"),
                fps: 24.0
            }
        );
        assert_eq!(config.params_for("plasma").unwrap()["speed"], 0.5);
    }

    #[test]
    fn explicit_path_errors_are_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[window]\nwidth = \"wide\"").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        // the logged message carries the toml cause after the config path
        let logged = format!("{:#}", anyhow::Error::from(err));
        assert!(logged.starts_with("failed to parse config"));
        assert!(logged.contains(": "));
        assert!(logged.contains("width"));

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            Config::load_from(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
