//! Editor settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Settings file: JSON, `$XDG_CONFIG_HOME/litestone/persistent.json` by default
//! 3. Environment variables: `LITESTONE_*` prefix
//!
//! Loading never fails the caller: a missing file contributes nothing and a
//! malformed one is reported and replaced by the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::application::ApplicationError;

pub const SETTINGS_FILE_NAME: &str = "persistent.json";

/// Used when no platform config directory can be determined.
pub const FALLBACK_SETTINGS_PATH: &str = "data/persistent.json";

pub const ENV_PREFIX: &str = "LITESTONE";

/// Window geometry and default text font of the editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub window_width: u32,
    pub window_height: u32,
    /// Window position, None lets the window manager decide
    pub window_x: Option<i32>,
    pub window_y: Option<i32>,
    pub default_font: String,
    pub default_font_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            window_x: None,
            window_y: None,
            default_font: "Arial".into(),
            default_font_size: 12,
        }
    }
}

/// Get the XDG config directory for litestone.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "litestone").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the settings file.
pub fn default_settings_path() -> PathBuf {
    global_config_dir()
        .map(|dir| dir.join(SETTINGS_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_SETTINGS_PATH))
}

impl Settings {
    /// Load settings, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("using default settings: {}", e);
                Self::default()
            }
        }
    }

    /// Load settings, reporting malformed sources.
    ///
    /// A missing file is not an error; its keys keep their defaults.
    pub fn try_load(path: &Path) -> Result<Self, ApplicationError> {
        debug!("loading settings from {}", path.display());
        let config = Config::builder()
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Json)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ApplicationError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ApplicationError::Config {
                message: format!("create {}: {}", parent.display(), e),
            })?;
        }
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| ApplicationError::Config {
            message: format!("write {}: {}", path.display(), e),
        })
    }

    pub fn to_json(&self) -> Result<String, ApplicationError> {
        serde_json::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {e}"),
        })
    }

    /// Generate a template settings file.
    pub fn template() -> String {
        r#"{
  "window_width": 800,
  "window_height": 600,
  "window_x": null,
  "window_y": null,
  "default_font": "Arial",
  "default_font_size": 12
}
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
