use crate::anim::Easing;
use crate::launch::CommandLine;
use derive_more::{AsRef, Deref, Display, From, Into};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Display name of a menu item. Not rendered anywhere, kept for the config
/// file's readability and for logging.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Label(String);

crate::impl_string_newtype!(Label);

/// One entry of the ring. Insertion order in the config file determines
/// angular placement.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MenuItem {
    pub label: Label,
    #[serde(default)]
    pub command: CommandLine,
    #[serde(default)]
    pub icon: PathBuf,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Side length of the (square) menu window.
    pub window_size: f64,
    /// Distance from the window center to each button's center.
    pub ring_radius: f64,
    /// Diameter of each button.
    pub button_size: f64,
    pub open_ms: u64,
    pub close_ms: u64,
    /// Interval of the outside-pointer poll while the menu is open.
    pub poll_ms: u64,
    pub open_easing: Easing,
    pub close_easing: Easing,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            window_size: 300.0,
            ring_radius: 100.0,
            button_size: 60.0,
            open_ms: 500,
            close_ms: 300,
            poll_ms: 50,
            open_easing: Easing::BackOut,
            close_easing: Easing::BackIn,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub menu: MenuConfig,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs =
        ProjectDirs::from("org", "whirl", "whirl").ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

/// Loads the config file (CLI override first, then the XDG location), layered
/// with `WHIRL_`-prefixed environment variables. A missing file is fine.
pub fn load_config(path_override: Option<&PathBuf>) -> Result<Config, ConfigError> {
    let config_path = match path_override {
        Some(p) => p.clone(),
        None => get_config_path()?,
    };

    let s = config::Config::builder()
        .add_source(config::File::from(config_path).required(false))
        .add_source(config::Environment::with_prefix("WHIRL"))
        .build()?;

    Ok(s.try_deserialize()?)
}

/// Best-effort load: a broken or unreadable config degrades to an empty menu
/// rather than refusing to start.
pub fn load_or_default(path_override: Option<&PathBuf>) -> Config {
    match load_config(path_override) {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Falling back to default config: {}", e);
            Config::default()
        }
    }
}

/// Writes the commented example config if none exists yet, returning its path.
pub fn write_default_config() -> std::io::Result<PathBuf> {
    let path =
        get_config_path().map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");
