//! Client configuration: TOML-backed option set with command-line overrides.
//!
//! Every field has a default, so a partial (or missing) file is valid. Values
//! are sanitized after every load or override: a tick rate that is not a
//! positive finite number falls back to the default rather than failing.

use crate::error::{Result, WrathError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_TICK_RATE: f64 = 30.0;
const DEFAULT_INPUT_CADENCE_HZ: f64 = 15.0;

/// Display mode of the presentation surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    Fullscreen,
    FullscreenWindowed,
    #[default]
    Windowed,
    WindowedUndecorated,
}

/// Options consumed by the scheduler and the windowing collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Simulation ticks per second, constant for the session
    pub tick_rate: f64,
    /// How often held-down input callbacks re-run, clamped into `[1, tick_rate]`
    pub persistent_input_cadence_hz: f64,
    /// Frame cap; 0 means uncapped
    pub max_frames_per_second: u32,
    pub window_state: WindowState,
    pub resolution_width: u32,
    pub resolution_height: u32,
    pub window_width: u32,
    pub window_height: u32,
    /// When true the window always matches the rendering resolution
    pub resolution_is_window_size: bool,
    pub vsync: bool,
    pub window_resizable: bool,
    pub debug_mode: bool,
    pub display_samples: u32,
    pub screenshot_dir: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            persistent_input_cadence_hz: DEFAULT_INPUT_CADENCE_HZ,
            max_frames_per_second: 0,
            window_state: WindowState::Windowed,
            resolution_width: 800,
            resolution_height: 600,
            window_width: 800,
            window_height: 600,
            resolution_is_window_size: true,
            vsync: true,
            window_resizable: true,
            debug_mode: false,
            display_samples: 0,
            screenshot_dir: PathBuf::from("etc/screenshots"),
        }
    }
}

impl GameConfig {
    /// Load a config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: GameConfig = toml::from_str(&content)?;
        Ok(config.sanitized())
    }

    /// Load a config file, falling back to defaults when it is absent or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Could not load config {}: {e}; using defaults", path.display());
            Self::default()
        })
    }

    /// Write the config as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `key=value` overrides (typically command-line arguments).
    ///
    /// Values are read as TOML scalars (integer, float, boolean) and otherwise
    /// as strings. Malformed entries, unknown keys, and values of the wrong
    /// type are skipped with a warning. Returns how many overrides were applied.
    pub fn apply_overrides<I, S>(&mut self, overrides: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut applied = 0;
        for raw in overrides {
            let raw = raw.as_ref();
            let Some((key, value)) = raw.split_once('=') else {
                log::warn!("Ignoring malformed config override '{raw}' (expected key=value)");
                continue;
            };
            let key = key.trim();

            let mut table = match toml::Value::try_from(&*self)? {
                toml::Value::Table(table) => table,
                _ => return Err(WrathError::Config("config is not a table".into())),
            };
            if !table.contains_key(key) {
                log::warn!("Ignoring unknown config key '{key}'");
                continue;
            }
            table.insert(key.to_string(), parse_scalar(value.trim()));

            match GameConfig::deserialize(toml::Value::Table(table)) {
                Ok(updated) => {
                    *self = updated.sanitized();
                    applied += 1;
                }
                Err(e) => log::warn!("Ignoring override '{raw}': {e}"),
            }
        }
        Ok(applied)
    }

    /// Window parameters for the windowing collaborator.
    pub fn window_settings(&self, title: &str) -> WindowSettings {
        let (width, height) = if self.resolution_is_window_size {
            (self.resolution_width, self.resolution_height)
        } else {
            (self.window_width, self.window_height)
        };
        WindowSettings {
            title: title.to_string(),
            width,
            height,
            resolution: (self.resolution_width, self.resolution_height),
            fullscreen: self.window_state == WindowState::Fullscreen,
            decorated: matches!(
                self.window_state,
                WindowState::Windowed | WindowState::Fullscreen
            ),
            resizable: self.window_resizable,
            vsync: self.vsync,
            samples: self.display_samples,
        }
    }

    /// Replace values the scheduler cannot run with by their defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            log::warn!(
                "tick_rate {} is not a positive number, using {DEFAULT_TICK_RATE}",
                self.tick_rate
            );
            self.tick_rate = DEFAULT_TICK_RATE;
        }
        if !self.persistent_input_cadence_hz.is_finite() {
            self.persistent_input_cadence_hz = DEFAULT_INPUT_CADENCE_HZ;
        }
        self
    }
}

fn parse_scalar(value: &str) -> toml::Value {
    if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = value.parse::<f64>() {
        toml::Value::Float(f)
    } else if let Ok(b) = value.parse::<bool>() {
        toml::Value::Boolean(b)
    } else {
        toml::Value::String(value.to_string())
    }
}

/// What the windowing collaborator needs to open a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSettings {
    pub title: String,
    /// Window size in pixels (for fullscreen modes the surface may substitute the monitor size)
    pub width: u32,
    pub height: u32,
    /// Rendering resolution
    pub resolution: (u32, u32),
    pub fullscreen: bool,
    pub decorated: bool,
    pub resizable: bool,
    pub vsync: bool,
    pub samples: u32,
}

impl WindowSettings {
    /// Rendering aspect ratio (width / height)
    pub fn aspect_ratio(&self) -> f32 {
        let (w, h) = self.resolution;
        if h == 0 {
            1.0
        } else {
            w as f32 / h as f32
        }
    }
}
