//! Launcher configuration loaded from TOML
//!
//! Every field has a default, so a missing file (or a partial one) is fine.
//! Malformed TOML and unusable screen dimensions are reported as errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LauncherError, Result};

/// Thresholds used by the gesture classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Stationary press duration before a long press fires (ms)
    pub long_press_duration_ms: u64,
    /// Movement allowed before a press stops being a tap (px)
    pub touch_slop: f64,
    /// Minimum release speed on either axis for a fling (px/s)
    pub min_fling_velocity: f64,
    /// Flings this soon after a drag release are swallowed (ms)
    pub fling_suppression_ms: u64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            long_press_duration_ms: 500,
            touch_slop: 16.0,
            min_fling_velocity: 150.0,
            fling_suppression_ms: 500,
        }
    }
}

impl GestureSettings {
    pub fn long_press_duration(&self) -> Duration {
        Duration::from_millis(self.long_press_duration_ms)
    }

    pub fn fling_suppression(&self) -> Duration {
        Duration::from_millis(self.fling_suppression_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// Real screen height in logical pixels (panel hidden offset)
    pub screen_height: f64,
    /// Real screen width, only used by the headless grid
    pub screen_width: f64,
    pub gesture: GestureSettings,
    /// Duration of the panel show/hide tween (ms)
    pub panel_animation_ms: u64,
    /// How far above the finger an icon menu is anchored (px)
    pub icon_anchor_offset: f64,
    /// How far above the finger the empty-area menu is anchored (px)
    pub home_anchor_offset: f64,
    /// Where launcher records and grid placements are persisted
    pub data_dir: Option<PathBuf>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            screen_height: 2000.0,
            screen_width: 1080.0,
            gesture: GestureSettings::default(),
            panel_animation_ms: 150,
            icon_anchor_offset: 64.0,
            home_anchor_offset: 48.0,
            data_dir: None,
        }
    }
}

impl LauncherConfig {
    /// Load config from a TOML file, falling back to defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config = toml::from_str::<Self>(&contents)?;
        config.validate()?;
        tracing::info!("Loaded launcher config from {:?}", path);
        Ok(config)
    }

    /// Panel offsets are clamped to `0..=screen_height`, so it must be usable
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("screen_height", self.screen_height), ("screen_width", self.screen_width)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LauncherError::InvalidScreenSize { field, value });
            }
        }
        Ok(())
    }

    pub fn panel_animation(&self) -> Duration {
        Duration::from_millis(self.panel_animation_ms)
    }

    /// Data directory, defaulting to ~/.local/state/flick/launcher
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        std::env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .or_else(|_| std::env::var("HOME").map(|h| PathBuf::from(h).join(".local/state")))
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
            .join("flick/launcher")
    }
}
