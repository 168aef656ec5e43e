use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// In what order the collected files are cycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    Random,
    Keep,
    Name,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[value(alias = "ascending")]
    Asc,
    #[value(alias = "descending")]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    Fullscreen,
    Maximized,
    /// Maximized, undecorated, kept below every other window.
    Desktop,
    Window,
    Undecorated,
}

/// Scaling policy: fill the screen (`max`) or fit inside it (`min`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatioTarget {
    Max,
    Min,
}

/// Effective slideshow options: saved settings overlaid with CLI arguments.
///
/// Persisted as a flat JSON object in the user config dir and rewritten on
/// every run. The file list is deliberately not part of this blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interval in seconds between image changes.
    pub seconds: f32,
    /// Fade duration as a fraction of the interval; 0 disables fade.
    pub fade: f32,
    /// How much to zoom images, as a ratio of their size; 0 disables zoom.
    pub zoom: f32,
    /// How much to pan images sideways, as a ratio of screen size; 0 disables pan.
    pub pan: f32,
    pub sort: SortMode,
    pub sort_order: SortOrder,
    /// Monitor to run on, 1-based; clamped to the available monitor count.
    pub monitor: usize,
    pub mode: WindowMode,
    pub title: String,
    pub hide_from_taskbar: bool,
    pub quit_on_motion: bool,
    pub ar_target: AspectRatioTarget,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seconds: 6.0,
            fade: 0.5,
            zoom: 0.2,
            pan: 0.05,
            sort: SortMode::Random,
            sort_order: SortOrder::Asc,
            monitor: 1,
            mode: WindowMode::Fullscreen,
            title: "Slidedrift".to_string(),
            hide_from_taskbar: false,
            quit_on_motion: false,
            ar_target: AspectRatioTarget::Max,
        }
    }
}

/// CLI values that take precedence over the saved settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seconds: Option<f32>,
    pub fade: Option<f32>,
    pub zoom: Option<f32>,
    pub pan: Option<f32>,
    pub sort: Option<SortMode>,
    pub sort_order: Option<SortOrder>,
    pub monitor: Option<usize>,
    pub mode: Option<WindowMode>,
    pub title: Option<String>,
    pub hide_from_taskbar: Option<bool>,
    pub quit_on_motion: Option<bool>,
    pub ar_target: Option<AspectRatioTarget>,
}

/// Location of the persisted settings blob, if a config dir exists.
pub fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("slidedrift").join("settings.json"))
}

impl Settings {
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing settings from {}", path.display()))
    }

    /// Load saved settings, falling back to defaults. Persistence is
    /// best-effort, so a missing or unparsable file is not an error.
    pub fn load_saved() -> Self {
        let Some(path) = settings_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(err) => {
                debug!("no saved settings: {err:#}");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating settings dir {}", dir.display()))?;
        }
        let raw = serde_json::to_string_pretty(self).context("serializing settings")?;
        fs::write(path, raw).with_context(|| format!("writing settings to {}", path.display()))
    }

    /// Persist the effective settings for the next run, best-effort.
    pub fn save(&self) {
        let Some(path) = settings_path() else {
            return;
        };
        if let Err(err) = self.save_to(&path) {
            debug!("could not save settings: {err:#}");
        }
    }

    pub fn with_overrides(mut self, cli: &Overrides) -> Self {
        if let Some(v) = cli.seconds {
            self.seconds = v;
        }
        if let Some(v) = cli.fade {
            self.fade = v;
        }
        if let Some(v) = cli.zoom {
            self.zoom = v;
        }
        if let Some(v) = cli.pan {
            self.pan = v;
        }
        if let Some(v) = cli.sort {
            self.sort = v;
        }
        if let Some(v) = cli.sort_order {
            self.sort_order = v;
        }
        if let Some(v) = cli.monitor {
            self.monitor = v;
        }
        if let Some(v) = cli.mode {
            self.mode = v;
        }
        if let Some(v) = &cli.title {
            self.title = v.clone();
        }
        if let Some(v) = cli.hide_from_taskbar {
            self.hide_from_taskbar = v;
        }
        if let Some(v) = cli.quit_on_motion {
            self.quit_on_motion = v;
        }
        if let Some(v) = cli.ar_target {
            self.ar_target = v;
        }
        self
    }

    /// Validate numeric ranges that clap cannot express.
    pub fn validated(self) -> Result<Self> {
        ensure!(self.seconds >= 0.1, "seconds should be at least 0.1");
        ensure!(
            (0.0..=1.0).contains(&self.fade),
            "fade should be between 0 and 1"
        );
        ensure!(self.zoom >= 0.0, "zoom should be at least 0");
        ensure!(self.pan >= 0.0, "pan should be at least 0");
        ensure!(self.monitor >= 1, "monitor numbering starts at 1");
        Ok(self)
    }

    /// Time an image stays on screen before the next change.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f32(self.seconds)
    }

    /// Cross-fade duration, derived from the interval.
    pub fn fade_time(&self) -> Duration {
        self.interval().mul_f32(self.fade)
    }
}
