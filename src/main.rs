use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use slidedrift::config::{AspectRatioTarget, Overrides, Settings, SortMode, SortOrder, WindowMode};
use slidedrift::playlist::{self, Playlist};
use slidedrift::render::viewer;

/// Pan/zoom cross-fade slideshow for the given images and/or image folders.
/// Options are saved automatically and reused on the next start.
#[derive(Debug, Parser)]
#[command(name = "slidedrift", version, about)]
struct Cli {
    /// Image files and/or folders to show
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Interval in seconds between image changes (at least 0.1)
    #[arg(short = 's', long)]
    seconds: Option<f32>,

    /// Fade duration as a fraction of the interval, between 0 and 1
    #[arg(long)]
    fade: Option<f32>,

    /// How much to zoom images, as a ratio of their size; 0 disables zoom
    #[arg(long)]
    zoom: Option<f32>,

    /// How much to pan images sideways, as a ratio of screen size; 0 disables pan
    #[arg(long)]
    pan: Option<f32>,

    /// In what order to cycle the files
    #[arg(long, value_enum)]
    sort: Option<SortMode>,

    /// Sort order
    #[arg(long = "order", value_enum)]
    order: Option<SortOrder>,

    /// On which monitor to run - 1, 2, etc. up to the number of monitors
    #[arg(long)]
    monitor: Option<usize>,

    /// Window mode
    #[arg(long, value_enum)]
    mode: Option<WindowMode>,

    /// Window title
    #[arg(long)]
    title: Option<String>,

    /// Ask the window manager not to show this window in the taskbar
    #[arg(long, overrides_with = "dont_hide_from_taskbar")]
    hide_from_taskbar: bool,

    /// Reverse a previously saved --hide-from-taskbar
    #[arg(long)]
    dont_hide_from_taskbar: bool,

    /// Ignore saved options and start from the defaults
    #[arg(long)]
    defaults: bool,

    /// Quit on mouse motion, like a screensaver
    #[arg(long)]
    quit_on_motion: bool,

    /// Fit pictures inside the screen (min) or fill it (max)
    #[arg(long = "aspect-ratio-target", value_enum)]
    aspect_ratio_target: Option<AspectRatioTarget>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            seconds: self.seconds,
            fade: self.fade,
            zoom: self.zoom,
            pan: self.pan,
            sort: self.sort,
            sort_order: self.order,
            monitor: self.monitor,
            mode: self.mode,
            title: self.title.clone(),
            hide_from_taskbar: if self.hide_from_taskbar {
                Some(true)
            } else if self.dont_hide_from_taskbar {
                Some(false)
            } else {
                None
            },
            quit_on_motion: self.quit_on_motion.then_some(true),
            ar_target: self.aspect_ratio_target,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let saved = if cli.defaults {
        Settings::default()
    } else {
        Settings::load_saved()
    };
    let settings = saved
        .with_overrides(&cli.overrides())
        .validated()
        .context("invalid options")?;
    settings.save();

    let paths = if cli.paths.is_empty() {
        vec![PathBuf::from("/usr/share/backgrounds/")]
    } else {
        cli.paths.clone()
    };
    let mut files = playlist::collect_files(&paths)?;
    playlist::order_files(&mut files, settings.sort, settings.sort_order);
    info!(count = files.len(), "collected images");

    viewer::run(Playlist::new(files), settings)
}
