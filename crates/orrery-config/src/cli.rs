//! Command-line argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{Config, TimingConfig};

/// Animation cadence selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimingArg {
    /// One fixed increment per rendered frame.
    PerFrame,
    /// Increments scaled by frame duration at a 60 Hz reference.
    Delta,
}

/// Orrery command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "orrery", about = "Animated Earth, Moon and starfield scene")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Seed for star placement.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Frame-rate dependence of the animation.
    #[arg(long, value_enum)]
    pub timing: Option<TimingArg>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding textures and the ambient track.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Do not load or play the ambient track.
    #[arg(long)]
    pub mute: bool,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(seed) = args.seed {
            self.scene.seed = seed;
        }
        if let Some(timing) = args.timing {
            self.motion.timing = match timing {
                TimingArg::PerFrame => TimingConfig::PerFrame,
                TimingArg::Delta => TimingConfig::DeltaScaled { reference_hz: 60.0 },
            };
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref dir) = args.assets {
            self.assets.root = Some(dir.clone());
        }
        if args.mute {
            self.audio.enabled = false;
        }
    }
}
