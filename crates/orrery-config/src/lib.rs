//! Configuration system for Orrery.
//!
//! Runtime-configurable settings persisted to disk as RON files, with CLI
//! overrides via clap and forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::{CliArgs, TimingArg};
pub use config::{
    AssetConfig, AudioConfig, Config, ConfigOrigin, DebugConfig, MotionConfig, SceneConfig, ScrollConfig,
    StarLayerConfig, TimingConfig, WindowConfig,
};
pub use error::ConfigError;
