//! The `orrery` binary.

use std::process::ExitCode;

use clap::Parser;
use orrery_app::PlatformDirs;
use orrery_config::{CliArgs, Config};
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let mut dirs = match PlatformDirs::resolve() {
        Ok(dirs) => dirs,
        Err(e) => {
            eprintln!("Failed to resolve platform directories: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(config_dir) = &args.config {
        dirs = dirs.with_config_dir(config_dir);
    }
    if let Err(e) = dirs.create_dirs() {
        eprintln!("Failed to create platform directories: {e}");
        return ExitCode::FAILURE;
    }

    let (mut config, origin) = match Config::load_or_create(&dirs.config_dir) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Failed to load config from {}: {e}", dirs.config_dir.display());
            return ExitCode::FAILURE;
        }
    };
    config.apply_cli_overrides(&args);
    orrery_log::init_logging(Some(&dirs.log_dir), Some(&config));
    info!("{origin}");

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    let asset_root = config.asset_root(&dirs.assets_dir);
    info!(
        config = %dirs.config_dir.display(),
        assets = %asset_root.display(),
        "Starting Orrery"
    );

    match orrery_app::run(config, asset_root) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Orrery stopped: {e}");
            ExitCode::FAILURE
        }
    }
}
