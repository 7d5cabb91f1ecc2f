//! Per-user directories for config, logs and bundled assets.

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("could not determine OS configuration directory")]
    NoConfigDir,

    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// OS-specific directory paths for Orrery.
///
/// Resolved with `dirs` (XDG on Linux, Known Folders on Windows, Library on
/// macOS).
#[derive(Debug, Clone)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Default asset root when neither the CLI nor the config names one.
    pub assets_dir: PathBuf,
    pub log_dir: PathBuf,
}

pub const APP_NAME: &str = "orrery";

impl PlatformDirs {
    /// Resolve directories without creating them.
    pub fn resolve() -> Result<Self, PlatformError> {
        let app_config = dirs::config_dir()
            .ok_or(PlatformError::NoConfigDir)?
            .join(APP_NAME);
        let data_dir = dirs::data_dir()
            .map(|d| d.join(APP_NAME))
            .unwrap_or_else(|| app_config.clone());

        Ok(Self {
            config_dir: app_config.join("config"),
            assets_dir: data_dir.join("assets"),
            log_dir: app_config.join("logs"),
        })
    }

    /// Lay the same structure out under `root`, for tests and portable runs.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.join("config"),
            assets_dir: app_dir.join("assets"),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Point the config directory elsewhere, keeping the other paths.
    pub fn with_config_dir(mut self, config_dir: impl Into<PathBuf>) -> Self {
        self.config_dir = config_dir.into();
        self
    }

    /// Create the config and log directories. The asset directory is only
    /// read, so a missing one is left for the loader to report.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_paths_are_absolute() {
        let Ok(dirs) = PlatformDirs::resolve() else {
            return;
        };
        assert!(dirs.config_dir.is_absolute());
        assert!(dirs.assets_dir.is_absolute());
        assert!(dirs.log_dir.is_absolute());
        assert!(dirs.config_dir.ends_with(Path::new(APP_NAME).join("config")));
    }

    #[test]
    fn test_create_dirs_under_root() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();

        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
        assert!(!dirs.assets_dir.exists());
    }

    #[test]
    fn test_config_dir_override() {
        let tmp = tempfile::tempdir().unwrap();
        let custom = tmp.path().join("elsewhere");
        let dirs = PlatformDirs::resolve_with_root(tmp.path()).with_config_dir(&custom);
        assert_eq!(dirs.config_dir, custom);
        assert_eq!(dirs.log_dir, tmp.path().join(APP_NAME).join("logs"));
    }
}
