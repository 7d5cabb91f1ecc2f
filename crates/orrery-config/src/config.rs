//! Configuration structs with scene defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level Orrery configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Star layers, seed and backdrop.
    pub scene: SceneConfig,
    /// Per-frame animation cadence.
    pub motion: MotionConfig,
    /// Virtual scroll track driving the camera dolly.
    pub scroll: ScrollConfig,
    /// Texture file locations.
    pub assets: AssetConfig,
    /// Ambient track settings.
    pub audio: AudioConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in borderless fullscreen.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// One procedural star shell.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StarLayerConfig {
    /// Number of stars in the shell.
    pub count: u32,
    /// Nominal shell radius; stars land between 0.6x and 1.4x of it.
    pub radius: f32,
    /// World-space sprite size.
    pub size: f32,
    /// Layer opacity in `[0, 1]`.
    pub opacity: f32,
    /// First endpoint color as `0xRRGGBB` (sRGB).
    pub color_a: u32,
    /// Second endpoint color as `0xRRGGBB` (sRGB).
    pub color_b: u32,
    /// How strongly the layer shifts against pointer movement.
    pub parallax: f32,
}

/// Scene content configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for star placement and the procedural nebula.
    pub seed: u64,
    /// Background clear color as `0xRRGGBB` (sRGB).
    pub background: u32,
    /// Star shells, nearest first.
    pub star_layers: Vec<StarLayerConfig>,
}

/// How per-frame increments relate to elapsed time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum TimingConfig {
    /// Constant increment per rendered frame, regardless of frame duration.
    PerFrame,
    /// Increments scaled by `dt * reference_hz`.
    DeltaScaled {
        /// Frame rate at which one frame equals one fixed increment.
        reference_hz: f32,
    },
}

/// Animation cadence configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Frame-rate dependence of the animation.
    pub timing: TimingConfig,
}

/// Virtual scroll track configuration.
///
/// A desktop window has no document to scroll, so the wheel moves an offset
/// along a track `pages` viewport-heights tall.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    /// Content height as a multiple of the viewport height (>= 1).
    pub pages: f32,
    /// Pixels scrolled per wheel line.
    pub pixels_per_line: f32,
}

/// Texture file names, resolved against `root` (or the platform data dir).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Asset directory override.
    pub root: Option<PathBuf>,
    /// Earth albedo map.
    pub earth_color: String,
    /// Earth tangent-space normal map.
    pub earth_normal: String,
    /// Cloud layer map.
    pub clouds: String,
    /// Moon albedo map.
    pub moon_color: String,
    /// Moon height map used for bump shading.
    pub moon_bump: String,
    /// Moon specular intensity map.
    pub moon_specular: String,
    /// Nebula backdrop map. A procedural backdrop is used until it loads.
    pub nebula: String,
}

/// Ambient track configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Load and arm the ambient track at all.
    pub enabled: bool,
    /// Track file name, resolved like textures.
    pub track: String,
    /// Playback volume (0.0 - 1.0).
    pub volume: f32,
    /// Loop the track once started.
    pub looping: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to the platform log directory.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 0x0e47_4d00,
            background: 0x020205,
            star_layers: vec![
                StarLayerConfig {
                    count: 8000,
                    radius: 200.0,
                    size: 0.05,
                    opacity: 0.8,
                    color_a: 0xffffff,
                    color_b: 0x88bbff,
                    parallax: 0.8,
                },
                StarLayerConfig {
                    count: 5000,
                    radius: 350.0,
                    size: 0.08,
                    opacity: 0.4,
                    color_a: 0xffeedd,
                    color_b: 0x99aaff,
                    parallax: 0.5,
                },
                StarLayerConfig {
                    count: 9000,
                    radius: 450.0,
                    size: 0.055,
                    opacity: 0.35,
                    color_a: 0xfff2dd,
                    color_b: 0xaaccff,
                    parallax: 0.25,
                },
                StarLayerConfig {
                    count: 12000,
                    radius: 600.0,
                    size: 0.035,
                    opacity: 0.18,
                    color_a: 0x8899ff,
                    color_b: 0xffffff,
                    parallax: 0.12,
                },
            ],
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::PerFrame,
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pages: 3.0,
            pixels_per_line: 40.0,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: None,
            earth_color: "earth_atmos_2048.jpg".to_string(),
            earth_normal: "earth_normal_2048.jpg".to_string(),
            clouds: "earth_clouds_1024.png".to_string(),
            moon_color: "moon_1024.jpg".to_string(),
            moon_bump: "moon_bump_1024.jpg".to_string(),
            moon_specular: "moon_specular_1024.jpg".to_string(),
            nebula: "nebula.png".to_string(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            track: "ambient.mp3".to_string(),
            volume: 0.3,
            looping: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: cfg!(debug_assertions),
        }
    }
}

// --- Validation ---

fn invalid(field: impl Into<String>, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.into(),
        reason,
    }
}

impl Config {
    /// Reject values that would produce a degenerate scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid("window", "dimensions must be non-zero"));
        }
        for (i, layer) in self.scene.star_layers.iter().enumerate() {
            if layer.count == 0 {
                return Err(invalid(format!("scene.star_layers[{i}].count"), "must be > 0"));
            }
            if !(layer.radius.is_finite() && layer.radius > 0.0) {
                return Err(invalid(format!("scene.star_layers[{i}].radius"), "must be > 0"));
            }
            if !(layer.size.is_finite() && layer.size > 0.0) {
                return Err(invalid(format!("scene.star_layers[{i}].size"), "must be > 0"));
            }
            if !(0.0..=1.0).contains(&layer.opacity) {
                return Err(invalid(
                    format!("scene.star_layers[{i}].opacity"),
                    "must be within [0, 1]",
                ));
            }
            if !layer.parallax.is_finite() {
                return Err(invalid(
                    format!("scene.star_layers[{i}].parallax"),
                    "must be finite",
                ));
            }
        }
        if let TimingConfig::DeltaScaled { reference_hz } = self.motion.timing
            && !(reference_hz.is_finite() && reference_hz > 0.0)
        {
            return Err(invalid("motion.timing.reference_hz", "must be > 0"));
        }
        if !(self.scroll.pages.is_finite() && self.scroll.pages >= 1.0) {
            return Err(invalid("scroll.pages", "must be >= 1"));
        }
        if !(self.scroll.pixels_per_line.is_finite() && self.scroll.pixels_per_line > 0.0) {
            return Err(invalid("scroll.pixels_per_line", "must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(invalid("audio.volume", "must be within [0, 1]"));
        }
        Ok(())
    }
}

// --- Load / Save ---

/// Where [`Config::load_or_create`] got its config from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Loaded(PathBuf),
    Created(PathBuf),
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigOrigin::Loaded(path) => write!(f, "Loaded config from {}", path.display()),
            ConfigOrigin::Created(path) => write!(f, "Created default config at {}", path.display()),
        }
    }
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    ///
    /// Runs before logging is installed, so the outcome is returned for the
    /// caller to report.
    pub fn load_or_create(config_dir: &Path) -> Result<(Self, ConfigOrigin), ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            Ok((config, ConfigOrigin::Loaded(config_path)))
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            Ok((config, ConfigOrigin::Created(config_path)))
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Directory textures and the audio track are resolved against.
    ///
    /// `assets.root` wins; otherwise `fallback` (usually the platform data dir).
    pub fn asset_root(&self, fallback: &Path) -> PathBuf {
        self.assets
            .root
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(4))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("count: 12000"));
        assert!(ron_str.contains("PerFrame"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.motion.timing = TimingConfig::DeltaScaled { reference_hz: 60.0 };
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_default_scene_has_four_layers_nearest_first() {
        let scene = SceneConfig::default();
        assert_eq!(scene.star_layers.len(), 4);
        let factors: Vec<f32> = scene.star_layers.iter().map(|l| l.parallax).collect();
        assert_eq!(factors, vec![0.8, 0.5, 0.25, 0.12]);
        let radii: Vec<f32> = scene.star_layers.iter().map(|l| l.radius).collect();
        assert!(radii.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (), scene: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.audio, AudioConfig::default());
        assert_eq!(config.scroll, ScrollConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_layer() {
        let mut config = Config::default();
        config.scene.star_layers[1].count = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("star_layers[1].count"), "{err}");
    }

    #[test]
    fn test_validate_rejects_zero_reference_rate() {
        let mut config = Config::default();
        config.motion.timing = TimingConfig::DeltaScaled { reference_hz: 0.0 };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_short_scroll_track() {
        let mut config = Config::default();
        config.scroll.pages = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.scene.seed = 7;
        config.audio.enabled = false;

        config.save(dir.path()).unwrap();
        let (loaded, origin) = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
        assert_eq!(origin, ConfigOrigin::Loaded(dir.path().join("config.ron")));
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let (config, origin) = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
        assert!(matches!(origin, ConfigOrigin::Created(_)));
        assert!(origin.to_string().starts_with("Created default config at"));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "(audio: (volume: 4.0))").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_asset_root_prefers_override() {
        let mut config = Config::default();
        let fallback = Path::new("fallback");
        assert_eq!(config.asset_root(fallback), PathBuf::from("fallback"));
        config.assets.root = Some(PathBuf::from("custom"));
        assert_eq!(config.asset_root(fallback), PathBuf::from("custom"));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
