//! Translation from config and scene types into the shapes the generator,
//! updater, audio gate and renderer take.

use orrery_assets::AssetId;
use orrery_audio::PlaybackSettings;
use orrery_config::{AssetConfig, AudioConfig, SceneConfig, TimingConfig};
use orrery_render::{LightRig, SurfaceMaterial, TextureRole};
use orrery_scene::TimingMode;
use orrery_scene::layout::{Lighting, MaterialParams};
use orrery_space::StarLayerParams;

/// Cosine of the rim spot light's half angle (60 degrees).
pub const RIM_CONE_COS: f32 = 0.5;

pub const AMBIENT_TRACK: AssetId = AssetId("ambient-track");

pub fn star_layer_params(scene: &SceneConfig) -> Vec<StarLayerParams> {
    scene
        .star_layers
        .iter()
        .map(|layer| {
            StarLayerParams::from_hex(
                layer.count,
                layer.radius,
                layer.size,
                layer.opacity,
                layer.color_a,
                layer.color_b,
                layer.parallax,
            )
        })
        .collect()
}

pub fn timing_mode(timing: TimingConfig) -> TimingMode {
    match timing {
        TimingConfig::PerFrame => TimingMode::PerFrame,
        TimingConfig::DeltaScaled { reference_hz } => TimingMode::DeltaScaled { reference_hz },
    }
}

pub fn playback_settings(audio: &AudioConfig) -> PlaybackSettings {
    PlaybackSettings {
        volume: audio.volume.clamp(0.0, 1.0),
        looping: audio.looping,
    }
}

/// Scalar material knobs; the map flags are set by the renderer as maps
/// arrive.
pub fn surface_material(params: &MaterialParams) -> SurfaceMaterial {
    SurfaceMaterial {
        tint: params.tint.into(),
        opacity: params.opacity,
        shininess: params.shininess,
        specular: params.specular,
        bump_scale: params.bump_scale,
        unlit: params.unlit,
        ..SurfaceMaterial::default()
    }
}

pub fn light_rig(lighting: &Lighting) -> LightRig {
    LightRig {
        ambient: lighting.ambient,
        sun_direction: lighting.sun_direction,
        sun_color: lighting.sun_color,
        rim_position: lighting.rim_position,
        rim_color: lighting.rim_color,
        rim_axis: lighting.rim_axis,
        rim_cone_cos: RIM_CONE_COS,
    }
}

/// Every image the scene can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    EarthColor,
    EarthNormal,
    Clouds,
    MoonColor,
    MoonBump,
    MoonSpecular,
    Nebula,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 7] = [
        TextureSlot::EarthColor,
        TextureSlot::EarthNormal,
        TextureSlot::Clouds,
        TextureSlot::MoonColor,
        TextureSlot::MoonBump,
        TextureSlot::MoonSpecular,
        TextureSlot::Nebula,
    ];

    pub fn id(self) -> AssetId {
        AssetId(match self {
            TextureSlot::EarthColor => "earth-color",
            TextureSlot::EarthNormal => "earth-normal",
            TextureSlot::Clouds => "clouds",
            TextureSlot::MoonColor => "moon-color",
            TextureSlot::MoonBump => "moon-bump",
            TextureSlot::MoonSpecular => "moon-specular",
            TextureSlot::Nebula => "nebula",
        })
    }

    pub fn from_id(id: AssetId) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.id() == id)
    }

    /// File name, relative to the asset root.
    pub fn file(self, assets: &AssetConfig) -> &str {
        match self {
            TextureSlot::EarthColor => &assets.earth_color,
            TextureSlot::EarthNormal => &assets.earth_normal,
            TextureSlot::Clouds => &assets.clouds,
            TextureSlot::MoonColor => &assets.moon_color,
            TextureSlot::MoonBump => &assets.moon_bump,
            TextureSlot::MoonSpecular => &assets.moon_specular,
            TextureSlot::Nebula => &assets.nebula,
        }
    }

    /// Color images decode from sRGB; the rest are stored as-is.
    pub fn role(self) -> TextureRole {
        match self {
            TextureSlot::EarthColor
            | TextureSlot::Clouds
            | TextureSlot::MoonColor
            | TextureSlot::Nebula => TextureRole::Color,
            TextureSlot::EarthNormal | TextureSlot::MoonBump | TextureSlot::MoonSpecular => {
                TextureRole::Data
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_config::Config;
    use orrery_scene::layout::{CLOUD_MATERIAL, MOON_MATERIAL, NEBULA_MATERIAL};

    #[test]
    fn test_default_star_layers_match_builtin_shells() {
        let params = star_layer_params(&SceneConfig::default());
        assert_eq!(params, StarLayerParams::defaults().to_vec());
    }

    #[test]
    fn test_timing_mode_mapping() {
        assert_eq!(timing_mode(TimingConfig::PerFrame), TimingMode::PerFrame);
        assert_eq!(
            timing_mode(TimingConfig::DeltaScaled { reference_hz: 60.0 }),
            TimingMode::DeltaScaled { reference_hz: 60.0 }
        );
    }

    #[test]
    fn test_playback_volume_is_clamped() {
        let mut audio = AudioConfig::default();
        let settings = playback_settings(&audio);
        assert_eq!(settings.volume, 0.3);
        assert!(settings.looping);

        audio.volume = 4.0;
        assert_eq!(playback_settings(&audio).volume, 1.0);
    }

    #[test]
    fn test_surface_material_carries_scalars() {
        let clouds = surface_material(&CLOUD_MATERIAL);
        assert_eq!(clouds.opacity, 0.6);
        assert!(!clouds.unlit);
        assert!(!clouds.normal_map && !clouds.bump_map && !clouds.specular_map);

        let moon = surface_material(&MOON_MATERIAL);
        assert_eq!(moon.bump_scale, 0.07);
        assert_eq!(moon.shininess, 8.0);

        assert!(surface_material(&NEBULA_MATERIAL).unlit);
    }

    #[test]
    fn test_light_rig_copies_lighting() {
        let lighting = Lighting::default();
        let rig = light_rig(&lighting);
        assert_eq!(rig.sun_direction, lighting.sun_direction);
        assert_eq!(rig.rim_axis, lighting.rim_axis);
        assert_eq!(rig.rim_cone_cos, RIM_CONE_COS);
    }

    #[test]
    fn test_texture_slot_ids_round_trip() {
        for slot in TextureSlot::ALL {
            assert_eq!(TextureSlot::from_id(slot.id()), Some(slot));
        }
        assert_eq!(TextureSlot::from_id(AMBIENT_TRACK), None);
    }

    #[test]
    fn test_texture_slot_files_and_roles() {
        let config = Config::default();
        assert_eq!(
            TextureSlot::EarthColor.file(&config.assets),
            "earth_atmos_2048.jpg"
        );
        assert_eq!(TextureSlot::Nebula.file(&config.assets), "nebula.png");
        assert_eq!(TextureSlot::EarthColor.role(), TextureRole::Color);
        assert_eq!(TextureSlot::EarthNormal.role(), TextureRole::Data);
        assert_eq!(TextureSlot::MoonSpecular.role(), TextureRole::Data);
    }
}
