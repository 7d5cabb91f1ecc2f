//! Scene-level rendering: owns every GPU resource of the orrery and records
//! one frame from a [`SceneState`].
//!
//! Draw order: nebula backdrop, star layers, Earth, Moon, clouds,
//! atmosphere. The backdrop and the stars use a projection with a far plane
//! past the nebula shell and never write depth.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use orrery_assets::TextureData;
use orrery_render::{
    BufferAllocator, Camera, DepthBuffer, Fallback, FrameBindings, FrameEncoder, FrameUniform,
    GpuTexture, LightRig, MaterialMaps, MeshBuffer, ObjectUniform, RenderContext,
    RenderPassBuilder, SphereMesh, StarLayerGpu, StarLayerUniform, StarPipeline, SurfaceError,
    SurfaceMaterial, SurfaceObject, SurfacePipeline, SurfaceVariant, TextureError,
    TextureManager, TextureRole, clear_color, draw_surface,
};
use orrery_scene::layout::{
    BACKDROP_FAR, BODY_SEGMENTS, CAMERA_FAR, CAMERA_FOV_DEG, CAMERA_NEAR,
    CLOUD_MATERIAL, EARTH_MATERIAL, MOON_MATERIAL, NEBULA_MATERIAL, NEBULA_SEGMENTS,
    TONE_EXPOSURE, atmosphere_material,
};
use orrery_scene::{BodyTransforms, SceneLayout, SceneState};
use orrery_space::{NebulaConfig, NebulaGenerator, Rgb, StarLayerParams, Starfield};
use tracing::{debug, info};

use crate::scene_setup::{TextureSlot, light_rig, surface_material};

/// Size of the procedural nebula shown until (or instead of) the image.
const NEBULA_BAKE: (u32, u32) = (512, 256);

/// Drawable spheres, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    Nebula,
    Earth,
    Moon,
    Clouds,
    Atmosphere,
}

impl Body {
    const ALL: [Body; 5] = [
        Body::Nebula,
        Body::Earth,
        Body::Moon,
        Body::Clouds,
        Body::Atmosphere,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Body::Nebula => "nebula",
            Body::Earth => "earth",
            Body::Moon => "moon",
            Body::Clouds => "clouds",
            Body::Atmosphere => "atmosphere",
        }
    }

    fn variant(self) -> SurfaceVariant {
        match self {
            Body::Nebula => SurfaceVariant::BACKDROP,
            Body::Earth | Body::Moon => SurfaceVariant::OPAQUE,
            Body::Clouds => SurfaceVariant::ADDITIVE_SHELL,
            Body::Atmosphere => SurfaceVariant::ADDITIVE_INNER,
        }
    }

    fn material(self) -> SurfaceMaterial {
        match self {
            Body::Nebula => SurfaceMaterial {
                backdrop: true,
                ..surface_material(&NEBULA_MATERIAL)
            },
            Body::Earth => surface_material(&EARTH_MATERIAL),
            Body::Moon => surface_material(&MOON_MATERIAL),
            Body::Clouds => surface_material(&CLOUD_MATERIAL),
            Body::Atmosphere => surface_material(&atmosphere_material(
                orrery_scene::PulsePhase::BASE_OPACITY,
            )),
        }
    }

    /// Color map bound until the real one loads. Clouds stay invisible
    /// rather than washing the planet out with a white shell.
    fn color_fallback(self) -> Fallback {
        match self {
            Body::Clouds => Fallback::Black,
            _ => Fallback::White,
        }
    }

    fn model(self, transforms: &BodyTransforms) -> glam::Mat4 {
        match self {
            Body::Nebula => transforms.nebula,
            Body::Earth => transforms.earth,
            Body::Moon => transforms.moon,
            Body::Clouds => transforms.clouds,
            Body::Atmosphere => transforms.atmosphere,
        }
    }
}

/// Which material map of a body a texture fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapKind {
    Color,
    Normal,
    Bump,
    Specular,
}

impl MapKind {
    fn index(self) -> usize {
        self as usize
    }
}

/// Where a loaded image goes.
pub fn slot_target(slot: TextureSlot) -> (Body, MapKind) {
    match slot {
        TextureSlot::EarthColor => (Body::Earth, MapKind::Color),
        TextureSlot::EarthNormal => (Body::Earth, MapKind::Normal),
        TextureSlot::Clouds => (Body::Clouds, MapKind::Color),
        TextureSlot::MoonColor => (Body::Moon, MapKind::Color),
        TextureSlot::MoonBump => (Body::Moon, MapKind::Bump),
        TextureSlot::MoonSpecular => (Body::Moon, MapKind::Specular),
        TextureSlot::Nebula => (Body::Nebula, MapKind::Color),
    }
}

struct SurfaceDrawable {
    body: Body,
    object: SurfaceObject,
    material: SurfaceMaterial,
    /// Color, normal, bump, specular.
    maps: [Arc<GpuTexture>; 4],
    bind_group: wgpu::BindGroup,
}

struct StarDrawable {
    gpu: StarLayerGpu,
    size: f32,
    opacity: f32,
}

pub struct SceneRenderer {
    frame: FrameBindings,
    surface_pipeline: SurfacePipeline,
    variants: HashMap<SurfaceVariant, wgpu::RenderPipeline>,
    star_pipeline: StarPipeline,
    body_mesh: MeshBuffer,
    backdrop_mesh: MeshBuffer,
    textures: TextureManager,
    surfaces: Vec<SurfaceDrawable>,
    stars: Vec<StarDrawable>,
    depth: DepthBuffer,
    camera: Camera,
    lights: LightRig,
    clear: wgpu::Color,
}

impl SceneRenderer {
    pub fn new(
        ctx: &RenderContext,
        layout: &SceneLayout,
        starfield: &Starfield,
        nebula_seed: u64,
        background: Rgb,
    ) -> Self {
        let device = &ctx.device;
        let (width, height) = ctx.size();

        let frame = FrameBindings::new(device);
        let surface_pipeline = SurfacePipeline::new(device, ctx.surface_format, &frame.layout);
        let mut variants = HashMap::new();
        for body in Body::ALL {
            variants
                .entry(body.variant())
                .or_insert_with(|| surface_pipeline.create_variant(device, body.variant()));
        }
        let star_pipeline = StarPipeline::new(device, ctx.surface_format, &frame.layout);

        let allocator = BufferAllocator::new(device);
        let body_sphere = SphereMesh::uv(BODY_SEGMENTS, BODY_SEGMENTS);
        let backdrop_sphere = SphereMesh::uv(NEBULA_SEGMENTS, NEBULA_SEGMENTS);
        let body_mesh =
            allocator.create_mesh("body-sphere", &body_sphere.vertices, &body_sphere.indices);
        let backdrop_mesh = allocator.create_mesh(
            "backdrop-sphere",
            &backdrop_sphere.vertices,
            &backdrop_sphere.indices,
        );
        debug!(
            "Sphere meshes: body {} triangles, backdrop {} triangles",
            body_sphere.triangle_count(),
            backdrop_sphere.triangle_count()
        );

        let textures = TextureManager::new(device, &ctx.queue);
        let nebula_bake = bake_nebula(&textures, ctx, nebula_seed);

        let surfaces = Body::ALL
            .into_iter()
            .map(|body| {
                let color = match (body, &nebula_bake) {
                    (Body::Nebula, Some(baked)) => Arc::clone(baked),
                    _ => textures.fallback(body.color_fallback()),
                };
                let maps = [
                    color,
                    textures.fallback(Fallback::FlatNormal),
                    textures.fallback(Fallback::Black),
                    textures.fallback(Fallback::WhiteData),
                ];
                let material = body.material();
                let object = surface_pipeline.create_object(
                    device,
                    body.label(),
                    &ObjectUniform::new(glam::Mat4::IDENTITY, &material),
                );
                let bind_group =
                    material_bind_group(&surface_pipeline, &textures, device, body, &maps);
                SurfaceDrawable {
                    body,
                    object,
                    material,
                    maps,
                    bind_group,
                }
            })
            .collect();

        let stars = starfield
            .layers()
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                let StarLayerParams { size, opacity, .. } = *layer.params();
                let gpu = star_pipeline.create_layer(
                    device,
                    &format!("star-layer-{i}"),
                    layer.positions(),
                    layer.colors(),
                    &StarLayerUniform::new(glam::Mat4::IDENTITY, size, opacity),
                );
                StarDrawable { gpu, size, opacity }
            })
            .collect();

        let mut camera = Camera {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: CAMERA_FOV_DEG.to_radians(),
            aspect_ratio: 1.0,
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        };
        camera.set_aspect_ratio(width as f32, height as f32);

        info!(
            "Scene renderer ready: {} surfaces, {} star layers, {width}x{height}",
            Body::ALL.len(),
            starfield.layers().len()
        );

        Self {
            frame,
            surface_pipeline,
            variants,
            star_pipeline,
            body_mesh,
            backdrop_mesh,
            textures,
            surfaces,
            stars,
            depth: DepthBuffer::new(device, width, height),
            camera,
            lights: light_rig(&layout.lighting),
            clear: clear_color(background.to_array()),
        }
    }

    /// Follow a surface resize.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth.resize(device, width, height);
        self.camera.set_aspect_ratio(width as f32, height as f32);
    }

    /// Upload a loaded image into its material slot.
    pub fn apply_texture(
        &mut self,
        ctx: &RenderContext,
        slot: TextureSlot,
        data: &TextureData,
    ) -> Result<(), TextureError> {
        let texture = self.textures.create_texture(
            &ctx.device,
            &ctx.queue,
            slot.id().0,
            &data.rgba,
            data.width,
            data.height,
            slot.role(),
        )?;

        let (body, map) = slot_target(slot);
        let surface = &mut self.surfaces[body.index()];
        surface.maps[map.index()] = texture;
        match map {
            MapKind::Color => {}
            MapKind::Normal => surface.material.normal_map = true,
            MapKind::Bump => surface.material.bump_map = true,
            MapKind::Specular => surface.material.specular_map = true,
        }
        surface.bind_group = material_bind_group(
            &self.surface_pipeline,
            &self.textures,
            &ctx.device,
            body,
            &surface.maps,
        );
        info!(
            "Applied {} to {} ({}x{})",
            slot.id(),
            body.label(),
            data.width,
            data.height
        );
        Ok(())
    }

    /// Write this frame's uniforms and draw it.
    pub fn render(
        &mut self,
        ctx: &RenderContext,
        state: &SceneState,
        transforms: &BodyTransforms,
        look_at: Vec3,
    ) -> Result<(), SurfaceError> {
        let surface_texture = ctx.get_current_texture()?;

        self.camera.position = state.camera.position;
        self.camera.target = look_at;
        let uniform = FrameUniform::new(
            self.camera.view_matrix(),
            self.camera.projection_matrix(),
            self.camera.projection_with_far(BACKDROP_FAR),
            self.camera.position,
            TONE_EXPOSURE,
            ctx.size(),
            &self.lights,
        );
        self.frame.write(&ctx.queue, &uniform);

        for surface in &mut self.surfaces {
            if surface.body == Body::Atmosphere {
                surface.material.opacity = state.atmosphere_opacity;
            }
            let model = surface.body.model(transforms);
            surface
                .object
                .write(&ctx.queue, &ObjectUniform::new(model, &surface.material));
        }
        for (star, model) in self.stars.iter().zip(&transforms.star_layers) {
            star.gpu.write(
                &ctx.queue,
                &StarLayerUniform::new(*model, star.size, star.opacity),
            );
        }

        let mut encoder = FrameEncoder::new(&ctx.device, surface_texture);
        {
            let builder = RenderPassBuilder::new()
                .clear_color(self.clear)
                .depth(&self.depth.view)
                .label("scene-pass");
            let mut pass = encoder.begin_render_pass(&builder);

            self.draw_body(&mut pass, Body::Nebula);
            for star in &self.stars {
                self.star_pipeline
                    .draw(&mut pass, &self.frame.bind_group, &star.gpu);
            }
            for body in [Body::Earth, Body::Moon, Body::Clouds, Body::Atmosphere] {
                self.draw_body(&mut pass, body);
            }
        }
        encoder.present(&ctx.queue);
        Ok(())
    }

    fn draw_body(&self, pass: &mut wgpu::RenderPass<'_>, body: Body) {
        let Some(pipeline) = self.variants.get(&body.variant()) else {
            return;
        };
        let surface = &self.surfaces[body.index()];
        let mesh = if body == Body::Nebula {
            &self.backdrop_mesh
        } else {
            &self.body_mesh
        };
        draw_surface(
            pass,
            pipeline,
            &self.frame.bind_group,
            &surface.object,
            &surface.bind_group,
            mesh,
        );
    }
}

fn material_bind_group(
    pipeline: &SurfacePipeline,
    textures: &TextureManager,
    device: &wgpu::Device,
    body: Body,
    maps: &[Arc<GpuTexture>; 4],
) -> wgpu::BindGroup {
    let [color, normal, bump, specular] = maps;
    pipeline.create_material(
        device,
        body.label(),
        &MaterialMaps {
            color,
            normal,
            bump,
            specular,
        },
        textures.sampler(),
    )
}

/// Bake the procedural nebula. The bake is linear color, so it is stored
/// as data rather than sRGB.
fn bake_nebula(
    textures: &TextureManager,
    ctx: &RenderContext,
    seed: u64,
) -> Option<Arc<GpuTexture>> {
    let (width, height) = NEBULA_BAKE;
    let generator = NebulaGenerator::new(NebulaConfig {
        seed,
        ..NebulaConfig::default()
    });
    let rgba = generator.bake_equirect(width, height);
    match textures.create_texture(
        &ctx.device,
        &ctx.queue,
        "nebula-procedural",
        &rgba,
        width,
        height,
        TextureRole::Data,
    ) {
        Ok(texture) => Some(texture),
        Err(e) => {
            tracing::warn!("Procedural nebula upload failed: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_slot_targets_a_distinct_map() {
        let mut seen = Vec::new();
        for slot in TextureSlot::ALL {
            let target = slot_target(slot);
            assert!(!seen.contains(&target), "{slot:?} shares a map");
            seen.push(target);
        }
    }

    #[test]
    fn test_body_indices_follow_draw_order() {
        for (i, body) in Body::ALL.iter().enumerate() {
            assert_eq!(body.index(), i);
        }
        assert_eq!(Body::ALL[0], Body::Nebula);
    }

    #[test]
    fn test_only_solid_bodies_write_depth() {
        for body in Body::ALL {
            let solid = matches!(body, Body::Earth | Body::Moon);
            assert_eq!(body.variant().depth_write, solid, "{body:?}");
        }
    }

    #[test]
    fn test_body_materials() {
        let nebula = Body::Nebula.material();
        assert!(nebula.backdrop && nebula.unlit);
        assert_eq!(nebula.opacity, 0.13);

        let atmosphere = Body::Atmosphere.material();
        assert!(atmosphere.unlit);
        assert_eq!(atmosphere.opacity, orrery_scene::PulsePhase::BASE_OPACITY);

        assert!(!Body::Earth.material().backdrop);
        assert_eq!(Body::Clouds.color_fallback(), Fallback::Black);
        assert_eq!(Body::Moon.color_fallback(), Fallback::White);
    }
}
