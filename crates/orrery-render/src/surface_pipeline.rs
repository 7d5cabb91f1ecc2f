//! Textured sphere surfaces: the planet, its cloud and atmosphere shells, the
//! moon, and the nebula backdrop.
//!
//! One shader covers every surface. Lit surfaces use Lambert diffuse with a
//! Blinn-Phong highlight from an ambient term, a directional sun, and a rim
//! spot light with inverse-square falloff. Optional normal, bump and
//! specular maps refine the lit result. Unlit surfaces output
//! `tint * color map` directly. Everything is tone mapped before blending.
//!
//! Bind groups: 0 frame, 1 object uniform, 2 material maps.

use crate::buffer::{BufferAllocator, MeshBuffer, VertexPositionNormalUv};
use crate::depth::DepthBuffer;
use crate::frame::FRAME_WGSL;
use crate::texture::GpuTexture;
use crate::tonemap::TONE_MAP_WGSL;
use crate::uniforms::ObjectUniform;

const SURFACE_WGSL: &str = r#"
struct Object {
    model: mat4x4<f32>,
    tint: vec4<f32>,
    params: vec4<f32>,
    flags: vec4<f32>,
};

@group(1) @binding(0) var<uniform> object: Object;

@group(2) @binding(0) var color_map: texture_2d<f32>;
@group(2) @binding(1) var normal_map: texture_2d<f32>;
@group(2) @binding(2) var bump_map: texture_2d<f32>;
@group(2) @binding(3) var specular_map: texture_2d<f32>;
@group(2) @binding(4) var map_sampler: sampler;

const PI: f32 = 3.14159265;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) world_tangent: vec3<f32>,
    @location(3) uv: vec2<f32>,
};

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    let world = object.model * vec4<f32>(in.position, 1.0);

    // Tangent along increasing longitude; arbitrary at the poles.
    var tangent = vec3<f32>(in.normal.z, 0.0, -in.normal.x);
    if dot(tangent, tangent) < 1e-8 {
        tangent = vec3<f32>(0.0, 0.0, 1.0);
    }

    var proj = frame.proj;
    if object.flags.w > 0.5 {
        proj = frame.backdrop_proj;
    }

    var out: VertexOutput;
    out.clip_position = proj * frame.view * world;
    out.world_position = world.xyz;
    // Models carry uniform scale only, so normals transform like directions.
    out.world_normal = (object.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.world_tangent = (object.model * vec4<f32>(tangent, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

fn blinn_phong(n: vec3<f32>, l: vec3<f32>, v: vec3<f32>, shininess: f32) -> f32 {
    let h = normalize(l + v);
    return select(0.0, pow(max(dot(n, h), 0.0), shininess), shininess > 0.0);
}

// Screen-space bump mapping from height differences along the pixel axes.
fn perturb_normal(sigma_x: vec3<f32>, sigma_y: vec3<f32>, n: vec3<f32>, dh: vec2<f32>, face: f32) -> vec3<f32> {
    let r1 = cross(sigma_y, n);
    let r2 = cross(n, sigma_x);
    let det = dot(sigma_x, r1) * face;
    let grad = sign(det) * (dh.x * r1 + dh.y * r2);
    let bumped = normalize(abs(det) * n - grad);
    return select(n, bumped, abs(det) > 1e-12);
}

@fragment
fn fs_main(in: VertexOutput, @builtin(front_facing) front_facing: bool) -> @location(0) vec4<f32> {
    let exposure = frame.camera_position.w;

    let base = textureSample(color_map, map_sampler, in.uv);
    let tangent_normal = textureSample(normal_map, map_sampler, in.uv).xyz * 2.0 - 1.0;
    let spec_mask = textureSample(specular_map, map_sampler, in.uv).r;

    let duv_dx = dpdx(in.uv);
    let duv_dy = dpdy(in.uv);
    let height = textureSample(bump_map, map_sampler, in.uv).r;
    let height_dx = textureSample(bump_map, map_sampler, in.uv + duv_dx).r - height;
    let height_dy = textureSample(bump_map, map_sampler, in.uv + duv_dy).r - height;
    let sigma_x = dpdx(in.world_position);
    let sigma_y = dpdy(in.world_position);

    let albedo = base.rgb * object.tint.rgb;
    let alpha = base.a * object.tint.a;
    if object.params.w > 0.5 {
        return vec4<f32>(tone_map(albedo, exposure), alpha);
    }

    let face = select(-1.0, 1.0, front_facing);
    var n = normalize(in.world_normal) * face;
    let t = normalize(in.world_tangent);
    let b = cross(n, t);
    let mapped = normalize(t * tangent_normal.x + b * tangent_normal.y + n * tangent_normal.z);
    n = normalize(mix(n, mapped, object.flags.x));

    let bump_scale = object.params.z * object.flags.y;
    n = perturb_normal(sigma_x, sigma_y, n, vec2<f32>(height_dx, height_dy) * bump_scale, face);

    let v = normalize(frame.camera_position.xyz - in.world_position);
    let shininess = object.params.x;
    let spec_strength = object.params.y * mix(1.0, spec_mask, object.flags.z);

    var irradiance = frame.ambient.rgb;
    var highlight = vec3<f32>(0.0);

    let l_sun = frame.sun_direction.xyz;
    let sun_ndl = max(dot(n, l_sun), 0.0);
    irradiance += frame.sun_color.rgb * sun_ndl;
    highlight += frame.sun_color.rgb * blinn_phong(n, l_sun, v, shininess) * sun_ndl;

    let to_rim = frame.rim_position.xyz - in.world_position;
    let dist2 = max(dot(to_rim, to_rim), 1e-4);
    let l_rim = to_rim * inverseSqrt(dist2);
    let cone_cos = frame.rim_position.w;
    let cone = smoothstep(cone_cos, cone_cos + 0.02, dot(-l_rim, frame.rim_axis.xyz));
    let rim = frame.rim_color.rgb * cone / dist2;
    let rim_ndl = max(dot(n, l_rim), 0.0);
    irradiance += rim * rim_ndl;
    highlight += rim * blinn_phong(n, l_rim, v, shininess) * rim_ndl;

    let color = albedo * irradiance / PI + highlight * spec_strength;
    return vec4<f32>(tone_map(color, exposure), alpha);
}
"#;

/// How a surface combines with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendMode {
    Opaque,
    Alpha,
    /// `src * alpha + dst`: glows and light shells.
    Additive,
}

impl BlendMode {
    pub fn state(self) -> Option<wgpu::BlendState> {
        match self {
            BlendMode::Opaque => None,
            BlendMode::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
            BlendMode::Additive => Some(ADDITIVE),
        }
    }
}

pub(crate) const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Zero,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Which side of the sphere is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faces {
    /// Outside; back faces culled.
    Outer,
    /// Inside; front faces culled. Used for shells seen through or from within.
    Inner,
}

/// Fixed-function state that differs between surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceVariant {
    pub blend: BlendMode,
    pub faces: Faces,
    pub depth_write: bool,
}

impl SurfaceVariant {
    pub const OPAQUE: Self = Self {
        blend: BlendMode::Opaque,
        faces: Faces::Outer,
        depth_write: true,
    };

    pub const ADDITIVE_SHELL: Self = Self {
        blend: BlendMode::Additive,
        faces: Faces::Outer,
        depth_write: false,
    };

    pub const ADDITIVE_INNER: Self = Self {
        blend: BlendMode::Additive,
        faces: Faces::Inner,
        depth_write: false,
    };

    pub const BACKDROP: Self = Self {
        blend: BlendMode::Alpha,
        faces: Faces::Inner,
        depth_write: false,
    };
}

/// The four maps of a material. Missing maps are filled with fallbacks by
/// the caller.
pub struct MaterialMaps<'a> {
    pub color: &'a GpuTexture,
    pub normal: &'a GpuTexture,
    pub bump: &'a GpuTexture,
    pub specular: &'a GpuTexture,
}

/// A drawable's own uniform buffer and bind group.
pub struct SurfaceObject {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl SurfaceObject {
    pub fn write(&self, queue: &wgpu::Queue, uniform: &ObjectUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}

pub struct SurfacePipeline {
    shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    surface_format: wgpu::TextureFormat,
    object_layout: wgpu::BindGroupLayout,
    material_layout: wgpu::BindGroupLayout,
}

impl SurfacePipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let source = format!("{FRAME_WGSL}\n{TONE_MAP_WGSL}\n{SURFACE_WGSL}");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("surface-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("surface-object-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ObjectUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("surface-material-layout"),
            entries: &[
                texture_entry(0),
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("surface-pipeline-layout"),
            bind_group_layouts: &[frame_layout, &object_layout, &material_layout],
            immediate_size: 0,
        });

        Self {
            shader,
            layout,
            surface_format,
            object_layout,
            material_layout,
        }
    }

    /// Build the render pipeline for one combination of blend, faces and
    /// depth writes.
    pub fn create_variant(&self, device: &wgpu::Device, variant: SurfaceVariant) -> wgpu::RenderPipeline {
        let cull_mode = match variant.faces {
            Faces::Outer => wgpu::Face::Back,
            Faces::Inner => wgpu::Face::Front,
        };
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("surface-pipeline-{variant:?}")),
            layout: Some(&self.layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &[VertexPositionNormalUv::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: variant.blend.state(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(cull_mode),
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(DepthBuffer::stencil_state(variant.depth_write)),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    pub fn create_object(&self, device: &wgpu::Device, label: &str, initial: &ObjectUniform) -> SurfaceObject {
        let buffer = BufferAllocator::new(device).create_uniform_buffer(&format!("{label}-object"), initial);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-object-bind-group")),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        SurfaceObject { buffer, bind_group }
    }

    pub fn create_material(
        &self,
        device: &wgpu::Device,
        label: &str,
        maps: &MaterialMaps<'_>,
        sampler: &wgpu::Sampler,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-material")),
            layout: &self.material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&maps.color.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&maps.normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&maps.bump.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&maps.specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    }
}

/// Record one surface draw.
pub fn draw_surface(
    pass: &mut wgpu::RenderPass<'_>,
    pipeline: &wgpu::RenderPipeline,
    frame_bind_group: &wgpu::BindGroup,
    object: &SurfaceObject,
    material: &wgpu::BindGroup,
    mesh: &MeshBuffer,
) {
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, frame_bind_group, &[]);
    pass.set_bind_group(1, &object.bind_group, &[]);
    pass.set_bind_group(2, material, &[]);
    mesh.bind(pass);
    mesh.draw(pass);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameBindings;
    use crate::gpu::create_test_device_queue;
    use crate::texture::{Fallback, TextureManager};
    use crate::uniforms::SurfaceMaterial;

    #[test]
    fn test_blend_states() {
        assert!(BlendMode::Opaque.state().is_none());
        assert_eq!(
            BlendMode::Alpha.state(),
            Some(wgpu::BlendState::ALPHA_BLENDING)
        );
        let additive = BlendMode::Additive.state().unwrap();
        assert_eq!(additive.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(additive.color.src_factor, wgpu::BlendFactor::SrcAlpha);
    }

    #[test]
    fn test_variants() {
        assert!(SurfaceVariant::OPAQUE.depth_write);
        assert!(!SurfaceVariant::ADDITIVE_SHELL.depth_write);
        assert_eq!(SurfaceVariant::ADDITIVE_INNER.faces, Faces::Inner);
        assert_eq!(SurfaceVariant::BACKDROP.blend, BlendMode::Alpha);
    }

    #[test]
    fn test_shader_source_has_entry_points() {
        assert!(SURFACE_WGSL.contains("fn vs_main"));
        assert!(SURFACE_WGSL.contains("fn fs_main"));
        assert!(SURFACE_WGSL.contains("tone_map("));
    }

    #[test]
    fn test_pipeline_and_bindings_build() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let frame = FrameBindings::new(&device);
        let pipeline =
            SurfacePipeline::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb, &frame.layout);
        for variant in [
            SurfaceVariant::OPAQUE,
            SurfaceVariant::ADDITIVE_SHELL,
            SurfaceVariant::ADDITIVE_INNER,
            SurfaceVariant::BACKDROP,
        ] {
            let _ = pipeline.create_variant(&device, variant);
        }
        let textures = TextureManager::new(&device, &queue);
        let white = textures.fallback(Fallback::White);
        let normal = textures.fallback(Fallback::FlatNormal);
        let black = textures.fallback(Fallback::Black);
        let spec = textures.fallback(Fallback::WhiteData);
        let maps = MaterialMaps {
            color: &white,
            normal: &normal,
            bump: &black,
            specular: &spec,
        };
        let _material = pipeline.create_material(&device, "earth", &maps, textures.sampler());
        let object = pipeline.create_object(
            &device,
            "earth",
            &ObjectUniform::new(glam::Mat4::IDENTITY, &SurfaceMaterial::default()),
        );
        assert_eq!(
            object.buffer.size(),
            std::mem::size_of::<ObjectUniform>() as u64
        );
    }
}
