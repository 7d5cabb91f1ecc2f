//! Star layers drawn as instanced, camera-facing square points.
//!
//! Each star is one instance of a six-vertex quad. Point size follows
//! `size * (viewport_height / 2) / distance` in pixels and never drops below
//! one pixel, so distant shells stay visible. Stars blend additively and
//! never write depth; they use the backdrop projection.

use crate::buffer::{BufferAllocator, StarInstance};
use crate::depth::DepthBuffer;
use crate::frame::FRAME_WGSL;
use crate::surface_pipeline::ADDITIVE;
use crate::tonemap::TONE_MAP_WGSL;
use crate::uniforms::StarLayerUniform;

const STAR_WGSL: &str = r#"
struct Layer {
    model: mat4x4<f32>,
    params: vec4<f32>,
};

@group(1) @binding(0) var<uniform> layer: Layer;

struct StarInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) vertex_index: u32, star: StarInput) -> VertexOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0),
        vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, 1.0),
    );

    let view_position = frame.view * layer.model * vec4<f32>(star.position, 1.0);
    let clip = frame.backdrop_proj * view_position;

    let distance = max(-view_position.z, 1e-3);
    let size_px = max(layer.params.x * frame.viewport.y * 0.5 / distance, 1.0);
    let offset = corners[vertex_index] * size_px / frame.viewport.xy;

    var out: VertexOutput;
    out.clip_position = vec4<f32>(clip.xy + offset * clip.w, clip.z, clip.w);
    out.color = star.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(tone_map(in.color, frame.camera_position.w), layer.params.y);
}
"#;

/// GPU resources for one star layer.
pub struct StarLayerGpu {
    pub instances: wgpu::Buffer,
    pub instance_count: u32,
    pub uniform: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl StarLayerGpu {
    pub fn write(&self, queue: &wgpu::Queue, uniform: &StarLayerUniform) {
        queue.write_buffer(&self.uniform, 0, bytemuck::bytes_of(uniform));
    }
}

pub struct StarPipeline {
    pipeline: wgpu::RenderPipeline,
    layer_layout: wgpu::BindGroupLayout,
}

impl StarPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        frame_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let source = format!("{FRAME_WGSL}\n{TONE_MAP_WGSL}\n{STAR_WGSL}");
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("star-shader"),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        let layer_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("star-layer-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<StarLayerUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("star-pipeline-layout"),
            bind_group_layouts: &[frame_layout, &layer_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("star-pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[StarInstance::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(DepthBuffer::stencil_state(false)),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(ADDITIVE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Self {
            pipeline,
            layer_layout,
        }
    }

    /// Upload a layer's stars. Positions and colors are flat `xyz` / `rgb`.
    pub fn create_layer(
        &self,
        device: &wgpu::Device,
        label: &str,
        positions: &[f32],
        colors: &[f32],
        initial: &StarLayerUniform,
    ) -> StarLayerGpu {
        let allocator = BufferAllocator::new(device);
        let stars = StarInstance::from_flat(positions, colors);
        // Zero-sized vertex buffers are invalid; keep one dummy star that is
        // never drawn.
        let instance_count = stars.len() as u32;
        let data = if stars.is_empty() {
            vec![<StarInstance as bytemuck::Zeroable>::zeroed()]
        } else {
            stars
        };
        let instances = allocator.create_vertex_buffer(&format!("{label}-stars"), &data);
        let uniform = allocator.create_uniform_buffer(&format!("{label}-uniform"), initial);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}-bind-group")),
            layout: &self.layer_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
        });
        StarLayerGpu {
            instances,
            instance_count,
            uniform,
            bind_group,
        }
    }

    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        frame_bind_group: &wgpu::BindGroup,
        layer: &StarLayerGpu,
    ) {
        if layer.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
        pass.set_bind_group(1, &layer.bind_group, &[]);
        pass.set_vertex_buffer(0, layer.instances.slice(..));
        pass.draw(0..6, 0..layer.instance_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameBindings;
    use crate::gpu::create_test_device_queue;
    use glam::Mat4;

    #[test]
    fn test_shader_source_has_entry_points() {
        assert!(STAR_WGSL.contains("fn vs_main"));
        assert!(STAR_WGSL.contains("fn fs_main"));
    }

    #[test]
    fn test_layers_upload() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let frame = FrameBindings::new(&device);
        let stars = StarPipeline::new(&device, wgpu::TextureFormat::Bgra8UnormSrgb, &frame.layout);
        let uniform = StarLayerUniform::new(Mat4::IDENTITY, 0.05, 0.9);

        let positions = [0.0, 0.0, -150.0, 10.0, 0.0, -200.0];
        let colors = [1.0, 1.0, 1.0, 0.5, 0.6, 1.0];
        let layer = stars.create_layer(&device, "near", &positions, &colors, &uniform);
        assert_eq!(layer.instance_count, 2);

        let empty = stars.create_layer(&device, "empty", &[], &[], &uniform);
        assert_eq!(empty.instance_count, 0);
    }
}
