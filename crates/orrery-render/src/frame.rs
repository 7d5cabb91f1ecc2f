//! The per-frame uniform buffer and its bind group (group 0 in every
//! pipeline).

use bytemuck::Zeroable;

use crate::buffer::BufferAllocator;
use crate::uniforms::FrameUniform;

/// WGSL declaration matching [`FrameUniform`].
pub const FRAME_WGSL: &str = r#"
struct Frame {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    backdrop_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    viewport: vec4<f32>,
    ambient: vec4<f32>,
    sun_direction: vec4<f32>,
    sun_color: vec4<f32>,
    rim_position: vec4<f32>,
    rim_color: vec4<f32>,
    rim_axis: vec4<f32>,
};

@group(0) @binding(0) var<uniform> frame: Frame;
"#;

pub struct FrameBindings {
    pub buffer: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl FrameBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = BufferAllocator::new(device)
            .create_uniform_buffer("frame-uniform", &FrameUniform::zeroed());
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame-bind-group-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<FrameUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame-bind-group"),
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });
        Self {
            buffer,
            layout,
            bind_group,
        }
    }

    pub fn write(&self, queue: &wgpu::Queue, uniform: &FrameUniform) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(uniform));
    }
}
