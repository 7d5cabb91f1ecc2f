//! RGBA8 texture upload with CPU-built mip chains, and the 1x1 stand-ins
//! bound while real maps are still loading or have failed.

use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    #[error("texture {width}x{height} exceeds the device limit of {max} per side")]
    TooLarge { width: u32, height: u32, max: u32 },
}

/// How texel values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureRole {
    /// sRGB-encoded color, decoded to linear on sample.
    Color,
    /// Linear data: normals, heights, specular masks, baked linear color.
    Data,
}

impl TextureRole {
    pub fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureRole::Color => wgpu::TextureFormat::Rgba8UnormSrgb,
            TextureRole::Data => wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Stand-in textures, one per neutral value a material slot can need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Opaque white color map.
    White,
    /// Tangent-space normal pointing straight out.
    FlatNormal,
    /// Zero height.
    Black,
    /// Full specular mask.
    WhiteData,
}

impl Fallback {
    fn texel(self) -> ([u8; 4], TextureRole) {
        match self {
            Fallback::White => ([255; 4], TextureRole::Color),
            Fallback::FlatNormal => ([128, 128, 255, 255], TextureRole::Data),
            Fallback::Black => ([0, 0, 0, 255], TextureRole::Data),
            Fallback::WhiteData => ([255; 4], TextureRole::Data),
        }
    }
}

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub dimensions: (u32, u32),
    pub role: TextureRole,
    pub mip_level_count: u32,
}

pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Halve an RGBA8 image with a 2x2 box filter. Odd edges reuse their last
/// row or column.
pub fn downsample_rgba8(src: &[u8], width: u32, height: u32) -> (Vec<u8>, u32, u32) {
    let (w, h) = (width as usize, height as usize);
    let (nw, nh) = ((w / 2).max(1), (h / 2).max(1));
    let mut out = vec![0u8; nw * nh * 4];
    for y in 0..nh {
        let (y0, y1) = ((2 * y).min(h - 1), (2 * y + 1).min(h - 1));
        for x in 0..nw {
            let (x0, x1) = ((2 * x).min(w - 1), (2 * x + 1).min(w - 1));
            for c in 0..4 {
                let sum: u32 = [(x0, y0), (x1, y0), (x0, y1), (x1, y1)]
                    .iter()
                    .map(|&(sx, sy)| src[(sy * w + sx) * 4 + c] as u32)
                    .sum();
                out[(y * nw + x) * 4 + c] = ((sum + 2) / 4) as u8;
            }
        }
    }
    (out, nw as u32, nh as u32)
}

fn validate(data: &[u8], width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

/// Owns the shared sampler and the fallback textures.
pub struct TextureManager {
    sampler: wgpu::Sampler,
    white: Arc<GpuTexture>,
    flat_normal: Arc<GpuTexture>,
    black: Arc<GpuTexture>,
    white_data: Arc<GpuTexture>,
}

impl TextureManager {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        // Longitude wraps around the sphere; latitude stops at the poles.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("surface-sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Linear,
            ..Default::default()
        });

        let make = |fallback: Fallback| {
            let (texel, role) = fallback.texel();
            Arc::new(upload(device, queue, &format!("{fallback:?}"), &texel, 1, 1, role, false))
        };

        Self {
            sampler,
            white: make(Fallback::White),
            flat_normal: make(Fallback::FlatNormal),
            black: make(Fallback::Black),
            white_data: make(Fallback::WhiteData),
        }
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    pub fn fallback(&self, which: Fallback) -> Arc<GpuTexture> {
        match which {
            Fallback::White => Arc::clone(&self.white),
            Fallback::FlatNormal => Arc::clone(&self.flat_normal),
            Fallback::Black => Arc::clone(&self.black),
            Fallback::WhiteData => Arc::clone(&self.white_data),
        }
    }

    /// Upload tightly packed RGBA8 rows, top row first, with a full mip chain.
    ///
    /// Images larger than the device's 2D texture limit are rejected before
    /// anything reaches the GPU.
    pub fn create_texture(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        rgba: &[u8],
        width: u32,
        height: u32,
        role: TextureRole,
    ) -> Result<Arc<GpuTexture>, TextureError> {
        validate(rgba, width, height, device.limits().max_texture_dimension_2d)?;
        let texture = upload(device, queue, label, rgba, width, height, role, true);
        log::debug!(
            "Uploaded texture '{label}' {width}x{height} ({} mips)",
            texture.mip_level_count
        );
        Ok(Arc::new(texture))
    }
}

#[allow(clippy::too_many_arguments)]
fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    rgba: &[u8],
    width: u32,
    height: u32,
    role: TextureRole,
    mipmapped: bool,
) -> GpuTexture {
    let mip_levels = if mipmapped { mip_level_count(width, height) } else { 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: mip_levels,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: role.format(),
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let mut level = std::borrow::Cow::Borrowed(rgba);
    let (mut w, mut h) = (width, height);
    for mip in 0..mip_levels {
        if mip > 0 {
            let (next, nw, nh) = downsample_rgba8(&level, w, h);
            level = std::borrow::Cow::Owned(next);
            (w, h) = (nw, nh);
        }
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: mip,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &level,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * w),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
    }

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture {
        texture,
        view,
        dimensions: (width, height),
        role,
        mip_level_count: mip_levels,
    }
}
