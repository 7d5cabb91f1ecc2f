//! wgpu rendering: device and surface setup, sphere meshes, textures, and the
//! surface and star pipelines.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod frame;
pub mod gpu;
pub mod pass;
pub mod sphere;
pub mod star_pipeline;
pub mod surface;
pub mod surface_pipeline;
pub mod texture;
pub mod tonemap;
pub mod uniforms;

pub use buffer::{BufferAllocator, MeshBuffer, StarInstance, VertexPositionNormalUv};
pub use camera::Camera;
pub use depth::DepthBuffer;
pub use frame::FrameBindings;
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use pass::{FrameEncoder, RenderPassBuilder, clear_color};
pub use sphere::SphereMesh;
pub use star_pipeline::{StarLayerGpu, StarPipeline};
pub use surface::{PhysicalSize, SurfaceWrapper};
pub use surface_pipeline::{
    BlendMode, Faces, MaterialMaps, SurfaceObject, SurfacePipeline, SurfaceVariant, draw_surface,
};
pub use texture::{Fallback, GpuTexture, TextureError, TextureManager, TextureRole};
pub use tonemap::tone_map;
pub use uniforms::{FrameUniform, LightRig, ObjectUniform, StarLayerUniform, SurfaceMaterial};
