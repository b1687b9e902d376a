/*!
# Aurora 3D Engine - Vulkan Renderer Backend

Vulkan implementation of the Aurora 3D rendering engine.

Built on Ash for the Vulkan bindings and gpu-allocator for memory
management, around a bindless resource model: one global descriptor table
for sampled images, a single storage-buffer set for mouse picking, and
buffer device addresses for everything else. Rendering uses Vulkan 1.3
dynamic rendering; there are no render pass or framebuffer objects.

The two central types are [`Device`] (instance/device bring-up, frame
slots, resource creation, one-shot uploads) and [`SceneRenderer`] (the
caches and pass pipelines that turn a `Scene` into a recorded frame).
*/

// Device layer
mod bindless;
mod buffer;
mod context;
mod debug;
mod device;
mod image;
mod shader;
mod swapchain;

// Resource caches and per-frame state
mod image_cache;
mod material_cache;
mod mesh_cache;
mod nbuffer;
mod pick;
mod targets;

// Frame orchestration
mod passes;
mod scene_renderer;

pub use buffer::AllocatedBuffer;
pub use context::GpuContext;
pub use device::{frame_slot, transition_image, transition_image_aspect, Device, FrameData};
pub use image::{AllocatedImage, ImageDesc};
pub use image_cache::{DefaultImages, ImageCache};
pub use material_cache::{Material, MaterialCache};
pub use mesh_cache::{GpuMesh, MeshCache};
pub use nbuffer::NBuffer;
pub use passes::{SpriteInstance, SpriteRun, MAX_SPRITES};
pub use pick::PickBuffer;
pub use scene_renderer::{RenderMode, SceneRenderer};
pub use swapchain::Swapchain;
pub use targets::{RenderTargets, POST_FX_FORMAT, SCENE_COLOR_FORMAT, SCENE_DEPTH_FORMAT};
