/// RenderTargets - offscreen images for one viewport
///
/// Each viewport mode (editor Scene view, Game view) owns one set: scene
/// color and depth at the configured sample count, the single-sampled
/// resolve targets when MSAA is on, and the post-fx output that ends up
/// sampled by the editor UI or blitted to the swapchain. Targets register
/// stable bindless ids once and keep them across resizes.

use aurora_3d_engine::aurora3d::render::ImageId;
use aurora_3d_engine::aurora3d::{Result, SampleCount};
use ash::vk;

use crate::device::Device;
use crate::image::{AllocatedImage, ImageDesc};
use crate::image_cache::ImageCache;

pub const SCENE_COLOR_FORMAT: vk::Format = vk::Format::R16G16B16A16_SFLOAT;
pub const SCENE_DEPTH_FORMAT: vk::Format = vk::Format::D32_SFLOAT;
pub const POST_FX_FORMAT: vk::Format = vk::Format::R8G8B8A8_UNORM;

pub fn sample_flags(samples: SampleCount) -> vk::SampleCountFlags {
    match samples.as_u32() {
        2 => vk::SampleCountFlags::TYPE_2,
        4 => vk::SampleCountFlags::TYPE_4,
        8 => vk::SampleCountFlags::TYPE_8,
        _ => vk::SampleCountFlags::TYPE_1,
    }
}

pub struct RenderTargets {
    extent: vk::Extent2D,
    samples: SampleCount,

    /// Multisampled color, resolved into `color` (None when MSAA is off)
    color_msaa: Option<AllocatedImage>,
    /// Single-sampled scene color (direct target when MSAA is off)
    color: AllocatedImage,
    color_id: ImageId,

    /// Scene depth at the configured sample count
    depth: AllocatedImage,
    /// Bindless id of `depth` (the depth-resolve pass samples it)
    depth_msaa_id: ImageId,
    /// Single-sampled depth written by the resolve pass (MSAA only)
    depth_resolve: Option<AllocatedImage>,
    /// Bindless id of the single-sampled depth (resolved or direct)
    depth_id: ImageId,

    /// Tone-mapped output, the image handed to the viewport
    post_fx: AllocatedImage,
    post_fx_id: ImageId,
}

impl RenderTargets {
    pub fn new(
        device: &Device,
        images: &mut ImageCache,
        width: u32,
        height: u32,
        samples: SampleCount,
    ) -> Result<Self> {
        let color_id = images.reserve_id()?;
        let depth_msaa_id = images.reserve_id()?;
        let depth_id = images.reserve_id()?;
        let post_fx_id = images.reserve_id()?;

        let (color_msaa, color, depth, depth_resolve, post_fx) =
            Self::create_images(device, width, height, samples)?;

        let targets = Self {
            extent: vk::Extent2D { width, height },
            samples,
            color_msaa,
            color,
            color_id,
            depth,
            depth_msaa_id,
            depth_resolve,
            depth_id,
            post_fx,
            post_fx_id,
        };
        targets.register(device);
        Ok(targets)
    }

    /// Recreate every image for a new viewport size, keeping the ids.
    ///
    /// The caller must ensure no frame is in flight (device idle).
    pub fn resize(&mut self, device: &Device, width: u32, height: u32) -> Result<()> {
        let (color_msaa, color, depth, depth_resolve, post_fx) =
            Self::create_images(device, width, height, self.samples)?;
        self.extent = vk::Extent2D { width, height };
        self.color_msaa = color_msaa;
        self.color = color;
        self.depth = depth;
        self.depth_resolve = depth_resolve;
        self.post_fx = post_fx;
        self.register(device);
        Ok(())
    }

    #[allow(clippy::type_complexity)]
    fn create_images(
        device: &Device,
        width: u32,
        height: u32,
        samples: SampleCount,
    ) -> Result<(
        Option<AllocatedImage>,
        AllocatedImage,
        AllocatedImage,
        Option<AllocatedImage>,
        AllocatedImage,
    )> {
        let flags = sample_flags(samples);

        let color_msaa = if samples.is_msaa() {
            Some(device.create_image(
                &ImageDesc {
                    width,
                    height,
                    format: SCENE_COLOR_FORMAT,
                    usage: vk::ImageUsageFlags::COLOR_ATTACHMENT,
                    samples: flags,
                    mipmapped: false,
                },
                None,
            )?)
        } else {
            None
        };
        let color = device.create_image(
            &ImageDesc {
                width,
                height,
                format: SCENE_COLOR_FORMAT,
                usage: vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::SAMPLED,
                samples: vk::SampleCountFlags::TYPE_1,
                mipmapped: false,
            },
            None,
        )?;
        let depth = device.create_image(
            &ImageDesc {
                width,
                height,
                format: SCENE_DEPTH_FORMAT,
                usage: vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
                    | vk::ImageUsageFlags::SAMPLED,
                samples: flags,
                mipmapped: false,
            },
            None,
        )?;
        let depth_resolve = if samples.is_msaa() {
            Some(device.create_image(
                &ImageDesc {
                    width,
                    height,
                    format: SCENE_DEPTH_FORMAT,
                    usage: vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
                        | vk::ImageUsageFlags::SAMPLED,
                    samples: vk::SampleCountFlags::TYPE_1,
                    mipmapped: false,
                },
                None,
            )?)
        } else {
            None
        };
        let post_fx = device.create_image(
            &ImageDesc {
                width,
                height,
                format: POST_FX_FORMAT,
                usage: vk::ImageUsageFlags::COLOR_ATTACHMENT
                    | vk::ImageUsageFlags::SAMPLED
                    | vk::ImageUsageFlags::TRANSFER_SRC,
                samples: vk::SampleCountFlags::TYPE_1,
                mipmapped: false,
            },
            None,
        )?;
        Ok((color_msaa, color, depth, depth_resolve, post_fx))
    }

    fn register(&self, device: &Device) {
        device.register_bindless_image(self.color_id, self.color.view());
        device.register_bindless_image(self.depth_msaa_id, self.depth.view());
        let resolved_depth_view = self
            .depth_resolve
            .as_ref()
            .map(|d| d.view())
            .unwrap_or_else(|| self.depth.view());
        device.register_bindless_image(self.depth_id, resolved_depth_view);
        device.register_bindless_image(self.post_fx_id, self.post_fx.view());
    }

    // ===== ACCESSORS =====

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn samples(&self) -> SampleCount {
        self.samples
    }

    pub fn color(&self) -> &AllocatedImage {
        &self.color
    }

    pub fn color_msaa(&self) -> Option<&AllocatedImage> {
        self.color_msaa.as_ref()
    }

    pub fn color_id(&self) -> ImageId {
        self.color_id
    }

    pub fn depth(&self) -> &AllocatedImage {
        &self.depth
    }

    pub fn depth_msaa_id(&self) -> ImageId {
        self.depth_msaa_id
    }

    pub fn depth_resolve(&self) -> Option<&AllocatedImage> {
        self.depth_resolve.as_ref()
    }

    pub fn depth_id(&self) -> ImageId {
        self.depth_id
    }

    pub fn post_fx(&self) -> &AllocatedImage {
        &self.post_fx
    }

    /// Bindless id of the finished frame (what the viewport samples).
    pub fn post_fx_id(&self) -> ImageId {
        self.post_fx_id
    }
}
