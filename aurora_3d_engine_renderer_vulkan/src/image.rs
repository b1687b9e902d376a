/// AllocatedImage - a vk::Image, its view and its gpu-allocator allocation

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;

use crate::context::GpuContext;

/// Description of an image to create.
#[derive(Debug, Clone, Copy)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub format: vk::Format,
    pub usage: vk::ImageUsageFlags,
    pub samples: vk::SampleCountFlags,
    /// Generate a full mip chain (ignored for multisampled images)
    pub mipmapped: bool,
}

impl ImageDesc {
    /// Sampled texture description (the common bindless-upload case)
    pub fn sampled(width: u32, height: u32, format: vk::Format, mipmapped: bool) -> Self {
        Self {
            width,
            height,
            format,
            usage: vk::ImageUsageFlags::SAMPLED
                | vk::ImageUsageFlags::TRANSFER_DST
                | vk::ImageUsageFlags::TRANSFER_SRC,
            samples: vk::SampleCountFlags::TYPE_1,
            mipmapped,
        }
    }

    /// Number of mip levels this description produces.
    pub fn mip_levels(&self) -> u32 {
        if self.mipmapped {
            32 - self.width.max(self.height).leading_zeros()
        } else {
            1
        }
    }
}

/// GPU image with its view and backing allocation.
pub struct AllocatedImage {
    /// Shared GPU context (device, allocator)
    ctx: Arc<GpuContext>,
    /// Vulkan image
    pub(crate) image: vk::Image,
    /// Vulkan image view
    pub(crate) view: vk::ImageView,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Image extent
    pub(crate) extent: vk::Extent2D,
    /// Image format
    pub(crate) format: vk::Format,
    /// Mip level count
    pub(crate) mip_levels: u32,
}

impl AllocatedImage {
    pub fn new(
        ctx: Arc<GpuContext>,
        image: vk::Image,
        view: vk::ImageView,
        allocation: Allocation,
        extent: vk::Extent2D,
        format: vk::Format,
        mip_levels: u32,
    ) -> Self {
        Self {
            ctx,
            image,
            view,
            allocation: Some(allocation),
            extent,
            format,
            mip_levels,
        }
    }

    pub fn handle(&self) -> vk::Image {
        self.image
    }

    pub fn view(&self) -> vk::ImageView {
        self.view
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    pub fn format(&self) -> vk::Format {
        self.format
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }
}

impl Drop for AllocatedImage {
    fn drop(&mut self) {
        unsafe {
            // Destroy image view
            self.ctx.device.destroy_image_view(self.view, None);

            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            // Destroy image
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}
