/// Swapchain - presentation with an explicit Valid/Dirty state machine
///
/// Manages presentation to the window, completely separated from rendering
/// logic. A failed acquire or present flips the state to Dirty; the frame
/// loop observes `needs_recreate()` and calls `recreate()` with the new
/// window size before trying again. A frame that hits a dirty swapchain is
/// abandoned for that iteration.

use aurora_3d_engine::aurora3d::{Error, Result};
use aurora_3d_engine::{engine_debug, engine_err, engine_error};
use ash::vk;
use std::sync::Arc;

use crate::context::GpuContext;

/// Swapchain lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainState {
    /// Images can be acquired and presented
    Valid,
    /// Out of date or suboptimal; must be recreated before the next frame
    Dirty,
}

pub struct Swapchain {
    ctx: Arc<GpuContext>,

    /// Surface
    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,

    /// Swapchain
    swapchain: vk::SwapchainKHR,
    swapchain_loader: ash::khr::swapchain::Device,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    format: vk::Format,
    extent: vk::Extent2D,

    /// One render-finished semaphore per swapchain image (for present)
    render_finished_semaphores: Vec<vk::Semaphore>,

    state: SwapchainState,
}

impl Swapchain {
    pub fn new(
        ctx: Arc<GpuContext>,
        surface: vk::SurfaceKHR,
        surface_loader: ash::khr::surface::Instance,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let swapchain_loader = ash::khr::swapchain::Device::new(&ctx.instance, &ctx.device);

        let mut swapchain = Self {
            ctx,
            surface,
            surface_loader,
            swapchain: vk::SwapchainKHR::null(),
            swapchain_loader,
            images: Vec::new(),
            image_views: Vec::new(),
            format: vk::Format::UNDEFINED,
            extent: vk::Extent2D { width, height },
            render_finished_semaphores: Vec::new(),
            state: SwapchainState::Valid,
        };
        swapchain.build(width, height)?;
        Ok(swapchain)
    }

    // ===== ACCESSORS =====

    pub fn image(&self, index: u32) -> vk::Image {
        self.images[index as usize]
    }

    pub fn image_view(&self, index: u32) -> vk::ImageView {
        self.image_views[index as usize]
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn format(&self) -> vk::Format {
        self.format
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Whether the next frame must recreate the swapchain first.
    pub fn needs_recreate(&self) -> bool {
        self.state == SwapchainState::Dirty
    }

    // ===== FRAME OPERATIONS =====

    /// Acquire the next image, signalling `acquire_semaphore`.
    ///
    /// Returns `None` (and marks the swapchain dirty) when the surface has
    /// changed under us; the caller abandons the frame for this iteration.
    pub fn acquire_image(&mut self, acquire_semaphore: vk::Semaphore) -> Result<Option<u32>> {
        if self.state == SwapchainState::Dirty {
            return Ok(None);
        }
        unsafe {
            match self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                acquire_semaphore,
                vk::Fence::null(),
            ) {
                Ok((image_index, false)) => Ok(Some(image_index)),
                // Suboptimal: the image is usable but the surface changed
                Ok((_, true)) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    self.state = SwapchainState::Dirty;
                    Ok(None)
                }
                Err(e) => Err(engine_err!(
                    "aurora3d::vulkan",
                    "Failed to acquire swapchain image: {:?}",
                    e
                )),
            }
        }
    }

    /// Submit the frame's command buffer and present `image_index`.
    ///
    /// The submit waits on `acquire_semaphore` at color-attachment output,
    /// signals the image's render-finished semaphore and `fence`; present
    /// waits on the render-finished semaphore. A present failure marks the
    /// swapchain dirty instead of failing the caller.
    pub fn submit_and_present(
        &mut self,
        cmd: vk::CommandBuffer,
        acquire_semaphore: vk::Semaphore,
        fence: vk::Fence,
        image_index: u32,
    ) -> Result<()> {
        let render_finished = self.render_finished_semaphores[image_index as usize];
        unsafe {
            let wait_semaphores = [acquire_semaphore];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let command_buffers = [cmd];
            let signal_semaphores = [render_finished];

            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            self.ctx
                .device
                .queue_submit(self.ctx.graphics_queue, &[submit_info], fence)
                .map_err(|e| {
                    engine_err!("aurora3d::vulkan", "Failed to submit frame commands: {:?}", e)
                })?;

            let swapchains = [self.swapchain];
            let image_indices = [image_index];
            let present_wait = [render_finished];
            let present_info = vk::PresentInfoKHR::default()
                .wait_semaphores(&present_wait)
                .swapchains(&swapchains)
                .image_indices(&image_indices);

            match self
                .swapchain_loader
                .queue_present(self.ctx.graphics_queue, &present_info)
            {
                Ok(false) => Ok(()),
                Ok(true) | Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    self.state = SwapchainState::Dirty;
                    Ok(())
                }
                Err(e) => Err(engine_err!(
                    "aurora3d::vulkan",
                    "Failed to present swapchain image: {:?}",
                    e
                )),
            }
        }
    }

    /// Rebuild the swapchain for a new window size.
    ///
    /// Waits for the device to go idle first; no frame may be in flight
    /// across a recreate.
    pub fn recreate(&mut self, width: u32, height: u32) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .device_wait_idle()
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to wait idle before swapchain recreate: {:?}", e))?;
        }
        self.destroy_resources(false);
        self.build(width, height)?;
        engine_debug!(
            "aurora3d::vulkan",
            "Swapchain recreated at {}x{}",
            self.extent.width,
            self.extent.height
        );
        Ok(())
    }

    // ===== CONSTRUCTION =====

    fn build(&mut self, width: u32, height: u32) -> Result<()> {
        unsafe {
            let device = &self.ctx.device;

            let surface_capabilities = self
                .surface_loader
                .get_physical_device_surface_capabilities(self.ctx.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to get surface capabilities: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to get surface capabilities: {:?}",
                        e
                    ))
                })?;

            let surface_formats = self
                .surface_loader
                .get_physical_device_surface_formats(self.ctx.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;

            let surface_format = surface_formats
                .iter()
                .find(|f| {
                    f.format == vk::Format::B8G8R8A8_SRGB || f.format == vk::Format::R8G8B8A8_SRGB
                })
                .unwrap_or(&surface_formats[0]);

            let extent = if surface_capabilities.current_extent.width != u32::MAX {
                surface_capabilities.current_extent
            } else {
                vk::Extent2D {
                    width: width.clamp(
                        surface_capabilities.min_image_extent.width,
                        surface_capabilities.max_image_extent.width,
                    ),
                    height: height.clamp(
                        surface_capabilities.min_image_extent.height,
                        surface_capabilities.max_image_extent.height,
                    ),
                }
            };

            let image_count = surface_capabilities.min_image_count + 1;
            let image_count = if surface_capabilities.max_image_count > 0 {
                image_count.min(surface_capabilities.max_image_count)
            } else {
                image_count
            };

            let old_swapchain = self.swapchain;
            let swapchain_create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(self.surface)
                .min_image_count(image_count)
                .image_format(surface_format.format)
                .image_color_space(surface_format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(
                    vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST,
                )
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(surface_capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(vk::PresentModeKHR::FIFO)
                .clipped(true)
                .old_swapchain(old_swapchain);

            let swapchain = self
                .swapchain_loader
                .create_swapchain(&swapchain_create_info, None)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create swapchain: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
                })?;

            if old_swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(old_swapchain, None);
            }
            self.swapchain = swapchain;
            self.format = surface_format.format;
            self.extent = extent;

            self.images = self
                .swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to get swapchain images: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
                })?;

            for &image in &self.images {
                let create_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(self.format)
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });
                let view = device.create_image_view(&create_info, None).map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create swapchain image view: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create image view: {:?}", e))
                })?;
                self.image_views.push(view);
            }

            let semaphore_info = vk::SemaphoreCreateInfo::default();
            for _ in 0..self.images.len() {
                self.render_finished_semaphores.push(
                    device.create_semaphore(&semaphore_info, None).map_err(|e| {
                        engine_error!("aurora3d::vulkan", "Failed to create render-finished semaphore: {:?}", e);
                        Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
                    })?,
                );
            }

            self.state = SwapchainState::Valid;
            Ok(())
        }
    }

    fn destroy_resources(&mut self, destroy_swapchain: bool) {
        unsafe {
            let device = &self.ctx.device;
            for &semaphore in &self.render_finished_semaphores {
                device.destroy_semaphore(semaphore, None);
            }
            self.render_finished_semaphores.clear();
            for &view in &self.image_views {
                device.destroy_image_view(view, None);
            }
            self.image_views.clear();
            self.images.clear();
            if destroy_swapchain && self.swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
                self.swapchain = vk::SwapchainKHR::null();
            }
        }
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.device_wait_idle().ok();
        }
        self.destroy_resources(true);
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}
