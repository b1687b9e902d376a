/// Device - Vulkan instance/device bring-up and frame-slot orchestration
///
/// Central object for creating resources and submitting commands.
/// Completely separated from swapchain and presentation logic.

use aurora_3d_engine::aurora3d::render::{ImageId, FRAME_OVERLAP};
use aurora_3d_engine::aurora3d::{Error, RendererConfig, Result, SampleCount};
use aurora_3d_engine::{engine_err, engine_error, engine_info};
use ash::vk;
use gpu_allocator::vulkan::{
    AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc,
};
use gpu_allocator::MemoryLocation;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CString;
use std::sync::{Arc, Mutex};

use crate::bindless::BindlessTable;
use crate::buffer::AllocatedBuffer;
use crate::context::GpuContext;
use crate::image::{AllocatedImage, ImageDesc};

/// Fence timeout for blocking setup submits (10 seconds)
const IMMEDIATE_SUBMIT_TIMEOUT_NS: u64 = 10_000_000_000;

/// Frame slot for a given monotonic frame counter.
///
/// The CPU may only touch slot `frame_slot(f)` after the fence signaled by
/// cycle `f - FRAME_OVERLAP` has been waited on.
#[inline]
pub fn frame_slot(frame_count: u64) -> usize {
    (frame_count % FRAME_OVERLAP as u64) as usize
}

/// Per-frame-slot command recording state.
///
/// One of these per overlapping frame; reused in a cycle of
/// `FRAME_OVERLAP`, gated by `in_flight_fence`.
pub struct FrameData {
    pub command_pool: vk::CommandPool,
    pub command_buffer: vk::CommandBuffer,
    /// Signaled when this slot's GPU work from the previous cycle is done
    pub in_flight_fence: vk::Fence,
    /// Signaled by swapchain acquire, waited on by the frame's submit
    pub acquire_semaphore: vk::Semaphore,
}

/// Vulkan device wrapper.
///
/// Owns the GPU context, the per-frame command state, the one-shot upload
/// path and the bindless descriptor table. Resource caches and passes are
/// layered on top by `SceneRenderer`.
pub struct Device {
    ctx: Arc<GpuContext>,

    /// Per-frame command recording state, indexed by `frame_slot`
    frames: Vec<FrameData>,
    /// Monotonic frame counter, incremented by `end_frame`
    frame_count: u64,

    /// One-shot submit state for setup uploads
    imm_command_pool: vk::CommandPool,
    imm_command_buffer: vk::CommandBuffer,
    imm_fence: vk::Fence,

    /// Global descriptor table (set 0 images, set 1 pick buffer)
    bindless: BindlessTable,

    /// Trilinear repeat sampler shared by all bindless images
    default_sampler: vk::Sampler,

    /// MSAA sample count the renderer's scene targets use
    msaa_samples: SampleCount,
}

impl Device {
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: &RendererConfig,
    ) -> Result<(Self, vk::SurfaceKHR, ash::khr::surface::Instance)> {
        unsafe {
            // Create Vulkan Entry
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            // Application Info
            let app_name = CString::new(config.app_name.as_str()).map_err(|_| {
                Error::InitializationFailed("App name contains a NUL byte".to_string())
            })?;
            let (major, minor, patch) = config.app_version;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, major, minor, patch))
                .engine_name(c"Aurora3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_3);

            // Get required extensions
            let display_handle = window.display_handle().map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to get display handle: {}", e);
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            let mut extension_names =
                ash_window::enumerate_required_extensions(display_handle.as_raw())
                    .map_err(|e| {
                        engine_error!("aurora3d::vulkan", "Failed to get required extensions: {}", e);
                        Error::InitializationFailed(format!(
                            "Failed to get required extensions: {}",
                            e
                        ))
                    })?
                    .to_vec();

            // Add debug utils extension if validation is enabled
            if config.enable_validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            // Validation layers
            let layer_names = if config.enable_validation {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            // Setup debug messenger if validation is enabled
            let (debug_utils_loader, debug_messenger) = if config.enable_validation {
                let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);

                crate::debug::init_debug_config(crate::debug::DebugConfig {
                    severity: config.debug_severity,
                });

                let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
                    .message_severity(crate::debug::severity_flags(config.debug_severity))
                    .message_type(
                        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                    )
                    .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

                let messenger = debug_utils
                    .create_debug_utils_messenger(&debug_info, None)
                    .map_err(|e| {
                        engine_error!("aurora3d::vulkan", "Failed to create debug messenger: {:?}", e);
                        Error::InitializationFailed(format!(
                            "Failed to create debug messenger: {:?}",
                            e
                        ))
                    })?;

                (Some(debug_utils), Some(messenger))
            } else {
                (None, None)
            };

            // Create surface
            let window_handle = window.window_handle().map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to get window handle: {}", e);
                Error::InitializationFailed(format!("Failed to get window handle: {}", e))
            })?;
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;

            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            // Pick physical device: prefer a discrete GPU that can present
            let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to enumerate physical devices: {:?}", e);
                Error::InitializationFailed(format!(
                    "Failed to enumerate physical devices: {:?}",
                    e
                ))
            })?;

            let mut picked: Option<(vk::PhysicalDevice, u32)> = None;
            for pd in physical_devices {
                let queue_families = instance.get_physical_device_queue_family_properties(pd);
                let family = queue_families.iter().enumerate().find(|(i, qf)| {
                    qf.queue_flags.contains(vk::QueueFlags::GRAPHICS)
                        && surface_loader
                            .get_physical_device_surface_support(pd, *i as u32, surface)
                            .unwrap_or(false)
                });
                if let Some((family, _)) = family {
                    let props = instance.get_physical_device_properties(pd);
                    let discrete = props.device_type == vk::PhysicalDeviceType::DISCRETE_GPU;
                    match picked {
                        None => picked = Some((pd, family as u32)),
                        Some(_) if discrete => picked = Some((pd, family as u32)),
                        Some(_) => {}
                    }
                }
            }
            let (physical_device, graphics_family_index) = picked.ok_or_else(|| {
                engine_error!("aurora3d::vulkan", "No Vulkan-capable GPU with present support found");
                Error::InitializationFailed("No suitable GPU found".to_string())
            })?;

            let device_props = instance.get_physical_device_properties(physical_device);
            let device_name = device_props
                .device_name_as_c_str()
                .ok()
                .and_then(|s| s.to_str().ok())
                .unwrap_or("Unknown");
            engine_info!("aurora3d::vulkan", "Selected GPU: {}", device_name);

            // Create logical device (Vulkan 1.3 feature set the renderer relies on)
            let queue_priorities = [1.0];
            let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(graphics_family_index)
                .queue_priorities(&queue_priorities)];

            let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];

            let device_features = vk::PhysicalDeviceFeatures::default()
                .sampler_anisotropy(true)
                .fill_mode_non_solid(true);
            let mut features12 = vk::PhysicalDeviceVulkan12Features::default()
                .buffer_device_address(true)
                .descriptor_indexing(true)
                .runtime_descriptor_array(true)
                .descriptor_binding_partially_bound(true)
                .descriptor_binding_sampled_image_update_after_bind(true)
                .descriptor_binding_update_unused_while_pending(true);
            let mut features13 = vk::PhysicalDeviceVulkan13Features::default()
                .dynamic_rendering(true)
                .synchronization2(true);

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .enabled_features(&device_features)
                .push_next(&mut features12)
                .push_next(&mut features13);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let graphics_queue = device.get_device_queue(graphics_family_index, 0);

            // Create GPU allocator (buffer device address required for pulled
            // vertex/material/light reads)
            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: true,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to create GPU allocator: {:?}", e);
                Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
            })?;

            let ctx = Arc::new(GpuContext::new(
                entry,
                instance,
                physical_device,
                device.clone(),
                Arc::new(Mutex::new(allocator)),
                graphics_queue,
                graphics_family_index,
                debug_utils_loader,
                debug_messenger,
            ));

            // Per-frame command state
            let mut frames = Vec::with_capacity(FRAME_OVERLAP);
            for _ in 0..FRAME_OVERLAP {
                let pool_info = vk::CommandPoolCreateInfo::default()
                    .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
                    .queue_family_index(graphics_family_index);
                let command_pool = device.create_command_pool(&pool_info, None).map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create frame command pool: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
                })?;

                let alloc_info = vk::CommandBufferAllocateInfo::default()
                    .command_pool(command_pool)
                    .level(vk::CommandBufferLevel::PRIMARY)
                    .command_buffer_count(1);
                let command_buffer = device
                    .allocate_command_buffers(&alloc_info)
                    .map_err(|e| {
                        engine_error!("aurora3d::vulkan", "Failed to allocate frame command buffer: {:?}", e);
                        Error::InitializationFailed(format!(
                            "Failed to allocate command buffer: {:?}",
                            e
                        ))
                    })?[0];

                // Created signaled so the first begin_frame doesn't block
                let fence_info =
                    vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);
                let in_flight_fence = device.create_fence(&fence_info, None).map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create in-flight fence: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
                })?;

                let semaphore_info = vk::SemaphoreCreateInfo::default();
                let acquire_semaphore =
                    device.create_semaphore(&semaphore_info, None).map_err(|e| {
                        engine_error!("aurora3d::vulkan", "Failed to create acquire semaphore: {:?}", e);
                        Error::InitializationFailed(format!("Failed to create semaphore: {:?}", e))
                    })?;

                frames.push(FrameData {
                    command_pool,
                    command_buffer,
                    in_flight_fence,
                    acquire_semaphore,
                });
            }

            // One-shot submit state
            let imm_pool_info = vk::CommandPoolCreateInfo::default()
                .flags(
                    vk::CommandPoolCreateFlags::TRANSIENT
                        | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
                )
                .queue_family_index(graphics_family_index);
            let imm_command_pool =
                device.create_command_pool(&imm_pool_info, None).map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create upload command pool: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
                })?;
            let imm_alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(imm_command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let imm_command_buffer = device
                .allocate_command_buffers(&imm_alloc_info)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to allocate upload command buffer: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to allocate command buffer: {:?}",
                        e
                    ))
                })?[0];
            let imm_fence = device
                .create_fence(&vk::FenceCreateInfo::default(), None)
                .map_err(|e| {
                    engine_error!("aurora3d::vulkan", "Failed to create upload fence: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
                })?;

            let bindless = BindlessTable::new(device.clone())?;

            // Trilinear repeat sampler shared by all bindless images
            let sampler_info = vk::SamplerCreateInfo::default()
                .mag_filter(vk::Filter::LINEAR)
                .min_filter(vk::Filter::LINEAR)
                .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
                .address_mode_u(vk::SamplerAddressMode::REPEAT)
                .address_mode_v(vk::SamplerAddressMode::REPEAT)
                .address_mode_w(vk::SamplerAddressMode::REPEAT)
                .anisotropy_enable(true)
                .max_anisotropy(device_props.limits.max_sampler_anisotropy.min(8.0))
                .max_lod(vk::LOD_CLAMP_NONE);
            let default_sampler = device.create_sampler(&sampler_info, None).map_err(|e| {
                engine_error!("aurora3d::vulkan", "Failed to create default sampler: {:?}", e);
                Error::InitializationFailed(format!("Failed to create sampler: {:?}", e))
            })?;

            engine_info!(
                "aurora3d::vulkan",
                "Device initialized ({} frames in flight)",
                FRAME_OVERLAP
            );

            Ok((
                Self {
                    ctx,
                    frames,
                    frame_count: 0,
                    imm_command_pool,
                    imm_command_buffer,
                    imm_fence,
                    bindless,
                    default_sampler,
                    msaa_samples: config.msaa_samples,
                },
                surface,
                surface_loader,
            ))
        }
    }

    // ===== ACCESSORS =====

    pub fn ctx(&self) -> &Arc<GpuContext> {
        &self.ctx
    }

    pub fn handle(&self) -> &ash::Device {
        &self.ctx.device
    }

    pub fn bindless(&self) -> &BindlessTable {
        &self.bindless
    }

    pub fn default_sampler(&self) -> vk::Sampler {
        self.default_sampler
    }

    /// MSAA sample count for scene render targets
    pub fn msaa(&self) -> SampleCount {
        self.msaa_samples
    }

    /// Monotonic frame counter
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frame slot index for the current frame
    pub fn current_slot(&self) -> usize {
        frame_slot(self.frame_count)
    }

    /// Per-slot frame state
    pub fn frame(&self, slot: usize) -> &FrameData {
        &self.frames[slot]
    }

    // ===== FRAME LIFECYCLE =====

    /// Start recording the current frame slot's command buffer.
    ///
    /// Blocks until the slot's previous cycle has finished on the GPU, then
    /// resets its fence and command buffer. Nothing belonging to the slot may
    /// be touched before this returns.
    pub fn begin_frame(&mut self) -> Result<vk::CommandBuffer> {
        let frame = &self.frames[self.current_slot()];
        let device = &self.ctx.device;
        unsafe {
            device
                .wait_for_fences(&[frame.in_flight_fence], true, u64::MAX)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to wait for frame fence: {:?}", e))?;
            device
                .reset_fences(&[frame.in_flight_fence])
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to reset frame fence: {:?}", e))?;

            device
                .reset_command_buffer(frame.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to reset frame command buffer: {:?}", e))?;
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device
                .begin_command_buffer(frame.command_buffer, &begin_info)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to begin frame command buffer: {:?}", e))?;
        }
        Ok(frame.command_buffer)
    }

    /// Advance to the next frame slot. Called after the frame's submit.
    pub fn end_frame(&mut self) {
        self.frame_count += 1;
    }

    // ===== RESOURCE CREATION =====

    /// Create a buffer.
    ///
    /// `CpuToGpu` buffers come back persistently mapped. Buffers created
    /// with SHADER_DEVICE_ADDRESS usage have their device address resolved
    /// immediately.
    pub fn create_buffer(
        &self,
        size: u64,
        usage: vk::BufferUsageFlags,
        location: MemoryLocation,
        label: &str,
    ) -> Result<AllocatedBuffer> {
        unsafe {
            let device = &self.ctx.device;
            let buffer_info = vk::BufferCreateInfo::default()
                .size(size)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);
            let buffer = device.create_buffer(&buffer_info, None).map_err(|e| {
                engine_err!("aurora3d::vulkan", "Failed to create buffer '{}': {:?}", label, e)
            })?;

            let requirements = device.get_buffer_memory_requirements(buffer);
            let allocation = self
                .ctx
                .allocator
                .lock()
                .map_err(|_| Error::BackendError("Allocator mutex poisoned".to_string()))?
                .allocate(&AllocationCreateDesc {
                    name: label,
                    requirements,
                    location,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|e| {
                    device.destroy_buffer(buffer, None);
                    match e {
                        gpu_allocator::AllocationError::OutOfMemory => Error::OutOfMemory,
                        other => engine_err!(
                            "aurora3d::vulkan",
                            "Failed to allocate memory for buffer '{}': {:?}",
                            label,
                            other
                        ),
                    }
                })?;

            device
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                .map_err(|e| {
                    engine_err!("aurora3d::vulkan", "Failed to bind buffer memory for '{}': {:?}", label, e)
                })?;

            let address = if usage.contains(vk::BufferUsageFlags::SHADER_DEVICE_ADDRESS) {
                let info = vk::BufferDeviceAddressInfo::default().buffer(buffer);
                device.get_buffer_device_address(&info)
            } else {
                0
            };

            Ok(AllocatedBuffer::new(
                self.ctx.clone(),
                buffer,
                allocation,
                size,
                address,
            ))
        }
    }

    /// Create an image, optionally uploading `pixels` (tightly packed
    /// RGBA8-style data matching `desc.format`) through a staging buffer.
    ///
    /// With `desc.mipmapped`, mip levels are generated by blits after the
    /// upload. The image ends in SHADER_READ_ONLY_OPTIMAL when pixels were
    /// provided, UNDEFINED otherwise (render targets transition on first use).
    pub fn create_image(&self, desc: &ImageDesc, pixels: Option<&[u8]>) -> Result<AllocatedImage> {
        let mip_levels = desc.mip_levels();
        unsafe {
            let device = &self.ctx.device;
            let extent = vk::Extent3D {
                width: desc.width,
                height: desc.height,
                depth: 1,
            };
            let image_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(desc.format)
                .extent(extent)
                .mip_levels(mip_levels)
                .array_layers(1)
                .samples(desc.samples)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(desc.usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);
            let image = device.create_image(&image_info, None).map_err(|e| {
                engine_err!("aurora3d::vulkan", "Failed to create image: {:?}", e)
            })?;

            let requirements = device.get_image_memory_requirements(image);
            let allocation = self
                .ctx
                .allocator
                .lock()
                .map_err(|_| Error::BackendError("Allocator mutex poisoned".to_string()))?
                .allocate(&AllocationCreateDesc {
                    name: "image",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|e| {
                    device.destroy_image(image, None);
                    match e {
                        gpu_allocator::AllocationError::OutOfMemory => Error::OutOfMemory,
                        other => engine_err!(
                            "aurora3d::vulkan",
                            "Failed to allocate image memory: {:?}",
                            other
                        ),
                    }
                })?;

            device
                .bind_image_memory(image, allocation.memory(), allocation.offset())
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to bind image memory: {:?}", e))?;

            let aspect = if desc.format == vk::Format::D32_SFLOAT {
                vk::ImageAspectFlags::DEPTH
            } else {
                vk::ImageAspectFlags::COLOR
            };
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(desc.format)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: aspect,
                    base_mip_level: 0,
                    level_count: mip_levels,
                    base_array_layer: 0,
                    layer_count: 1,
                });
            let view = device.create_image_view(&view_info, None).map_err(|e| {
                engine_err!("aurora3d::vulkan", "Failed to create image view: {:?}", e)
            })?;

            let allocated = AllocatedImage::new(
                self.ctx.clone(),
                image,
                view,
                allocation,
                vk::Extent2D {
                    width: desc.width,
                    height: desc.height,
                },
                desc.format,
                mip_levels,
            );

            if let Some(pixels) = pixels {
                self.upload_image_pixels(&allocated, pixels)?;
            }

            Ok(allocated)
        }
    }

    /// Stage `pixels` into mip 0 and generate the rest of the chain.
    fn upload_image_pixels(&self, image: &AllocatedImage, pixels: &[u8]) -> Result<()> {
        let staging = self.create_buffer(
            pixels.len() as u64,
            vk::BufferUsageFlags::TRANSFER_SRC,
            MemoryLocation::CpuToGpu,
            "image staging",
        )?;
        staging.write(0, pixels)?;

        let extent = image.extent();
        let mip_levels = image.mip_levels();
        let handle = image.handle();
        let device = self.ctx.device.clone();

        self.immediate_submit(|cmd| unsafe {
            // UNDEFINED -> TRANSFER_DST for the whole chain
            transition_image(
                &device,
                cmd,
                handle,
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                0,
                mip_levels,
            );

            let region = vk::BufferImageCopy {
                buffer_offset: 0,
                buffer_row_length: 0,
                buffer_image_height: 0,
                image_subresource: vk::ImageSubresourceLayers {
                    aspect_mask: vk::ImageAspectFlags::COLOR,
                    mip_level: 0,
                    base_array_layer: 0,
                    layer_count: 1,
                },
                image_offset: vk::Offset3D { x: 0, y: 0, z: 0 },
                image_extent: vk::Extent3D {
                    width: extent.width,
                    height: extent.height,
                    depth: 1,
                },
            };
            device.cmd_copy_buffer_to_image(
                cmd,
                staging.handle(),
                handle,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[region],
            );

            if mip_levels > 1 {
                generate_mipmaps(&device, cmd, handle, extent, mip_levels);
            } else {
                transition_image(
                    &device,
                    cmd,
                    handle,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                    0,
                    1,
                );
            }
        })
    }

    /// Register an image view in the bindless table under `id` and return it.
    pub fn register_bindless_image(&self, id: ImageId, view: vk::ImageView) -> ImageId {
        self.bindless.register_image(id, view, self.default_sampler);
        id
    }

    // ===== ONE-SHOT SUBMIT =====

    /// Record and submit a one-shot command buffer, blocking until done.
    ///
    /// Setup and import paths only; never called inside a frame.
    pub fn immediate_submit<F: FnOnce(vk::CommandBuffer)>(&self, record: F) -> Result<()> {
        let device = &self.ctx.device;
        unsafe {
            device
                .reset_command_buffer(self.imm_command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to reset upload command buffer: {:?}", e))?;
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device
                .begin_command_buffer(self.imm_command_buffer, &begin_info)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to begin upload command buffer: {:?}", e))?;

            record(self.imm_command_buffer);

            device
                .end_command_buffer(self.imm_command_buffer)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to end upload command buffer: {:?}", e))?;

            let command_buffers = [self.imm_command_buffer];
            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
            device
                .queue_submit(self.ctx.graphics_queue, &[submit_info], self.imm_fence)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to submit upload commands: {:?}", e))?;

            device
                .wait_for_fences(&[self.imm_fence], true, IMMEDIATE_SUBMIT_TIMEOUT_NS)
                .map_err(|e| engine_err!("aurora3d::vulkan", "Upload submit timed out or failed: {:?}", e))?;
            device
                .reset_fences(&[self.imm_fence])
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to reset upload fence: {:?}", e))?;
        }
        Ok(())
    }

    /// Block until the GPU is idle. Resize and shutdown paths only.
    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .device_wait_idle()
                .map_err(|e| engine_err!("aurora3d::vulkan", "Failed to wait for device idle: {:?}", e))
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        unsafe {
            let device = &self.ctx.device;
            device.device_wait_idle().ok();

            for frame in &self.frames {
                device.destroy_semaphore(frame.acquire_semaphore, None);
                device.destroy_fence(frame.in_flight_fence, None);
                device.destroy_command_pool(frame.command_pool, None);
            }
            device.destroy_fence(self.imm_fence, None);
            device.destroy_command_pool(self.imm_command_pool, None);
            device.destroy_sampler(self.default_sampler, None);
        }
        // bindless and ctx drop themselves, ctx last
    }
}

// ===== LAYOUT TRANSITIONS =====

/// Record a color-aspect layout transition over `mip_count` levels.
pub fn transition_image(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    base_mip: u32,
    mip_count: u32,
) {
    transition_image_aspect(
        device,
        cmd,
        image,
        old_layout,
        new_layout,
        base_mip,
        mip_count,
        vk::ImageAspectFlags::COLOR,
    )
}

/// Record a layout transition with an explicit aspect (depth targets).
#[allow(clippy::too_many_arguments)]
pub fn transition_image_aspect(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    image: vk::Image,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
    base_mip: u32,
    mip_count: u32,
    aspect: vk::ImageAspectFlags,
) {
    let barrier = vk::ImageMemoryBarrier2::default()
        .src_stage_mask(vk::PipelineStageFlags2::ALL_COMMANDS)
        .src_access_mask(vk::AccessFlags2::MEMORY_WRITE)
        .dst_stage_mask(vk::PipelineStageFlags2::ALL_COMMANDS)
        .dst_access_mask(vk::AccessFlags2::MEMORY_WRITE | vk::AccessFlags2::MEMORY_READ)
        .old_layout(old_layout)
        .new_layout(new_layout)
        .image(image)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: aspect,
            base_mip_level: base_mip,
            level_count: mip_count,
            base_array_layer: 0,
            layer_count: 1,
        });
    let barriers = [barrier];
    let dependency = vk::DependencyInfo::default().image_memory_barriers(&barriers);
    unsafe {
        device.cmd_pipeline_barrier2(cmd, &dependency);
    }
}

/// Blit-based mip chain generation. The image must be TRANSFER_DST for all
/// levels on entry; every level ends in SHADER_READ_ONLY_OPTIMAL.
fn generate_mipmaps(
    device: &ash::Device,
    cmd: vk::CommandBuffer,
    image: vk::Image,
    extent: vk::Extent2D,
    mip_levels: u32,
) {
    let mut width = extent.width as i32;
    let mut height = extent.height as i32;

    for level in 1..mip_levels {
        // Previous level: TRANSFER_DST -> TRANSFER_SRC
        transition_image(
            device,
            cmd,
            image,
            vk::ImageLayout::TRANSFER_DST_OPTIMAL,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            level - 1,
            1,
        );

        let next_width = (width / 2).max(1);
        let next_height = (height / 2).max(1);
        let blit = vk::ImageBlit {
            src_subresource: vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: level - 1,
                base_array_layer: 0,
                layer_count: 1,
            },
            src_offsets: [
                vk::Offset3D { x: 0, y: 0, z: 0 },
                vk::Offset3D {
                    x: width,
                    y: height,
                    z: 1,
                },
            ],
            dst_subresource: vk::ImageSubresourceLayers {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                mip_level: level,
                base_array_layer: 0,
                layer_count: 1,
            },
            dst_offsets: [
                vk::Offset3D { x: 0, y: 0, z: 0 },
                vk::Offset3D {
                    x: next_width,
                    y: next_height,
                    z: 1,
                },
            ],
        };
        unsafe {
            device.cmd_blit_image(
                cmd,
                image,
                vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                image,
                vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                &[blit],
                vk::Filter::LINEAR,
            );
        }

        transition_image(
            device,
            cmd,
            image,
            vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            level - 1,
            1,
        );

        width = next_width;
        height = next_height;
    }

    // Last level never became a blit source
    transition_image(
        device,
        cmd,
        image,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
        mip_levels - 1,
        1,
    );
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
