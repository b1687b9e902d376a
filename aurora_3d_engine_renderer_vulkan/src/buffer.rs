/// AllocatedBuffer - a vk::Buffer paired with its gpu-allocator allocation

use aurora_3d_engine::aurora3d::{Error, Result};
use aurora_3d_engine::engine_err;
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;

use crate::context::GpuContext;

/// GPU buffer with its backing allocation.
///
/// CPU-visible buffers (`CpuToGpu`) stay persistently mapped for their
/// whole lifetime; `write` copies straight into the mapping. Device-local
/// buffers are filled through staging copies instead.
pub struct AllocatedBuffer {
    /// Shared GPU context (device, allocator, queue)
    ctx: Arc<GpuContext>,
    /// Vulkan buffer
    pub(crate) buffer: vk::Buffer,
    /// GPU memory allocation
    pub(crate) allocation: Option<Allocation>,
    /// Buffer size in bytes
    pub(crate) size: u64,
    /// Device address (0 when created without SHADER_DEVICE_ADDRESS usage)
    pub(crate) address: u64,
}

impl AllocatedBuffer {
    pub fn new(
        ctx: Arc<GpuContext>,
        buffer: vk::Buffer,
        allocation: Allocation,
        size: u64,
        address: u64,
    ) -> Self {
        Self {
            ctx,
            buffer,
            allocation: Some(allocation),
            size,
            address,
        }
    }

    /// Raw buffer handle
    pub fn handle(&self) -> vk::Buffer {
        self.buffer
    }

    /// Buffer size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Device address for pulled reads from shaders.
    ///
    /// Only valid on buffers created with SHADER_DEVICE_ADDRESS usage.
    pub fn device_address(&self) -> u64 {
        self.address
    }

    /// Persistently mapped pointer, if the buffer is CPU-visible.
    pub fn mapped_ptr(&self) -> Option<*mut u8> {
        self.allocation
            .as_ref()
            .and_then(|a| a.mapped_ptr())
            .map(|p| p.as_ptr() as *mut u8)
    }

    /// Copy `data` into the persistent mapping at `offset`.
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        if offset + data.len() as u64 > self.size {
            return Err(engine_err!(
                "aurora3d::vulkan",
                "Buffer write out of range: offset {} + {} bytes > size {}",
                offset,
                data.len(),
                self.size
            ));
        }
        let mapped_ptr = self
            .mapped_ptr()
            .ok_or_else(|| Error::BackendError("Buffer is not CPU-accessible".to_string()))?;
        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                mapped_ptr.offset(offset as isize),
                data.len(),
            );
        }
        Ok(())
    }
}

impl Drop for AllocatedBuffer {
    fn drop(&mut self) {
        unsafe {
            // Free GPU memory
            if let Some(allocation) = self.allocation.take() {
                // Don't panic if lock fails - we still need to destroy the buffer
                if let Ok(mut allocator) = self.ctx.allocator.lock() {
                    allocator.free(allocation).ok();
                }
            }

            // Destroy buffer
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
