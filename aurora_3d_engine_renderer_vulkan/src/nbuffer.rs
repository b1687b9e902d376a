/// NBuffer - per-frame staged upload into one device-local buffer
///
/// N CPU-visible staging buffers (one per overlapping frame) feeding a
/// single device-local destination. Each frame memcpys fresh data into its
/// own staging slot and records a staging-to-dest copy into the frame's
/// command buffer; the frame-slot fence guarantees the CPU never rewrites
/// a staging buffer the GPU is still copying from.

use aurora_3d_engine::aurora3d::{Error, Result};
use aurora_3d_engine::engine_err;
use ash::vk;
use gpu_allocator::MemoryLocation;

use crate::buffer::AllocatedBuffer;
use crate::device::Device;

pub struct NBuffer {
    staging: Vec<AllocatedBuffer>,
    dest: AllocatedBuffer,
    data_size: u64,
}

impl NBuffer {
    /// Create the staging ring and the device-local destination.
    ///
    /// `usage` is the destination's read usage (storage, uniform, ...);
    /// TRANSFER_DST and SHADER_DEVICE_ADDRESS are always added.
    pub fn new(
        device: &Device,
        usage: vk::BufferUsageFlags,
        data_size: u64,
        frames_in_flight: usize,
        label: &str,
    ) -> Result<Self> {
        let mut staging = Vec::with_capacity(frames_in_flight);
        for i in 0..frames_in_flight {
            staging.push(device.create_buffer(
                data_size,
                vk::BufferUsageFlags::TRANSFER_SRC,
                MemoryLocation::CpuToGpu,
                &format!("{label} staging {i}"),
            )?);
        }
        let dest = device.create_buffer(
            data_size,
            usage
                | vk::BufferUsageFlags::TRANSFER_DST
                | vk::BufferUsageFlags::SHADER_DEVICE_ADDRESS,
            MemoryLocation::GpuOnly,
            label,
        )?;
        Ok(Self {
            staging,
            dest,
            data_size,
        })
    }

    /// Device address of the destination buffer.
    pub fn device_address(&self) -> u64 {
        self.dest.device_address()
    }

    /// Destination buffer handle.
    pub fn dest_handle(&self) -> vk::Buffer {
        self.dest.handle()
    }

    /// Write `bytes` into this frame's staging slot and record the copy
    /// into the destination at `offset`.
    ///
    /// With `sync`, a buffer barrier fences the transfer against later
    /// shader reads of the same buffer in this command buffer.
    pub fn upload_new_data(
        &self,
        device: &ash::Device,
        cmd: vk::CommandBuffer,
        frame_slot: usize,
        bytes: &[u8],
        offset: u64,
        sync: bool,
    ) -> Result<()> {
        if offset + bytes.len() as u64 > self.data_size {
            return Err(engine_err!(
                "aurora3d::vulkan",
                "NBuffer upload out of range: offset {} + {} bytes > size {}",
                offset,
                bytes.len(),
                self.data_size
            ));
        }
        if bytes.is_empty() {
            return Ok(());
        }
        let staging = self
            .staging
            .get(frame_slot)
            .ok_or_else(|| Error::InvalidResource(format!("NBuffer frame slot {frame_slot}")))?;
        staging.write(offset, bytes)?;

        unsafe {
            let region = vk::BufferCopy {
                src_offset: offset,
                dst_offset: offset,
                size: bytes.len() as u64,
            };
            device.cmd_copy_buffer(cmd, staging.handle(), self.dest.handle(), &[region]);

            if sync {
                let barrier = vk::BufferMemoryBarrier2::default()
                    .src_stage_mask(vk::PipelineStageFlags2::TRANSFER)
                    .src_access_mask(vk::AccessFlags2::TRANSFER_WRITE)
                    .dst_stage_mask(vk::PipelineStageFlags2::ALL_GRAPHICS)
                    .dst_access_mask(vk::AccessFlags2::SHADER_READ)
                    .buffer(self.dest.handle())
                    .offset(offset)
                    .size(bytes.len() as u64);
                let barriers = [barrier];
                let dependency = vk::DependencyInfo::default().buffer_memory_barriers(&barriers);
                device.cmd_pipeline_barrier2(cmd, &dependency);
            }
        }
        Ok(())
    }
}
