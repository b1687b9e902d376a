/// Mouse picking - GPU-written entity id, CPU readback
///
/// A fixed-size storage buffer (bindless set 1) the forward fragment shader
/// writes the entity id of the fragment under the mouse cursor into, depth
/// ordering resolved on the GPU. The CPU reads the persistently-mapped
/// buffer right after recording, without waiting on the frame's fence: the
/// value observed is from a frame `FRAME_OVERLAP` cycles old. For editor
/// hover/click at interactive rates a one-frame-stale id is indistinguishable
/// to the user, and the alternative (a fence wait) would stall the frame loop.

use aurora_3d_engine::aurora3d::Result;
use ash::vk;
use gpu_allocator::MemoryLocation;

use crate::buffer::AllocatedBuffer;
use crate::device::Device;

/// Pick buffer layout: one u32 entity id (0 = nothing under the cursor)
/// and one u32 depth bits word used by the shader's atomic depth test.
const PICK_BUFFER_SIZE: u64 = 8;

pub struct PickBuffer {
    buffer: AllocatedBuffer,
}

impl PickBuffer {
    /// Create the buffer and register it as bindless set 1.
    pub fn new(device: &Device) -> Result<Self> {
        let buffer = device.create_buffer(
            PICK_BUFFER_SIZE,
            vk::BufferUsageFlags::STORAGE_BUFFER,
            MemoryLocation::CpuToGpu,
            "pick buffer",
        )?;
        device
            .bindless()
            .register_pick_buffer(buffer.handle(), PICK_BUFFER_SIZE);
        Ok(Self { buffer })
    }

    /// Reset before recording a frame that runs the pick path.
    ///
    /// Depth bits start at max so the first written fragment wins.
    pub fn clear(&self) -> Result<()> {
        self.buffer.write(0, &0u32.to_ne_bytes())?;
        self.buffer.write(4, &u32::MAX.to_ne_bytes())
    }

    /// Entity id currently in the buffer.
    ///
    /// Read without synchronization; the result lags the visible frame by
    /// up to `FRAME_OVERLAP` cycles (accepted staleness, see module docs).
    pub fn read_hovered(&self) -> u32 {
        match self.buffer.mapped_ptr() {
            Some(ptr) => unsafe { (ptr as *const u32).read_volatile() },
            None => 0,
        }
    }
}
