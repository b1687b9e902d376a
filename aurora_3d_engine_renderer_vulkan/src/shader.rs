/// SPIR-V shader module loading
///
/// Shaders ship precompiled; a missing or malformed module is fatal at
/// pass init.

use aurora_3d_engine::aurora3d::{Error, Result};
use aurora_3d_engine::engine_error;
use ash::vk;
use std::path::Path;

/// Load a `.spv` file into a shader module.
pub fn load_shader_module(device: &ash::Device, path: &Path) -> Result<vk::ShaderModule> {
    let mut file = std::fs::File::open(path).map_err(|e| {
        engine_error!("aurora3d::vulkan", "Failed to open shader '{}': {}", path.display(), e);
        Error::InitializationFailed(format!("Failed to open shader '{}': {}", path.display(), e))
    })?;
    let code = ash::util::read_spv(&mut file).map_err(|e| {
        engine_error!("aurora3d::vulkan", "Failed to read SPIR-V '{}': {}", path.display(), e);
        Error::InitializationFailed(format!("Invalid SPIR-V '{}': {}", path.display(), e))
    })?;
    let info = vk::ShaderModuleCreateInfo::default().code(&code);
    unsafe {
        device.create_shader_module(&info, None).map_err(|e| {
            engine_error!("aurora3d::vulkan", "Failed to create shader module '{}': {:?}", path.display(), e);
            Error::InitializationFailed(format!(
                "Failed to create shader module '{}': {:?}",
                path.display(),
                e
            ))
        })
    }
}
