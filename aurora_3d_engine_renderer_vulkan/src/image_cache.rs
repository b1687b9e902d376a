/// ImageCache - owner of every sampled image and its bindless registration
///
/// Append-only array of `AllocatedImage` indexed by `ImageId`. Ids are never
/// recycled; "refresh" style updates (thumbnail re-imports) overwrite the
/// slot and re-register the same id, so ids held by materials stay valid for
/// the cache's lifetime.

use aurora_3d_engine::aurora3d::render::ImageId;
use aurora_3d_engine::aurora3d::utils::IdAllocator;
use aurora_3d_engine::aurora3d::{Error, Result};
use aurora_3d_engine::{engine_debug, engine_err};
use ash::vk;

use crate::bindless::MAX_BINDLESS_IMAGES;
use crate::device::Device;
use crate::image::{AllocatedImage, ImageDesc};

/// Ids of the built-in fallback images, created at cache init.
#[derive(Debug, Clone, Copy)]
pub struct DefaultImages {
    /// 1x1 opaque white
    pub white: ImageId,
    /// 1x1 opaque black
    pub black: ImageId,
    /// 16x16 magenta/black checkerboard (missing-texture fallback)
    pub checkerboard: ImageId,
    /// 1x1 flat tangent-space normal
    pub flat_normal: ImageId,
}

pub struct ImageCache {
    /// `None` entries are reserved slots whose view lives elsewhere
    /// (render targets register their own views under the reserved id)
    images: Vec<Option<AllocatedImage>>,
    ids: IdAllocator,
    defaults: DefaultImages,
}

impl ImageCache {
    /// Create the cache and its built-in default images.
    pub fn new(device: &Device) -> Result<Self> {
        let mut cache = Self {
            images: Vec::new(),
            ids: IdAllocator::with_capacity(MAX_BINDLESS_IMAGES),
            defaults: DefaultImages {
                white: ImageId::NULL,
                black: ImageId::NULL,
                checkerboard: ImageId::NULL,
                flat_normal: ImageId::NULL,
            },
        };

        let white = cache.add_image(
            device,
            &ImageDesc::sampled(1, 1, vk::Format::R8G8B8A8_UNORM, false),
            &[255, 255, 255, 255],
        )?;
        let black = cache.add_image(
            device,
            &ImageDesc::sampled(1, 1, vk::Format::R8G8B8A8_UNORM, false),
            &[0, 0, 0, 255],
        )?;
        let checkerboard = cache.add_image(
            device,
            &ImageDesc::sampled(16, 16, vk::Format::R8G8B8A8_UNORM, false),
            &checkerboard_pixels(),
        )?;
        let flat_normal = cache.add_image(
            device,
            &ImageDesc::sampled(1, 1, vk::Format::R8G8B8A8_UNORM, false),
            &[128, 128, 255, 255],
        )?;

        cache.defaults = DefaultImages {
            white,
            black,
            checkerboard,
            flat_normal,
        };
        engine_debug!("aurora3d::ImageCache", "Default images created");
        Ok(cache)
    }

    /// Upload an image and register it in the bindless table.
    ///
    /// The returned id is stable for the cache's lifetime.
    pub fn add_image(
        &mut self,
        device: &Device,
        desc: &ImageDesc,
        pixels: &[u8],
    ) -> Result<ImageId> {
        let raw = self
            .ids
            .alloc()
            .ok_or_else(|| engine_err!("aurora3d::ImageCache", "Bindless image table is full"))?;
        let id = ImageId::new(raw);
        let image = device.create_image(desc, Some(pixels))?;
        device.register_bindless_image(id, image.view());
        self.images.push(Some(image));
        Ok(id)
    }

    /// Reserve a bindless id without storing an image in the cache.
    ///
    /// Used by render targets, which own their images but still need a
    /// stable bindless slot so later passes can sample them.
    pub fn reserve_id(&mut self) -> Result<ImageId> {
        let raw = self
            .ids
            .alloc()
            .ok_or_else(|| engine_err!("aurora3d::ImageCache", "Bindless image table is full"))?;
        self.images.push(None);
        Ok(ImageId::new(raw))
    }

    /// Overwrite an existing id with a freshly uploaded image.
    ///
    /// The bindless slot is re-pointed at the new view; the old image is
    /// destroyed after a device idle wait, so this is an import-path
    /// operation, never called inside a frame.
    pub fn replace_image(
        &mut self,
        device: &Device,
        id: ImageId,
        desc: &ImageDesc,
        pixels: &[u8],
    ) -> Result<()> {
        if id.is_null() || !self.ids.is_live(id.raw()) {
            return Err(Error::InvalidResource(format!("image id {}", id.raw())));
        }
        let image = device.create_image(desc, Some(pixels))?;
        device.register_bindless_image(id, image.view());
        // In-flight frames may still sample the old image
        device.wait_idle()?;
        self.images[id.index()] = Some(image);
        Ok(())
    }

    pub fn get(&self, id: ImageId) -> Option<&AllocatedImage> {
        if id.is_null() {
            return None;
        }
        self.images.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn defaults(&self) -> DefaultImages {
        self.defaults
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// 16x16 magenta/black checkerboard, 8-pixel squares.
pub fn checkerboard_pixels() -> Vec<u8> {
    let magenta = [255u8, 0, 255, 255];
    let black = [0u8, 0, 0, 255];
    let mut pixels = Vec::with_capacity(16 * 16 * 4);
    for y in 0..16 {
        for x in 0..16 {
            let cell = if (x / 8 + y / 8) % 2 == 0 {
                magenta
            } else {
                black
            };
            pixels.extend_from_slice(&cell);
        }
    }
    pixels
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "image_cache_tests.rs"]
mod tests;
