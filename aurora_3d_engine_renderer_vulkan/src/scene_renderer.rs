/*!
 * SceneRenderer - per-frame orchestration over the GPU resource caches
 *
 * Owns everything the frame touches: the bindless image/mesh/material
 * caches, the per-frame scene and light uploads, the pass pipelines and
 * one render-target set per viewport. `update` mirrors the scene into
 * transient draw commands; `render` records one viewport's frame into the
 * command buffer the device handed out.
 */

use aurora_3d_engine::aurora3d::assets::{AssetHandle, AssetManager, MeshPoll};
use aurora_3d_engine::aurora3d::camera::Camera;
use aurora_3d_engine::aurora3d::render::{
    GpuLightData, GpuSceneData, ImageId, MeshId, PassMask, FRAME_OVERLAP, MAX_LIGHTS,
};
use aurora_3d_engine::aurora3d::scene::{
    cull_draw_commands, sort_by_material, LightCache, MeshDrawCommand, ModelSource, Scene,
};
use aurora_3d_engine::aurora3d::Result;
use aurora_3d_engine::engine_warn;
use ash::vk;
use glam::{Vec2, Vec4};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use crate::device::{transition_image, transition_image_aspect, Device};
use crate::image_cache::ImageCache;
use crate::material_cache::MaterialCache;
use crate::mesh_cache::MeshCache;
use crate::nbuffer::NBuffer;
use crate::passes::{
    batch_sprites, DepthResolvePass, ForwardPass, IblPrecompute, InfiniteGridPass, PostFxPass,
    SkyPass, SpriteBatchPass, SpriteInstance, SpriteRun,
};
use crate::pick::PickBuffer;
use crate::targets::{sample_flags, RenderTargets, SCENE_COLOR_FORMAT, SCENE_DEPTH_FORMAT};

const LOG_SOURCE: &str = "aurora3d::SceneRenderer";

/// Which viewport a frame renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Editor scene view: grid and mouse picking enabled
    Scene,
    /// Game view: no editor overlays
    Game,
}

impl RenderMode {
    fn pass_mask(self) -> PassMask {
        match self {
            RenderMode::Scene => PassMask::SCENE_VIEW,
            RenderMode::Game => PassMask::GAME_VIEW,
        }
    }
}

/// GPU scene state and the per-frame recording logic.
pub struct SceneRenderer {
    images: ImageCache,
    meshes: MeshCache,
    materials: MaterialCache,
    lights: LightCache,

    scene_data_buffer: NBuffer,
    light_buffer: NBuffer,

    sky_pass: SkyPass,
    grid_pass: InfiniteGridPass,
    forward_pass: ForwardPass,
    sprite_pass: SpriteBatchPass,
    depth_resolve_pass: Option<DepthResolvePass>,
    post_fx_pass: PostFxPass,
    ibl: IblPrecompute,
    pick: PickBuffer,

    scene_targets: RenderTargets,
    game_targets: RenderTargets,
    scene_camera: Camera,
    game_camera: Camera,

    // Rebuilt by `update`, consumed by `render`
    draw_commands: Vec<MeshDrawCommand>,
    sprite_instances: Vec<SpriteInstance>,
    sprite_runs: Vec<SpriteRun>,
    uploaded_assets: FxHashMap<AssetHandle, MeshId>,

    ambient: Vec4,
    mouse_pos: Vec2,
    hovered: u32,
    shader_dir: PathBuf,
}

impl SceneRenderer {
    pub fn new(
        device: &Device,
        shader_dir: &Path,
        width: u32,
        height: u32,
        scene_camera: Camera,
        game_camera: Camera,
    ) -> Result<Self> {
        let mut images = ImageCache::new(device)?;
        let meshes = MeshCache::new(device)?;
        let materials = MaterialCache::new(device, images.defaults())?;

        let scene_data_buffer = NBuffer::new(
            device,
            vk::BufferUsageFlags::STORAGE_BUFFER,
            std::mem::size_of::<GpuSceneData>() as u64,
            FRAME_OVERLAP,
            "scene data",
        )?;
        let light_buffer = NBuffer::new(
            device,
            vk::BufferUsageFlags::STORAGE_BUFFER,
            (MAX_LIGHTS * std::mem::size_of::<GpuLightData>()) as u64,
            FRAME_OVERLAP,
            "lights",
        )?;

        let scene_targets = RenderTargets::new(device, &mut images, width, height, device.msaa())?;
        let game_targets = RenderTargets::new(device, &mut images, width, height, device.msaa())?;
        let samples = sample_flags(device.msaa());

        let sky_pass = SkyPass::new(
            device,
            shader_dir,
            SCENE_COLOR_FORMAT,
            SCENE_DEPTH_FORMAT,
            samples,
        )?;
        let grid_pass = InfiniteGridPass::new(
            device,
            shader_dir,
            SCENE_COLOR_FORMAT,
            SCENE_DEPTH_FORMAT,
            samples,
        )?;
        let forward_pass = ForwardPass::new(
            device,
            shader_dir,
            SCENE_COLOR_FORMAT,
            SCENE_DEPTH_FORMAT,
            samples,
        )?;
        let sprite_pass = SpriteBatchPass::new(
            device,
            shader_dir,
            SCENE_COLOR_FORMAT,
            SCENE_DEPTH_FORMAT,
            samples,
        )?;
        let depth_resolve_pass = if device.msaa().is_msaa() {
            Some(DepthResolvePass::new(device, shader_dir)?)
        } else {
            None
        };
        let post_fx_pass = PostFxPass::new(device, shader_dir)?;
        let ibl = IblPrecompute::new(device, &mut images, shader_dir)?;
        let pick = PickBuffer::new(device)?;

        Ok(Self {
            images,
            meshes,
            materials,
            lights: LightCache::new(),
            scene_data_buffer,
            light_buffer,
            sky_pass,
            grid_pass,
            forward_pass,
            sprite_pass,
            depth_resolve_pass,
            post_fx_pass,
            ibl,
            pick,
            scene_targets,
            game_targets,
            scene_camera,
            game_camera,
            draw_commands: Vec::new(),
            sprite_instances: Vec::new(),
            sprite_runs: Vec::new(),
            uploaded_assets: FxHashMap::default(),
            ambient: Vec4::new(1.0, 1.0, 1.0, 0.03),
            mouse_pos: Vec2::ZERO,
            hovered: 0,
            shader_dir: shader_dir.to_path_buf(),
        })
    }

    // ===== SCENE MIRRORING =====

    /// Mirror the scene into this frame's transient draw state.
    ///
    /// Walks models, sprites and lights once. Asset-backed models whose
    /// mesh is still decoding are skipped this frame and picked up on a
    /// later update; a decoded mesh is uploaded to the mesh cache exactly
    /// once. Idempotent for an unchanged scene.
    pub fn update(
        &mut self,
        device: &Device,
        scene: &Scene,
        assets: &mut AssetManager,
    ) -> Result<()> {
        self.draw_commands.clear();
        for (_, entity, model) in scene.models() {
            let mesh_id = match model.source {
                ModelSource::Builtin(id) => id,
                ModelSource::Asset(handle) => match self.resolve_asset(device, assets, handle)? {
                    Some(id) => id,
                    None => continue,
                },
            };
            let Some(mesh) = self.meshes.get(mesh_id) else {
                continue;
            };
            let world = entity.transform.matrix();
            self.draw_commands.push(MeshDrawCommand {
                mesh_id,
                model: world,
                visible: entity.visible,
                entity_id: entity.pick_id(),
                bounds: mesh.local_bounds().transformed(&world),
                material_id: model.material,
            });
        }
        sort_by_material(&mut self.draw_commands);

        self.sprite_instances.clear();
        for (_, entity, sprite) in scene.sprites() {
            if !entity.visible {
                continue;
            }
            self.sprite_instances.push(SpriteInstance {
                position: entity.transform.position,
                _pad0: 0.0,
                size: sprite.size,
                _pad1: [0.0; 2],
                tint: sprite.tint,
                image: sprite.image,
                _pad2: [0; 3],
            });
        }
        self.sprite_runs = batch_sprites(&mut self.sprite_instances);

        self.lights.clear();
        for (_, entity, light) in scene.lights() {
            if !entity.visible {
                continue;
            }
            let id = self.lights.add(light.to_gpu(&entity.transform.matrix()));
            if id.is_null() {
                engine_warn!(LOG_SOURCE, "Light budget exceeded, light dropped this frame");
            }
        }
        Ok(())
    }

    /// Look up or upload the mesh behind an asset handle.
    ///
    /// Returns `None` while the load is still in flight (or failed); the
    /// model is simply absent from this frame's draw list.
    fn resolve_asset(
        &mut self,
        device: &Device,
        assets: &mut AssetManager,
        handle: AssetHandle,
    ) -> Result<Option<MeshId>> {
        if let Some(&id) = self.uploaded_assets.get(&handle) {
            return Ok(Some(id));
        }
        match assets.poll_mesh(handle) {
            MeshPoll::Ready => {}
            MeshPoll::NotRequested | MeshPoll::Pending | MeshPoll::Taken | MeshPoll::Failed => {
                return Ok(None)
            }
        }
        let Some(data) = assets.take_mesh(handle) else {
            return Ok(None);
        };
        let id = self.meshes.upload_mesh(device, &data)?;
        self.uploaded_assets.insert(handle, id);
        Ok(Some(id))
    }

    // ===== FRAME RECORDING =====

    /// Record one viewport's frame into `cmd`.
    ///
    /// Pass sequence: uploads, IBL precompute when dirty, sky, grid
    /// (editor only), forward, sprites, depth resolve (MSAA only), post
    /// fx, pick readback (editor only).
    pub fn render(&mut self, device: &Device, cmd: vk::CommandBuffer, mode: RenderMode) -> Result<()> {
        let mask = mode.pass_mask();
        let (targets, camera) = match mode {
            RenderMode::Scene => (&self.scene_targets, &self.scene_camera),
            RenderMode::Game => (&self.game_targets, &self.game_camera),
        };
        let vk_device = device.handle();
        let slot = device.current_slot();
        let extent = targets.extent();

        if mask.contains(PassMask::PICK) {
            // Read last frame's result before clearing for this one.
            // One frame of staleness is accepted; no fence wait.
            self.hovered = self.pick.read_hovered();
            self.pick.clear()?;
        }

        // ----- Uploads (outside any rendering block) -----
        let scene_data = GpuSceneData {
            view: *camera.view(),
            proj: *camera.projection(),
            view_proj: camera.view_projection(),
            camera_pos: camera.position().extend(1.0),
            mouse_pos: self.mouse_pos,
            _pad0: [0.0; 2],
            ambient: self.ambient,
            light_buffer: self.light_buffer.device_address(),
            light_count: self.lights.count(),
            _pad1: 0,
            material_buffer: self.materials.device_address(),
            _pad2: [0; 2],
        };
        self.scene_data_buffer
            .upload_new_data(vk_device, cmd, slot, bytemuck::bytes_of(&scene_data), 0, true)?;
        self.light_buffer
            .upload_new_data(vk_device, cmd, slot, self.lights.as_bytes(), 0, true)?;
        if mask.contains(PassMask::SPRITES) {
            self.sprite_pass
                .upload(device, cmd, slot, &self.sprite_instances)?;
        }
        let scene_buffer = self.scene_data_buffer.device_address();

        self.ibl.run_if_dirty(device, cmd, scene_buffer);

        // ----- Main rendering block -----
        if let Some(msaa) = targets.color_msaa() {
            transition_image(
                vk_device,
                cmd,
                msaa.handle(),
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                0,
                1,
            );
        }
        transition_image(
            vk_device,
            cmd,
            targets.color().handle(),
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            0,
            1,
        );
        transition_image_aspect(
            vk_device,
            cmd,
            targets.depth().handle(),
            vk::ImageLayout::UNDEFINED,
            vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL,
            0,
            1,
            vk::ImageAspectFlags::DEPTH,
        );

        let mut color_attachment = vk::RenderingAttachmentInfo::default()
            .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .clear_value(vk::ClearValue {
                color: vk::ClearColorValue {
                    float32: [0.0, 0.0, 0.0, 1.0],
                },
            });
        color_attachment = match targets.color_msaa() {
            Some(msaa) => color_attachment
                .image_view(msaa.view())
                .resolve_mode(vk::ResolveModeFlags::AVERAGE)
                .resolve_image_view(targets.color().view())
                .resolve_image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL),
            None => color_attachment.image_view(targets.color().view()),
        };
        let depth_attachment = vk::RenderingAttachmentInfo::default()
            .image_view(targets.depth().view())
            .image_layout(vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .clear_value(vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue {
                    depth: 1.0,
                    stencil: 0,
                },
            });
        let color_attachments = [color_attachment];
        let rendering_info = vk::RenderingInfo::default()
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .layer_count(1)
            .color_attachments(&color_attachments)
            .depth_attachment(&depth_attachment);

        unsafe {
            vk_device.cmd_begin_rendering(cmd, &rendering_info);
        }

        if mask.contains(PassMask::SKY) {
            self.sky_pass
                .draw(device, cmd, extent, scene_buffer, self.ibl.env_id());
        }
        if mask.contains(PassMask::GRID) {
            self.grid_pass.draw(device, cmd, extent, scene_buffer);
        }
        if mask.contains(PassMask::FORWARD) {
            let visible = cull_draw_commands(&self.draw_commands, &camera.frustum());
            self.forward_pass
                .draw(device, cmd, extent, scene_buffer, &self.meshes, &visible);
        }
        if mask.contains(PassMask::SPRITES) {
            self.sprite_pass
                .draw(device, cmd, extent, scene_buffer, &self.sprite_runs);
        }

        unsafe {
            vk_device.cmd_end_rendering(cmd);
        }

        transition_image(
            vk_device,
            cmd,
            targets.color().handle(),
            vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            0,
            1,
        );
        transition_image_aspect(
            vk_device,
            cmd,
            targets.depth().handle(),
            vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL,
            vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
            0,
            1,
            vk::ImageAspectFlags::DEPTH,
        );

        // ----- Depth resolve (MSAA only) -----
        if let (Some(pass), Some(resolve)) = (&self.depth_resolve_pass, targets.depth_resolve()) {
            transition_image_aspect(
                vk_device,
                cmd,
                resolve.handle(),
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL,
                0,
                1,
                vk::ImageAspectFlags::DEPTH,
            );
            let resolve_attachment = vk::RenderingAttachmentInfo::default()
                .image_view(resolve.view())
                .image_layout(vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL)
                .load_op(vk::AttachmentLoadOp::DONT_CARE)
                .store_op(vk::AttachmentStoreOp::STORE);
            let resolve_info = vk::RenderingInfo::default()
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent,
                })
                .layer_count(1)
                .depth_attachment(&resolve_attachment);
            unsafe {
                vk_device.cmd_begin_rendering(cmd, &resolve_info);
            }
            pass.draw(
                device,
                cmd,
                extent,
                targets.depth_msaa_id(),
                targets.samples().as_u32(),
            );
            unsafe {
                vk_device.cmd_end_rendering(cmd);
            }
            transition_image_aspect(
                vk_device,
                cmd,
                resolve.handle(),
                vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL,
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                0,
                1,
                vk::ImageAspectFlags::DEPTH,
            );
        }

        // ----- Post fx -----
        if mask.contains(PassMask::POST_FX) {
            transition_image(
                vk_device,
                cmd,
                targets.post_fx().handle(),
                vk::ImageLayout::UNDEFINED,
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                0,
                1,
            );
            let post_fx_attachment = vk::RenderingAttachmentInfo::default()
                .image_view(targets.post_fx().view())
                .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                .load_op(vk::AttachmentLoadOp::DONT_CARE)
                .store_op(vk::AttachmentStoreOp::STORE);
            let post_fx_attachments = [post_fx_attachment];
            let post_fx_info = vk::RenderingInfo::default()
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent,
                })
                .layer_count(1)
                .color_attachments(&post_fx_attachments);
            unsafe {
                vk_device.cmd_begin_rendering(cmd, &post_fx_info);
            }
            self.post_fx_pass
                .draw(device, cmd, extent, targets.color_id());
            unsafe {
                vk_device.cmd_end_rendering(cmd);
            }
            transition_image(
                vk_device,
                cmd,
                targets.post_fx().handle(),
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
                vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                0,
                1,
            );
        }

        Ok(())
    }

    /// Recreate one viewport's render targets for a new size.
    pub fn resize(&mut self, device: &Device, mode: RenderMode, width: u32, height: u32) -> Result<()> {
        device.wait_idle()?;
        match mode {
            RenderMode::Scene => self.scene_targets.resize(device, width, height),
            RenderMode::Game => self.game_targets.resize(device, width, height),
        }
    }

    // ===== ACCESSORS =====

    pub fn camera_mut(&mut self, mode: RenderMode) -> &mut Camera {
        match mode {
            RenderMode::Scene => &mut self.scene_camera,
            RenderMode::Game => &mut self.game_camera,
        }
    }

    /// Viewport-relative mouse position, consumed by the pick shader.
    pub fn set_mouse_pos(&mut self, pos: Vec2) {
        self.mouse_pos = pos;
    }

    /// Ambient color (rgb) and intensity (a).
    pub fn set_ambient(&mut self, ambient: Vec4) {
        self.ambient = ambient;
        self.ibl.mark_dirty();
    }

    /// Pick id of the entity under the cursor as of the previous editor
    /// frame, 0 when nothing is hovered.
    pub fn hovered_entity(&self) -> u32 {
        self.hovered
    }

    /// Bindless id of the image a viewport displays.
    pub fn viewport_image(&self, mode: RenderMode) -> ImageId {
        match mode {
            RenderMode::Scene => self.scene_targets.post_fx_id(),
            RenderMode::Game => self.game_targets.post_fx_id(),
        }
    }

    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    pub fn meshes(&self) -> &MeshCache {
        &self.meshes
    }

    pub fn materials_mut(&mut self) -> &mut MaterialCache {
        &mut self.materials
    }

    pub fn shader_dir(&self) -> &Path {
        &self.shader_dir
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "scene_renderer_tests.rs"]
mod tests;
